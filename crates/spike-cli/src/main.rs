//! `spiketool`: manage programs and the display of a SPIKE hub over USB.
//!
//! This is the only place where an [`RpcError`] ends the process: the
//! connection is closed, a diagnostic and a hint are printed and the exit
//! status tells the fault class apart.

mod output;

use std::fs::File;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use spike_protocol::{ProgramMeta, DEFAULT_PIXEL_BRIGHTNESS, DISPLAY_SIZE, MAX_PIXEL_BRIGHTNESS, SLOT_COUNT};
use spike_rpc::{
    RpcClient, RpcError, SerialConfig, SerialTransport, UploadRequest, DEFAULT_DEVICE,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::output::ConsoleSink;

#[derive(Parser, Debug)]
#[command(name = "spiketool")]
#[command(about = "Tools for the SPIKE hub RPC protocol")]
struct Cli {
    /// Hub device path
    #[arg(short, long, global = true, default_value = DEFAULT_DEVICE)]
    tty: String,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored programs
    #[command(visible_alias = "ls")]
    List,

    /// Show firmware and runtime versions
    Fwinfo,

    /// Move a program to another slot
    Mv {
        #[arg(value_parser = slot_parser())]
        from_slot: u8,
        #[arg(value_parser = slot_parser())]
        to_slot: u8,
    },

    /// Upload a program and start it
    #[command(visible_alias = "cp")]
    Upload {
        file: PathBuf,

        /// Name shown on the hub (defaults to the file path)
        name: Option<String>,

        #[arg(long, alias = "to_slot", default_value_t = 0, value_parser = slot_parser())]
        to_slot: u8,

        /// Do not start after upload
        #[arg(short = 'n', long, alias = "no_start")]
        no_start: bool,
    },

    /// Remove the program at a slot
    Rm {
        #[arg(value_parser = slot_parser())]
        slot: u8,
    },

    /// Start a program and show its output until it stops
    Start {
        #[arg(value_parser = slot_parser())]
        slot: u8,
    },

    /// Stop the running program
    Stop,

    /// Control the 5x5 LED matrix
    Display {
        #[command(subcommand)]
        command: DisplayCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DisplayCommand {
    /// Show an image
    Image {
        /// Rows as `xxxxx:xxxxx:xxxxx:xxxxx:xxxxx`, x being brightness 0-9
        image: String,
    },

    /// Show an image for a while
    ImageFor {
        image: String,
        duration_ms: u32,
    },

    /// Scroll text
    Text { text: String },

    /// Turn all pixels off
    Clear,

    /// Set one pixel
    Setpixel {
        #[arg(value_parser = coordinate_parser())]
        x: u8,
        #[arg(value_parser = coordinate_parser())]
        y: u8,
        /// Pixel brightness 0-9
        #[arg(default_value_t = DEFAULT_PIXEL_BRIGHTNESS,
              value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_PIXEL_BRIGHTNESS)))]
        brightness: u8,
    },
}

fn slot_parser() -> clap::builder::RangedI64ValueParser<u8> {
    clap::value_parser!(u8).range(0..i64::from(SLOT_COUNT))
}

fn coordinate_parser() -> clap::builder::RangedI64ValueParser<u8> {
    clap::value_parser!(u8).range(0..i64::from(DISPLAY_SIZE))
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = SerialConfig::new(&cli.tty);
    let transport = match SerialTransport::open(&config) {
        Ok(transport) => transport,
        Err(err) => fail(None, &err),
    };
    let mut client = RpcClient::new(transport);

    if let Err(err) = run(&mut client, cli.command) {
        fail(Some(&mut client), &err);
    }

    let stats = client.stats();
    debug!(
        "{} requests, {} acknowledgments, {} frames discarded, {} malformed",
        stats.requests_sent, stats.acknowledgments_sent, stats.frames_discarded, stats.frames_malformed
    );
    if let Err(e) = client.close() {
        warn!("Failed to close the USB connection: {}", e);
    }
}

fn run(client: &mut RpcClient<SerialTransport>, command: Command) -> Result<(), RpcError> {
    match command {
        Command::List => {
            let status = client.storage_status()?;
            for line in output::listing(&status) {
                println!("{}", line);
            }
        }
        Command::Fwinfo => {
            let info = client.hub_info()?;
            println!("{}", output::versions(&info));
        }
        Command::Mv { from_slot, to_slot } => {
            let result = client.move_project(from_slot, to_slot)?;
            debug!("move_project: {}", result);
        }
        Command::Upload {
            file,
            name,
            to_slot,
            no_start,
        } => upload(client, file, name, to_slot, !no_start)?,
        Command::Rm { slot } => {
            let result = client.remove_project(slot)?;
            debug!("remove_project: {}", result);
        }
        Command::Start { slot } => client.program_execute(slot, &mut ConsoleSink)?,
        Command::Stop => {
            client.program_terminate()?;
        }
        Command::Display { command } => display(client, command)?,
    }
    Ok(())
}

fn upload(
    client: &mut RpcClient<SerialTransport>,
    file: PathBuf,
    name: Option<String>,
    slot: u8,
    start: bool,
) -> Result<(), RpcError> {
    let source = File::open(&file).map_err(RpcError::LocalIo)?;
    let size = source.metadata().map_err(RpcError::LocalIo)?.len();
    let now = chrono::Utc::now().timestamp_millis();
    let request = UploadRequest {
        slot,
        size,
        meta: ProgramMeta {
            name: name.unwrap_or_else(|| file.display().to_string()),
            created: now,
            modified: now,
        },
        start,
    };

    info!("Uploading {} ({} bytes) to slot {}", file.display(), size, slot);
    let mut sink = ConsoleSink;
    let mut drawn = false;
    let result = client.upload(
        source,
        &request,
        |progress| {
            eprint!("\r{}", output::progress_line(&progress));
            drawn = true;
            if progress.bytes_sent >= progress.total {
                eprintln!();
                drawn = false;
            }
        },
        &mut sink,
    );
    if drawn {
        eprintln!();
    }
    let session = result?;
    debug!(
        "transfer {} finished: {} chunks of at most {} bytes",
        session.transfer_id, session.chunks_sent, session.block_size
    );
    Ok(())
}

fn display(client: &mut RpcClient<SerialTransport>, command: DisplayCommand) -> Result<(), RpcError> {
    let result = match command {
        DisplayCommand::Image { image } => client.display_image(&image)?,
        DisplayCommand::ImageFor { image, duration_ms } => {
            client.display_image_for(&image, duration_ms)?
        }
        DisplayCommand::Text { text } => client.display_text(&text)?,
        DisplayCommand::Clear => client.display_clear()?,
        DisplayCommand::Setpixel { x, y, brightness } => {
            client.display_set_pixel(x, y, brightness)?
        }
    };
    debug!("display: {}", result);
    Ok(())
}

/// Close the connection, report `err` and exit with its status.
fn fail(client: Option<&mut RpcClient<SerialTransport>>, err: &RpcError) -> ! {
    if let Some(client) = client {
        if let Err(e) = client.close() {
            warn!("Failed to close the USB connection: {}", e);
        }
    }

    match err {
        RpcError::Remote(remote) => eprintln!("Hub reported an error: {}", remote),
        _ => eprintln!("Error: {}", err),
    }
    if let Some(hint) = err.hint() {
        eprintln!("{}", hint);
    }
    process::exit(err.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_upload_arguments() {
        let cli = Cli::parse_from(["spiketool", "cp", "main.py", "--to-slot", "3", "-n"]);
        match cli.command {
            Command::Upload {
                file,
                name,
                to_slot,
                no_start,
            } => {
                assert_eq!(file, PathBuf::from("main.py"));
                assert_eq!(name, None);
                assert_eq!(to_slot, 3);
                assert!(no_start);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.tty, DEFAULT_DEVICE);
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from(["spiketool", "ls", "-t", "/dev/ttyACM1", "--debug"]);
        assert!(matches!(cli.command, Command::List));
        assert_eq!(cli.tty, "/dev/ttyACM1");
        assert!(cli.debug);
    }

    #[test]
    fn test_setpixel_default_and_range() {
        let cli = Cli::parse_from(["spiketool", "display", "setpixel", "1", "4"]);
        match cli.command {
            Command::Display {
                command: DisplayCommand::Setpixel { x, y, brightness },
            } => assert_eq!((x, y, brightness), (1, 4, 9)),
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["spiketool", "display", "setpixel", "1", "1", "10"]).is_err());
        assert!(Cli::try_parse_from(["spiketool", "display", "setpixel", "5", "1"]).is_err());
    }

    #[test]
    fn test_slot_range() {
        assert!(Cli::try_parse_from(["spiketool", "rm", "19"]).is_ok());
        assert!(Cli::try_parse_from(["spiketool", "rm", "20"]).is_err());
    }

    #[test]
    fn test_display_image_for() {
        let cli = Cli::parse_from(["spiketool", "display", "image-for", "09090:", "250"]);
        assert!(matches!(
            cli.command,
            Command::Display {
                command: DisplayCommand::ImageFor { duration_ms: 250, .. }
            }
        ));
    }
}
