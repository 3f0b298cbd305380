//! Console rendering: program listing, versions, upload progress and the
//! events of a running program.

use std::io::{self, Write};

use chrono::DateTime;
use spike_protocol::{Frame, HubInfo, SlotInfo, StorageStatus, SLOT_COUNT};
use spike_rpc::{DecodeFailure, EventSink, UploadProgress};
use tracing::warn;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header line of the program listing.
pub fn listing_header() -> String {
    format!(
        "{:>4} {:<40} {:>6} {:<20} {:<12} {:<10}",
        "Slot", "Decoded Name", "Size", "Last Modified", "Project_id", "Type"
    )
}

/// One row of the program listing.
pub fn listing_row(slot: u8, info: &SlotInfo) -> String {
    let modified = info
        .modified
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| " ".to_string());
    format!(
        "{:>4} {:<40} {:>5}b {:<20} {:<12} {:<10}",
        slot,
        info.display_name(),
        info.size,
        modified,
        info.project_id.as_deref().unwrap_or(" "),
        info.program_type.as_deref().unwrap_or(" "),
    )
}

/// The full listing: header, occupied slots in order, storage summary.
pub fn listing(status: &StorageStatus) -> Vec<String> {
    let mut lines = vec![listing_header()];
    lines.extend(
        (0..SLOT_COUNT)
            .filter_map(|slot| status.slot(slot).map(|info| listing_row(slot, info))),
    );
    let storage = &status.storage;
    lines.push(format!(
        "Storage free {}{} of total {}{}",
        storage.free, storage.unit, storage.total, storage.unit
    ));
    lines
}

pub fn versions(info: &HubInfo) -> String {
    format!(
        "Firmware version: {}; Runtime version: {}",
        info.firmware.dotted(),
        info.runtime.dotted()
    )
}

/// Single-line progress, meant to be redrawn with a leading `\r`.
pub fn progress_line(progress: &UploadProgress) -> String {
    let percent = if progress.total == 0 {
        100.0
    } else {
        progress.bytes_sent as f64 * 100.0 / progress.total as f64
    };
    format!(
        "  [{:>8}/{:>8}] {:.1}% uploaded",
        progress.bytes_sent, progress.total, percent
    )
}

/// Writes everything a running program reports to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn button_pressed(&mut self) {
        println!("Button pressed.");
    }

    fn button_released(&mut self, duration_ms: i64) {
        println!("Button released after {}ms.", duration_ms);
    }

    fn program_finished(&mut self, frame: &Frame) {
        println!("Program finished {}", frame);
    }

    fn print(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
            warn!("Cannot write program output: {}", e);
        }
    }

    fn program_error(&mut self, message: &str, traceback: &str) {
        println!("{}", message);
        println!("{}", traceback);
    }

    fn decode_failed(&mut self, failure: DecodeFailure, frame: &Frame) {
        match failure {
            DecodeFailure::Print => match frame.param("value") {
                Some(value) => println!("Error decoding print payload: {}", value),
                None => println!("Error decoding print payload: {}", frame),
            },
            DecodeFailure::ProgramError => println!("Error decoding program error: {}", frame),
        }
    }

    fn unrecognized(&mut self, frame: &Frame) {
        println!("Unknown message format: {}", frame);
    }
}
