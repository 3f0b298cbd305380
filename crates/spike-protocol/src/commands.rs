//! Requests that can be sent to the hub.
//!
//! The hub supports several categories of requests:
//! - Program storage (list, upload, move, remove)
//! - Program control (execute, terminate)
//! - Hub information
//! - LED matrix display

use serde_json::{json, Value};

use crate::constants::*;
use crate::frame::Frame;
use crate::text::encode_data;
use crate::token::CorrelationToken;

/// Metadata stored with an uploaded program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramMeta {
    /// Display name.
    pub name: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub created: i64,
    /// Modification time, milliseconds since the Unix epoch.
    pub modified: i64,
}

/// Requests understood by the hub.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // ========== Storage ==========
    /// Query storage usage and the programs in each slot.
    GetStorageStatus,

    /// Begin uploading a program into a slot.
    StartWriteProgram {
        /// Target slot.
        slot: u8,
        /// Total program size in bytes.
        size: u64,
        /// Program metadata.
        meta: ProgramMeta,
    },

    /// Send one chunk of an upload.
    WritePackage {
        /// Raw chunk bytes (base64-encoded on the wire).
        data: Vec<u8>,
        /// Transfer id returned by `StartWriteProgram`.
        transfer_id: String,
    },

    /// Move a program between slots.
    MoveProject {
        /// Current slot.
        from_slot: u8,
        /// New slot.
        to_slot: u8,
    },

    /// Delete the program in a slot.
    RemoveProject {
        /// Slot to clear.
        slot: u8,
    },

    // ========== Program control ==========
    /// Run the program stored in a slot.
    ProgramExecute {
        /// Slot to run.
        slot: u8,
    },

    /// Stop the running program.
    ProgramTerminate,

    // ========== Hub ==========
    /// Query firmware and runtime versions.
    GetHubInfo,

    // ========== Display ==========
    /// Set one LED's brightness.
    DisplaySetPixel {
        /// Column (0-4).
        x: u8,
        /// Row (0-4).
        y: u8,
        /// Brightness (0-9).
        brightness: u8,
    },

    /// Turn all LEDs off.
    DisplayClear,

    /// Show a static image, `xxxxx:xxxxx:xxxxx:xxxxx:xxxxx` with digits 0-9.
    DisplayImage {
        /// Image string.
        image: String,
    },

    /// Show an image for a fixed duration.
    DisplayImageFor {
        /// Image string.
        image: String,
        /// Duration in milliseconds.
        duration_ms: u32,
    },

    /// Scroll text across the display.
    DisplayText {
        /// Text to scroll.
        text: String,
    },
}

impl Command {
    /// Get the wire method name.
    pub fn method(&self) -> &'static str {
        match self {
            Command::GetStorageStatus => METHOD_GET_STORAGE_STATUS,
            Command::StartWriteProgram { .. } => METHOD_START_WRITE_PROGRAM,
            Command::WritePackage { .. } => METHOD_WRITE_PACKAGE,
            Command::MoveProject { .. } => METHOD_MOVE_PROJECT,
            Command::RemoveProject { .. } => METHOD_REMOVE_PROJECT,
            Command::ProgramExecute { .. } => METHOD_PROGRAM_EXECUTE,
            Command::ProgramTerminate => METHOD_PROGRAM_TERMINATE,
            Command::GetHubInfo => METHOD_GET_HUB_INFO,
            Command::DisplaySetPixel { .. } => METHOD_DISPLAY_SET_PIXEL,
            Command::DisplayClear => METHOD_DISPLAY_CLEAR,
            Command::DisplayImage { .. } => METHOD_DISPLAY_IMAGE,
            Command::DisplayImageFor { .. } => METHOD_DISPLAY_IMAGE_FOR,
            Command::DisplayText { .. } => METHOD_DISPLAY_TEXT,
        }
    }

    /// Build the parameter object.
    pub fn params(&self) -> Value {
        match self {
            Command::GetStorageStatus
            | Command::ProgramTerminate
            | Command::GetHubInfo
            | Command::DisplayClear => json!({}),
            Command::StartWriteProgram { slot, size, meta } => json!({
                "slotid": slot,
                "size": size,
                "meta": {
                    "created": meta.created,
                    "modified": meta.modified,
                    "name": meta.name,
                    "type": PROGRAM_TYPE,
                    "project_id": PROJECT_ID,
                },
            }),
            Command::WritePackage { data, transfer_id } => json!({
                "data": encode_data(data),
                "transferid": transfer_id,
            }),
            Command::MoveProject { from_slot, to_slot } => json!({
                "old_slotid": from_slot,
                "new_slotid": to_slot,
            }),
            Command::RemoveProject { slot } | Command::ProgramExecute { slot } => {
                json!({ "slotid": slot })
            }
            Command::DisplaySetPixel { x, y, brightness } => json!({
                "x": x,
                "y": y,
                "brightness": brightness,
            }),
            Command::DisplayImage { image } => json!({ "image": image }),
            Command::DisplayImageFor { image, duration_ms } => json!({
                "image": image,
                "duration": duration_ms,
            }),
            Command::DisplayText { text } => json!({ "text": text }),
        }
    }

    /// Build the request frame for this command.
    pub fn to_frame(&self, token: &CorrelationToken) -> Frame {
        Frame::request(self.method(), self.params(), token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameterless_commands_send_empty_object() {
        for cmd in [
            Command::GetStorageStatus,
            Command::ProgramTerminate,
            Command::GetHubInfo,
            Command::DisplayClear,
        ] {
            assert_eq!(cmd.params(), json!({}), "{}", cmd.method());
        }
    }

    #[test]
    fn test_start_write_program_params() {
        let cmd = Command::StartWriteProgram {
            slot: 4,
            size: 1234,
            meta: ProgramMeta {
                name: "demo.py".to_string(),
                created: 1_700_000_000_000,
                modified: 1_700_000_000_001,
            },
        };
        assert_eq!(cmd.method(), "start_write_program");
        assert_eq!(
            cmd.params(),
            json!({
                "slotid": 4,
                "size": 1234,
                "meta": {
                    "created": 1_700_000_000_000i64,
                    "modified": 1_700_000_000_001i64,
                    "name": "demo.py",
                    "type": "python",
                    "project_id": "50uN1ZaRpHj2",
                }
            })
        );
    }

    #[test]
    fn test_write_package_encodes_data() {
        let cmd = Command::WritePackage {
            data: b"print(1)".to_vec(),
            transfer_id: "T42".to_string(),
        };
        assert_eq!(cmd.params(), json!({"data": "cHJpbnQoMSk=", "transferid": "T42"}));
    }

    #[test]
    fn test_slot_commands() {
        assert_eq!(
            Command::MoveProject { from_slot: 1, to_slot: 7 }.params(),
            json!({"old_slotid": 1, "new_slotid": 7})
        );
        assert_eq!(Command::RemoveProject { slot: 3 }.params(), json!({"slotid": 3}));
        assert_eq!(Command::ProgramExecute { slot: 0 }.method(), "program_execute");
    }

    #[test]
    fn test_display_commands() {
        assert_eq!(
            Command::DisplaySetPixel { x: 1, y: 2, brightness: 9 }.params(),
            json!({"x": 1, "y": 2, "brightness": 9})
        );
        assert_eq!(
            Command::DisplayImageFor { image: "09090:".into(), duration_ms: 500 }.params(),
            json!({"image": "09090:", "duration": 500})
        );
        assert_eq!(Command::DisplayText { text: "Hi".into() }.method(), "scratch.display_text");
    }

    #[test]
    fn test_to_frame_carries_token() {
        let token = CorrelationToken::from("Q_1z");
        let frame = Command::GetHubInfo.to_frame(&token);
        assert!(frame.answers(&token));
        assert_eq!(frame.to_json().unwrap(), r#"{"m":"get_hub_info","p":{},"i":"Q_1z"}"#);
    }
}
