//! Protocol constants for the SPIKE hub RPC interface.

// ============================================================================
// Framing
// ============================================================================

/// Frame delimiter. Never appears inside a JSON payload because the encoder
/// escapes control characters.
pub const FRAME_DELIMITER: u8 = 0x0D;

/// Initial capacity of the receive buffer.
pub const RECEIVE_BUFFER_CAPACITY: usize = 1024;

// ============================================================================
// Correlation tokens
// ============================================================================

/// Number of characters in a correlation token.
pub const TOKEN_LENGTH: usize = 4;

/// Characters a correlation token is drawn from.
pub const TOKEN_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";

// ============================================================================
// Request methods (host → hub)
// ============================================================================

pub const METHOD_GET_STORAGE_STATUS: &str = "get_storage_status";
pub const METHOD_GET_HUB_INFO: &str = "get_hub_info";
pub const METHOD_PROGRAM_EXECUTE: &str = "program_execute";
pub const METHOD_PROGRAM_TERMINATE: &str = "program_terminate";
pub const METHOD_START_WRITE_PROGRAM: &str = "start_write_program";
pub const METHOD_WRITE_PACKAGE: &str = "write_package";
pub const METHOD_MOVE_PROJECT: &str = "move_project";
pub const METHOD_REMOVE_PROJECT: &str = "remove_project";
pub const METHOD_DISPLAY_SET_PIXEL: &str = "scratch.display_set_pixel";
pub const METHOD_DISPLAY_CLEAR: &str = "scratch.display_clear";
pub const METHOD_DISPLAY_IMAGE: &str = "scratch.display_image";
pub const METHOD_DISPLAY_IMAGE_FOR: &str = "scratch.display_image_for";
pub const METHOD_DISPLAY_TEXT: &str = "scratch.display_text";

// ============================================================================
// Push event tags (hub → host)
// ============================================================================

/// Integer tags of high-frequency telemetry (motion sensor, port values, ...).
pub const EVENT_TELEMETRY_CODES: [i64; 3] = [0, 2, 4];

/// Center button press/release.
pub const EVENT_BUTTON: i64 = 3;

/// Program running status change.
pub const EVENT_PROGRAM_STATUS: i64 = 12;

/// Text printed by the user program.
pub const EVENT_USER_PROGRAM_PRINT: &str = "userProgram.print";

/// Uncaught exception in the user program.
pub const EVENT_USER_PROGRAM_ERROR: &str = "user_program_error";

/// Parameter count of a button event: `[button, duration_ms]`.
pub const BUTTON_PARAM_COUNT: usize = 2;

/// Parameter count of a program status event: `[slot, running]`.
pub const PROGRAM_STATUS_PARAM_COUNT: usize = 2;

/// Parameter count of a user program error event.
pub const PROGRAM_ERROR_PARAM_COUNT: usize = 5;

/// Index of the base64 error message in a user program error event.
pub const PROGRAM_ERROR_MESSAGE_INDEX: usize = 3;

/// Index of the base64 traceback in a user program error event.
pub const PROGRAM_ERROR_TRACEBACK_INDEX: usize = 4;

// ============================================================================
// Program storage
// ============================================================================

/// Number of program slots on the hub.
pub const SLOT_COUNT: u8 = 20;

/// Program type recorded in upload metadata.
pub const PROGRAM_TYPE: &str = "python";

/// Project id recorded in upload metadata.
pub const PROJECT_ID: &str = "50uN1ZaRpHj2";

/// Default LED brightness for `set pixel`.
pub const DEFAULT_PIXEL_BRIGHTNESS: u8 = 9;

/// Maximum LED brightness.
pub const MAX_PIXEL_BRIGHTNESS: u8 = 9;

/// Width and height of the LED matrix.
pub const DISPLAY_SIZE: u8 = 5;
