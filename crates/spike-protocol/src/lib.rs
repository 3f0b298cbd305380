//! SPIKE Hub JSON RPC Protocol
//!
//! This crate provides types and utilities for talking to LEGO SPIKE hub
//! firmware over its USB serial interface. The hub speaks a line-delimited
//! JSON protocol where each message is a single JSON object terminated by a
//! carriage return (`\r`, 0x0D).
//!
//! # Protocol Overview
//!
//! Every frame is a JSON object with short single-letter keys:
//!
//! - `m`: method or event tag (string or small integer)
//! - `p`: parameters (object, array or absent)
//! - `i`: correlation token pairing a request with its response
//! - `r`: result (responses only)
//! - `e`: base64-encoded JSON error payload (failed responses only)
//!
//! Messages are either:
//!
//! - **Requests** (host → hub): `{m, p, i}`
//! - **Responses** (hub → host): `{i, r}` or `{i, e}`
//! - **Push events** (hub → host): `{m, p}`, sometimes with an `i` that the
//!   host must acknowledge
//!
//! # Example
//!
//! ```rust,ignore
//! use spike_protocol::{Command, CorrelationToken, Event, FrameCodec};
//!
//! // Build a request
//! let token = CorrelationToken::mint();
//! let bytes = FrameCodec::encode(&Command::GetHubInfo.to_frame(&token))?;
//!
//! // Parse what comes back
//! codec.push(&received);
//! while let Some(frame) = codec.next_frame() {
//!     let event = Event::classify(&frame);
//! }
//! ```

mod codec;
mod commands;
mod constants;
mod error;
mod events;
mod frame;
mod responses;
mod text;
mod token;

pub use codec::*;
pub use commands::*;
pub use constants::*;
pub use error::*;
pub use events::*;
pub use frame::*;
pub use responses::*;
pub use text::*;
pub use token::*;
