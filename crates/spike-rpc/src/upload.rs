//! Upload driver: start, chunked writes, optional execute.
//!
//! ```text
//! host                                   hub
//!  |-- start_write_program {slot,size,meta} -->|
//!  |<-------- {blocksize, transferid} ---------|
//!  |-- write_package {data, transferid} ------>|  ceil(size / blocksize) times
//!  |<------------------ ok --------------------|
//!  |-- program_execute {slotid} -------------->|  if requested
//! ```
//!
//! Each chunk waits for its response before the next is read.

use std::io::Read;

use spike_protocol::{ProgramMeta, ProtocolError, METHOD_START_WRITE_PROGRAM};
use tracing::debug;

use crate::client::RpcClient;
use crate::dispatcher::EventSink;
use crate::error::{Result, RpcError};
use crate::transport::Transport;

/// What to upload and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Target slot.
    pub slot: u8,
    /// Total size of the source in bytes.
    pub size: u64,
    /// Program metadata.
    pub meta: ProgramMeta,
    /// Run the program once the last chunk is acknowledged.
    pub start: bool,
}

/// Progress after one acknowledged chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    /// Bytes in the chunk just acknowledged.
    pub chunk_len: usize,
    /// Bytes acknowledged so far.
    pub bytes_sent: u64,
    /// Declared total size.
    pub total: u64,
}

/// State of one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSession {
    /// Hub-issued transfer id.
    pub transfer_id: String,
    /// Maximum chunk size dictated by the hub.
    pub block_size: usize,
    /// Bytes acknowledged so far.
    pub bytes_sent: u64,
    /// Chunks acknowledged so far.
    pub chunks_sent: usize,
}

impl<T: Transport> RpcClient<T> {
    /// Upload a program from `source`.
    ///
    /// `progress` is called after every acknowledged chunk. If
    /// `request.start` is set the program is executed afterwards and its
    /// events go to `sink` until it finishes.
    pub fn upload<R, P, S>(
        &mut self,
        mut source: R,
        request: &UploadRequest,
        mut progress: P,
        sink: &mut S,
    ) -> Result<TransferSession>
    where
        R: Read,
        P: FnMut(UploadProgress),
        S: EventSink + ?Sized,
    {
        let start = self.start_write_program(request.slot, request.size, request.meta.clone())?;
        if start.block_size == 0 {
            return Err(ProtocolError::UnexpectedResult {
                method: METHOD_START_WRITE_PROGRAM.to_string(),
                reason: "block size is zero".to_string(),
            }
            .into());
        }
        debug!(
            "upload to slot {}: transfer {} with {} byte blocks",
            request.slot, start.transfer_id, start.block_size
        );

        let mut session = TransferSession {
            transfer_id: start.transfer_id,
            block_size: start.block_size,
            bytes_sent: 0,
            chunks_sent: 0,
        };

        loop {
            let mut chunk = Vec::with_capacity(session.block_size);
            source
                .by_ref()
                .take(session.block_size as u64)
                .read_to_end(&mut chunk)
                .map_err(RpcError::LocalIo)?;
            if chunk.is_empty() {
                break;
            }

            let chunk_len = chunk.len();
            self.write_package(chunk, &session.transfer_id)?;
            session.bytes_sent += chunk_len as u64;
            session.chunks_sent += 1;
            progress(UploadProgress {
                chunk_len,
                bytes_sent: session.bytes_sent,
                total: request.size,
            });
        }

        debug!(
            "upload to slot {} complete: {} bytes in {} chunks",
            request.slot, session.bytes_sent, session.chunks_sent
        );

        if request.start {
            self.program_execute(request.slot, sink)?;
        }
        Ok(session)
    }
}
