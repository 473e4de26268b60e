// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Issue one command end to end: build, open, submit, classify, release.

/// Translates a [`CommandRequest`] into the `sg_io_hdr` request.
pub mod builder;
/// Maps completion fields onto a normalised outcome.
pub mod classify;
/// Scoped ownership of the open device.
pub mod session;

use std::{io, path::Path, time::Duration};

use tracing::{debug, instrument};

use crate::{
    error::{SgError, TransportFailure},
    executor::{builder::build_request, classify::classify, session::Session},
    models::{
        outcome::CommandOutcome,
        request::{CommandRequest, CommandRequestBuilder},
    },
    transport::Transport,
};

/// Runs commands over one transport backend.
#[derive(Debug, Default, Clone)]
pub struct Executor<T> {
    transport: T,
}

impl<T: Transport> Executor<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Issue `req` and block until it completes or times out.
    ///
    /// Validation and buffer allocation happen before the device is opened,
    /// so a malformed request never touches the device. The device is closed
    /// before the outcome is classified.
    #[instrument(level = "debug", skip_all, fields(path = %req.device_path().display()))]
    pub fn execute(&self, req: &CommandRequest) -> Result<CommandOutcome, SgError> {
        let mut sg = build_request(req)?;

        let mut session = Session::open(&self.transport, req.device_path())?;
        let submitted = session.submit(&mut sg);
        session.close();
        submitted?;

        let outcome = classify(&sg)?;
        debug!(
            status_code = outcome.status_code(),
            sense_len = outcome.sense().len(),
            data_in_len = outcome.data_in().len(),
            "command finished"
        );
        Ok(outcome)
    }
}

impl<T> Executor<T>
where T: Transport + Clone + Send + 'static
{
    /// Run [`Executor::execute`] on tokio's blocking pool.
    ///
    /// The command itself cannot be cancelled: dropping the future leaves the
    /// blocking call running until the transport returns.
    pub async fn execute_async(&self, req: CommandRequest) -> Result<CommandOutcome, SgError> {
        let exec = self.clone();
        match tokio::task::spawn_blocking(move || exec.execute(&req)).await {
            Ok(res) => res,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(SgError::Transport(TransportFailure::Os(io::Error::other(e)))),
        }
    }
}

/// Issue one command on the platform's SG transport.
///
/// * `device_path`    – e.g. `/dev/sg0`
/// * `timeout`        – deadline enforced by the kernel
/// * `cdb`            – 6 to 256 bytes
/// * `sense_capacity` – bytes reserved for sense data (1..=255)
/// * `data_in_len`    – bytes to read from the device; ignored when
///   `data_out` is non-empty
/// * `data_out`       – bytes to send to the device
#[cfg(target_os = "linux")]
pub fn execute(
    device_path: impl AsRef<Path>,
    timeout: Duration,
    cdb: &[u8],
    sense_capacity: usize,
    data_in_len: usize,
    data_out: &[u8],
) -> Result<CommandOutcome, SgError> {
    let req = CommandRequestBuilder::new(device_path.as_ref())
        .cdb(cdb)
        .timeout(timeout)
        .sense_capacity(sense_capacity)
        .data_in(data_in_len)
        .data_out(data_out)
        .build()?;
    Executor::new(crate::transport::SgIoTransport).execute(&req)
}

/// Async variant of [`execute`] for callers already on a tokio runtime.
#[cfg(target_os = "linux")]
pub async fn execute_async(req: CommandRequest) -> Result<CommandOutcome, SgError> {
    Executor::new(crate::transport::SgIoTransport)
        .execute_async(req)
        .await
}
