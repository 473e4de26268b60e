// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{
    error::{SgError, TransportFailure},
    executor::classify::os_failure,
    transport::{ScsiDevice, SgRequest, Transport},
};

/// An open device for the duration of one command.
///
/// The handle is released when the session is dropped, on every path out of
/// the caller: normal return, `?` propagation or unwinding.
#[derive(Debug)]
pub struct Session<D: ScsiDevice> {
    device: Option<D>,
    path: PathBuf,
}

impl<D: ScsiDevice> Session<D> {
    pub fn open<T>(transport: &T, path: &Path) -> Result<Self, SgError>
    where T: Transport<Device = D> + ?Sized {
        let device = transport.open(path).map_err(|source| SgError::DeviceOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            device: Some(device),
            path: path.to_path_buf(),
        })
    }

    /// Submit and block until the transport returns.
    pub fn submit(&mut self, request: &mut SgRequest) -> Result<(), TransportFailure> {
        let Some(device) = self.device.as_mut() else {
            return Err(TransportFailure::Os(std::io::Error::from_raw_os_error(
                libc::EBADF,
            )));
        };
        debug!(path = %self.path.display(), "submitting request");
        device.submit(request).map_err(os_failure)
    }

    /// Close the device now instead of at the end of the scope.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(device) = self.device.take() {
            drop(device);
            debug!(path = %self.path.display(), "device closed");
        }
    }
}

impl<D: ScsiDevice> Drop for Session<D> {
    fn drop(&mut self) {
        self.release();
    }
}
