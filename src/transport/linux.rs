// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{
    fs::{File, OpenOptions},
    io,
    os::fd::AsRawFd,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::transport::{
    ScsiDevice, Transport,
    sg_io::{SG_IO, SgRequest},
};

/// Issues requests through `ioctl(fd, SG_IO, &hdr)` on `/dev/sg*`,
/// `/dev/sd*`, `/dev/sr*`, `/dev/st*` and other nodes that accept it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SgIoTransport;

impl Transport for SgIoTransport {
    type Device = SgDevice;

    fn open(&self, path: &Path) -> io::Result<SgDevice> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        debug!(path = %path.display(), fd = file.as_raw_fd(), "device opened");
        Ok(SgDevice {
            file,
            path: path.to_path_buf(),
        })
    }
}

/// Open device node; the descriptor is closed on drop.
#[derive(Debug)]
pub struct SgDevice {
    file: File,
    path: PathBuf,
}

impl ScsiDevice for SgDevice {
    fn submit(&mut self, request: &mut SgRequest) -> io::Result<()> {
        // SAFETY: the header and every buffer it points into are owned by
        // `request`, which stays mutably borrowed until the ioctl returns.
        let rc = unsafe {
            libc::ioctl(self.file.as_raw_fd(), SG_IO as _, request.as_raw_mut())
        };
        if rc < 0 {
            let err = io::Error::last_os_error();
            debug!(path = %self.path.display(), %err, "SG_IO ioctl failed");
            return Err(err);
        }
        Ok(())
    }
}
