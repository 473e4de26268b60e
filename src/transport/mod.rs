// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The OS pass-through primitive: open a device, submit one request, close.
//!
//! Everything above this layer speaks only [`SgRequest`], so a backend just
//! has to move that request through its platform's issue call.

use std::{io, path::Path};

/// Linux `SG_IO` backend.
#[cfg(target_os = "linux")]
pub mod linux;
/// `sg_io_hdr` layout and the request object that owns its buffers.
pub mod sg_io;

#[cfg(target_os = "linux")]
pub use linux::{SgDevice, SgIoTransport};
pub use sg_io::{Completion, SgInfo, SgIoHdr, SgRequest};

/// Opens devices for pass-through.
pub trait Transport {
    type Device: ScsiDevice;

    /// Open `path` for read/write. The returned handle is closed when dropped.
    fn open(&self, path: &Path) -> io::Result<Self::Device>;
}

/// An open device handle.
pub trait ScsiDevice {
    /// Submit `request` and block until it completes, times out or the OS
    /// call itself fails.
    ///
    /// `Ok` means the request went through the transport and its completion
    /// fields are filled in, whatever the device said. `Err` is reserved for
    /// the issue call failing.
    fn submit(&mut self, request: &mut SgRequest) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for &T {
    type Device = T::Device;

    fn open(&self, path: &Path) -> io::Result<Self::Device> {
        (**self).open(path)
    }
}
