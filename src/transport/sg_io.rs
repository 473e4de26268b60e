// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The SG v3 request header (`struct sg_io_hdr` from `<scsi/sg.h>`) and the
//! request object that owns every buffer the header points into.

use core::fmt;
use std::{ptr, time::Duration};

use libc::{c_int, c_uchar, c_uint, c_ushort, c_void};

use crate::{
    buffer::AlignedBuffer,
    models::{
        request::{DataDirection, SgFlags},
        status::RawScsiStatus,
    },
};

/// `SG_IO` ioctl number.
pub const SG_IO: u32 = 0x2285;
/// `interface_id` of a v3 header.
pub const SG_INTERFACE_ID: c_int = b'S' as c_int;

bitflags::bitflags! {
    /// `SG_INFO_*` bits the driver writes into `info`.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct SgInfo: u32 {
        /// Set when status, host_status or driver_status is non-zero.
        const CHECK = 0x1;
        const DIRECT_IO = 0x2;
        const MIXED_IO = 0x4;
    }
}

impl SgInfo {
    pub const OK_MASK: u32 = 0x1;

    #[inline]
    pub fn is_ok(self) -> bool {
        self.bits() & Self::OK_MASK == 0
    }
}

/// Byte-exact mirror of `struct sg_io_hdr`.
#[repr(C)]
pub struct SgIoHdr {
    pub interface_id: c_int,
    pub dxfer_direction: c_int,
    pub cmd_len: c_uchar,
    pub mx_sb_len: c_uchar,
    pub iovec_count: c_ushort,
    pub dxfer_len: c_uint,
    pub dxferp: *mut c_void,
    pub cmdp: *mut c_uchar,
    pub sbp: *mut c_uchar,
    pub timeout: c_uint,
    pub flags: c_uint,
    pub pack_id: c_int,
    pub usr_ptr: *mut c_void,
    pub status: RawScsiStatus,
    pub masked_status: c_uchar,
    pub msg_status: c_uchar,
    pub sb_len_wr: c_uchar,
    pub host_status: c_ushort,
    pub driver_status: c_ushort,
    pub resid: c_int,
    pub duration: c_uint,
    pub info: c_uint,
}

impl SgIoHdr {
    fn empty() -> Self {
        Self {
            interface_id: SG_INTERFACE_ID,
            dxfer_direction: DataDirection::None.sg_dxfer(),
            cmd_len: 0,
            mx_sb_len: 0,
            iovec_count: 0,
            dxfer_len: 0,
            dxferp: ptr::null_mut(),
            cmdp: ptr::null_mut(),
            sbp: ptr::null_mut(),
            timeout: 0,
            flags: 0,
            pack_id: 0,
            usr_ptr: ptr::null_mut(),
            status: RawScsiStatus::default(),
            masked_status: 0,
            msg_status: 0,
            sb_len_wr: 0,
            host_status: 0,
            driver_status: 0,
            resid: 0,
            duration: 0,
            info: 0,
        }
    }
}

impl fmt::Debug for SgIoHdr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SgIoHdr")
            .field("dxfer_direction", &self.dxfer_direction)
            .field("cmd_len", &self.cmd_len)
            .field("mx_sb_len", &self.mx_sb_len)
            .field("dxfer_len", &self.dxfer_len)
            .field("timeout", &self.timeout)
            .field("flags", &format_args!("{:#x}", self.flags))
            .field("status", &self.status)
            .field("sb_len_wr", &self.sb_len_wr)
            .field("host_status", &format_args!("{:#06x}", self.host_status))
            .field("driver_status", &format_args!("{:#06x}", self.driver_status))
            .field("resid", &self.resid)
            .field("duration", &self.duration)
            .field("info", &format_args!("{:#x}", self.info))
            .finish()
    }
}

/// Output fields of a completed request, as the driver wrote them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub status: u8,
    pub host_status: u16,
    pub driver_status: u16,
    pub sb_len_wr: u8,
    pub resid: i32,
    pub duration_ms: u32,
    pub info: u32,
}

impl Completion {
    pub fn info(&self) -> SgInfo {
        SgInfo::from_bits_retain(self.info)
    }
}

/// A ready-to-submit SG request.
///
/// Owns the CDB, the sense buffer and the (optional) aligned data buffer;
/// the header's pointers refer to their heap storage, which does not move
/// when the request itself is moved.
pub struct SgRequest {
    hdr: SgIoHdr,
    cdb: Vec<u8>,
    sense: Vec<u8>,
    data: Option<AlignedBuffer>,
    direction: DataDirection,
}

// SAFETY: the raw pointers in `hdr` only ever refer to buffers owned by the
// same value.
unsafe impl Send for SgRequest {}

impl SgRequest {
    /// Assemble a header around owned buffers. Length fields must already
    /// have been checked to fit their header types.
    pub(crate) fn assemble(
        cdb: Vec<u8>,
        cmd_len: u8,
        sense_capacity: u8,
        data: Option<AlignedBuffer>,
        direction: DataDirection,
        timeout_ms: u32,
        flags: SgFlags,
    ) -> Self {
        let mut req = Self {
            hdr: SgIoHdr::empty(),
            cdb,
            sense: vec![0u8; sense_capacity as usize],
            data,
            direction,
        };

        req.hdr.dxfer_direction = direction.sg_dxfer();
        req.hdr.cmd_len = cmd_len;
        req.hdr.cmdp = req.cdb.as_mut_ptr();
        req.hdr.mx_sb_len = sense_capacity;
        req.hdr.sbp = req.sense.as_mut_ptr();
        req.hdr.timeout = timeout_ms;
        req.hdr.flags = flags.bits();
        if let Some(buf) = req.data.as_mut() {
            req.hdr.dxfer_len = buf.len() as c_uint;
            req.hdr.dxferp = buf.as_mut_ptr().cast();
        }
        req
    }

    pub fn header(&self) -> &SgIoHdr {
        &self.hdr
    }

    /// Pointer handed to the `SG_IO` ioctl.
    pub fn as_raw_mut(&mut self) -> *mut SgIoHdr {
        &mut self.hdr
    }

    pub fn cdb(&self) -> &[u8] {
        &self.cdb[..self.hdr.cmd_len as usize]
    }

    pub fn direction(&self) -> DataDirection {
        self.direction
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.hdr.timeout.into())
    }

    pub fn flags(&self) -> SgFlags {
        SgFlags::from_bits_retain(self.hdr.flags)
    }

    /// Length of the data phase.
    pub fn transfer_len(&self) -> usize {
        self.data.as_ref().map_or(0, AlignedBuffer::len)
    }

    /// Payload sent to the device; empty unless the direction is
    /// [`DataDirection::ToDevice`].
    pub fn data_out(&self) -> &[u8] {
        match (self.direction, self.data.as_ref()) {
            (DataDirection::ToDevice, Some(buf)) => buf.as_slice(),
            _ => &[],
        }
    }

    /// Buffer the device fills; empty unless the direction is
    /// [`DataDirection::FromDevice`].
    pub fn data_in_mut(&mut self) -> &mut [u8] {
        match (self.direction, self.data.as_mut()) {
            (DataDirection::FromDevice, Some(buf)) => buf.as_mut_slice(),
            _ => &mut [],
        }
    }

    pub(crate) fn data_buffer(&self) -> Option<&AlignedBuffer> {
        self.data.as_ref()
    }

    pub fn sense_capacity(&self) -> usize {
        self.sense.len()
    }

    pub fn sense(&self) -> &[u8] {
        &self.sense
    }

    pub fn sense_mut(&mut self) -> &mut [u8] {
        &mut self.sense
    }

    pub fn completion(&self) -> Completion {
        Completion {
            status: self.hdr.status.raw(),
            host_status: self.hdr.host_status,
            driver_status: self.hdr.driver_status,
            sb_len_wr: self.hdr.sb_len_wr,
            resid: self.hdr.resid,
            duration_ms: self.hdr.duration,
            info: self.hdr.info,
        }
    }

    /// Write the output fields, the way the driver does on completion.
    pub fn complete(&mut self, c: Completion) {
        self.hdr.status = RawScsiStatus::new_raw(c.status);
        self.hdr.masked_status = (c.status >> 1) & 0x1F;
        self.hdr.host_status = c.host_status;
        self.hdr.driver_status = c.driver_status;
        self.hdr.sb_len_wr = c.sb_len_wr;
        self.hdr.resid = c.resid;
        self.hdr.duration = c.duration_ms;
        self.hdr.info = c.info;
    }
}

impl fmt::Debug for SgRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SgRequest")
            .field("cdb", &hex::encode(self.cdb()))
            .field("direction", &self.direction)
            .field("data", &self.data)
            .field("hdr", &self.hdr)
            .finish()
    }
}
