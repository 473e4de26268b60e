// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::warn;

use crate::error::SgError;

/// Shortest CDB a SCSI device accepts (6-byte group 0 commands).
pub const MIN_CDB_LEN: usize = 6;
/// Longest CDB accepted (variable-length commands).
pub const MAX_CDB_LEN: usize = 256;
/// Sense capacity used when the caller does not pick one.
pub const DEFAULT_SENSE_LEN: usize = 32;
/// `mx_sb_len` is a single byte.
pub const MAX_SENSE_LEN: usize = u8::MAX as usize;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Direction of the data phase, derived from the buffers a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDirection {
    None,
    ToDevice,
    FromDevice,
}

impl DataDirection {
    /// `SG_DXFER_*` value for the v3 header.
    pub const fn sg_dxfer(self) -> i32 {
        match self {
            DataDirection::None => -1,
            DataDirection::ToDevice => -2,
            DataDirection::FromDevice => -3,
        }
    }
}

bitflags::bitflags! {
    /// `SG_FLAG_*` bits accepted in the request header.
    ///
    /// `SG_FLAG_MMAP_IO` and `SG_FLAG_NO_DXFER` are left out: with either set
    /// the driver never copies into the user buffer.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct SgFlags: u32 {
        const DIRECT_IO   = 0x01;
        const UNUSED_LUN_INHIBIT = 0x02;
        const Q_AT_TAIL   = 0x10;
        const Q_AT_HEAD   = 0x20;
    }
}

/// One pass-through command, validated and ready to be built into a
/// transport request.
///
/// Direction is not a field you can set: it follows from `data_out` and
/// `data_in_len` (see [`CommandRequest::direction`]).
#[derive(Clone, PartialEq, Eq)]
pub struct CommandRequest {
    device_path: PathBuf,
    cdb: Vec<u8>,
    timeout: Duration,
    sense_capacity: usize,
    data_in_len: usize,
    data_out: Vec<u8>,
    flags: SgFlags,
}

impl CommandRequest {
    pub fn device_path(&self) -> &Path {
        &self.device_path
    }

    pub fn cdb(&self) -> &[u8] {
        &self.cdb
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn sense_capacity(&self) -> usize {
        self.sense_capacity
    }

    pub fn flags(&self) -> SgFlags {
        self.flags
    }

    /// Outbound payload; empty when nothing is sent.
    pub fn data_out(&self) -> &[u8] {
        &self.data_out
    }

    /// Inbound length actually requested. Zero whenever an outbound payload
    /// is present.
    pub fn data_in_len(&self) -> usize {
        if self.data_out.is_empty() {
            self.data_in_len
        } else {
            0
        }
    }

    pub fn direction(&self) -> DataDirection {
        if !self.data_out.is_empty() {
            DataDirection::ToDevice
        } else if self.data_in_len > 0 {
            DataDirection::FromDevice
        } else {
            DataDirection::None
        }
    }

    /// Length of the data phase, whichever way it goes.
    pub fn transfer_len(&self) -> usize {
        match self.direction() {
            DataDirection::None => 0,
            DataDirection::ToDevice => self.data_out.len(),
            DataDirection::FromDevice => self.data_in_len,
        }
    }

    pub fn validate(&self) -> Result<(), SgError> {
        let n = self.cdb.len();
        if !(MIN_CDB_LEN..=MAX_CDB_LEN).contains(&n) {
            return Err(SgError::invalid(format!(
                "CDB length {n} outside [{MIN_CDB_LEN}, {MAX_CDB_LEN}]"
            )));
        }
        if self.sense_capacity == 0 || self.sense_capacity > MAX_SENSE_LEN {
            return Err(SgError::invalid(format!(
                "sense capacity {} outside [1, {MAX_SENSE_LEN}]",
                self.sense_capacity
            )));
        }
        let unknown = self.flags.bits() & !SgFlags::all().bits();
        if unknown != 0 {
            return Err(SgError::invalid(format!(
                "unsupported SG flag bits {unknown:#x}"
            )));
        }
        if u32::try_from(self.transfer_len()).is_err() {
            return Err(SgError::invalid(format!(
                "transfer length {} does not fit the transport",
                self.transfer_len()
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for CommandRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRequest")
            .field("device_path", &self.device_path)
            .field("cdb", &hex::encode(&self.cdb))
            .field("timeout", &self.timeout)
            .field("direction", &self.direction())
            .field("transfer_len", &self.transfer_len())
            .field("sense_capacity", &self.sense_capacity)
            .field("flags", &self.flags)
            .finish()
    }
}

/// Builder for [`CommandRequest`].
///
/// Notes & conventions:
/// - The CDB is copied verbatim; its length must lie in
///   [`MIN_CDB_LEN`]..=[`MAX_CDB_LEN`].
/// - Setting both an outbound payload and an inbound length is accepted, but
///   the outbound payload wins and the inbound length is dropped (a warning
///   is logged). There is no bidirectional transfer.
/// - The timeout defaults to [`DEFAULT_TIMEOUT`] and the sense capacity to
///   [`DEFAULT_SENSE_LEN`].
#[derive(Debug)]
pub struct CommandRequestBuilder {
    request: CommandRequest,
}

impl CommandRequestBuilder {
    pub fn new(device_path: impl Into<PathBuf>) -> Self {
        CommandRequestBuilder {
            request: CommandRequest {
                device_path: device_path.into(),
                cdb: Vec::new(),
                timeout: DEFAULT_TIMEOUT,
                sense_capacity: DEFAULT_SENSE_LEN,
                data_in_len: 0,
                data_out: Vec::new(),
                flags: SgFlags::empty(),
            },
        }
    }

    /// Set the Command Descriptor Block.
    pub fn cdb(mut self, cdb: &[u8]) -> Self {
        self.request.cdb = cdb.to_vec();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout = timeout;
        self
    }

    pub fn sense_capacity(mut self, capacity: usize) -> Self {
        self.request.sense_capacity = capacity;
        self
    }

    /// Request `len` bytes from the device.
    pub fn data_in(mut self, len: usize) -> Self {
        self.request.data_in_len = len;
        self
    }

    /// Send `data` to the device.
    pub fn data_out(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.request.data_out = data.into();
        self
    }

    pub fn flags(mut self, flags: SgFlags) -> Self {
        self.request.flags = flags;
        self
    }

    /// Validate and return the request.
    pub fn build(self) -> Result<CommandRequest, SgError> {
        let req = self.request;
        req.validate()?;
        if !req.data_out.is_empty() && req.data_in_len > 0 {
            warn!(
                data_out_len = req.data_out.len(),
                data_in_len = req.data_in_len,
                "both data phases requested; inbound length dropped"
            );
        }
        Ok(req)
    }
}
