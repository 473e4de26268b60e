// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fmt, time::Duration};

use crate::{
    error::SgError,
    models::{
        category::ResultCategory,
        sense_data::{SenseHeader, SenseKey},
        status::{DriverStatus, HostStatus, ScsiStatus},
    },
};

/// Result of one command that reached the device.
///
/// `category` is [`ResultCategory::Clean`] for a clean completion and one of
/// the device-reported categories otherwise. Transport failures never
/// produce an outcome; they come back as [`SgError::Transport`].
#[derive(Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub(crate) category: ResultCategory,
    pub(crate) scsi_status: ScsiStatus,
    pub(crate) host_status: HostStatus,
    pub(crate) driver_status: DriverStatus,
    pub(crate) sense: Vec<u8>,
    pub(crate) data_in: Vec<u8>,
    pub(crate) residual: usize,
    pub(crate) duration: Duration,
}

impl CommandOutcome {
    /// 0 for a clean completion, otherwise the category code.
    pub fn status_code(&self) -> i32 {
        self.category.code()
    }

    pub fn category(&self) -> ResultCategory {
        self.category
    }

    pub fn is_clean(&self) -> bool {
        self.category == ResultCategory::Clean
    }

    pub fn scsi_status(&self) -> ScsiStatus {
        self.scsi_status
    }

    pub fn host_status(&self) -> HostStatus {
        self.host_status
    }

    pub fn driver_status(&self) -> DriverStatus {
        self.driver_status
    }

    /// Sense bytes the transport wrote back, possibly empty.
    pub fn sense(&self) -> &[u8] {
        &self.sense
    }

    /// Data received, already cut down to what was actually transferred.
    pub fn data_in(&self) -> &[u8] {
        &self.data_in
    }

    /// Bytes of the data phase that were not transferred.
    pub fn residual(&self) -> usize {
        self.residual
    }

    /// Command duration as measured by the driver.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn sense_header(&self) -> Option<SenseHeader> {
        SenseHeader::normalize(&self.sense)
    }

    pub fn sense_key(&self) -> Option<SenseKey> {
        self.sense_header().map(|h| h.sense_key)
    }

    /// The `(status_code, sense, data_in)` triple.
    pub fn into_parts(self) -> (i32, Vec<u8>, Vec<u8>) {
        (self.category.code(), self.sense, self.data_in)
    }

    /// Turn a device-reported category into [`SgError::DeviceReported`].
    pub fn into_result(self) -> Result<Self, SgError> {
        if self.is_clean() {
            return Ok(self);
        }
        let hdr = self.sense_header();
        Err(SgError::DeviceReported {
            category: self.category,
            sense_key: hdr.map(|h| h.sense_key),
            asc: hdr.map_or(0, |h| h.asc),
            ascq: hdr.map_or(0, |h| h.ascq),
            sense: self.sense,
        })
    }
}

impl fmt::Debug for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandOutcome")
            .field("status_code", &self.status_code())
            .field("category", &format_args!("{}", self.category))
            .field("scsi_status", &self.scsi_status)
            .field("host_status", &self.host_status)
            .field("driver_status", &self.driver_status)
            .field("sense", &hex::encode(&self.sense))
            .field("data_in_len", &self.data_in.len())
            .field("residual", &self.residual)
            .field("duration", &self.duration)
            .finish()
    }
}
