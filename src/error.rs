// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::models::{
    category::ResultCategory,
    sense_data::SenseKey,
    status::{DriverStatus, HostStatus},
};

/// Everything that can go wrong while issuing one pass-through command.
#[derive(Debug, Error)]
pub enum SgError {
    /// Malformed CDB length or inconsistent buffer lengths. Raised before the
    /// device is opened.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("out of memory allocating {requested} byte transfer buffer")]
    OutOfMemory { requested: usize },

    #[error("cannot open {}: {source}", path.display())]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("transport error: {0}")]
    Transport(#[from] TransportFailure),

    /// Check condition (or another non-GOOD status) reported by the device.
    #[error("device reported {category} (sense key {sense_key:?}, asc 0x{asc:02X}, ascq 0x{ascq:02X})")]
    DeviceReported {
        category: ResultCategory,
        sense_key: Option<SenseKey>,
        asc: u8,
        ascq: u8,
        sense: Vec<u8>,
    },
}

/// Why the transport, rather than the device, failed the command.
#[derive(Debug, Error)]
pub enum TransportFailure {
    /// The kernel rejected the request header.
    #[error("bad pass-through setup")]
    BadParameters,

    #[error("command timed out")]
    Timeout,

    #[error("host status {}", .0.as_str())]
    Host(HostStatus),

    #[error("driver status {0:?}")]
    Driver(DriverStatus),

    #[error("os error: {0}")]
    Os(#[source] io::Error),
}

impl TransportFailure {
    pub fn category(&self) -> ResultCategory {
        match self {
            TransportFailure::Timeout => ResultCategory::Timeout,
            _ => ResultCategory::Other,
        }
    }
}

impl SgError {
    /// Stable category for this failure; see [`ResultCategory::code`].
    pub fn category(&self) -> ResultCategory {
        match self {
            SgError::InvalidArgument(_) | SgError::OutOfMemory { .. } => {
                ResultCategory::Other
            },
            SgError::DeviceOpen { .. } => ResultCategory::FileError,
            SgError::Transport(t) => t.category(),
            SgError::DeviceReported { category, .. } => *category,
        }
    }

    pub fn status_code(&self) -> i32 {
        self.category().code()
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SgError::Transport(TransportFailure::Timeout))
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SgError::InvalidArgument(msg.into())
    }
}
