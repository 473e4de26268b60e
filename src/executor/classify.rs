// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{io, time::Duration};

use tracing::{debug, warn};

use crate::{
    error::TransportFailure,
    models::{
        category::ResultCategory,
        outcome::CommandOutcome,
        request::DataDirection,
        status::{DriverStatus, HostStatus, ScsiStatus},
    },
    transport::{SgInfo, SgRequest},
};

/// Map a failed issue call onto a transport failure.
pub fn os_failure(err: io::Error) -> TransportFailure {
    match err.raw_os_error() {
        Some(libc::EINVAL) => TransportFailure::BadParameters,
        Some(libc::ETIMEDOUT) => TransportFailure::Timeout,
        _ => TransportFailure::Os(err),
    }
}

/// Bytes actually moved in a data phase of `requested` bytes with the
/// driver-reported residual `resid`, clamped to `[0, requested]`.
pub fn transferred_len(requested: usize, resid: i32) -> usize {
    let resid = usize::try_from(resid).unwrap_or(0);
    requested.saturating_sub(resid)
}

/// Interpret the completion fields of a submitted request.
///
/// Host/driver level problems (including timeouts) are transport failures.
/// Anything the device said, clean or not, becomes a [`CommandOutcome`]
/// carrying the sense bytes and the residual-trimmed inbound data.
pub fn classify(req: &SgRequest) -> Result<CommandOutcome, TransportFailure> {
    let c = req.completion();
    let scsi_status = ScsiStatus::from(c.status);
    let host_status = HostStatus::from(c.host_status);
    let driver_status = DriverStatus::from(c.driver_status);

    debug!(
        status = c.status,
        host_status = c.host_status,
        driver_status = c.driver_status,
        sb_len_wr = c.sb_len_wr,
        resid = c.resid,
        duration_ms = c.duration_ms,
        info = c.info,
        direct_io = c.info().contains(SgInfo::DIRECT_IO),
        "request completed"
    );

    if host_status == HostStatus::TimeOut || driver_status == DriverStatus::Timeout {
        return Err(TransportFailure::Timeout);
    }
    if host_status != HostStatus::Ok {
        return Err(TransportFailure::Host(host_status));
    }
    if !matches!(driver_status, DriverStatus::Ok | DriverStatus::Sense) {
        return Err(TransportFailure::Driver(driver_status));
    }

    let sense_len = (c.sb_len_wr as usize).min(req.sense_capacity());
    let sense = req.sense()[..sense_len].to_vec();

    let category = if c.info().is_ok() && scsi_status == ScsiStatus::Good {
        ResultCategory::Clean
    } else if driver_status == DriverStatus::Sense || scsi_status.carries_sense() {
        if sense.is_empty() {
            warn!("status is CHECK CONDITION but no sense information");
            ResultCategory::Sense
        } else {
            ResultCategory::from_sense(&sense)
        }
    } else {
        ResultCategory::from_status(scsi_status)
    };

    let requested = req.transfer_len();
    let moved = transferred_len(requested, c.resid);
    let data_in = match (req.direction(), req.data_buffer()) {
        (DataDirection::FromDevice, Some(buf)) => buf.to_vec_truncated(moved),
        _ => Vec::new(),
    };

    Ok(CommandOutcome {
        category,
        scsi_status,
        host_status,
        driver_status,
        sense,
        data_in,
        residual: requested - moved,
        duration: Duration::from_millis(c.duration_ms.into()),
    })
}
