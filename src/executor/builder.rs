// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use tracing::debug;

use crate::{
    buffer::AlignedBuffer,
    error::SgError,
    models::request::{CommandRequest, DataDirection},
    transport::SgRequest,
};

/// Timeout in the header's millisecond field, saturating at `u32::MAX`.
pub fn timeout_to_ms(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

/// Turn a validated [`CommandRequest`] into the transport request.
///
/// Allocates the aligned data buffer for whichever data phase the request
/// has; an outbound payload is copied in, an inbound buffer starts zeroed.
/// If an allocation fails nothing else has been acquired yet.
pub fn build_request(req: &CommandRequest) -> Result<SgRequest, SgError> {
    req.validate()?;

    let cmd_len = u8::try_from(req.cdb().len()).map_err(|_| {
        SgError::invalid(format!(
            "CDB length {} exceeds the SG v3 header limit of {}",
            req.cdb().len(),
            u8::MAX
        ))
    })?;
    let sense_capacity = u8::try_from(req.sense_capacity()).map_err(|_| {
        SgError::invalid(format!("sense capacity {} too large", req.sense_capacity()))
    })?;

    let direction = req.direction();
    let data = match direction {
        DataDirection::None => None,
        DataDirection::ToDevice => Some(AlignedBuffer::copy_from(req.data_out())?),
        DataDirection::FromDevice => Some(AlignedBuffer::new(req.data_in_len())?),
    };

    let timeout_ms = timeout_to_ms(req.timeout());
    let sg = SgRequest::assemble(
        req.cdb().to_vec(),
        cmd_len,
        sense_capacity,
        data,
        direction,
        timeout_ms,
        req.flags(),
    );
    debug!(
        cdb = %hex::encode(req.cdb()),
        ?direction,
        dxfer_len = sg.transfer_len(),
        timeout_ms,
        "request built"
    );
    Ok(sg)
}
