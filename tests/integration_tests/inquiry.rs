// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Integration: standard INQUIRY (36) against a real SG node, blocking and
//! async.

use std::time::Duration;

use anyhow::Result;
use sg_raw_rs::{
    cfg::logger::init_logger,
    execute, execute_async,
    models::request::{CommandRequestBuilder, DEFAULT_SENSE_LEN},
};

use crate::integration_tests::common::{test_device, test_logger_path};

const INQUIRY: [u8; 6] = [0x12, 0x00, 0x00, 0x00, 0x24, 0x00];

#[tokio::test]
async fn standard_inquiry() -> Result<()> {
    let Some(dev) = test_device() else {
        return Ok(());
    };
    let _ = init_logger(&test_logger_path());

    let outcome = execute(&dev, Duration::from_secs(20), &INQUIRY, 32, 36, &[])?;
    assert!(outcome.data_in().len() <= 36);
    assert!(outcome.sense().len() <= DEFAULT_SENSE_LEN);
    if outcome.is_clean() {
        // peripheral qualifier/type byte plus additional length
        assert!(outcome.data_in().len() >= 5);
    }

    let req = CommandRequestBuilder::new(&dev)
        .cdb(&INQUIRY)
        .data_in(36)
        .build()?;
    let again = execute_async(req).await?;
    assert_eq!(again.status_code(), outcome.status_code());
    Ok(())
}
