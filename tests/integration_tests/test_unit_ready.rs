// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Integration: TEST UNIT READY. A fresh device may answer UNIT ATTENTION
//! once; the second attempt must be GOOD or a not-ready condition.

use std::time::Duration;

use anyhow::Result;
use sg_raw_rs::{ResultCategory, execute};

use crate::integration_tests::common::test_device;

const TEST_UNIT_READY: [u8; 6] = [0x00; 6];

#[test]
fn test_unit_ready_settles() -> Result<()> {
    let Some(dev) = test_device() else {
        return Ok(());
    };

    let first = execute(&dev, Duration::from_secs(5), &TEST_UNIT_READY, 32, 0, &[])?;
    assert!(first.data_in().is_empty());

    let second = execute(&dev, Duration::from_secs(5), &TEST_UNIT_READY, 32, 0, &[])?;
    assert!(matches!(
        second.category(),
        ResultCategory::Clean | ResultCategory::NotReady
    ));
    Ok(())
}
