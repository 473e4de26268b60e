// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::path::PathBuf;

/// Device under test, e.g. `/dev/sg0`. Tests that need real hardware
/// return early when `SG_TEST_DEVICE` is unset.
pub fn test_device() -> Option<PathBuf> {
    std::env::var_os("SG_TEST_DEVICE").map(PathBuf::from)
}

pub fn test_logger_path() -> String {
    std::env::var("TEST_LOGGER_CONFIG").unwrap_or_else(|_| "config_logger.yaml".into())
}
