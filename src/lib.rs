//! This crate issues raw SCSI commands through the Linux SCSI generic
//! (`SG_IO`) pass-through interface.
// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Page-aligned transfer buffers.
pub mod buffer;
/// Handles configuration, command-line parsing, and logging.
pub mod cfg;
/// Error taxonomy shared by every layer.
pub mod error;
/// Builds, submits and classifies one command.
pub mod executor;
/// Defines requests, outcomes, sense data and status codes.
pub mod models;
/// The OS pass-through primitive and its backends.
pub mod transport;

pub use error::{SgError, TransportFailure};
#[cfg(target_os = "linux")]
pub use executor::{execute, execute_async};
pub use executor::Executor;
pub use models::{
    category::ResultCategory,
    outcome::CommandOutcome,
    request::{CommandRequest, CommandRequestBuilder, DataDirection, SgFlags},
};
