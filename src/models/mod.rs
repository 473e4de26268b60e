// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// sg3_utils-compatible result categories.
pub mod category;
/// The normalised result of a command.
pub mod outcome;
/// Command requests and their derived data direction.
pub mod request;
/// Fixed and descriptor format sense data.
pub mod sense_data;
/// SAM status, host and driver status bytes.
pub mod status;
