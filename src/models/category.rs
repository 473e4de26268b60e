// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Normalised result categories.
//!
//! The numeric codes are the ones sg3_utils reports (`SG_LIB_CAT_*`), so a
//! caller that already knows `sg_raw` exit codes can compare them directly.
//! Device-reported categories (derived from sense data or the SAM status)
//! and transport categories never overlap.

use core::fmt;

use crate::models::{
    sense_data::{SenseHeader, SenseKey},
    status::ScsiStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCategory {
    Clean,
    NotReady,
    MediumHard,
    IllegalRequest,
    UnitAttention,
    DataProtect,
    InvalidOpcode,
    CopyAborted,
    AbortedCommand,
    Miscompare,
    FileError,
    NoSense,
    Recovered,
    LbaOutOfRange,
    ReservationConflict,
    ConditionMet,
    Busy,
    TaskSetFull,
    AcaActive,
    TaskAborted,
    Timeout,
    Protection,
    /// Device returned a status byte outside the SAM set.
    UnknownStatus,
    Sense,
    Other,
}

impl ResultCategory {
    pub const fn code(self) -> i32 {
        use ResultCategory::*;
        match self {
            Clean => 0,
            NotReady => 2,
            MediumHard => 3,
            IllegalRequest => 5,
            UnitAttention => 6,
            DataProtect => 7,
            InvalidOpcode => 9,
            CopyAborted => 10,
            AbortedCommand => 11,
            Miscompare => 14,
            FileError => 15,
            NoSense => 20,
            Recovered => 21,
            LbaOutOfRange => 22,
            ReservationConflict => 24,
            ConditionMet => 25,
            Busy => 26,
            TaskSetFull => 27,
            AcaActive => 28,
            TaskAborted => 29,
            Timeout => 33,
            Protection => 40,
            UnknownStatus => 97,
            Sense => 98,
            Other => 99,
        }
    }

    /// The device itself complained (sense data or a non-GOOD status).
    pub const fn is_device_reported(self) -> bool {
        !matches!(
            self,
            ResultCategory::Clean
                | ResultCategory::FileError
                | ResultCategory::Timeout
                | ResultCategory::Other
        )
    }

    /// Category for a check condition, following the sense-key taxonomy.
    ///
    /// Unparseable sense, COMPLETED, VOLUME OVERFLOW and reserved/vendor keys
    /// all land in [`ResultCategory::Sense`].
    pub fn from_sense(sense: &[u8]) -> Self {
        let Some(hdr) = SenseHeader::normalize(sense) else {
            return ResultCategory::Sense;
        };
        match hdr.sense_key {
            SenseKey::NoSense => ResultCategory::NoSense,
            SenseKey::RecoveredError => ResultCategory::Recovered,
            SenseKey::NotReady => ResultCategory::NotReady,
            SenseKey::MediumError | SenseKey::HardwareError | SenseKey::BlankCheck => {
                ResultCategory::MediumHard
            },
            SenseKey::UnitAttention => ResultCategory::UnitAttention,
            SenseKey::IllegalRequest => match (hdr.asc, hdr.ascq) {
                (0x20, 0x00) => ResultCategory::InvalidOpcode,
                (0x21, 0x00) => ResultCategory::LbaOutOfRange,
                _ => ResultCategory::IllegalRequest,
            },
            SenseKey::AbortedCommand if hdr.asc == 0x10 => ResultCategory::Protection,
            SenseKey::AbortedCommand => ResultCategory::AbortedCommand,
            SenseKey::Miscompare => ResultCategory::Miscompare,
            SenseKey::DataProtect => ResultCategory::DataProtect,
            SenseKey::CopyAborted => ResultCategory::CopyAborted,
            SenseKey::Completed
            | SenseKey::VolumeOverflow
            | SenseKey::VendorSpecific
            | SenseKey::Reserved => ResultCategory::Sense,
        }
    }

    /// Category for a non-GOOD status that came back without sense data.
    pub fn from_status(status: ScsiStatus) -> Self {
        match status {
            ScsiStatus::Good => ResultCategory::Clean,
            ScsiStatus::CheckCondition | ScsiStatus::CommandTerminated => {
                ResultCategory::Sense
            },
            ScsiStatus::ConditionMet => ResultCategory::ConditionMet,
            ScsiStatus::Busy => ResultCategory::Busy,
            ScsiStatus::ReservationConflict => ResultCategory::ReservationConflict,
            ScsiStatus::TaskSetFull => ResultCategory::TaskSetFull,
            ScsiStatus::AcaActive => ResultCategory::AcaActive,
            ScsiStatus::TaskAborted => ResultCategory::TaskAborted,
            ScsiStatus::Other(_) => ResultCategory::UnknownStatus,
        }
    }
}

impl fmt::Display for ResultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ResultCategory::*;
        f.write_str(match self {
            Clean => "no errors",
            NotReady => "not ready",
            MediumHard => "medium or hardware error",
            IllegalRequest => "illegal request",
            UnitAttention => "unit attention",
            DataProtect => "data protect",
            InvalidOpcode => "invalid operation code",
            CopyAborted => "copy aborted",
            AbortedCommand => "aborted command",
            Miscompare => "miscompare",
            FileError => "file error",
            NoSense => "no sense",
            Recovered => "recovered error",
            LbaOutOfRange => "LBA out of range",
            ReservationConflict => "reservation conflict",
            ConditionMet => "condition met",
            Busy => "device busy",
            TaskSetFull => "task set full",
            AcaActive => "ACA active",
            TaskAborted => "task aborted",
            Timeout => "command timed out",
            Protection => "protection information error",
            UnknownStatus => "unrecognised SCSI status",
            Sense => "sense data present",
            Other => "other error",
        })
    }
}
