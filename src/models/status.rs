// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Status fields the SG driver writes back into the request header:
//! the SAM status byte from the device, the host (HBA) status and the
//! driver status.

use core::fmt;

/// SAM status byte reported by the logical unit.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScsiStatus {
    Good = 0x00,
    CheckCondition = 0x02,
    ConditionMet = 0x04,
    Busy = 0x08,
    ReservationConflict = 0x18,
    CommandTerminated = 0x22,
    TaskSetFull = 0x28,
    AcaActive = 0x30,
    TaskAborted = 0x40,
    /// Any other status codes defined in SAM-x or reserved
    Other(u8),
}

impl ScsiStatus {
    /// Whether the device has sense data to report for this status.
    #[inline]
    pub fn carries_sense(self) -> bool {
        matches!(self, ScsiStatus::CheckCondition | ScsiStatus::CommandTerminated)
    }
}

impl From<u8> for ScsiStatus {
    fn from(b: u8) -> Self {
        // bit 0 and bit 7 are reserved in SAM
        match b & 0x7E {
            0x00 => ScsiStatus::Good,
            0x02 => ScsiStatus::CheckCondition,
            0x04 => ScsiStatus::ConditionMet,
            0x08 => ScsiStatus::Busy,
            0x18 => ScsiStatus::ReservationConflict,
            0x22 => ScsiStatus::CommandTerminated,
            0x28 => ScsiStatus::TaskSetFull,
            0x30 => ScsiStatus::AcaActive,
            0x40 => ScsiStatus::TaskAborted,
            _ => ScsiStatus::Other(b),
        }
    }
}

impl From<ScsiStatus> for u8 {
    fn from(s: ScsiStatus) -> Self {
        match s {
            ScsiStatus::Good => 0x00,
            ScsiStatus::CheckCondition => 0x02,
            ScsiStatus::ConditionMet => 0x04,
            ScsiStatus::Busy => 0x08,
            ScsiStatus::ReservationConflict => 0x18,
            ScsiStatus::CommandTerminated => 0x22,
            ScsiStatus::TaskSetFull => 0x28,
            ScsiStatus::AcaActive => 0x30,
            ScsiStatus::TaskAborted => 0x40,
            ScsiStatus::Other(v) => v,
        }
    }
}

/// Wire view for the 1-byte `status` field of `sg_io_hdr`.
#[repr(transparent)]
#[derive(Default, Clone, Copy, PartialEq, Eq)]
pub struct RawScsiStatus(u8);

impl RawScsiStatus {
    #[inline]
    pub const fn raw(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn new_raw(v: u8) -> Self {
        Self(v)
    }

    #[inline]
    pub fn decode(&self) -> ScsiStatus {
        ScsiStatus::from(self.0)
    }

    #[inline]
    pub fn encode(&mut self, st: ScsiStatus) {
        self.0 = st.into();
    }
}

impl From<ScsiStatus> for RawScsiStatus {
    #[inline]
    fn from(s: ScsiStatus) -> Self {
        Self(s.into())
    }
}

impl fmt::Debug for RawScsiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawScsiStatus {{ {:?} (0x{:02X}) }}", self.decode(), self.0)
    }
}

/// Linux `DID_*` host byte: how the HBA / low level driver saw the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStatus {
    Ok,
    NoConnect,
    BusBusy,
    TimeOut,
    BadTarget,
    Abort,
    Parity,
    Error,
    Reset,
    BadIntr,
    Passthrough,
    SoftError,
    ImmRetry,
    Requeue,
    TransportDisrupted,
    TransportFailfast,
    TargetFailure,
    NexusFailure,
    AllocFailure,
    MediumError,
    Other(u16),
}

impl From<u16> for HostStatus {
    fn from(v: u16) -> Self {
        use HostStatus::*;
        match v {
            0x00 => Ok,
            0x01 => NoConnect,
            0x02 => BusBusy,
            0x03 => TimeOut,
            0x04 => BadTarget,
            0x05 => Abort,
            0x06 => Parity,
            0x07 => Error,
            0x08 => Reset,
            0x09 => BadIntr,
            0x0A => Passthrough,
            0x0B => SoftError,
            0x0C => ImmRetry,
            0x0D => Requeue,
            0x0E => TransportDisrupted,
            0x0F => TransportFailfast,
            0x10 => TargetFailure,
            0x11 => NexusFailure,
            0x12 => AllocFailure,
            0x13 => MediumError,
            other => Other(other),
        }
    }
}

impl HostStatus {
    pub fn as_str(&self) -> &'static str {
        use HostStatus::*;
        match self {
            Ok => "DID_OK",
            NoConnect => "DID_NO_CONNECT",
            BusBusy => "DID_BUS_BUSY",
            TimeOut => "DID_TIME_OUT",
            BadTarget => "DID_BAD_TARGET",
            Abort => "DID_ABORT",
            Parity => "DID_PARITY",
            Error => "DID_ERROR",
            Reset => "DID_RESET",
            BadIntr => "DID_BAD_INTR",
            Passthrough => "DID_PASSTHROUGH",
            SoftError => "DID_SOFT_ERROR",
            ImmRetry => "DID_IMM_RETRY",
            Requeue => "DID_REQUEUE",
            TransportDisrupted => "DID_TRANSPORT_DISRUPTED",
            TransportFailfast => "DID_TRANSPORT_FAILFAST",
            TargetFailure => "DID_TARGET_FAILURE",
            NexusFailure => "DID_NEXUS_FAILURE",
            AllocFailure => "DID_ALLOC_FAILURE",
            MediumError => "DID_MEDIUM_ERROR",
            Other(_) => "DID_<unknown>",
        }
    }
}

/// Linux `DRIVER_*` byte. The low nibble carries the driver status, the
/// high nibble the (obsolete) suggestion bits, which are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    Ok,
    Busy,
    Soft,
    Media,
    Error,
    Invalid,
    Timeout,
    Hard,
    Sense,
    Other(u8),
}

impl DriverStatus {
    pub const MASK: u16 = 0x0F;
}

impl From<u16> for DriverStatus {
    fn from(v: u16) -> Self {
        use DriverStatus::*;
        match (v & Self::MASK) as u8 {
            0x00 => Ok,
            0x01 => Busy,
            0x02 => Soft,
            0x03 => Media,
            0x04 => Error,
            0x05 => Invalid,
            0x06 => Timeout,
            0x07 => Hard,
            0x08 => Sense,
            other => Other(other),
        }
    }
}
