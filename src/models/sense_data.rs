// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::fmt;

use anyhow::{Result, anyhow, bail};
use zerocopy::{BigEndian, FromBytes, Immutable, IntoBytes, KnownLayout, U32};

/// Sense data must be ≥ 18 bytes for a complete fixed-format record.
pub const FIXED_MIN_LEN: usize = 18;

/// Descriptor-format sense carries an 8-byte header.
pub const DESCRIPTOR_HEADER_LEN: usize = 8;

/// SPC-4 Table 48 — sense keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenseKey {
    NoSense,
    RecoveredError,
    NotReady,
    MediumError,
    HardwareError,
    IllegalRequest,
    UnitAttention,
    DataProtect,
    BlankCheck,
    VendorSpecific,
    CopyAborted,
    AbortedCommand,
    /// 0xC, obsolete in SPC-4
    Completed,
    VolumeOverflow,
    Miscompare,
    Reserved,
}

impl From<u8> for SenseKey {
    fn from(v: u8) -> Self {
        use SenseKey::*;
        match v & 0x0F {
            0x0 => NoSense,
            0x1 => RecoveredError,
            0x2 => NotReady,
            0x3 => MediumError,
            0x4 => HardwareError,
            0x5 => IllegalRequest,
            0x6 => UnitAttention,
            0x7 => DataProtect,
            0x8 => BlankCheck,
            0x9 => VendorSpecific,
            0xA => CopyAborted,
            0xB => AbortedCommand,
            0xC => Completed,
            0xD => VolumeOverflow,
            0xE => Miscompare,
            _ => Reserved,
        }
    }
}

impl fmt::Display for SenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SenseKey::*;
        f.write_str(match self {
            NoSense => "No Sense",
            RecoveredError => "Recovered Error",
            NotReady => "Not Ready",
            MediumError => "Medium Error",
            HardwareError => "Hardware Error",
            IllegalRequest => "Illegal Request",
            UnitAttention => "Unit Attention",
            DataProtect => "Data Protect",
            BlankCheck => "Blank Check",
            VendorSpecific => "Vendor Specific",
            CopyAborted => "Copy Aborted",
            AbortedCommand => "Aborted Command",
            Completed => "Completed",
            VolumeOverflow => "Volume Overflow",
            Miscompare => "Miscompare",
            Reserved => "Reserved",
        })
    }
}

/// Response code (byte 0, low 7 bits) of a sense buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenseFormat {
    /// 0x70 current / 0x71 deferred
    Fixed { deferred: bool },
    /// 0x72 current / 0x73 deferred
    Descriptor { deferred: bool },
}

impl SenseFormat {
    pub fn from_response_code(rc: u8) -> Option<Self> {
        match rc & 0x7F {
            0x70 => Some(Self::Fixed { deferred: false }),
            0x71 => Some(Self::Fixed { deferred: true }),
            0x72 => Some(Self::Descriptor { deferred: false }),
            0x73 => Some(Self::Descriptor { deferred: true }),
            _ => None,
        }
    }
}

/// Key, ASC and ASCQ pulled out of either sense format.
///
/// Tolerates short buffers: a fixed-format record cut before byte 12 still
/// yields its sense key with ASC/ASCQ reported as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenseHeader {
    pub format: SenseFormat,
    pub sense_key: SenseKey,
    pub asc: u8,
    pub ascq: u8,
}

impl SenseHeader {
    /// Returns `None` when the buffer holds no recognisable sense record.
    pub fn normalize(buf: &[u8]) -> Option<Self> {
        let format = SenseFormat::from_response_code(*buf.first()?)?;
        let at = |i: usize| buf.get(i).copied().unwrap_or(0);
        match format {
            SenseFormat::Descriptor { .. } => {
                if buf.len() < 2 {
                    return None;
                }
                Some(Self {
                    format,
                    sense_key: SenseKey::from(at(1)),
                    asc: at(2),
                    ascq: at(3),
                })
            },
            SenseFormat::Fixed { .. } => {
                if buf.len() < 3 {
                    return None;
                }
                Some(Self {
                    format,
                    sense_key: SenseKey::from(at(2)),
                    asc: at(12),
                    ascq: at(13),
                })
            },
        }
    }
}

/// SPC-4 Table 51 — first 18 bytes of fixed-format sense data.
#[repr(C)]
#[derive(Debug, Default, PartialEq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct RawFixedSense {
    pub response_code: u8,             // 0
    pub obsolete: u8,                  // 1
    pub flags_key: u8,                 // 2
    pub information: U32<BigEndian>,   // 3..7
    pub additional_len: u8,            // 7
    pub cmd_specific: U32<BigEndian>,  // 8..12
    pub asc: u8,                       // 12
    pub ascq: u8,                      // 13
    pub fru: u8,                       // 14
    pub sense_key_specific: [u8; 3],   // 15..18
}

/// Decoded fixed-format sense data.
#[derive(Default, PartialEq)]
pub struct SenseData {
    pub valid: bool,        // bit7 of byte0
    pub response_code: u8,  // low-7 bits of byte0
    pub sense_key: u8,      // low-4 bits of byte2
    pub ili: bool,          // bit5 of byte2
    pub eom: bool,          // bit6 of byte2
    pub filemark: bool,     // bit7 of byte2
    pub information: u32,   // bytes 3-6
    pub additional_len: u8, // byte7
    pub cmd_specific: u32,  // bytes 8-11
    pub asc: u8,            // Additional Sense Code
    pub ascq: u8,           // Additional Sense Code Qualifier
    pub fru: u8,            // Field Replaceable Unit code
    pub sksv: bool,         // bit7 of byte15
    pub sense_key_specific: [u8; 3],
}

impl SenseData {
    /// Parse *fixed-format* sense-data (SPC-4 § 4.5.3).
    ///
    /// The buffer must be at least 18 bytes long.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < FIXED_MIN_LEN {
            bail!("sense buffer too small: {} < {FIXED_MIN_LEN}", buf.len());
        }
        let (raw, _) = RawFixedSense::ref_from_prefix(buf)
            .map_err(|e| anyhow!("failed to view fixed sense: {e}"))?;

        let response_code = raw.response_code & 0x7F;
        if !matches!(response_code, 0x70 | 0x71) {
            bail!("not fixed-format sense: response code 0x{response_code:02X}");
        }

        Ok(Self {
            valid: raw.response_code & 0x80 != 0,
            response_code,
            sense_key: raw.flags_key & 0x0F,
            ili: raw.flags_key & 0x20 != 0,
            eom: raw.flags_key & 0x40 != 0,
            filemark: raw.flags_key & 0x80 != 0,
            information: raw.information.get(),
            additional_len: raw.additional_len,
            cmd_specific: raw.cmd_specific.get(),
            asc: raw.asc,
            ascq: raw.ascq,
            fru: raw.fru,
            sksv: raw.sense_key_specific[0] & 0x80 != 0,
            sense_key_specific: raw.sense_key_specific,
        })
    }

    pub fn key(&self) -> SenseKey {
        SenseKey::from(self.sense_key)
    }
}

impl fmt::Debug for SenseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenseData")
            .field("valid", &self.valid)
            .field(
                "response_code",
                &format_args!("{:#04x}", self.response_code),
            )
            .field("sense_key", &format_args!("{:#x} ({})", self.sense_key, self.key()))
            .field("filemark", &self.filemark)
            .field("eom", &self.eom)
            .field("ili", &self.ili)
            .field("information", &self.information)
            .field("additional_len", &self.additional_len)
            .field("cmd_specific", &self.cmd_specific)
            .field("asc", &format_args!("{:#04x}", self.asc))
            .field("ascq", &format_args!("{:#04x}", self.ascq))
            .field("description", &asc_ascq_to_str(self.asc, self.ascq))
            .finish()
    }
}

/// One descriptor out of descriptor-format sense data (SPC-4 § 4.5.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenseDescriptor {
    pub descriptor_type: u8,
    pub payload: Vec<u8>,
}

/// Decoded descriptor-format sense data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSense {
    pub response_code: u8,
    pub sense_key: SenseKey,
    pub asc: u8,
    pub ascq: u8,
    pub descriptors: Vec<SenseDescriptor>,
}

impl DescriptorSense {
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < DESCRIPTOR_HEADER_LEN {
            bail!(
                "descriptor sense too small: {} < {DESCRIPTOR_HEADER_LEN}",
                buf.len()
            );
        }
        let response_code = buf[0] & 0x7F;
        if !matches!(response_code, 0x72 | 0x73) {
            bail!("not descriptor-format sense: response code 0x{response_code:02X}");
        }

        // byte 7 may claim more than the transport actually delivered
        let end = (DESCRIPTOR_HEADER_LEN + buf[7] as usize).min(buf.len());
        let mut descriptors = Vec::new();
        let mut off = DESCRIPTOR_HEADER_LEN;
        while off + 2 <= end {
            let len = buf[off + 1] as usize;
            let start = off + 2;
            let stop = start + len;
            if stop > end {
                break;
            }
            descriptors.push(SenseDescriptor {
                descriptor_type: buf[off],
                payload: buf[start..stop].to_vec(),
            });
            off = stop;
        }

        Ok(Self {
            response_code,
            sense_key: SenseKey::from(buf[1]),
            asc: buf[2],
            ascq: buf[3],
            descriptors,
        })
    }
}

/// Return the SPC-4 description for a given ASC/ASCQ pair.
///
/// * If the pair is not present in the table, returns `"UNSPECIFIED / vendor
///   specific"`.
#[inline]
pub fn asc_ascq_to_str(asc: u8, ascq: u8) -> &'static str {
    hot_table(asc, ascq).unwrap_or("UNSPECIFIED / vendor specific")
}

fn hot_table(asc: u8, ascq: u8) -> Option<&'static str> {
    Some(match (asc, ascq) {
        (0x00, 0x00) => "No additional sense information",
        (0x00, 0x06) => "I/O process terminated",
        (0x04, 0x00) => "Logical unit not ready, cause not reportable",
        (0x04, 0x01) => "Logical unit is in process of becoming ready",
        (0x04, 0x02) => "Logical unit not ready, initializing command required",
        (0x04, 0x04) => "Logical unit not ready, format in progress",
        (0x0C, 0x00) => "Write error",
        (0x10, 0x01) => "Logical block guard check failed",
        (0x11, 0x00) => "Unrecovered read error",
        (0x1A, 0x00) => "Parameter list length error",
        (0x1D, 0x00) => "Miscompare during verify operation",
        (0x20, 0x00) => "Invalid command operation code",
        (0x21, 0x00) => "Logical block address out of range",
        (0x24, 0x00) => "Invalid field in CDB",
        (0x25, 0x00) => "Logical unit not supported",
        (0x26, 0x00) => "Invalid field in parameter list",
        (0x27, 0x00) => "Write protected",
        (0x28, 0x00) => "Not ready to ready change, medium may have changed",
        (0x29, 0x00) => "Power on, reset, or bus device reset occurred",
        (0x2A, 0x01) => "Mode parameters changed",
        (0x3A, 0x00) => "Medium not present",
        (0x3F, 0x0E) => "Reported LUNs data has changed",
        (0x44, 0x00) => "Internal target failure",
        (0x47, 0x00) => "SCSI parity error",
        (0x4E, 0x00) => "Overlapped commands attempted",
        _ => return None,
    })
}
