// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{
    cfg::enums::{QueuePosition, YesNo},
    models::request::{
        CommandRequest, CommandRequestBuilder, DEFAULT_SENSE_LEN, MAX_CDB_LEN,
        MAX_SENSE_LEN, MIN_CDB_LEN, SgFlags,
    },
};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    /// Which device node to talk to.
    pub device: DeviceConfig,
    /// The command to issue and its data phase.
    pub command: CommandConfig,
    /// Transport knobs that do not change what the device sees.
    #[serde(default)]
    pub transport: TransportConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DeviceConfig {
    #[serde(rename = "Path")]
    /// Device node, e.g. `/dev/sg0`.
    pub path: PathBuf,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// One raw command. Byte strings are hex, whitespace ignored.
pub struct CommandConfig {
    #[serde(rename = "Cdb")]
    /// Command Descriptor Block as hex (`"12 00 00 00 24 00"`).
    pub cdb: String,

    #[serde(default, rename = "DataIn")]
    /// Bytes to read back from the device.
    pub data_in: usize,

    #[serde(default, rename = "DataOut")]
    /// Hex payload to send; takes precedence over `DataIn`.
    pub data_out: String,

    #[serde(default = "default_sense_len", rename = "SenseLength")]
    /// Sense buffer capacity.
    pub sense_len: usize,

    #[serde(default = "default_timeout", rename = "Timeout", with = "serde_secs")]
    /// Deadline handed to the kernel, in seconds.
    pub timeout: Duration,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// Request flags passed through to the SG driver.
pub struct TransportConfig {
    #[serde(default = "no", rename = "DirectIo")]
    /// Ask for direct I/O into the aligned user buffer.
    pub direct_io: YesNo,

    #[serde(default, rename = "Queue")]
    /// Where the command goes in the device queue.
    pub queue: QueuePosition,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            direct_io: YesNo::No,
            queue: QueuePosition::default(),
        }
    }
}

fn default_sense_len() -> usize {
    DEFAULT_SENSE_LEN
}

fn default_timeout() -> Duration {
    crate::models::request::DEFAULT_TIMEOUT
}

fn no() -> YesNo {
    YesNo::No
}

fn decode_hex(field: &str, s: &str) -> Result<Vec<u8>> {
    let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .unwrap_or(&cleaned);
    hex::decode(cleaned).with_context(|| format!("{field} is not valid hex: {s:?}"))
}

impl Config {
    /// Loads the configuration from YAML, validates it, and returns the
    /// ready-to-use value.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        Self::from_yaml(&s)
    }

    pub fn from_yaml(s: &str) -> Result<Self> {
        let mut cfg: Config =
            serde_yaml::from_str(s).context("failed to parse config YAML")?;
        cfg.validate_and_normalize()?;
        Ok(cfg)
    }

    /// Validates invariants and normalizes derived fields.
    pub fn validate_and_normalize(&mut self) -> Result<()> {
        ensure!(
            !self.device.path.as_os_str().is_empty(),
            "device Path must not be empty"
        );

        let cdb = self.cdb()?;
        ensure!(
            (MIN_CDB_LEN..=MAX_CDB_LEN).contains(&cdb.len()),
            "Cdb must be {MIN_CDB_LEN}..={MAX_CDB_LEN} bytes, got {}",
            cdb.len()
        );
        ensure!(
            (1..=MAX_SENSE_LEN).contains(&self.command.sense_len),
            "SenseLength must be 1..={MAX_SENSE_LEN}"
        );

        // An outbound payload wins; keep the file honest about it.
        if !self.data_out()?.is_empty() {
            self.command.data_in = 0;
        }
        Ok(())
    }

    pub fn cdb(&self) -> Result<Vec<u8>> {
        decode_hex("Cdb", &self.command.cdb)
    }

    pub fn data_out(&self) -> Result<Vec<u8>> {
        decode_hex("DataOut", &self.command.data_out)
    }

    pub fn flags(&self) -> SgFlags {
        let mut flags = self.transport.queue.flags();
        if self.transport.direct_io.as_bool() {
            flags |= SgFlags::DIRECT_IO;
        }
        flags
    }

    /// Builds the request described by this config.
    pub fn to_request(&self) -> Result<CommandRequest> {
        CommandRequestBuilder::new(self.device.path.clone())
            .cdb(&self.cdb()?)
            .data_in(self.command.data_in)
            .data_out(self.data_out()?)
            .sense_capacity(self.command.sense_len)
            .timeout(self.command.timeout)
            .flags(self.flags())
            .build()
            .context("invalid command in config")
    }
}

mod serde_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}
