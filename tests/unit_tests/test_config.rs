// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fs, path::PathBuf};

use anyhow::Result;
use serial_test::serial;
use sg_raw_rs::{
    Executor,
    cfg::{
        cli::resolve_config_path,
        config::Config,
        logger::{LoggerConfig, init_logger_with},
    },
    models::request::{DataDirection, SgFlags},
};

use crate::unit_tests::common::{Reply, SimTransport, inquiry_data};

fn write_fixture(name: &str, body: &str) -> Result<PathBuf> {
    let path = std::env::temp_dir().join(format!("sg_raw_rs_{}_{name}", std::process::id()));
    fs::write(&path, body)?;
    Ok(path)
}

#[test]
fn config_file_drives_the_executor() -> Result<()> {
    let path = write_fixture(
        "inquiry.yaml",
        r#"
device:
  Path: /dev/sg7
command:
  Cdb: "12 00 00 00 24 00"
  DataIn: 36
  SenseLength: 64
  Timeout: 3
transport:
  Queue: Tail
"#,
    )?;

    let cfg = Config::load_from_file(resolve_config_path(
        path.to_str().expect("utf-8 temp path"),
    )?)?;
    let req = cfg.to_request()?;
    assert_eq!(req.flags(), SgFlags::Q_AT_TAIL);

    let sim = SimTransport::replying(Reply {
        data: inquiry_data(),
        ..Default::default()
    });
    let outcome = Executor::new(sim.clone()).execute(&req)?;
    assert!(outcome.is_clean());

    let seen = sim.seen();
    assert_eq!(seen[0].path, PathBuf::from("/dev/sg7"));
    assert_eq!(seen[0].sense_capacity, 64);
    assert_eq!(seen[0].timeout.as_secs(), 3);
    assert_eq!(seen[0].direction, DataDirection::FromDevice);

    fs::remove_file(path)?;
    Ok(())
}

#[test]
fn oversized_sense_length_is_rejected() {
    let yaml = r#"
device:
  Path: /dev/sg0
command:
  Cdb: "12 00 00 00 24 00"
  SenseLength: 300
"#;
    assert!(Config::from_yaml(yaml).is_err());
}

#[test]
#[serial]
fn logger_installs_once() -> Result<()> {
    let cfg = LoggerConfig::from_yaml("logger:\n  level: \"sg_raw_rs=debug\"\n  output: stderr\n")?;
    let guard = init_logger_with(cfg.clone())?;
    tracing::info!(test = "logger_installs_once", "logger up");
    assert!(init_logger_with(cfg).is_err());
    drop(guard);
    Ok(())
}
