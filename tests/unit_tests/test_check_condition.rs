// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use hex_literal::hex;
use sg_raw_rs::{
    CommandOutcome, Executor, ResultCategory, SgError,
    models::{
        request::CommandRequestBuilder,
        sense_data::{SenseData, SenseKey, asc_ascq_to_str},
    },
};

use crate::unit_tests::common::{INQUIRY, Reply, SimTransport, fixed_sense};

const DRIVER_SENSE: u16 = 0x08;

fn run(reply: Reply, sense_capacity: usize) -> Result<CommandOutcome> {
    let req = CommandRequestBuilder::new("/dev/sg0")
        .cdb(&INQUIRY)
        .data_in(36)
        .sense_capacity(sense_capacity)
        .build()?;
    Ok(Executor::new(SimTransport::replying(reply)).execute(&req)?)
}

fn check_condition(sense: Vec<u8>) -> Reply {
    Reply {
        status: 0x02,
        driver_status: DRIVER_SENSE,
        sense,
        ..Default::default()
    }
}

#[test]
fn illegal_request_reports_sense() -> Result<()> {
    let outcome = run(check_condition(fixed_sense(0x05, 0x24, 0x00)), 32)?;

    assert_eq!(outcome.category(), ResultCategory::IllegalRequest);
    assert_eq!(outcome.status_code(), 5);
    assert_eq!(outcome.sense().len(), 18);
    assert_eq!(outcome.sense_key(), Some(SenseKey::IllegalRequest));

    let parsed = SenseData::parse(outcome.sense())?;
    assert_eq!(asc_ascq_to_str(parsed.asc, parsed.ascq), "Invalid field in CDB");

    match outcome.into_result() {
        Err(SgError::DeviceReported {
            category, asc, ascq, ..
        }) => {
            assert_eq!(category, ResultCategory::IllegalRequest);
            assert_eq!((asc, ascq), (0x24, 0x00));
        },
        other => panic!("expected DeviceReported, got {other:?}"),
    }
    Ok(())
}

#[test]
fn illegal_request_refinements() -> Result<()> {
    let opcode = run(check_condition(fixed_sense(0x05, 0x20, 0x00)), 32)?;
    assert_eq!(opcode.category(), ResultCategory::InvalidOpcode);
    assert_eq!(opcode.status_code(), 9);

    let lba = run(check_condition(fixed_sense(0x05, 0x21, 0x00)), 32)?;
    assert_eq!(lba.status_code(), 22);
    Ok(())
}

#[test]
fn sense_is_clamped_to_capacity() -> Result<()> {
    let outcome = run(check_condition(fixed_sense(0x05, 0x24, 0x00)), 8)?;

    assert_eq!(outcome.sense().len(), 8);
    // key survives truncation, ASC does not
    assert_eq!(outcome.category(), ResultCategory::IllegalRequest);
    Ok(())
}

#[test]
fn descriptor_sense_unit_attention() -> Result<()> {
    let sense = hex!("72 06 29 00 00 00 00 00").to_vec();
    let outcome = run(check_condition(sense), 32)?;

    assert_eq!(outcome.category(), ResultCategory::UnitAttention);
    assert_eq!(outcome.status_code(), 6);
    assert_eq!(outcome.sense().len(), 8);
    Ok(())
}

#[test]
fn protection_error_from_aborted_command() -> Result<()> {
    let outcome = run(check_condition(fixed_sense(0x0B, 0x10, 0x01)), 32)?;
    assert_eq!(outcome.category(), ResultCategory::Protection);
    assert_eq!(outcome.status_code(), 40);
    Ok(())
}

#[test]
fn busy_without_sense_uses_status() -> Result<()> {
    let outcome = run(
        Reply {
            status: 0x08,
            ..Default::default()
        },
        32,
    )?;
    assert_eq!(outcome.category(), ResultCategory::Busy);
    assert_eq!(outcome.status_code(), 26);
    assert!(outcome.sense().is_empty());
    assert!(outcome.category().is_device_reported());
    Ok(())
}

#[test]
fn check_condition_without_sense_bytes() -> Result<()> {
    let outcome = run(check_condition(Vec::new()), 32)?;
    assert_eq!(outcome.category(), ResultCategory::Sense);
    assert!(outcome.sense().is_empty());
    Ok(())
}

#[test]
fn unknown_status_is_not_a_transport_code() -> Result<()> {
    let outcome = run(
        Reply {
            status: 0x0C,
            ..Default::default()
        },
        32,
    )?;
    assert_eq!(outcome.category(), ResultCategory::UnknownStatus);
    assert!(outcome.category().is_device_reported());

    let req = CommandRequestBuilder::new("/dev/sg0")
        .cdb(&INQUIRY)
        .data_in(36)
        .build()?;
    let bad_target = SimTransport::replying(Reply {
        host_status: 0x04, // DID_BAD_TARGET
        ..Default::default()
    });
    let err = Executor::new(bad_target)
        .execute(&req)
        .expect_err("host failure");

    assert_ne!(outcome.status_code(), err.status_code());
    assert_eq!(outcome.status_code(), 97);
    Ok(())
}
