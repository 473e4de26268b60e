// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use anyhow::Result;
use sg_raw_rs::{
    Executor, ResultCategory,
    models::request::{CommandRequestBuilder, DataDirection},
};

use crate::unit_tests::common::{INQUIRY, Reply, SimTransport, inquiry_data};

#[test]
fn inquiry_on_healthy_device() -> Result<()> {
    let sim = SimTransport::replying(Reply {
        data: inquiry_data(),
        ..Default::default()
    });
    let req = CommandRequestBuilder::new("/dev/sg0")
        .cdb(&INQUIRY)
        .data_in(36)
        .timeout(Duration::from_secs(5))
        .build()?;

    let outcome = Executor::new(sim.clone()).execute(&req)?;

    assert_eq!(outcome.status_code(), 0);
    assert!(outcome.is_clean());
    assert!(outcome.sense().is_empty());
    assert_eq!(outcome.data_in().len(), 36);
    assert_eq!(&outcome.data_in()[8..16], b"LINUX   ");
    assert_eq!(outcome.residual(), 0);

    let seen = sim.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].cdb, INQUIRY);
    assert_eq!(seen[0].direction, DataDirection::FromDevice);
    assert_eq!(seen[0].transfer_len, 36);
    assert_eq!(seen[0].timeout, Duration::from_secs(5));
    assert_eq!(seen[0].sense_capacity, 32);
    assert_eq!(sim.live_handles(), 0);
    Ok(())
}

#[test]
fn short_transfer_is_cut_by_residual() -> Result<()> {
    let sim = SimTransport::replying(Reply {
        data: inquiry_data(),
        resid: 60,
        ..Default::default()
    });
    let req = CommandRequestBuilder::new("/dev/sg0")
        .cdb(&[0x12, 0, 0, 0, 96, 0])
        .data_in(96)
        .build()?;

    let outcome = Executor::new(sim).execute(&req)?;

    assert_eq!(outcome.category(), ResultCategory::Clean);
    assert_eq!(outcome.data_in(), inquiry_data().as_slice());
    assert_eq!(outcome.residual(), 60);
    Ok(())
}

#[test]
fn bogus_residual_never_grows_the_data() -> Result<()> {
    let sim = SimTransport::replying(Reply {
        data: inquiry_data(),
        resid: 1000,
        ..Default::default()
    });
    let req = CommandRequestBuilder::new("/dev/sg0")
        .cdb(&INQUIRY)
        .data_in(36)
        .build()?;

    let outcome = Executor::new(sim).execute(&req)?;
    assert!(outcome.data_in().is_empty());
    assert_eq!(outcome.residual(), 36);
    Ok(())
}

#[test]
fn into_parts_returns_triple() -> Result<()> {
    let sim = SimTransport::replying(Reply {
        data: inquiry_data(),
        ..Default::default()
    });
    let req = CommandRequestBuilder::new("/dev/sg0")
        .cdb(&INQUIRY)
        .data_in(36)
        .build()?;

    let (code, sense, data) = Executor::new(sim).execute(&req)?.into_parts();
    assert_eq!(code, 0);
    assert!(sense.is_empty());
    assert_eq!(data, inquiry_data());
    Ok(())
}

#[tokio::test]
async fn async_facade_matches_blocking_call() -> Result<()> {
    let sim = SimTransport::replying(Reply {
        data: inquiry_data(),
        ..Default::default()
    });
    let req = CommandRequestBuilder::new("/dev/sg3")
        .cdb(&INQUIRY)
        .data_in(36)
        .build()?;

    let outcome = Executor::new(sim.clone()).execute_async(req).await?;

    assert_eq!(outcome.status_code(), 0);
    assert_eq!(outcome.data_in().len(), 36);
    assert_eq!(sim.seen()[0].path.to_str(), Some("/dev/sg3"));
    assert_eq!(sim.live_handles(), 0);
    Ok(())
}

#[tokio::test]
#[should_panic(expected = "simulated device panicked")]
async fn async_facade_propagates_panics() {
    let sim = SimTransport::replying(Reply {
        panic_on_submit: true,
        ..Default::default()
    });
    let req = CommandRequestBuilder::new("/dev/sg0")
        .cdb(&INQUIRY)
        .data_in(36)
        .build()
        .expect("build");

    let _ = Executor::new(sim).execute_async(req).await;
}
