// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Context, Result};
use sg_raw_rs::{
    cfg::{
        cli::{parse_args, resolve_config_path},
        config::Config,
        logger::init_logger,
    },
    execute_async,
    models::{
        outcome::CommandOutcome,
        sense_data::{DescriptorSense, SenseData, SenseFormat, SenseHeader, asc_ascq_to_str},
    },
};
use tokio::main;
use tracing::{error, info, warn};

fn log_sense(outcome: &CommandOutcome) {
    let sense = outcome.sense();
    if sense.is_empty() {
        return;
    }
    match SenseHeader::normalize(sense).map(|h| h.format) {
        Some(SenseFormat::Fixed { .. }) => match SenseData::parse(sense) {
            Ok(s) => info!("Sense: {s:?}"),
            Err(e) => warn!("short fixed sense ({e}): {}", hex::encode(sense)),
        },
        Some(SenseFormat::Descriptor { .. }) => match DescriptorSense::parse(sense) {
            Ok(d) => info!(
                "Sense: {} / {} ({d:?})",
                d.sense_key,
                asc_ascq_to_str(d.asc, d.ascq)
            ),
            Err(e) => warn!("bad descriptor sense ({e}): {}", hex::encode(sense)),
        },
        None => warn!("unrecognised sense: {}", hex::encode(sense)),
    }
}

#[main]
async fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    let guard = init_logger(&args.logger_config)?;

    let config = resolve_config_path(&args.config)
        .and_then(Config::load_from_file)
        .context("failed to resolve or load config")?;
    let request = config.to_request()?;
    info!("Request: {request:?}");

    let code = match execute_async(request).await {
        Ok(outcome) => {
            info!(
                status_code = outcome.status_code(),
                "SCSI status: {:?}, {}",
                outcome.scsi_status(),
                outcome.category()
            );
            log_sense(&outcome);
            if !outcome.data_in().is_empty() {
                info!(
                    len = outcome.data_in().len(),
                    residual = outcome.residual(),
                    "Data-In: {}",
                    hex::encode(outcome.data_in())
                );
            }
            outcome.status_code()
        },
        Err(e) => {
            error!(status_code = e.status_code(), "{e}");
            e.status_code()
        },
    };

    drop(guard);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
