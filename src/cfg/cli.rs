// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

pub const DEFAULT_CONFIG: &str = "config.yaml";
pub const DEFAULT_LOGGER_CONFIG: &str = "config_logger.yaml";

/// Paths the `sg_raw` binary reads its settings from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config: String,
    pub logger_config: String,
}

/// Parse `[--config <path>] [--logger <path>]` (program name excluded).
pub fn parse_args<I>(args: I) -> Result<CliArgs>
where I: IntoIterator<Item = String> {
    let mut out = CliArgs {
        config: DEFAULT_CONFIG.to_string(),
        logger_config: DEFAULT_LOGGER_CONFIG.to_string(),
    };
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        let slot = match arg.as_str() {
            "-c" | "--config" => &mut out.config,
            "-l" | "--logger" => &mut out.logger_config,
            other => bail!("unexpected argument {other:?}"),
        };
        *slot = it
            .next()
            .with_context(|| format!("{arg} expects a path"))?;
    }
    Ok(out)
}

pub fn resolve_config_path(rel: &str) -> Result<PathBuf> {
    let p = Path::new(rel);

    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot get current working dir")?
            .join(p)
    };

    let canon = abs
        .canonicalize()
        .with_context(|| format!("failed to canonicalize path {abs:?}"))?;

    Ok(canon)
}
