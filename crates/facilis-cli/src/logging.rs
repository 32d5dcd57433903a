// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::env;
use std::io;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "FACILIS_LOG";

/// Installs the stderr subscriber. `FACILIS_LOG` takes a full filter
/// directive and wins over the configured level.
pub fn init(config_level: &str) -> Result<()> {
    let filter = filter_for(env::var(LOG_ENV).ok().as_deref(), config_level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

fn filter_for(env_value: Option<&str>, config_level: &str) -> Result<EnvFilter> {
    match env_value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid {LOG_ENV} filter {directive:?}")),
        None => EnvFilter::try_new(config_level)
            .with_context(|| format!("invalid log level {config_level:?}")),
    }
}
