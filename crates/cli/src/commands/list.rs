// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{self, Write};

use chrono::Utc;
use heyama_core::Pagination;

use crate::api::ObjectApi;
use crate::cli::OutputFormat;
use crate::display::format_object_summary;
use crate::error::{Error, Result};
use crate::store::ObjectStore;

use super::Context;

pub async fn run(
    ctx: &Context,
    pagination: Option<Pagination>,
    format: OutputFormat,
) -> Result<()> {
    let store = ctx.store()?;
    run_impl(&store, pagination, format, &mut io::stdout().lock()).await
}

/// Internal implementation that accepts a store for testing.
pub(crate) async fn run_impl<A: ObjectApi>(
    store: &ObjectStore<A>,
    pagination: Option<Pagination>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    store.refresh_with(pagination).await;
    if let Some(message) = store.error() {
        return Err(Error::Load(message));
    }

    let objects = store.objects();
    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&objects)?)?;
        }
        OutputFormat::Text => {
            if objects.is_empty() {
                writeln!(out, "No objects yet.")?;
                return Ok(());
            }
            let now = Utc::now();
            for object in &objects {
                writeln!(out, "{}", format_object_summary(object, now))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
