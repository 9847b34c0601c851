// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{self, Write};

use crate::api::ObjectApi;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::store::ObjectStore;

use super::{write_object, Context};

pub async fn run(ctx: &Context, id: &str, format: OutputFormat) -> Result<()> {
    let store = ctx.store()?;
    run_impl(&store, id, format, &mut io::stdout().lock()).await
}

/// Internal implementation that accepts a store for testing.
pub(crate) async fn run_impl<A: ObjectApi>(
    store: &ObjectStore<A>,
    id: &str,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let object = store.get_object_by_id(id).await?;
    write_object(out, &object, format)
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
