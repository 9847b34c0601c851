// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{self, Write};

use crate::api::ObjectApi;
use crate::error::Result;
use crate::store::ObjectStore;

use super::Context;

pub async fn run(ctx: &Context, id: &str) -> Result<()> {
    let store = ctx.store()?;
    run_impl(&store, id, &mut io::stdout().lock()).await
}

/// Internal implementation that accepts a store for testing.
pub(crate) async fn run_impl<A: ObjectApi>(
    store: &ObjectStore<A>,
    id: &str,
    out: &mut impl Write,
) -> Result<()> {
    store.delete_object(id).await?;
    writeln!(out, "Deleted {}", id)?;
    Ok(())
}

#[cfg(test)]
#[path = "delete_tests.rs"]
mod tests;
