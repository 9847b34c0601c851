// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.

use clap::Args;
use heyama_core::Pagination;

/// Page window for commands that list objects.
#[derive(Args, Clone, Copy, Debug, Default)]
pub struct PageArgs {
    /// Page number, starting at 1
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: Option<u32>,

    /// Maximum number of objects per page
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,
}

impl PageArgs {
    /// Pagination to send, or `None` for the server default.
    pub fn pagination(&self) -> Option<Pagination> {
        if self.page.is_none() && self.limit.is_none() {
            None
        } else {
            Some(Pagination::new(self.page, self.limit))
        }
    }
}
