// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use args::PageArgs;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const QUICKSTART: &str = "\
Quickstart:
  heyama list                                   Show the newest objects
  heyama create -t Chair -d \"A wooden chair\"    Create an object
  heyama create -t Lamp -d \"Brass desk lamp\" --image lamp.jpg
  heyama watch                                  Follow live changes";

#[derive(Parser)]
#[command(name = "heyama")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse and manage Heyama objects from the terminal")]
#[command(after_help = QUICKSTART)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List objects, newest first
    #[command(after_help = "\
Examples:
  heyama list                 First page with the server default size
  heyama list --page 2 -n 10  Second page of ten
  heyama list -o json         Machine-readable output")]
    List {
        #[command(flatten)]
        page: PageArgs,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Show a single object
    #[command(arg_required_else_help = true)]
    Show {
        /// Object ID
        id: String,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Create a new object, optionally with an image
    #[command(after_help = "\
Examples:
  heyama create -t Chair -d \"A sturdy wooden chair\"
  heyama create -t Lamp -d \"Brass desk lamp\" -i ./lamp.jpg")]
    Create {
        /// Title (at least 3 characters)
        #[arg(long, short, value_parser = non_empty_string)]
        title: String,

        /// Description (at least 10 characters)
        #[arg(long, short, value_parser = non_empty_string)]
        description: String,

        /// Image file to attach
        #[arg(long, short, value_name = "path")]
        image: Option<PathBuf>,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Change the title or description of an object
    #[command(arg_required_else_help = true)]
    Update {
        /// Object ID
        id: String,

        /// New title
        #[arg(long, short, value_parser = non_empty_string)]
        title: Option<String>,

        /// New description
        #[arg(long, short, value_parser = non_empty_string)]
        description: Option<String>,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Delete an object
    #[command(arg_required_else_help = true)]
    Delete {
        /// Object ID
        id: String,
    },

    /// Load the list and follow live changes until interrupted
    Watch {
        /// Exit after this many events
        #[arg(long, value_name = "n")]
        events: Option<usize>,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
