// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - Derive macros: Automatically generate code for our types
// =============================================================================

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::checker::DEFAULT_CONCURRENCY;
use crate::codec::BookmarkFormat;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "bookmark-pruner",
    version = "0.1.0",
    about = "Check browser bookmark exports for dead links and prune them",
    long_about = "bookmark-pruner loads a bookmark export (Chrome-style JSON or Netscape HTML), \
                  probes every bookmarked URL for liveness, and can write back a copy with the \
                  dead entries removed - in the original format or converted to the other one."
)]
pub struct Cli {
    // The #[command(subcommand)] attribute tells clap that this field
    // will hold one of the subcommands defined in the Commands enum
    #[command(subcommand)]
    pub command: Commands,
}

// This enum defines our subcommands (check, prune, convert)
//
// Each variant represents a different subcommand the user can run
// The fields inside each variant become the arguments for that subcommand
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every bookmarked URL in an export for liveness
    ///
    /// Example: bookmark-pruner check Bookmarks.json --recheck
    Check {
        /// Path to the bookmark export (.json or .html)
        file: PathBuf,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        /// How many probes may be in flight at once
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// After the full pass, probe the failed links once more to
        /// weed out transient errors
        #[arg(long)]
        recheck: bool,
    },

    /// Check an export and write a copy with dead bookmarks removed
    ///
    /// By default only confirmed 404s are pruned; --all-failures widens
    /// that to every link that failed its check.
    ///
    /// Example: bookmark-pruner prune Bookmarks.json --all-failures
    Prune {
        /// Path to the bookmark export (.json or .html)
        file: PathBuf,

        /// Where to write the pruned export
        /// (default: Bookmarks_<YYYYMMDD>.<ext>)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write in this format instead of the input's format
        #[arg(long, value_enum)]
        to: Option<FormatArg>,

        /// Prune every failed link, not just confirmed 404s
        #[arg(long)]
        all_failures: bool,

        /// Probe failed links a second time before deciding
        #[arg(long)]
        recheck: bool,

        /// How many probes may be in flight at once
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,
    },

    /// Convert a bookmark export between JSON and Netscape HTML
    ///
    /// Example: bookmark-pruner convert Bookmarks.html --to json
    Convert {
        /// Path to the bookmark export (.json or .html)
        file: PathBuf,

        /// Target format
        #[arg(long, value_enum)]
        to: FormatArg,

        /// Where to write the converted export
        /// (default: Bookmarks_<YYYYMMDD>.<ext>)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

// The format names the user can type on the command line
//
// Kept separate from codec::BookmarkFormat so the codec doesn't need to
// know about clap
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FormatArg {
    Json,
    Html,
}

impl From<FormatArg> for BookmarkFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => BookmarkFormat::Json,
            FormatArg::Html => BookmarkFormat::Html,
        }
    }
}
