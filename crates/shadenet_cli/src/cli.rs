// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// shadenet command line interface
#[derive(Parser)]
#[command(
    name = "shadenet",
    about = "Shading-network shader generator",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands
#[derive(Subcommand)]
pub enum Command {
    /// Validate a shading-network document
    Validate {
        /// Path to the document (.ron or .json)
        document: PathBuf,
    },
    /// Generate shader source for one or more targets
    Generate {
        /// Path to the document (.ron or .json)
        document: PathBuf,
        /// Target to generate for; repeatable
        #[arg(long = "target", short = 't', required = true)]
        targets: Vec<String>,
        /// Directory to write stage sources into; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
        /// Entry element name; defaults to the document's renderable element
        #[arg(long)]
        element: Option<String>,
    },
    /// List the available targets
    Targets,
}
