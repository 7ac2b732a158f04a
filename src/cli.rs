use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api::DEFAULT_BASE_URL;
use crate::model::{MAX_PALETTE_LENGTH, MIN_PALETTE_LENGTH};

/// Turn natural-language prompts into color palettes via the Chromos service.
#[derive(Parser, Debug)]
#[command(name = "chromos", version, about)]
pub struct Args {
    /// Base URL of the Chromos service
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a palette from a prompt and print a colored preview
    Generate {
        /// The prompt to interpret
        prompt: String,

        /// Number of colors in the palette
        #[arg(
            short = 'k',
            long = "colors",
            default_value_t = 5,
            value_parser = clap::value_parser!(u8).range(MIN_PALETTE_LENGTH as i64..=MAX_PALETTE_LENGTH as i64)
        )]
        colors: u8,

        /// Ask the service to enforce accessibility contrast strictly
        #[arg(long)]
        strict_ada: bool,

        /// Tone preset hint (e.g. "sacred", "bold")
        #[arg(long)]
        tone: Option<String>,

        /// Print the raw JSON result instead of a preview
        #[arg(long)]
        json: bool,

        /// Also write the result to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ask Isla to refine or explain a palette
    Chat {
        /// What to ask
        prompt: String,

        /// Palette label passed as conversation context
        #[arg(long, default_value = "")]
        label: String,

        /// Context tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Conversation tone
        #[arg(long, default_value = "resilient")]
        tone: String,
    },

    /// Apply accessibility remediation to an exported palette
    Fix {
        /// Path to a palette JSON produced by `generate -o`
        file: PathBuf,

        /// Write the remediated palette to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Launch the interactive session
    Tui {
        /// Number of colors requested per generation
        #[arg(
            short = 'k',
            long = "colors",
            default_value_t = 5,
            value_parser = clap::value_parser!(u8).range(MIN_PALETTE_LENGTH as i64..=MAX_PALETTE_LENGTH as i64)
        )]
        colors: u8,

        /// Ask the service to enforce accessibility contrast strictly
        #[arg(long)]
        strict_ada: bool,

        /// Tone preset hint applied to every generation
        #[arg(long)]
        tone: Option<String>,

        /// Disable the Isla chat pane
        #[arg(long)]
        no_chat: bool,

        /// Disable accessibility remediation actions
        #[arg(long)]
        no_ada: bool,

        /// Disable evolve/branch history
        #[arg(long)]
        no_evolve: bool,
    },
}
