//! Command line definition.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "coactl")]
#[command(about = "CoA pipeline client - live metrics and assistant", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream live metrics from coad
    Watch {
        /// Server URL (overrides config and COA_SERVER_URL)
        #[arg(long)]
        url: Option<String>,

        /// Stop after this many snapshots
        #[arg(long)]
        count: Option<usize>,
    },

    /// Ask the assistant one question about the current metrics
    Ask {
        /// Question text
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        #[arg(long)]
        url: Option<String>,

        /// Use baseline metrics instead of the live stream
        #[arg(long)]
        offline: bool,
    },

    /// Interactive assistant session on top of the live stream
    Chat {
        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        offline: bool,
    },

    /// Print the noise-free baseline snapshot
    Sample {
        /// Emit raw JSON, as sent on the wire
        #[arg(long)]
        json: bool,
    },
}
