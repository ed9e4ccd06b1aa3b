use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracker_core::{Action, ItemId};

/// Top-level CLI parser for the `tracker` binary.
#[derive(Debug, Parser)]
#[command(
    name = "tracker",
    version,
    about = "Follow RFPs through analysis, pricing and proposal generation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./tracker.ron)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Automated-run webhook URL, overrides the config file
    #[arg(long, global = true)]
    pub webhook_url: Option<String>,

    /// Directory for downloaded proposals, overrides the config file
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Verbose mode (debug logging to file and terminal)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Pipeline counts and the most recent RFPs.
    Dashboard,
    /// Every tracked RFP with its status.
    List,
    /// Scan tender portals for new RFPs, then show the dashboard.
    Scan,
    /// Detail view of one RFP.
    Show { id: ItemId },
    /// Run one pipeline step by hand.
    Run { id: ItemId, step: StepArg },
    /// Trigger the automated run and follow the RFP until it is ready.
    Autopilot {
        id: ItemId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Give up after this many refreshes
        #[arg(long)]
        max_ticks: Option<u32>,
    },
    /// Follow an RFP without triggering anything.
    Watch {
        id: ItemId,
        /// Give up after this many refreshes
        #[arg(long)]
        max_ticks: Option<u32>,
    },
    /// Save the generated proposal deck.
    Download { id: ItemId },
    /// Ask a question about an RFP.
    Chat {
        id: ItemId,
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Upload a tender document by hand.
    Upload {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long)]
        client: String,
        #[arg(long)]
        deadline: String,
    },
}

/// Manual pipeline step names accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StepArg {
    Analyze,
    Price,
    Proposal,
}

impl From<StepArg> for Action {
    fn from(step: StepArg) -> Self {
        match step {
            StepArg::Analyze => Action::Analyze,
            StepArg::Price => Action::Price,
            StepArg::Proposal => Action::GenerateProposal,
        }
    }
}
