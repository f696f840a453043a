//! CLI command definitions and dispatch for the `mentors` binary.
//!
//! Uses clap derive macros for argument parsing. The CLI follows a verb-noun
//! pattern (e.g., `mentors create mentor`, `mentors list templates`).

pub mod chat;
pub mod mentor;
pub mod session;
pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use uuid::Uuid;

/// Create and talk to AI mentors.
#[derive(Parser)]
#[command(name = "mentors", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans via OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Bind address; defaults to the configured host.
        #[arg(long)]
        host: Option<String>,
        /// Bind port; defaults to the configured port.
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Insert the built-in mentor template catalog.
    Seed,

    /// List resources.
    #[command(alias = "ls")]
    List {
        #[command(subcommand)]
        resource: ListResource,
    },

    /// Create a new resource.
    Create {
        #[command(subcommand)]
        resource: CreateResource,
    },

    /// Chat with a mentor (template id or custom mentor UUID).
    Chat {
        /// Template id (e.g. `crypto_day_trader_wyckoff_ta`) or mentor UUID.
        mentor: String,
        /// Acting user id.
        #[arg(long)]
        user: String,
        /// Resume an existing session.
        #[arg(long)]
        session: Option<Uuid>,
    },

    /// Show store counts and configuration summary.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ListResource {
    /// List the mentor template catalog.
    Templates,
    /// List a user's custom mentors.
    Mentors {
        /// Owner user id.
        #[arg(long)]
        user: String,
    },
    /// List a user's chat sessions.
    Sessions {
        /// Owner user id.
        #[arg(long)]
        user: String,
    },
}

#[derive(Subcommand)]
pub enum CreateResource {
    /// Create a custom mentor.
    Mentor {
        /// Mentor display name.
        name: String,
        /// One-or-two sentence persona description.
        #[arg(long)]
        description: String,
        /// Owning user id.
        #[arg(long)]
        user: String,
        /// Accent color (hex).
        #[arg(long)]
        color: Option<String>,
        /// Icon name.
        #[arg(long)]
        icon: Option<String>,
    },
}
