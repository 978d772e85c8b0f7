//! CLI argument definitions for the sarsync binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sarsync::Role;

/// Offline session and sync tool for the SAR school portal
#[derive(Parser, Debug)]
#[command(name = "sarsync")]
#[command(about = "sarsync: offline-first session and data sync for the SAR portal")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub context: ContextArgs,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where local state lives and where it syncs to.
#[derive(Args, Debug, Clone)]
pub struct ContextArgs {
    /// Data directory holding offline.json and the session/ slot directory
    #[arg(short = 'D', long, global = true, env = "SARSYNC_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Endpoint that accepts pending mutations
    #[arg(long, global = true, env = "SARSYNC_REMOTE_URL")]
    pub remote_url: Option<String>,

    /// Bearer token sent to the remote
    #[arg(long, global = true, env = "SARSYNC_REMOTE_TOKEN", hide_env_values = true)]
    pub remote_token: Option<String>,

    /// Treat connectivity as down: writes are queued, nothing is pushed
    #[arg(long, global = true, env = "SARSYNC_OFFLINE")]
    pub offline: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect or change the stored session
    #[command(subcommand)]
    Session(SessionCommand),
    /// Store a JSON value under a key and sync it if online
    Put(PutArgs),
    /// Print the stored value for a key
    Get(KeyArgs),
    /// Remove a key and queue the deletion
    Delete(KeyArgs),
    /// List pending mutations
    Queue,
    /// Push pending mutations to the remote
    Sync,
    /// Print the connectivity badge
    Status,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Show the current session, if valid
    Show,
    /// Store a session for an already-authenticated user
    Login(LoginArgs),
    /// Clear the session
    Logout,
    /// Refresh the session expiry, optionally changing profile fields
    Touch(TouchArgs),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub name: String,
    #[arg(long, value_enum)]
    pub role: RoleArg,
}

#[derive(Args, Debug)]
pub struct TouchArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Args, Debug)]
pub struct PutArgs {
    pub key: String,
    /// Value as a JSON document
    pub value: String,
}

#[derive(Args, Debug)]
pub struct KeyArgs {
    pub key: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Admin,
    Teacher,
    Parent,
    Student,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::Teacher => Role::Teacher,
            RoleArg::Parent => Role::Parent,
            RoleArg::Student => Role::Student,
        }
    }
}
