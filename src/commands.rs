//! CLI command definitions
//!
//! All CLI structs and subcommand enums are defined here.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use whaletown::session::Role;

/// Whaletown - agent addressing, sessions and mail routing
#[derive(Parser, Debug)]
#[command(name = "wt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.config/whaletown/config.yaml)
    #[arg(short, long, global = true, env = "WT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Town root (default: discovered from the current directory)
    #[arg(long, global = true, env = "WT_TOWN_ROOT")]
    pub town: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse mail addresses
    #[command(subcommand)]
    Address(AddressCommands),

    /// Convert between agents and tmux session names
    #[command(subcommand)]
    Session(SessionCommands),

    /// Convert between agent addresses and bead IDs
    #[command(subcommand)]
    Bead(BeadCommands),

    /// Label session names (reads stdin when none are given)
    Categorize {
        /// Session names
        sessions: Vec<String>,

        /// Known rig names, used to split hyphenated rigs (comma-separated)
        #[arg(long, value_delimiter = ',')]
        rigs: Vec<String>,
    },

    /// Nudge targeting
    #[command(subcommand)]
    Nudge(NudgeCommands),

    /// Mail recipient resolution
    #[command(subcommand)]
    Mail(MailCommands),

    /// Agent roles and their workspaces
    #[command(subcommand)]
    Role(RoleCommands),

    /// Rig discovery
    #[command(subcommand)]
    Rig(RigCommands),

    /// Town health checks
    #[command(subcommand)]
    Doctor(DoctorCommands),

    /// Merge protocol messages
    #[command(subcommand)]
    Protocol(ProtocolCommands),

    /// Show the mail identity of the current process
    Whoami,

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum AddressCommands {
    /// Parse an address into machine, rig and polecat
    Parse {
        /// Address (e.g., whaletown/crew/max, vm:whaletown/witness)
        address: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Parse a session name into an agent identity
    Parse {
        /// Session name (e.g., wt-whaletown-crew-max)
        name: String,
    },

    /// Build the session name for an agent
    Name {
        /// Agent role
        role: Role,

        /// Rig name (rig-level roles)
        #[arg(long)]
        rig: Option<String>,

        /// Worker name (crew and polecats)
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BeadCommands {
    /// Bead ID for an agent address
    Id {
        /// Agent address (e.g., whaletown/polecats/Toast)
        address: String,
    },

    /// Agent address for a bead ID
    Address {
        /// Bead ID (e.g., wt-whaletown-polecat-Toast)
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum NudgeCommands {
    /// Sessions targeted by a nudge pattern
    Resolve {
        /// Pattern (e.g., mayor, */witness, whaletown/polecats/*)
        pattern: String,

        /// Live session names (reads stdin when none are given)
        sessions: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MailCommands {
    /// Recipients of a mail address
    Resolve {
        /// Recipient (address, pattern, name, queue:, channel:, list:, announce:, @group)
        address: String,

        /// Live session names (reads stdin when none are given)
        sessions: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RoleCommands {
    /// Home directory of an agent (default: the current agent)
    Home {
        /// Agent role
        role: Option<Role>,

        /// Rig name
        #[arg(long)]
        rig: Option<String>,

        /// Worker name (crew and polecats)
        #[arg(long)]
        polecat: Option<String>,
    },

    /// Detect the role from the current directory
    Detect,

    /// Print the environment for the current agent
    Env,
}

#[derive(Subcommand, Debug)]
pub enum RigCommands {
    /// Rig containing a path (default: current directory)
    Detect {
        path: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DoctorCommands {
    /// Find sessions whose rig no longer exists
    Orphans {
        /// Live session names (reads stdin when none are given)
        sessions: Vec<String>,

        /// List the sessions that are safe to kill
        #[arg(long)]
        targets: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProtocolCommands {
    /// Parse a protocol subject, and optionally its body
    Parse {
        /// Subject line (e.g., "MERGE_READY nux")
        subject: String,

        /// Message body with Key: value lines
        #[arg(long)]
        body: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Validate the configuration file
    Validate,
}
