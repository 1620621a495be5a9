//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--store <dir>`: Use this store instead of the configured one
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Coursekeeper - maintenance commands for versioned course branches
#[derive(Parser, Debug)]
#[command(name = "ck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Store directory (defaults to the configured store)
    #[arg(long, global = true, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the store layout and default store config
    #[command(
        name = "init",
        long_about = "Create the store directory layout.\n\n\
            Creates the course index, structure, legacy, lock and audit \
            directories under the store root and writes a default store \
            config if none exists. Safe to run more than once.",
        after_help = "\
EXAMPLES:
    # Initialize the configured store
    ck init

    # Initialize a store somewhere else
    ck --store /srv/coursekeeper init"
    )]
    Init,

    /// List available maintenance commands
    #[command(name = "commands")]
    Commands,

    /// Show a course's draft and published branch versions
    #[command(
        name = "versions",
        long_about = "Show the content version each branch of a course points at.\n\n\
            Only courses in the versioned backend have branch pointers. A course \
            is published when both branches point at the same version.",
        after_help = "\
EXAMPLES:
    ck versions course-v1:edX+DemoX+2024
    ck versions course-v1:edX+DemoX+2024 --json"
    )]
    Versions {
        /// Course key (course-v1:ORG+COURSE+RUN or ORG/COURSE/RUN)
        course: String,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Point a course's published branch at its draft version
    #[command(
        name = "force-publish",
        long_about = "Force the published branch of a course to match its draft branch.\n\n\
            Use when normal publishing has failed or the branches have diverged. \
            Only the published pointer moves; draft content is never touched. \
            Courses in the legacy backend are refused. Requires a staff actor.\n\n\
            Every invocation is recorded in the audit log, including dry runs \
            and failures.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Preview what would change
    ck force-publish course-v1:edX+DemoX+2024 --dry-run

    # Publish, recording who did it
    ck force-publish course-v1:edX+DemoX+2024 --actor escalations

    # Review what happened
    ck audit --limit 5

RETRYING:
    'Could not publish course.' after a concurrent change is safe to retry:
    run the same command again. It re-reads both branches first."
    )]
    ForcePublish {
        /// Course key (course-v1:ORG+COURSE+RUN or ORG/COURSE/RUN)
        course: String,

        /// Compare branches without moving anything
        #[arg(long)]
        dry_run: bool,

        /// Acting identity (defaults to config `actor`, then $USER)
        #[arg(long)]
        actor: Option<String>,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Register courses and stage draft content
    #[command(name = "course", subcommand)]
    Course(CourseAction),

    /// Show force-publish audit entries
    #[command(
        name = "audit",
        after_help = "\
EXAMPLES:
    # Last ten invocations
    ck audit --limit 10

    # Everything, as JSON lines
    ck audit --json"
    )]
    Audit {
        /// Show only the newest N entries
        #[arg(long, value_name = "N")]
        limit: Option<usize>,

        /// Print one JSON entry per line
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
INSTALLATION:
    # Bash
    ck completion bash > ~/.local/share/bash-completion/completions/ck

    # Zsh
    ck completion zsh > ~/.zfunc/_ck

    # Fish
    ck completion fish > ~/.config/fish/completions/ck.fish

    # PowerShell
    ck completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Course fixture subcommands.
#[derive(Subcommand, Debug)]
pub enum CourseAction {
    /// Register a new course
    Create {
        /// Course key
        course: String,

        /// Register in the legacy backend (no branch pointers)
        #[arg(long)]
        legacy: bool,

        /// Acting identity (defaults to config `actor`, then $USER)
        #[arg(long)]
        actor: Option<String>,
    },

    /// Record new draft content and move the draft branch to it
    Stage {
        /// Course key
        course: String,

        /// Content to stage
        #[arg(long)]
        content: String,

        /// Acting identity (defaults to config `actor`, then $USER)
        #[arg(long)]
        actor: Option<String>,
    },
}

/// Supported shells for completion.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
