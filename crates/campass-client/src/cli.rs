//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// campass - your campus portal at the command line
#[derive(Debug, Parser)]
#[command(name = "campass")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CAMPASS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v: info, -vv: debug)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in to the campus portal and store the credential
    Login {
        /// Portal username (student id)
        #[arg(long, env = "CAMPASS_USERNAME")]
        username: Option<String>,

        /// Portal password (supports env:: and pass:: references)
        #[arg(long, env = "CAMPASS_PASSWORD")]
        password: Option<String>,

        /// Log in with an SMS code instead of a password
        #[arg(long)]
        sms: bool,

        /// Phone number for the SMS flow
        #[arg(long, requires = "sms")]
        phone: Option<String>,

        /// SMS code; omit to request one first
        #[arg(long, requires = "sms")]
        code: Option<String>,
    },

    /// Show the weekly class schedule
    Schedule {
        /// Teaching week number (1-based); defaults to the current week
        #[arg(long)]
        week: Option<usize>,

        /// Fetch every week of the semester
        #[arg(long, conflicts_with = "week")]
        all: bool,

        /// Write an iCalendar file instead of printing
        #[arg(long)]
        export: bool,
    },

    /// Show the exam arrangement
    Exams {
        /// Semester id, e.g. 2023-2024-1; defaults to the first on offer
        #[arg(long)]
        semester: Option<String>,

        /// Write an iCalendar file instead of printing
        #[arg(long)]
        export: bool,
    },

    /// Search the student directory
    Students {
        /// Name or student id fragment to search for
        query: String,
    },

    /// Payment platform queries
    Payment {
        #[command(subcommand)]
        action: PaymentAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Payment platform actions.
#[derive(Debug, Subcommand)]
pub enum PaymentAction {
    /// Show the payment account profile
    Info,

    /// List payable projects
    Projects,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Show configuration file paths
    Path,
}
