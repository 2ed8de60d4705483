//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// scrolldepth - scroll-depth telemetry service
#[derive(Parser, Debug)]
#[command(name = "scrolldepth")]
#[command(version)]
#[command(about = "Scroll-depth telemetry: tracking script, event ingestion and engagement analytics", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the HTTP server (default when no command is given)
    Serve,

    /// Manage trackers
    Tracker {
        #[command(subcommand)]
        action: TrackerCommands,
    },

    /// Print the engagement summary of a tracker
    Stats {
        /// Tracker id
        tracker_id: String,

        /// Owner id the tracker belongs to
        #[arg(long)]
        owner: String,

        /// Refresh every `dashboard.refresh_interval_secs` seconds until Ctrl+C
        #[arg(long)]
        watch: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum TrackerCommands {
    /// Create a tracker and print its embed snippet
    Create {
        #[arg(long)]
        owner: String,
    },

    /// List trackers of an owner
    List {
        #[arg(long)]
        owner: String,
    },

    /// Delete a tracker and all of its events
    Delete {
        /// Tracker id
        id: String,

        #[arg(long)]
        owner: String,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigCommands {
    /// Generate a sample configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stats_watch() {
        let cli = Cli::try_parse_from([
            "scrolldepth",
            "-c",
            "custom.toml",
            "stats",
            "abcd1234efgh5678",
            "--owner",
            "alice",
            "--watch",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
        assert_eq!(
            cli.command,
            Some(Commands::Stats {
                tracker_id: "abcd1234efgh5678".to_string(),
                owner: "alice".to_string(),
                watch: true,
                json: false,
            })
        );
    }

    #[test]
    fn test_parse_tracker_delete() {
        let cli =
            Cli::try_parse_from(["scrolldepth", "tracker", "delete", "abc", "--owner", "bob"])
                .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Tracker {
                action: TrackerCommands::Delete {
                    id: "abc".to_string(),
                    owner: "bob".to_string(),
                }
            })
        );
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::try_parse_from(["scrolldepth"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_tracker_create_requires_owner() {
        assert!(Cli::try_parse_from(["scrolldepth", "tracker", "create"]).is_err());
    }
}
