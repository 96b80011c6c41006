//! Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Store named YAML datasets inside release notes.
#[derive(Parser, Debug)]
#[command(name = "smuggler", version, about, long_about = None)]
pub struct Cli {
    /// Absolute directory for rotating log files (logging is off when unset)
    #[arg(long, env = "SMUGGLER_LOG_DIR", global = true)]
    pub log_dir: Option<String>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List dataset names stored in a release note
    List { tag: String },
    /// Print one dataset as YAML
    Get { tag: String, name: String },
    /// Add a new dataset from a YAML file (`-` reads stdin)
    Add {
        tag: String,
        name: String,
        file: PathBuf,
        /// Append below the existing note instead of above it
        #[arg(long)]
        bottom: bool,
    },
    /// Replace an existing dataset from a YAML file (`-` reads stdin)
    Set {
        tag: String,
        name: String,
        file: PathBuf,
        /// Create the dataset when it does not exist yet
        #[arg(long)]
        add_if_missing: bool,
    },
    /// Remove a dataset; missing datasets are ignored
    Delete { tag: String, name: String },
    /// Print the login the configured token belongs to
    Whoami,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_set_with_flag() {
        let cli = Cli::parse_from(["smuggler", "set", "v1", "stats", "-", "--add-if-missing"]);
        match cli.command {
            Command::Set {
                tag,
                name,
                file,
                add_if_missing,
            } => {
                assert_eq!(tag, "v1");
                assert_eq!(name, "stats");
                assert_eq!(file.to_str(), Some("-"));
                assert!(add_if_missing);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
