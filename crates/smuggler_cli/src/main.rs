//! `smuggler` command-line entry point.
//!
//! # Responsibility
//! - Wire environment configuration, logging and the GitHub client together.
//! - Map each subcommand onto one `ReleaseStore` operation.

mod args;

use anyhow::Context;
use args::{Cli, Command};
use clap::Parser;
use log::info;
use serde_yaml::Value;
use smuggler_core::{
    core_version, default_log_level, init_logging, DatasetUpdate, GithubReleaseApi,
    InsertPosition, ReleaseStore, SmugglerConfig,
};
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let config = SmugglerConfig::from_env().context("failed to load configuration")?;
    let api = GithubReleaseApi::new(&config)?;
    info!(
        "event=cli_start module=cli core_version={} repo={}/{} command={:?}",
        core_version(),
        config.owner,
        config.repo,
        cli.command
    );

    let mut store = ReleaseStore::new(api);
    match cli.command {
        Command::List { tag } => {
            for found in store.list_datasets(&tag).await? {
                println!("{}\t{}+{}", found.name, found.start, found.length);
            }
        }
        Command::Get { tag, name } => {
            let payload = store.get_dataset(&tag, &name).await?;
            print!("{}", serde_yaml::to_string(&payload)?);
        }
        Command::Add {
            tag,
            name,
            file,
            bottom,
        } => {
            let payload = read_payload(&file)?;
            let position = if bottom {
                InsertPosition::Bottom
            } else {
                InsertPosition::Top
            };
            store.add_dataset_at(&tag, &name, &payload, position).await?;
        }
        Command::Set {
            tag,
            name,
            file,
            add_if_missing,
        } => {
            let payload = read_payload(&file)?;
            store
                .update_dataset(&tag, &name, DatasetUpdate::Replace(payload), add_if_missing)
                .await?;
        }
        Command::Delete { tag, name } => store.delete_dataset(&tag, &name).await?,
        Command::Whoami => println!("{}", store.api().current_user().await?),
    }
    Ok(())
}

fn read_payload(path: &Path) -> anyhow::Result<Value> {
    let text = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read payload from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload file `{}`", path.display()))?
    };
    serde_yaml::from_str(&text).context("payload is not valid YAML")
}
