//! mvirt-vnic: offline planner for vNIC reconciliation.
//!
//! Reads provisioning options and a snapshot of the VM's current NICs and
//! prints the actions a reconciliation run would apply. Never contacts a
//! backend.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mvirt_vnic::{CurrentNic, ProvisionOptions, plan_nics};

/// mvirt vNIC planner
#[derive(Parser, Debug)]
#[command(name = "mvirt-vnic", version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the NIC actions for a provisioning request
    Plan {
        /// JSON file with provisioning options (networks, vlan, mac_address)
        #[arg(long)]
        options: PathBuf,

        /// JSON file with the VM's current NICs
        #[arg(long)]
        current: Option<PathBuf>,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mvirt_vnic=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Plan { options, current } => {
            let mut options: ProvisionOptions = read_json(&options)?;
            let current: Vec<CurrentNic> = match current {
                Some(path) => read_json(&path)?,
                None => Vec::new(),
            };

            options.apply_dialog_nic();
            let Some(desired) = options.desired_nics()? else {
                info!("NIC settings will be inherited from the template");
                println!("[]");
                return Ok(());
            };

            let actions = plan_nics(&desired, current)?;
            println!("{}", serde_json::to_string_pretty(&actions)?);
        }
    }

    Ok(())
}
