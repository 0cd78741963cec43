use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::DEFAULT_SETTINGS_FILE, load_settings, AssociationState, ProviderConfiguration,
    QualityGateProjectAssociation, ReadOutcome, Resource,
};
use shared::domain::AssociationId;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Manage SonarQube quality gate / project associations")]
struct Cli {
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    /// Overrides the host from the settings file and environment.
    #[arg(long)]
    host: Option<String>,
    #[arg(long, env = "SONAR_TOKEN", hide_env_values = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Associate a quality gate with a project.
    Select { gate_id: String, project_key: String },
    /// Look up an association by its `<gateId>/<projectKey>` id.
    Show { id: String },
    /// Remove the association between a quality gate and a project.
    Deselect { gate_id: String, project_key: String },
    /// Verify an existing association and print its state.
    Import { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config)?;
    if let Some(host) = cli.host {
        settings.host = host;
    }
    if let Some(token) = cli.token {
        settings.token = Some(token);
    }
    let config = ProviderConfiguration::new(&settings).context("invalid provider settings")?;
    let resource = QualityGateProjectAssociation;

    match cli.command {
        Command::Select {
            gate_id,
            project_key,
        } => {
            let mut state = AssociationState::planned(gate_id.as_str(), project_key.as_str());
            resource.create(&config, &mut state).await?;
            if let Some(id) = state.id {
                println!("created id={id}");
            }
        }
        Command::Show { id } => {
            let id: AssociationId = id.parse()?;
            let mut state = AssociationState::from_id(id);
            match resource.read(&config, &mut state).await? {
                ReadOutcome::Found => println!(
                    "found gateid={} projectkey={}",
                    state.gateid, state.projectkey
                ),
                ReadOutcome::Missing => println!(
                    "missing gateid={} projectkey={}",
                    state.gateid, state.projectkey
                ),
                ReadOutcome::Undecodable => {
                    bail!("server returned an unreadable search response")
                }
                ReadOutcome::Incomplete => {
                    bail!("project not on the first search page; association unconfirmed")
                }
            }
        }
        Command::Deselect {
            gate_id,
            project_key,
        } => {
            let state = AssociationState::planned(gate_id.as_str(), project_key.as_str());
            resource.delete(&config, &state).await?;
            println!("deleted");
        }
        Command::Import { id } => match resource.import(&config, &id).await? {
            Some(state) => {
                info!(resource = resource.type_name(), %id, "imported");
                println!(
                    "imported gateid={} projectkey={}",
                    state.gateid, state.projectkey
                );
            }
            None => bail!("no association {id} on the server"),
        },
    }

    Ok(())
}
