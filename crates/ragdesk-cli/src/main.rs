//! ragdesk CLI: manage documents through a running ragdesk API.
//!
//! Set RAGDESK_API_URL to point at the server (default http://localhost:3000).

use anyhow::Context;
use clap::{Parser, Subcommand};
use ragdesk_cli::{init_tracing, ApiClient};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "ragdesk", about = "ragdesk API CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List documents, newest first
    List,
    /// Show one document's metadata
    Get {
        /// Search store document ID
        id: String,
    },
    /// Upload a file into the search store
    Upload {
        /// Path to the file to upload
        file: std::path::PathBuf,
    },
    /// Delete a document from the search store and the metadata table
    Delete {
        /// Search store document ID
        id: String,
    },
    /// Change a document's display name
    Rename {
        /// Search store document ID
        id: String,
        /// New name
        name: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let client = ApiClient::from_env().context("Failed to create API client")?;

    let cli = Cli::parse();

    match cli.command {
        Commands::List => print_json(&client.list_documents().await?)?,
        Commands::Get { id } => print_json(&client.get_document(&id).await?)?,
        Commands::Upload { file } => print_json(&client.upload(&file).await?)?,
        Commands::Delete { id } => print_json(&client.delete(&id).await?)?,
        Commands::Rename { id, name } => print_json(&client.rename(&id, &name).await?)?,
    }

    Ok(())
}
