//! Attache CLI: manage media records against a local database and uploads root.
//!
//! Reads DATABASE_URL and UPLOADS_ROOT (plus the optional limits) from the
//! environment or a `.env` file.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use attache_cli::{encode_file, exit_code, init_tracing, render};
use attache_core::{AttacheConfig, CreateMediaRequest, MediaResponse, UpdateMediaRequest};
use attache_db::PgMediaStore;
use attache_services::{LocalMediaStorage, MediaService};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "attache", about = "Attache media store CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    #[command(flatten)]
    Media(MediaCommand),
}

#[derive(Subcommand)]
enum MediaCommand {
    /// Create a media record, optionally uploading a file
    Create {
        #[arg(long)]
        container_id: i64,
        /// Display name, e.g. notes.txt
        #[arg(long)]
        name: String,
        /// Local file whose bytes are stored
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        video_length: Option<f64>,
    },
    /// Show a single media record
    Get { id: i64 },
    /// List live media by owner or container
    List(ListArgs),
    /// Rename a record and/or replace its bytes
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        file_size: Option<i64>,
        #[arg(long)]
        video_length: Option<f64>,
    },
    /// Soft delete a record and unlink its file
    Delete { id: i64 },
    /// Write the stored bytes of a record to stdout
    Cat { id: i64 },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ListArgs {
    /// User id owning the containers
    #[arg(long)]
    owner: Option<i64>,
    #[arg(long)]
    container: Option<i64>,
}

fn finish<T: Serialize>(response: &MediaResponse<T>) -> anyhow::Result<i32> {
    println!("{}", render(response)?);
    Ok(exit_code(response))
}

async fn build_service(config: &AttacheConfig) -> anyhow::Result<MediaService> {
    let pool = attache_db::connect(config).await?;
    let storage = LocalMediaStorage::new(&config.uploads_root, config.max_upload_bytes)
        .context("Failed to set up uploads root")?;

    Ok(MediaService::new(
        Arc::new(PgMediaStore::new(pool)),
        Arc::new(storage),
        config.max_filename_length,
    ))
}

async fn run(cli: Cli, config: AttacheConfig) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Migrate => {
            let pool = attache_db::connect(&config).await?;
            attache_db::run_migrations(&pool).await?;
            Ok(0)
        }
        Commands::Media(command) => {
            let service = build_service(&config).await?;
            run_media_command(command, &service).await
        }
    }
}

async fn run_media_command(command: MediaCommand, service: &MediaService) -> anyhow::Result<i32> {
    match command {
        MediaCommand::Create {
            container_id,
            name,
            file,
            video_length,
        } => {
            let base64 = file.as_deref().map(encode_file).transpose()?;
            let request = CreateMediaRequest {
                container_id,
                filename: name,
                video_length,
                base64,
                ..Default::default()
            };
            finish(&service.create_media(request).await)
        }
        MediaCommand::Get { id } => finish(&service.get_media_by_id(id).await),
        MediaCommand::List(ListArgs { owner, container }) => match (owner, container) {
            (Some(owner), _) => finish(&service.get_media_by_owner(owner).await),
            (None, Some(container)) => finish(&service.get_media_by_container(container).await),
            (None, None) => anyhow::bail!("either --owner or --container is required"),
        },
        MediaCommand::Update {
            id,
            name,
            file,
            file_size,
            video_length,
        } => {
            let base64 = file.as_deref().map(encode_file).transpose()?;
            let request = UpdateMediaRequest {
                filename: name,
                file_size,
                video_length,
                base64,
            };
            finish(&service.update_media(id, request).await)
        }
        MediaCommand::Delete { id } => finish(&service.delete_media(id).await),
        MediaCommand::Cat { id } => {
            let response = service.get_media_content(id).await;
            match response.data.as_deref() {
                Some(bytes) => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(bytes).context("Write to stdout")?;
                    stdout.flush().context("Flush stdout")?;
                    Ok(0)
                }
                None => {
                    eprintln!("{}", render(&response)?);
                    Ok(exit_code(&response))
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = AttacheConfig::from_env().context(
        "Failed to load configuration. Set DATABASE_URL and UPLOADS_ROOT",
    )?;

    let code = run(cli, config).await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
