//! Pixvault CLI — administrative commands that talk straight to the
//! database and filesystem (no running API server required).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pixvault_core::Config;
use pixvault_db::{connect_pool, ImageRepository, PgImageRepository};
use pixvault_processing::Seeder;
use pixvault_storage::LocalFileSystem;

#[derive(Parser)]
#[command(name = "pixvault", about = "Pixvault administration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a local directory and upsert a record for every image found
    Seed {
        /// Directory to scan; defaults to the configured images path
        #[arg(long)]
        images_dir: Option<PathBuf>,
        /// Directory for generated thumbnails; defaults to the configured
        /// thumbnails path (omit both to skip thumbnail generation)
        #[arg(long)]
        thumbnails_dir: Option<PathBuf>,
    },
    /// Delete every image, tag, and association from the database
    Reset {
        /// Required confirmation flag
        #[arg(long)]
        yes: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let pool = connect_pool(&config).await?;
    let repo = Arc::new(PgImageRepository::new(pool));

    match cli.command {
        Commands::Seed {
            images_dir,
            thumbnails_dir,
        } => {
            let images_dir = images_dir.unwrap_or_else(|| config.base_images_path.clone());
            let thumbnails_dir = thumbnails_dir.or_else(|| config.base_thumbnails_path.clone());

            let seeder = Seeder::new(Arc::new(LocalFileSystem::new()), repo);
            let report = seeder
                .seed(&images_dir, thumbnails_dir.as_deref())
                .await
                .context("Seeding failed")?;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Reset { yes } => {
            if !yes {
                anyhow::bail!("Refusing to reset the database without --yes");
            }
            repo.delete_all().await.context("Reset failed")?;
            tracing::info!("All image, tag, and association rows deleted");
        }
    }

    Ok(())
}
