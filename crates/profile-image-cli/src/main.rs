//! profile-image: set, remove or show the signed-in user's profile image.
//!
//! Reads API_URL, storage settings and IDENTITY_PATH from the environment (or `.env`).

use anyhow::Context;
use clap::{Parser, Subcommand};
use profile_image_api_client::ProfileApiClient;
use profile_image_cli::{init_tracing, read_candidate};
use profile_image_core::{resolve_image_url, ProfileImageConfig};
use profile_image_storage::create_storage;
use profile_image_sync::{
    FileIdentityStore, IdentityCache, IdentityStore, ProfileImageUploader, TempFilePreviewManager,
    UploadPhase,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "profile-image", about = "Manage the signed-in user's profile image")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image and make it the profile image
    Upload {
        /// Path to the image
        file: PathBuf,
        /// Override the media type guessed from the extension
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Remove the current profile image
    Remove,
    /// Print the cached profile image URL
    Show,
}

/// Uploader wired to the configured storage, the backend and the identity file.
async fn build_uploader(
    config: &ProfileImageConfig,
    identity_store: Arc<FileIdentityStore>,
) -> anyhow::Result<ProfileImageUploader> {
    let identity = IdentityCache::new(identity_store);
    let current_image = identity
        .current()?
        .map(|user| user.profile_image)
        .unwrap_or_default();

    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage")?;
    let records = Arc::new(ProfileApiClient::from_config(config)?);

    Ok(ProfileImageUploader::new(
        storage,
        records,
        Arc::new(TempFilePreviewManager::in_temp_dir()),
        identity,
        config.api_url.clone(),
    )
    .with_current_image(&current_image)
    .on_image_change(|value| {
        tracing::info!(profile_image = %value, "Profile image changed");
    }))
}

fn finish(uploader: &ProfileImageUploader) -> anyhow::Result<()> {
    if let UploadPhase::Error(message) = uploader.session().phase {
        anyhow::bail!(message);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ProfileImageConfig::from_env().context("Invalid configuration")?;
    let identity_store = Arc::new(FileIdentityStore::new(config.identity_path.clone()));

    match cli.command {
        Commands::Upload { file, content_type } => {
            let candidate = read_candidate(&file, content_type.as_deref()).await?;
            let mut uploader = build_uploader(&config, identity_store).await?;
            if let Ok(location) = uploader.upload(candidate).await {
                println!("{}", location);
            }
            finish(&uploader)
        }
        Commands::Remove => {
            let mut uploader = build_uploader(&config, identity_store).await?;
            if uploader.remove().await.is_ok() {
                println!("Profile image removed");
            }
            finish(&uploader)
        }
        Commands::Show => {
            let identity = identity_store
                .load()?
                .context("No signed-in user; write the identity file first")?;
            match resolve_image_url(&config.api_url, &identity.profile_image) {
                Some(url) => println!("{}", url),
                None => println!("(no profile image)"),
            }
            Ok(())
        }
    }
}
