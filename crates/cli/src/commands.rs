//! Subcommands. Each one is a thin caller of a single client operation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::info;

use topomatch_core::{
    progress_channel, BinaryResponse, EncodedImage, FolderMatch, FolderPath, Identifier,
    ImageUpload, MatchingApi, NewCrag, NewRegion, ProgressReceiver, ProgressReporter,
    TopomatchClient,
};

#[derive(Subcommand)]
pub enum Command {
    /// Find the best-matching reference topo within a region/crag folder.
    FindMatch {
        /// Photo to match.
        #[arg(long)]
        image: PathBuf,

        /// Corpus folder, e.g. "poland_jura" or "region/crag".
        #[arg(long)]
        folder: String,

        /// Also fetch the preview of the best match and write it here.
        #[arg(long)]
        preview_out: Option<PathBuf>,
    },
    /// Full matching matrix of a photo against a corpus folder.
    Matrix {
        #[arg(long)]
        image: PathBuf,

        #[arg(long)]
        folder: String,
    },
    /// Render the correspondences between a photo and a known reference.
    Preview {
        #[arg(long)]
        image: PathBuf,

        /// Corpus path of the reference, as reported by find-match.
        #[arg(long)]
        best_match: String,

        #[arg(long)]
        out: PathBuf,
    },
    /// Compare two photos directly.
    Compare {
        #[arg(long)]
        image1: PathBuf,

        #[arg(long)]
        image2: PathBuf,

        /// Send both images base64-encoded in a JSON body instead of as files.
        #[arg(long)]
        encoded: bool,
    },
    /// Download a reference image from the corpus.
    ReferenceImage {
        #[arg(long)]
        path: String,

        #[arg(long)]
        out: PathBuf,
    },
    /// Region reference data.
    #[command(subcommand)]
    Region(RegionCommand),
    /// Crag reference data.
    #[command(subcommand)]
    Crag(CragCommand),
}

#[derive(Subcommand)]
pub enum RegionCommand {
    /// List the reference images of a region.
    Get { region: String },
    /// Create an empty region.
    Create { region: String },
}

#[derive(Subcommand)]
pub enum CragCommand {
    /// Show a crag's annotations ("region/crag" or a bare crag name).
    Get { crag: String },
    /// Replace a crag's annotations with the contents of a JSON file.
    Update {
        crag: String,

        #[arg(long)]
        data: PathBuf,
    },
    /// Add a crag with its reference topo to a region.
    Add(AddCragArgs),
}

#[derive(Args)]
pub struct AddCragArgs {
    #[arg(long)]
    pub region: String,

    #[arg(long)]
    pub name: String,

    /// Reference topo photo.
    #[arg(long)]
    pub image: PathBuf,
}

pub async fn run(client: &TopomatchClient, command: Command) -> Result<()> {
    match command {
        Command::Region(cmd) => run_region(client, cmd).await,
        Command::Crag(cmd) => run_crag(client, cmd).await,
        Command::ReferenceImage { path, out } => {
            let image = client.get_reference_image(&path).await?;
            write_binary(&image, &out).await
        }
        matching => run_matching(client, matching).await,
    }
}

/// Matching subcommands, against any `MatchingApi`.
pub async fn run_matching(api: &dyn MatchingApi, command: Command) -> Result<()> {
    match command {
        Command::FindMatch {
            image,
            folder,
            preview_out,
        } => {
            let upload = load_image(&image).await?;
            let folder = FolderPath::parse(&folder)?;

            let (reporter, relay) = progress_logger("find-match");
            let body = api.find_match(&upload, &folder, Some(&reporter)).await;
            finish_progress(reporter, relay).await;
            let body = body?;
            print_json(&body)?;

            if let Some(out) = preview_out {
                let found = FolderMatch::try_from(body)
                    .context("find-match response has no best_match")?;
                info!("Best match {} (score {})", found.best_match, found.score);

                let (reporter, relay) = progress_logger("preview");
                let preview = api
                    .get_best_match_preview(&upload, &found.best_match, Some(&reporter))
                    .await;
                finish_progress(reporter, relay).await;
                write_binary(&preview?, &out).await?;
            }
            Ok(())
        }
        Command::Matrix { image, folder } => {
            let upload = load_image(&image).await?;
            let folder = FolderPath::parse(&folder)?;
            // The service base64-decodes image_data as-is, so no data URI prefix.
            let encoded = EncodedImage::base64(&upload);

            let (reporter, relay) = progress_logger("matrix");
            let body = api
                .find_matching_matrix(&encoded, &folder, Some(&reporter))
                .await;
            finish_progress(reporter, relay).await;
            print_json(&body?)
        }
        Command::Preview {
            image,
            best_match,
            out,
        } => {
            let upload = load_image(&image).await?;

            let (reporter, relay) = progress_logger("preview");
            let preview = api
                .get_best_match_preview(&upload, &best_match, Some(&reporter))
                .await;
            finish_progress(reporter, relay).await;
            write_binary(&preview?, &out).await
        }
        Command::Compare {
            image1,
            image2,
            encoded,
        } => {
            let first = load_image(&image1).await?;
            let second = load_image(&image2).await?;
            let body = if encoded {
                api.get_matching(&EncodedImage::base64(&first), &EncodedImage::base64(&second))
                    .await?
            } else {
                api.get_matching_matrix(&first, &second).await?
            };
            print_json(&body)
        }
        Command::ReferenceImage { .. } | Command::Region(_) | Command::Crag(_) => {
            anyhow::bail!("not a matching command")
        }
    }
}

async fn run_region(client: &TopomatchClient, command: RegionCommand) -> Result<()> {
    let body = match command {
        RegionCommand::Get { region } => client.get_region(&Identifier::new(region)?).await?,
        RegionCommand::Create { region } => {
            client
                .create_region(&NewRegion::new(Identifier::new(region)?))
                .await?
        }
    };
    print_json(&body)
}

async fn run_crag(client: &TopomatchClient, command: CragCommand) -> Result<()> {
    let body = match command {
        CragCommand::Get { crag } => client.get_crag(&FolderPath::parse(&crag)?).await?,
        CragCommand::Update { crag, data } => {
            let raw = tokio::fs::read(&data)
                .await
                .with_context(|| format!("Failed to read {}", data.display()))?;
            let data: Value = serde_json::from_slice(&raw)
                .with_context(|| format!("{} is not valid JSON", data.display()))?;
            client.update_crag(&FolderPath::parse(&crag)?, &data).await?
        }
        CragCommand::Add(args) => {
            let upload = load_image(&args.image).await?;
            let crag = NewCrag {
                name: Identifier::new(args.name)?,
                image: EncodedImage::base64(&upload).as_str().to_string(),
            };
            client.add_crag(&Identifier::new(args.region)?, &crag).await?
        }
    };
    print_json(&body)
}

async fn load_image(path: &Path) -> Result<ImageUpload> {
    let upload = ImageUpload::from_path(path).await?;
    info!(
        "Loaded {} ({} bytes, {})",
        upload.file_name(),
        upload.len(),
        upload.mime()
    );
    Ok(upload)
}

/// Reporter plus a task logging its events.
fn progress_logger(label: &'static str) -> (ProgressReporter, JoinHandle<()>) {
    let (reporter, rx) = progress_channel();
    (reporter, tokio::spawn(log_progress(label, rx)))
}

async fn log_progress(label: &'static str, mut rx: ProgressReceiver) {
    let mut last_decile = None;
    while let Some(event) = rx.recv().await {
        let Some(fraction) = event.fraction() else {
            continue;
        };
        let decile = (fraction * 10.0).floor() as u8;
        if last_decile != Some(decile) {
            last_decile = Some(decile);
            info!("{}: uploaded {}%", label, decile * 10);
        }
    }
}

/// Drop the reporter so the logging task sees the channel close, then wait for it.
async fn finish_progress(reporter: ProgressReporter, relay: JoinHandle<()>) {
    drop(reporter);
    relay.await.ok();
}

async fn write_binary(response: &BinaryResponse, out: &Path) -> Result<()> {
    tokio::fs::write(out, &response.body)
        .await
        .with_context(|| format!("Failed to write {}", out.display()))?;
    info!(
        "Wrote {} bytes ({}) to {}",
        response.len(),
        response.content_type().unwrap_or("unknown type"),
        out.display()
    );
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
