use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tiktok_media_storage::models::PutOptions;
use tiktok_media_storage::storage::FilesystemAdapter;
use tiktok_media_storage::{Config, TikTokAdapter};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "tiktok-media")]
#[command(about = "Upload images and videos to the TikTok Ads media library")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload a single image or video.
    Put {
        file: PathBuf,
        /// Send the file name as an explicit form field.
        #[arg(long)]
        include_file_name: bool,
        #[arg(long)]
        third_party: bool,
        #[arg(long)]
        flaw_detect: bool,
        #[arg(long)]
        auto_fix: bool,
        #[arg(long)]
        auto_bind: bool,
    },
    /// Upload several images concurrently.
    PutMany {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Look up a previously uploaded video.
    VideoInfo { video_id: String },
    /// Print the MIME type detected for a path.
    MimeType { path: String },
}

async fn run(command: Command) -> Result<()> {
    let adapter = TikTokAdapter::new(Config::from_env()?).await?;

    let output = match command {
        Command::Put {
            file,
            include_file_name,
            third_party,
            flaw_detect,
            auto_fix,
            auto_bind,
        } => {
            let contents = tokio::fs::read(&file).await?;
            let options = PutOptions {
                include_file_name,
                is_third_party: third_party,
                flaw_detect,
                auto_fix_enabled: auto_fix,
                auto_bind_enabled: auto_bind,
                concurrency: None,
            };
            let result = adapter
                .put(&file.to_string_lossy(), &contents, &options)
                .await?;
            serde_json::to_value(result)?
        }
        Command::PutMany { files, concurrency } => {
            let mut batch = Vec::with_capacity(files.len());
            for file in files {
                let contents = tokio::fs::read(&file).await?;
                batch.push((file.to_string_lossy().into_owned(), contents));
            }
            let options = PutOptions {
                concurrency,
                ..Default::default()
            };
            let results: serde_json::Map<String, serde_json::Value> = adapter
                .put_many(batch, &options)
                .await
                .into_iter()
                .map(|(name, outcome)| -> Result<(String, serde_json::Value)> {
                    Ok((name, serde_json::to_value(outcome)?))
                })
                .collect::<Result<_>>()?;
            serde_json::Value::Object(results)
        }
        Command::VideoInfo { video_id } => {
            serde_json::to_value(adapter.get_video_info(&video_id).await?)?
        }
        Command::MimeType { path } => serde_json::to_value(adapter.mime_type(&path).await?)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiktok_media_storage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    match run(args.command).await {
        Ok(()) => {
            info!("Done");
            Ok(())
        }
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
