use crate::config::Config;
use crate::core::{convert, AudioDownloader, Session};
use crate::utils::validate_youtube_url;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "yt2mp3")]
#[command(about = "Download YouTube audio as MP3 via yt-dlp")]
#[command(version)]
pub struct Cli {
    /// Video URL; omit it to start an interactive session
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        let config = Config::load()?;
        let default_dir = self
            .output
            .clone()
            .unwrap_or_else(|| config.output_dir.clone());

        let downloader = AudioDownloader::new(&config);
        let version = downloader.version().await?;
        debug!("using yt-dlp {version}");

        let work = async {
            match &self.url {
                Some(url) => {
                    anyhow::ensure!(validate_youtube_url(url), "invalid YouTube URL: {url}");
                    convert(&downloader, url, &default_dir).await?;
                    Ok(())
                }
                None => Session::new(downloader, default_dir).run().await,
            }
        };

        // One Ctrl-C handler covers the whole run; kill_on_drop reaps any
        // child still going
        tokio::select! {
            res = work => res,
            _ = tokio::signal::ctrl_c() => {
                println!("\n\nOperation cancelled by user.");
                Ok(())
            }
        }
    }
}
