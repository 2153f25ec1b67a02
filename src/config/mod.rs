use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE: &str = "yt2mp3.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";

// Tool locations and the default output directory; the conversion parameters
// themselves (format, quality) are fixed
#[derive(Debug, Clone)]
pub struct Config {
    pub ytdlp_bin: PathBuf,
    pub ffmpeg_bin: Option<PathBuf>,
    pub output_dir: PathBuf,
}

// On-disk form, every key optional
#[derive(Debug, Deserialize)]
struct ConfigFile {
    ytdlp_bin: Option<String>,
    ffmpeg_bin: Option<String>,
    output_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ytdlp_bin: PathBuf::from("yt-dlp"),
            ffmpeg_bin: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Config {
    // yt2mp3.toml in the working directory, defaults when absent
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        let file: ConfigFile =
            toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            ytdlp_bin: file
                .ytdlp_bin
                .map(PathBuf::from)
                .unwrap_or(defaults.ytdlp_bin),
            ffmpeg_bin: file.ffmpeg_bin.and_then(|s| {
                let s = s.trim().to_string();
                if s.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(s))
                }
            }),
            output_dir: file
                .output_dir
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ytdlp_bin, PathBuf::from("yt-dlp"));
        assert!(config.ffmpeg_bin.is_none());
        assert_eq!(config.output_dir, PathBuf::from("downloads"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file: ConfigFile = toml::from_str(r#"output_dir = "music""#).unwrap();
        let config = Config::from_file(file);
        assert_eq!(config.output_dir, PathBuf::from("music"));
        assert_eq!(config.ytdlp_bin, PathBuf::from("yt-dlp"));
    }

    #[test]
    fn test_blank_ffmpeg_entry_is_ignored() {
        let file: ConfigFile = toml::from_str(r#"ffmpeg_bin = "  ""#).unwrap();
        let config = Config::from_file(file);
        assert!(config.ffmpeg_bin.is_none());
    }
}
