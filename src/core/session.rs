use crate::core::downloader::AudioDownloader;
use crate::core::error::ConvertError;
use crate::utils::{format_duration, validate_youtube_url};
use anyhow::Result;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

const EXIT_KEYWORDS: [&str; 3] = ["quit", "exit", "q"];

// One answer to the URL prompt
enum UrlInput {
    Quit,
    Empty,
    Candidate(String),
}

fn parse_url_input(line: &str) -> UrlInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        UrlInput::Empty
    } else if EXIT_KEYWORDS.iter().any(|k| trimmed.eq_ignore_ascii_case(k)) {
        UrlInput::Quit
    } else {
        UrlInput::Candidate(trimmed.to_string())
    }
}

// Only yes/y (case-insensitive) count as yes, anything else is no
fn is_affirmative(answer: &str) -> bool {
    let trimmed = answer.trim();
    trimmed.eq_ignore_ascii_case("yes") || trimmed.eq_ignore_ascii_case("y")
}

fn resolve_output_dir(answer: &str, default_dir: &Path) -> PathBuf {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        default_dir.to_path_buf()
    } else {
        PathBuf::from(trimmed)
    }
}

// One fetch-and-convert cycle, shared by the interactive loop and the
// single-URL mode
pub async fn convert(
    downloader: &AudioDownloader,
    url: &str,
    output_dir: &Path,
) -> Result<PathBuf, ConvertError> {
    println!("\nFetching video information...");
    let info = downloader.fetch_metadata(url).await?;
    let title = info.sanitized_title();

    println!("Video Title: {title}");
    println!("Duration: {}", format_duration(info.duration_secs()));
    println!("\nDownloading and converting to MP3...");

    let path = downloader.download(url, output_dir, &title).await?;
    println!("\n✅ Successfully saved as: {}", path.display());
    Ok(path)
}

// Line-oriented conversion session over stdin/stdout
pub struct Session {
    downloader: AudioDownloader,
    default_dir: PathBuf,
    input: Lines<BufReader<Stdin>>,
}

impl Session {
    pub fn new(downloader: AudioDownloader, default_dir: PathBuf) -> Self {
        Self {
            downloader,
            default_dir,
            input: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("{}", "=".repeat(50));
        println!("YouTube to MP3 Converter");
        println!("{}", "=".repeat(50));

        loop {
            println!("\nEnter a YouTube video URL (or 'quit' to exit):");
            let Some(line) = self.read_line().await? else {
                return self.farewell();
            };

            let url = match parse_url_input(&line) {
                UrlInput::Quit => return self.farewell(),
                UrlInput::Empty => {
                    println!("Please enter a valid URL.");
                    continue;
                }
                UrlInput::Candidate(url) => url,
            };

            if !validate_youtube_url(&url) {
                println!("❌ Invalid YouTube URL. Please try again.");
                continue;
            }

            println!(
                "\nEnter output directory (press Enter for '{}'):",
                self.default_dir.display()
            );
            let dir = match self.read_line().await? {
                Some(answer) => resolve_output_dir(&answer, &self.default_dir),
                None => return self.farewell(),
            };

            let succeeded = match convert(&self.downloader, &url, &dir).await {
                Ok(_) => true,
                Err(err) => {
                    if let ConvertError::ToolFailed { code: Some(code), .. } = &err {
                        debug!(code = %code, "yt-dlp run failed");
                    }
                    println!("\n❌ Download error: {err}");
                    false
                }
            };

            if succeeded {
                println!("\nWould you like to download another video? (yes/no)");
            } else {
                println!("\nWould you like to try again? (yes/no)");
            }
            match self.read_line().await? {
                Some(answer) if is_affirmative(&answer) => continue,
                _ => return self.farewell(),
            }
        }
    }

    fn farewell(&self) -> Result<()> {
        println!("\nGoodbye!");
        Ok(())
    }

    // None at end of input
    async fn read_line(&mut self) -> Result<Option<String>> {
        print!("> ");
        io::stdout().flush()?;
        Ok(self.input.next_line().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_input_exit_keywords() {
        for word in ["quit", "exit", "q", "QUIT", "Exit", " q "] {
            assert!(matches!(parse_url_input(word), UrlInput::Quit));
        }
    }

    #[test]
    fn test_parse_url_input_empty_and_candidate() {
        assert!(matches!(parse_url_input(""), UrlInput::Empty));
        assert!(matches!(parse_url_input("   "), UrlInput::Empty));
        match parse_url_input("  https://youtu.be/dQw4w9WgXcQ  ") {
            UrlInput::Candidate(url) => assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ"),
            _ => panic!("expected candidate"),
        }
    }

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("YES"));
        assert!(is_affirmative("y"));
        assert!(is_affirmative(" Y "));

        assert!(!is_affirmative("no"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("sure"));
        assert!(!is_affirmative("yeah"));
    }

    #[test]
    fn test_resolve_output_dir() {
        let default_dir = Path::new("downloads");
        assert_eq!(
            resolve_output_dir("", default_dir),
            PathBuf::from("downloads")
        );
        assert_eq!(
            resolve_output_dir("   ", default_dir),
            PathBuf::from("downloads")
        );
        assert_eq!(
            resolve_output_dir(" music/rips ", default_dir),
            PathBuf::from("music/rips")
        );
    }
}
