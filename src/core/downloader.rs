use crate::config::Config;
use crate::core::error::ConvertError;
use crate::core::metadata::TrackInfo;
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, SystemTime};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

// Fixed conversion parameters, not user-configurable
const FORMAT_SELECTOR: &str = "bestaudio/best";
const AUDIO_FORMAT: &str = "mp3";
const AUDIO_QUALITY: &str = "192K";

const STDERR_TAIL_LINES: usize = 50;

// File timestamps can lag the system clock slightly; tolerate a little skew
// when deciding whether an MP3 was written by the current run
const MODIFIED_SLACK: Duration = Duration::from_secs(2);

// All network access and transcoding happens inside the spawned yt-dlp
// process; this type builds its commands and interprets its output
pub struct AudioDownloader {
    ytdlp_bin: PathBuf,
    ffmpeg_bin: Option<PathBuf>,
}

impl AudioDownloader {
    pub fn new(config: &Config) -> Self {
        Self {
            ytdlp_bin: config.ytdlp_bin.clone(),
            ffmpeg_bin: config.ffmpeg_bin.clone(),
        }
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.ytdlp_bin);
        cmd.arg("--no-playlist");
        if let Some(ffmpeg) = &self.ffmpeg_bin {
            cmd.arg("--ffmpeg-location").arg(ffmpeg);
        }
        cmd.stdin(Stdio::null()).kill_on_drop(true);
        cmd
    }

    pub async fn version(&self) -> Result<String, ConvertError> {
        let output = Command::new(&self.ytdlp_bin)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(Self::map_spawn_error)?;

        if !output.status.success() {
            return Err(ConvertError::ToolFailed {
                code: output.status.code(),
                details: format!("{} --version failed", self.ytdlp_bin.display()),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub async fn fetch_metadata(&self, url: &str) -> Result<TrackInfo, ConvertError> {
        let mut cmd = self.base_command();
        cmd.arg("-J")
            .arg(url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("running {:?}", cmd.as_std());
        let output = cmd.output().await.map_err(Self::map_spawn_error)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Self::interpret_failure(output.status.code(), &stderr));
        }

        let info: TrackInfo = serde_json::from_slice(&output.stdout)?;
        debug!(
            id = %info.id,
            uploader = ?info.uploader,
            page = ?info.webpage_url,
            "metadata fetched"
        );
        Ok(info)
    }

    // Download `url` into `output_dir` (created on demand, parents included)
    // and return the path of the MP3 that actually appeared
    pub async fn download(
        &self,
        url: &str,
        output_dir: &Path,
        expected_title: &str,
    ) -> Result<PathBuf, ConvertError> {
        tokio::fs::create_dir_all(output_dir).await?;
        let started = SystemTime::now();

        let template = output_dir.join("%(title)s.%(ext)s");
        let mut cmd = self.base_command();
        cmd.args(["-f", FORMAT_SELECTOR])
            .args(["-x", "--audio-format", AUDIO_FORMAT])
            .args(["--audio-quality", AUDIO_QUALITY])
            .arg("-o")
            .arg(&template)
            .arg(url)
            // The tool's own progress output stays visible on stdout
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped());

        debug!("running {:?}", cmd.as_std());
        let mut child = cmd.spawn().map_err(Self::map_spawn_error)?;

        // Echo stderr through while keeping the last lines; that is where
        // yt-dlp puts the reason when it fails
        let stderr = child.stderr.take();
        let tail_task = tokio::spawn(async move {
            let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let line = line.trim_end().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    eprintln!("{line}");
                    if tail.len() >= STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }
            tail
        });

        let status = child.wait().await?;
        let tail: VecDeque<String> = tail_task.await.unwrap_or_default();

        if !status.success() {
            let stderr_text = tail.into_iter().collect::<Vec<_>>().join("\n");
            return Err(Self::interpret_failure(status.code(), &stderr_text));
        }

        self.locate_output(output_dir, expected_title, started).await
    }

    // yt-dlp mangles reserved title characters differently than we do, so the
    // artifact can land under a name we did not predict; prefer the expected
    // path, else take the newest MP3 written since the run started
    async fn locate_output(
        &self,
        dir: &Path,
        title: &str,
        started: SystemTime,
    ) -> Result<PathBuf, ConvertError> {
        let expected = dir.join(format!("{title}.{AUDIO_FORMAT}"));
        if tokio::fs::try_exists(&expected).await? {
            return Ok(expected);
        }
        warn!(
            "expected {} not found, scanning {}",
            expected.display(),
            dir.display()
        );

        let mut newest: Option<(PathBuf, SystemTime)> = None;
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(AUDIO_FORMAT) {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let modified = meta.modified()?;
            if modified + MODIFIED_SLACK < started {
                continue;
            }
            if newest.as_ref().map_or(true, |(_, t)| modified > *t) {
                newest = Some((path, modified));
            }
        }

        match newest {
            Some((path, _)) => {
                debug!("resolved artifact at {}", path.display());
                Ok(path)
            }
            None => Err(ConvertError::NoOutput {
                dir: dir.to_path_buf(),
            }),
        }
    }

    fn map_spawn_error(err: std::io::Error) -> ConvertError {
        if err.kind() == ErrorKind::NotFound {
            ConvertError::ToolMissing
        } else {
            ConvertError::Io(err)
        }
    }

    // Map the stderr tail of a failed run to a short human message
    fn interpret_failure(code: Option<i32>, stderr: &str) -> ConvertError {
        debug!("yt-dlp stderr tail:\n{stderr}");
        let lower = stderr.to_lowercase();

        let details = if lower.contains("http error 429") {
            "the server is rate limiting requests (HTTP 429), try again later".to_string()
        } else if lower.contains("http error 403") || lower.contains("forbidden") {
            "the server denied access to this video (HTTP 403)".to_string()
        } else if lower.contains("private video") {
            "this video is private".to_string()
        } else if lower.contains("video unavailable") {
            "this video is unavailable or has been removed".to_string()
        } else if lower.contains("ffmpeg")
            && (lower.contains("not found") || lower.contains("not installed"))
        {
            "ffmpeg is required for MP3 conversion but was not found; install it and retry"
                .to_string()
        } else if lower.contains("unable to download")
            || lower.contains("getaddrinfo")
            || lower.contains("timed out")
        {
            "network error while contacting the video server".to_string()
        } else {
            Self::last_error_line(stderr).unwrap_or_else(|| {
                let code = code.map_or_else(|| "unknown".to_string(), |c| c.to_string());
                format!("yt-dlp exited with status code {code}")
            })
        };

        ConvertError::ToolFailed { code, details }
    }

    // Last ERROR: line from the tool, else the last non-empty line
    fn last_error_line(stderr: &str) -> Option<String> {
        stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| l.starts_with("ERROR:"))
            .map(|l| l.trim_start_matches("ERROR:").trim().to_string())
            .or_else(|| {
                stderr
                    .lines()
                    .rev()
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .map(str::to_string)
            })
    }
}
