use crate::utils::sanitize_filename;
use serde::Deserialize;

// Subset of the yt-dlp info dict this program consumes; everything else in
// the -J output is ignored
#[derive(Debug, Clone, Deserialize)]
pub struct TrackInfo {
    pub id: String,
    pub title: Option<String>,
    pub duration: Option<f64>, // fractional for some sources
    pub uploader: Option<String>,
    pub webpage_url: Option<String>,
}

impl TrackInfo {
    pub fn sanitized_title(&self) -> String {
        sanitize_filename(self.title.as_deref().unwrap_or("Unknown"))
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration.unwrap_or(0.0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_title_falls_back_to_unknown() {
        let info = TrackInfo {
            id: "dQw4w9WgXcQ".to_string(),
            title: None,
            duration: None,
            uploader: None,
            webpage_url: None,
        };
        assert_eq!(info.sanitized_title(), "Unknown");
        assert_eq!(info.duration_secs(), 0);
    }

    #[test]
    fn test_sanitized_title_strips_reserved_characters() {
        let info = TrackInfo {
            id: "dQw4w9WgXcQ".to_string(),
            title: Some("Song: Best? Mix*".to_string()),
            duration: Some(213.9),
            uploader: Some("Example".to_string()),
            webpage_url: None,
        };
        assert_eq!(info.sanitized_title(), "Song Best Mix");
        assert_eq!(info.duration_secs(), 213);
    }
}
