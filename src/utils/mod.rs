use regex::Regex;
use std::sync::LazyLock;

// Accepted watch/embed/share URL shapes, anchored at the start of the input
static YOUTUBE_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(https?://)?(www\.)?(youtube|youtu|youtube-nocookie)\.(com|be)/(watch\?v=|embed/|v/|.+\?v=)?([^&=%?]{11})",
    )
    .unwrap()
});

pub fn validate_youtube_url(url: &str) -> bool {
    YOUTUBE_URL_PATTERN.is_match(url)
}

pub fn sanitize_filename(name: &str) -> String {
    // Remove characters that are invalid in filenames, then trim whitespace
    name.chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn format_duration(seconds: u64) -> String {
    // Minutes keep accumulating past the hour mark (61:05)
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_youtube_url() {
        assert!(validate_youtube_url(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        ));
        assert!(validate_youtube_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(validate_youtube_url("youtube.com/watch?v=dQw4w9WgXcQ"));

        assert!(!validate_youtube_url("https://vimeo.com/123456789"));
        assert!(!validate_youtube_url("https://www.youtube.com/"));
        assert!(!validate_youtube_url("not a url"));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Song: Best? Mix*"), "Song Best Mix");
        assert_eq!(sanitize_filename("hello/world"), "helloworld");
        assert_eq!(sanitize_filename("  padded  "), "padded");
        assert_eq!(sanitize_filename("normal_file.mp3"), "normal_file.mp3");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(214), "3:34");
        assert_eq!(format_duration(3600), "60:00");
    }
}
