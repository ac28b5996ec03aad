use thiserror::Error;

/// Failures a conversation turn can end in.
///
/// `NoSupportedLanguage` is raised by the conversation layer only; the
/// transcript fetcher reports that case as `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("unsupported source: {0}")]
    UnsupportedSource(String),

    #[error("transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("no transcripts listed for video {0}")]
    NoTranscriptsListed(String),

    #[error("no transcript for video {video_id} in any of: {}", .languages.join(", "))]
    NoSupportedLanguage { video_id: String, languages: Vec<String> },

    #[error("caption service error: {0}")]
    ServiceError(String),

    #[error("model error: {0}")]
    DownstreamModelError(String),
}

impl ChatError {
    /// Text suitable for showing to the person at the keyboard.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::UnsupportedSource(_) => "Please supply a valid video URL.".to_string(),
            ChatError::TranscriptsDisabled(_) => {
                "Transcripts are disabled for this video. Please try another one.".to_string()
            }
            ChatError::NoTranscriptsListed(_) => {
                "This video has no transcripts at all. Sorry I can't help here.".to_string()
            }
            ChatError::NoSupportedLanguage { languages, .. } => format!(
                "The video provided has no {} transcript. Sorry I can't help here.",
                language_names(languages)
            ),
            ChatError::ServiceError(msg) => {
                format!("Could not reach the caption service ({msg}). Please submit the URL again.")
            }
            ChatError::DownstreamModelError(msg) => format!("Error running chain: {msg}"),
        }
    }

    /// Whether resubmitting the same input may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ChatError::ServiceError(_) | ChatError::DownstreamModelError(_))
    }
}

fn language_name(code: &str) -> &str {
    match code {
        "de" => "German",
        "fr" => "French",
        "en" => "English",
        "es" => "Spanish",
        "it" => "Italian",
        "pt" => "Portuguese",
        "nl" => "Dutch",
        "ja" => "Japanese",
        other => other,
    }
}

fn language_names(codes: &[String]) -> String {
    let names: Vec<&str> = codes.iter().map(|c| language_name(c)).collect();
    match names.as_slice() {
        [] => "supported-language".to_string(),
        [one] => one.to_string(),
        [init @ .., last] => format!("{} or {last}", init.join(", ")),
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_supported_language_message() {
        let err = ChatError::NoSupportedLanguage {
            video_id: "abc".to_string(),
            languages: vec!["de".into(), "fr".into(), "en".into(), "es".into()],
        };
        assert_eq!(
            err.user_message(),
            "The video provided has no German, French, English or Spanish transcript. Sorry I can't help here."
        );
    }

    #[test]
    fn test_unknown_language_code_passes_through() {
        assert_eq!(language_names(&["sv".to_string()]), "sv");
    }

    #[test]
    fn test_unsupported_source_message() {
        let err = ChatError::UnsupportedSource("https://example.com/video".to_string());
        assert_eq!(err.user_message(), "Please supply a valid video URL.");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_transient_errors() {
        assert!(ChatError::ServiceError("timeout".into()).is_transient());
        assert!(ChatError::DownstreamModelError("429".into()).is_transient());
        assert!(!ChatError::TranscriptsDisabled("x".into()).is_transient());
    }
}
