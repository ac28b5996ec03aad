use log::{info, warn};

use crate::VideoId;
use crate::error::Result;
use crate::youtube::CaptionService;

/// Languages tried, in order, when no preference list is configured
pub const DEFAULT_LANGUAGES: [&str; 4] = ["de", "fr", "en", "es"];

/// Fetches the transcript of a video in the first preferred language it offers.
#[derive(Debug, Clone)]
pub struct TranscriptFetcher<S> {
    service: S,
    languages: Vec<String>,
}

impl<S: CaptionService> TranscriptFetcher<S> {
    pub fn new(service: S) -> Self {
        Self::with_languages(service, DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect())
    }

    pub fn with_languages(service: S, languages: Vec<String>) -> Self {
        TranscriptFetcher { service, languages }
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Returns `Ok(None)` when the video has captions, just none in a preferred language.
    pub async fn fetch(&self, video_id: &VideoId) -> Result<Option<String>> {
        let tracks = self.service.list_tracks(video_id).await?;

        for lang in &self.languages {
            let Some(track) = tracks.find(lang) else {
                info!("No {lang} transcript found, trying next language");
                continue;
            };

            let segments = self.service.fetch_segments(track).await?;
            info!("Successfully retrieved {lang} transcript ({} segments)", segments.len());
            return Ok(Some(join_segments(segments.iter().map(|s| s.text.as_str()))));
        }

        warn!(
            "No transcript found for {video_id} in supported languages ({})",
            self.languages.join(", ")
        );
        Ok(None)
    }
}

/// Segment texts in order, separated by single spaces
pub fn join_segments<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    texts.into_iter().collect::<Vec<_>>().join(" ")
}
