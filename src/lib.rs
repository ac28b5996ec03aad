pub mod chat;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod llm;
pub mod memory;
pub mod output;
pub mod prompt;
pub mod resolver;
pub mod youtube;

use serde::Serialize;

pub use chat::{Conversation, Turn};
pub use error::{ChatError, Result};
pub use fetcher::TranscriptFetcher;
pub use prompt::build_prompt;
pub use resolver::resolve;

/// Identifier the caption service knows a video by
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        VideoId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of content a URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContentType {
    YouTube,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::YouTube => write!(f, "youtube"),
        }
    }
}

/// A single captioned segment
#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// One available caption track for a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptionTrack {
    pub language_code: String,
    pub language: String,
    pub is_generated: bool,
    /// Where the segments are fetched from on demand
    pub base_url: String,
}

/// All caption tracks a video offers, in the order the service listed them
#[derive(Debug, Clone, Default)]
pub struct TrackList {
    pub video_id: String,
    pub tracks: Vec<CaptionTrack>,
}

impl TrackList {
    pub fn new(video_id: impl Into<String>, tracks: Vec<CaptionTrack>) -> Self {
        TrackList {
            video_id: video_id.into(),
            tracks,
        }
    }

    /// Exact match on a language code; manually created tracks win over generated ones
    pub fn find(&self, language_code: &str) -> Option<&CaptionTrack> {
        let mut matching = self.tracks.iter().filter(|t| t.language_code == language_code);
        let first = matching.next()?;
        if !first.is_generated {
            return Some(first);
        }
        matching.find(|t| !t.is_generated).or(Some(first))
    }

    /// First track matched by the ordered preference list, if any
    pub fn select<S: AsRef<str>>(&self, languages: &[S]) -> Option<&CaptionTrack> {
        languages.iter().find_map(|lang| self.find(lang.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }
}
