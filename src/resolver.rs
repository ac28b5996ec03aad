use log::{debug, info};

use crate::error::{ChatError, Result};
use crate::{ContentType, VideoId};

/// Host marker for YouTube links. Matches both `youtube.com` and the
/// `youtu.be` short links handed out by the share button.
const YOUTUBE_MARKER: &str = "youtu";

const WATCH_PARAM: &str = "watch?v=";

/// Resolve a user-supplied URL into a video id and the kind of content it points at.
///
/// Query parameters following the id inside the last path segment (for
/// example `watch?v=ID&t=30s`) are kept as part of the id.
pub fn resolve(url: &str) -> Result<(VideoId, ContentType)> {
    if url.contains(YOUTUBE_MARKER) {
        let id = youtube_video_id(url);
        if id.is_empty() {
            return Err(ChatError::UnsupportedSource(url.to_string()));
        }
        info!("Resolved video id {id} from {url}");
        return Ok((VideoId::new(id), ContentType::YouTube));
    }

    debug!("No known host marker in {url}");
    Err(ChatError::UnsupportedSource(url.to_string()))
}

fn youtube_video_id(url: &str) -> String {
    let parts: Vec<&str> = url.split('/').collect();
    let mut segment = parts.last().copied().unwrap_or_default().trim();
    if segment.is_empty() && parts.len() >= 2 {
        segment = parts[parts.len() - 2].trim();
    }

    if let Some(pos) = segment.find(WATCH_PARAM) {
        segment = &segment[pos + WATCH_PARAM.len()..];
    }

    segment.trim().to_string()
}
