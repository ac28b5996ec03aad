use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::error::{ChatError, Result};
use crate::{CaptionTrack, Segment, TrackList, VideoId};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Source of caption tracks and their segments.
#[allow(async_fn_in_trait)]
pub trait CaptionService {
    /// List every caption track available for a video.
    async fn list_tracks(&self, video_id: &VideoId) -> Result<TrackList>;

    /// Fetch the timed segments of one track, in time order.
    async fn fetch_segments(&self, track: &CaptionTrack) -> Result<Vec<Segment>>;
}

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<InnerTubeTrack>>,
}

#[derive(Debug, Deserialize)]
struct InnerTubeTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    name: Option<TrackName>,
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrackName {
    #[serde(rename = "simpleText")]
    simple_text: Option<String>,
    runs: Option<Vec<TextRun>>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl InnerTubeTrack {
    fn into_caption_track(self) -> CaptionTrack {
        let language = self
            .name
            .and_then(|n| n.simple_text.or_else(|| n.runs.and_then(|r| r.into_iter().next()).map(|r| r.text)))
            .unwrap_or_else(|| self.language_code.clone());

        CaptionTrack {
            is_generated: self.kind.as_deref() == Some("asr"),
            base_url: self.base_url.replace("&fmt=srv3", ""),
            language_code: self.language_code,
            language,
        }
    }
}

/// Caption service backed by YouTube's InnerTube player API
#[derive(Debug, Clone)]
pub struct YouTubeCaptions {
    client: reqwest::Client,
}

impl YouTubeCaptions {
    pub fn new(client: reqwest::Client) -> Self {
        YouTubeCaptions { client }
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        self.client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(service_error)?
            .text()
            .await
            .map_err(service_error)
    }
}

impl CaptionService for YouTubeCaptions {
    async fn list_tracks(&self, video_id: &VideoId) -> Result<TrackList> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");
        let page_html = self.get_text(&watch_url).await?;

        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        // Step 2: Call InnerTube player endpoint
        let player_url = format!("https://www.youtube.com/youtubei/v1/player?key={api_key}&prettyPrint=false");

        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": "en",
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": "2.20241126.01.00"
                }
            },
            "videoId": video_id.as_str()
        });

        let resp: InnerTubePlayerResponse = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(service_error)?
            .json()
            .await
            .map_err(service_error)?;

        track_list(video_id, resp)
    }

    async fn fetch_segments(&self, track: &CaptionTrack) -> Result<Vec<Segment>> {
        debug!("Fetching caption track: lang={}", track.language_code);
        let caption_xml = self.get_text(&track.base_url).await?;
        parse_caption_xml(&caption_xml)
    }
}

fn service_error(e: reqwest::Error) -> ChatError {
    ChatError::ServiceError(e.to_string())
}

fn track_list(video_id: &VideoId, resp: InnerTubePlayerResponse) -> Result<TrackList> {
    if let Some(ps) = resp.playability_status {
        let status = ps.status.unwrap_or_default();
        if !status.is_empty() && status != "OK" {
            let reason = ps.reason.unwrap_or_default();
            return Err(ChatError::ServiceError(format!(
                "video {video_id} is not playable ({status}): {reason}"
            )));
        }
    }

    let renderer = resp
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .ok_or_else(|| ChatError::TranscriptsDisabled(video_id.to_string()))?;

    let tracks: Vec<CaptionTrack> = renderer
        .caption_tracks
        .unwrap_or_default()
        .into_iter()
        .map(InnerTubeTrack::into_caption_track)
        .collect();

    if tracks.is_empty() {
        return Err(ChatError::NoTranscriptsListed(video_id.to_string()));
    }

    debug!("Found {} caption track(s) for {video_id}", tracks.len());
    Ok(TrackList::new(video_id.as_str(), tracks))
}

fn extract_api_key(html: &str) -> Result<String> {
    let patterns = [r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#, r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#];

    for pattern in patterns {
        let re = Regex::new(pattern).map_err(|e| ChatError::ServiceError(e.to_string()))?;
        if let Some(caps) = re.captures(html) {
            return Ok(caps[1].to_string());
        }
    }

    Err(ChatError::ServiceError(
        "could not extract InnerTube API key from watch page".to_string(),
    ))
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
                current_start = start;
                // Final segments sometimes omit `dur`
                current_dur = dur.or(Some(0.0));
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                current_start = None;
                current_dur = None;
            }
            Ok(Event::Empty(_)) => {
                // Self-closing <text .../> with no content — skip
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(start), Some(dur)) = (current_start.take(), current_dur.take()) {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).to_string();
                    if !text.is_empty() {
                        segments.push(Segment {
                            text,
                            start,
                            duration: dur,
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ChatError::ServiceError(format!("error parsing caption XML: {e}"))),
            _ => {}
        }
    }

    Ok(segments)
}
