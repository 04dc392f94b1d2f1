//! YouTube caption transcripts.
//!
//! Captions are located through the innertube player API: the watch page
//! carries the API key, the player response lists the caption tracks, and
//! each track's timedtext XML holds the snippets.

use super::{SourceType, Transcript, TranscriptSource};
use crate::config::TranscriptSettings;
use crate::error::{Result, TldwError};
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::borrow::Cow;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("Invalid regex"));

static INNERTUBE_API_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([A-Za-z0-9_-]+)""#).expect("Invalid regex")
});

// Self-closing elements match the first branch and carry no text
static TEXT_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<text\b[^>]*?/>|<text\b[^>]*>(.*?)</text>").expect("Invalid regex")
});

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex"));

/// Extract a video ID from a YouTube URL or a bare 11-character ID.
///
/// Accepts `youtu.be/<id>`, and `youtube.com`, `www.youtube.com` or
/// `m.youtube.com` with `/watch?v=<id>`, `/embed/<id>`, `/v/<id>` or
/// `/shorts/<id>`. The scheme may be omitted.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if VIDEO_ID.is_match(input) {
        return Some(input.to_string());
    }

    let with_scheme = if input.contains("://") {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("https://{}", input))
    };
    let url = Url::parse(&with_scheme).ok()?;

    let candidate = match url.host_str()? {
        "youtu.be" => url.path_segments()?.next().map(str::to_string),
        "youtube.com" | "www.youtube.com" | "m.youtube.com" => {
            let mut segments = url.path_segments()?;
            match segments.next()? {
                "watch" => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                "embed" | "v" | "shorts" => segments.next().map(str::to_string),
                _ => None,
            }
        }
        _ => None,
    }?;

    VIDEO_ID.is_match(&candidate).then_some(candidate)
}

/// YouTube caption transcripts.
pub struct YoutubeTranscriptSource {
    http: Client,
    base_url: String,
    languages: Vec<String>,
}

impl YoutubeTranscriptSource {
    pub fn new(settings: &TranscriptSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TldwError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: settings.youtube_base_url.trim_end_matches('/').to_string(),
            languages: settings.languages.clone(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT_LANGUAGE, "en-US")
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TldwError::TranscriptFetch(format!(
                "YouTube returned HTTP {} for {}",
                status.as_u16(),
                redact_query(url)
            )));
        }

        response.text().await.map_err(request_failed)
    }

    async fn fetch_player(&self, video_id: &str, api_key: &str) -> Result<PlayerResponse> {
        let url = format!("{}/youtubei/v1/player?key={}", self.base_url, api_key);
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let response = self
            .http
            .post(&url)
            .header(ACCEPT_LANGUAGE, "en-US")
            .json(&body)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TldwError::TranscriptFetch(format!(
                "YouTube player API returned HTTP {}",
                status.as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TldwError::TranscriptFetch(format!("malformed player response: {}", e)))
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    fn source_type(&self) -> SourceType {
        SourceType::YouTube
    }

    fn can_handle(&self, input: &str) -> bool {
        extract_video_id(input).is_some()
    }

    fn extract_id(&self, input: &str) -> Option<String> {
        extract_video_id(input)
    }

    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<Transcript> {
        let watch_page = self
            .get_text(&format!("{}/watch?v={}", self.base_url, video_id))
            .await?;
        let api_key = extract_api_key(&watch_page)?;

        let player = self.fetch_player(video_id, &api_key).await?;
        let tracks = caption_tracks(video_id, player)?;

        let track = select_track(&tracks, &self.languages).ok_or_else(|| {
            let available: Vec<&str> = tracks.iter().map(|t| t.language_code.as_str()).collect();
            TldwError::TranscriptUnavailable(format!(
                "no transcript found for video {} in [{}] (available: [{}])",
                video_id,
                self.languages.join(", "),
                available.join(", ")
            ))
        })?;
        debug!(
            "Using {} captions ({})",
            track.language_code,
            if track.is_generated() { "auto-generated" } else { "manual" }
        );

        let xml = self.get_text(&track.base_url.replace("&fmt=srv3", "")).await?;
        let text = parse_timedtext(&xml).join(" ");
        if text.is_empty() {
            return Err(TldwError::TranscriptUnavailable(format!(
                "transcript for video {} is empty",
                video_id
            )));
        }

        Ok(Transcript::new(video_id, text))
    }
}

fn request_failed(error: reqwest::Error) -> TldwError {
    TldwError::TranscriptFetch(format!("request to YouTube failed: {}", error))
}

fn redact_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

fn extract_api_key(watch_page: &str) -> Result<String> {
    if watch_page.contains("class=\"g-recaptcha\"") {
        return Err(TldwError::TranscriptFetch(
            "YouTube is blocking requests from this IP (captcha required)".to_string(),
        ));
    }

    INNERTUBE_API_KEY
        .captures(watch_page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            TldwError::TranscriptFetch("could not find the innertube API key on the watch page".to_string())
        })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TrackList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackList {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

fn caption_tracks(video_id: &str, player: PlayerResponse) -> Result<Vec<CaptionTrack>> {
    if let Some(playability) = &player.playability_status {
        if playability.status != "OK" {
            return Err(TldwError::TranscriptFetch(format!(
                "video {} is unplayable ({}): {}",
                video_id,
                playability.status,
                playability.reason.as_deref().unwrap_or("no reason given")
            )));
        }
    }

    let tracks = player
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .map(|r| r.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(TldwError::TranscriptUnavailable(format!(
            "transcripts are disabled for video {}",
            video_id
        )));
    }
    Ok(tracks)
}

/// Pick the track for the first language that has one, manual before auto-generated.
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|language| {
        tracks
            .iter()
            .filter(|t| &t.language_code == language)
            .min_by_key(|t| t.is_generated())
    })
}

/// Text of every non-empty `<text>` element, in document order.
fn parse_timedtext(xml: &str) -> Vec<String> {
    TEXT_ELEMENT
        .captures_iter(xml)
        .filter_map(|caps| {
            let raw = caps.get(1)?.as_str();
            // Snippet text is HTML-escaped inside the XML escaping
            let once = html_escape::decode_html_entities(raw);
            let unescaped = html_escape::decode_html_entities(&once);
            let text = HTML_TAG.replace_all(&unescaped, "").into_owned();
            (!text.trim().is_empty()).then_some(text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, Method::POST, MockServer};

    const VIDEO: &str = "dQw4w9WgXcQ";

    #[test]
    fn test_extract_video_id() {
        let expected = Some(VIDEO.to_string());

        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), expected);
        assert_eq!(extract_video_id("https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ"), expected);
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ"), expected);
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=42"), expected);
        assert_eq!(extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"), expected);
        assert_eq!(extract_video_id("https://www.youtube.com/v/dQw4w9WgXcQ"), expected);
        assert_eq!(extract_video_id("https://m.youtube.com/watch?v=dQw4w9WgXcQ"), expected);
        assert_eq!(extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"), expected);
        assert_eq!(extract_video_id("youtube.com/watch?v=dQw4w9WgXcQ"), expected);
        assert_eq!(extract_video_id("  dQw4w9WgXcQ \n"), expected);

        assert_eq!(extract_video_id("https://www.youtube.com/playlist?list=PLtest"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(extract_video_id("https://example.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id("not-a-video-id"), None);
        assert_eq!(extract_video_id(""), None);
    }

    fn track(language: &str, kind: Option<&str>) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://example.com/{}/{}", language, kind.unwrap_or("manual")),
            language_code: language.to_string(),
            kind: kind.map(str::to_string),
        }
    }

    #[test]
    fn test_select_track_prefers_manual() {
        let tracks = vec![track("en", Some("asr")), track("en", None), track("de", None)];
        let languages = vec!["en".to_string()];

        let selected = select_track(&tracks, &languages).unwrap();
        assert!(!selected.is_generated());
        assert_eq!(selected.language_code, "en");
    }

    #[test]
    fn test_select_track_language_order_wins() {
        let tracks = vec![track("de", None), track("en", Some("asr"))];
        let languages = vec!["en".to_string(), "de".to_string()];

        // An auto-generated track in the first language beats a manual one in the second
        let selected = select_track(&tracks, &languages).unwrap();
        assert_eq!(selected.language_code, "en");
        assert!(selected.is_generated());

        assert!(select_track(&tracks, &["fr".to_string()]).is_none());
    }

    #[test]
    fn test_parse_timedtext() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
<text start="0.0" dur="1.5">Hey there, it&amp;#39;s me</text>
<text start="1.5" dur="2.0">rock &amp;amp; roll
forever</text>
<text start="3.5" dur="1.0"/>
<text start="4.5" dur="1.0">&lt;font color=&quot;#E5E5E5&quot;&gt;tagged&lt;/font&gt; text</text>
<text start="5.5" dur="1.0">   </text>
</transcript>"#;

        let snippets = parse_timedtext(xml);
        assert_eq!(
            snippets,
            vec![
                "Hey there, it's me".to_string(),
                "rock & roll\nforever".to_string(),
                "tagged text".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_timedtext_named_entities() {
        let xml = r#"<transcript><text start="0" dur="1">caf&amp;eacute; &amp;hellip; &amp;#39;ok&amp;#x27;</text><text start="1" dur="1">AT&amp;amp;T &amp;mdash; more</text></transcript>"#;

        assert_eq!(
            parse_timedtext(xml),
            vec!["café … 'ok'".to_string(), "AT&T — more".to_string()]
        );
    }

    #[test]
    fn test_extract_api_key() {
        let page = r#"<script>ytcfg.set({"INNERTUBE_API_KEY": "AIzaTestKey_123","OTHER":1})</script>"#;
        assert_eq!(extract_api_key(page).unwrap(), "AIzaTestKey_123");

        let err = extract_api_key("<html></html>").unwrap_err();
        assert!(matches!(err, TldwError::TranscriptFetch(_)));

        let err = extract_api_key(r#"<div class="g-recaptcha"></div>"#).unwrap_err();
        assert!(err.to_string().contains("captcha"));
    }

    fn source_for(server: &MockServer) -> YoutubeTranscriptSource {
        YoutubeTranscriptSource::new(&TranscriptSettings {
            languages: vec!["en".to_string()],
            youtube_base_url: server.base_url(),
        })
        .unwrap()
    }

    #[test]
    fn test_new_builds_client() {
        let source = YoutubeTranscriptSource::new(&TranscriptSettings {
            languages: vec!["de".to_string()],
            youtube_base_url: "http://localhost:9999/".to_string(),
        })
        .unwrap();

        assert_eq!(source.base_url, "http://localhost:9999");
        assert_eq!(source.languages, vec!["de".to_string()]);
    }

    async fn mock_watch_page(server: &MockServer) {
        server
            .mock_async(|when, then| {
                when.method(GET).path("/watch").query_param("v", VIDEO);
                then.status(200)
                    .body(r#"<html><script>var cfg = {"INNERTUBE_API_KEY":"test-key"};</script></html>"#);
            })
            .await;
    }

    #[tokio::test]
    async fn test_fetch_transcript() {
        let server = MockServer::start_async().await;
        mock_watch_page(&server).await;

        let caption_url = server.url(format!("/api/timedtext?v={}&lang=en&fmt=srv3", VIDEO));
        let player = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/youtubei/v1/player")
                    .query_param("key", "test-key")
                    .body_contains("ANDROID")
                    .body_contains(VIDEO);
                then.status(200).json_body(json!({
                    "playabilityStatus": { "status": "OK" },
                    "captions": {
                        "playerCaptionsTracklistRenderer": {
                            "captionTracks": [
                                { "baseUrl": "https://unused.example/asr", "languageCode": "en", "kind": "asr" },
                                { "baseUrl": caption_url, "languageCode": "en" }
                            ]
                        }
                    }
                }));
            })
            .await;

        let captions = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/timedtext").query_param("lang", "en");
                then.status(200).body(
                    r#"<transcript><text start="0" dur="1">Never gonna</text><text start="1" dur="1">give you up</text></transcript>"#,
                );
            })
            .await;

        let transcript = source_for(&server).fetch(VIDEO).await.unwrap();

        player.assert_async().await;
        captions.assert_async().await;
        assert_eq!(transcript.video_id, VIDEO);
        assert_eq!(transcript.text, "Never gonna give you up");
    }

    #[tokio::test]
    async fn test_fetch_captions_disabled() {
        let server = MockServer::start_async().await;
        mock_watch_page(&server).await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/youtubei/v1/player");
                then.status(200)
                    .json_body(json!({ "playabilityStatus": { "status": "OK" } }));
            })
            .await;

        let err = source_for(&server).fetch(VIDEO).await.unwrap_err();
        assert!(matches!(err, TldwError::TranscriptUnavailable(_)));
        assert!(err.to_string().contains("transcripts are disabled"));
    }

    #[tokio::test]
    async fn test_fetch_no_matching_language() {
        let server = MockServer::start_async().await;
        mock_watch_page(&server).await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/youtubei/v1/player");
                then.status(200).json_body(json!({
                    "captions": {
                        "playerCaptionsTracklistRenderer": {
                            "captionTracks": [{ "baseUrl": "https://unused.example/de", "languageCode": "de" }]
                        }
                    }
                }));
            })
            .await;

        let err = source_for(&server).fetch(VIDEO).await.unwrap_err();
        assert!(matches!(err, TldwError::TranscriptUnavailable(_)));
        assert!(err.to_string().contains("no transcript found"));
        assert!(err.to_string().contains("de"));
    }

    #[tokio::test]
    async fn test_fetch_unplayable_video() {
        let server = MockServer::start_async().await;
        mock_watch_page(&server).await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/youtubei/v1/player");
                then.status(200).json_body(json!({
                    "playabilityStatus": { "status": "ERROR", "reason": "This video is unavailable" }
                }));
            })
            .await;

        let err = source_for(&server).fetch(VIDEO).await.unwrap_err();
        assert!(matches!(err, TldwError::TranscriptFetch(_)));
        assert!(err.to_string().contains("This video is unavailable"));
    }

    #[tokio::test]
    async fn test_fetch_watch_page_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/watch");
                then.status(429);
            })
            .await;

        let err = source_for(&server).fetch(VIDEO).await.unwrap_err();
        assert!(matches!(err, TldwError::TranscriptFetch(_)));
        assert!(err.to_string().contains("429"));
    }
}
