//! Playback URL normalization
//!
//! Google Drive share links become direct downloads, and MPEG-TS URLs are
//! swapped for their HLS playlist, which players handle more reliably.
//! Other hosts (Dropbox `?dl=1`, plain CDNs, ...) pass through untouched.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use crate::models::Stream;

const DRIVE_DOWNLOAD_URL: &str = "https://drive.google.com/uc?export=download&id=";
const HLS_SUFFIX: &str = " (HLS)";

lazy_static! {
    // https://drive.google.com/file/d/FILE_ID/view?...
    static ref DRIVE_FILE_LINK: Regex =
        Regex::new(r"https?://drive\.google\.com/file/d/([^/?&#]+)").unwrap();
    // https://drive.google.com/open?id=FILE_ID
    static ref DRIVE_OPEN_LINK: Regex =
        Regex::new(r"https?://drive\.google\.com/open\?id=([^&#]+)").unwrap();

    static ref HLS_EXTENSION: Regex = Regex::new(r"(?i)\.m3u8(\?|$)").unwrap();
    static ref TS_EXTENSION: Regex = Regex::new(r"(?i)\.ts(\?|$)").unwrap();
}

/// Rewrite Drive share links to the direct-download endpoint
pub fn normalize_drive_url(url: &str) -> String {
    let trimmed = url.trim();

    let file_id = DRIVE_FILE_LINK
        .captures(trimmed)
        .or_else(|| DRIVE_OPEN_LINK.captures(trimmed))
        .and_then(|caps| caps.get(1));

    match file_id {
        Some(id) => {
            let direct = format!("{}{}", DRIVE_DOWNLOAD_URL, id.as_str());
            info!("Drive link converted: {}", direct);
            direct
        }
        None => trimmed.to_string(),
    }
}

/// Choose the stream to hand to the player. HLS is preferred: `.ts` URLs are
/// rewritten to `.m3u8` (query string kept) and tagged `(HLS)`.
pub fn pick_best_stream(title: &str, url: &str) -> Option<Stream> {
    if url.trim().is_empty() {
        return None;
    }

    let url = normalize_drive_url(url);

    if HLS_EXTENSION.is_match(&url) {
        return Some(Stream {
            title: format!("{}{}", title, HLS_SUFFIX),
            url,
        });
    }

    if TS_EXTENSION.is_match(&url) {
        let hls_url = TS_EXTENSION.replace(&url, ".m3u8${1}").into_owned();
        debug!("TS stream rewritten to HLS: {} -> {}", url, hls_url);
        return Some(Stream {
            title: format!("{}{}", title, HLS_SUFFIX),
            url: hls_url,
        });
    }

    Some(Stream {
        title: title.to_string(),
        url,
    })
}
