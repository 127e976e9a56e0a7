//! `dump-m3u` command: download an M3U playlist and write it out as a
//! `index;nome;grupo;url` channel file the catalog server can read.

use anyhow::{anyhow, bail, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::sleep;
use tokio_stream::StreamExt;
use tokio_util::io::StreamReader;
use tracing::{info, warn};

const MAX_LINE_BYTES: usize = 32 * 1024;
const READ_LINE_TIMEOUT: Duration = Duration::from_secs(10);
const PREVIEW_ENTRIES: usize = 20;
const DUMP_HEADER: &str = "index;nome;grupo;url";

lazy_static! {
    // tvg-id="...", group-title="...", ...
    static ref ATTR_REGEX: Regex = Regex::new(r#"(\w+(?:-\w+)*)="([^"]*)""#).unwrap();
}

/// One playlist entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub name: String,
    pub group: String,
    pub url: String,
}

#[derive(Debug, Default)]
struct ExtinfData {
    attributes: HashMap<String, String>,
    title: String,
}

impl ExtinfData {
    /// Display title, falling back to tvg-name then tvg-id
    fn name(&self) -> String {
        [
            Some(&self.title),
            self.attributes.get("tvg-name"),
            self.attributes.get("tvg-id"),
        ]
        .into_iter()
        .flatten()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
    }
}

/// Parse `#EXTINF:-1 tvg-id="..." group-title="...",Title`
fn parse_extinf(line: &str) -> Option<ExtinfData> {
    let content = line.strip_prefix("#EXTINF:")?;

    // First comma outside quoted attribute values ends the header
    let mut in_quotes = false;
    let comma = content.char_indices().find_map(|(i, c)| match c {
        '"' => {
            in_quotes = !in_quotes;
            None
        }
        ',' if !in_quotes => Some(i),
        _ => None,
    });
    let (header, title) = match comma {
        Some(comma) => (&content[..comma], content[comma + 1..].trim()),
        None => (content, ""),
    };

    let attributes = ATTR_REGEX
        .captures_iter(header)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();

    Some(ExtinfData {
        attributes,
        title: title.to_string(),
    })
}

/// Line-by-line playlist state machine
#[derive(Debug, Default)]
pub struct PlaylistParser {
    current: Option<ExtinfData>,
    entries: Vec<PlaylistEntry>,
}

impl PlaylistParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        if trimmed.starts_with("#EXTINF:") {
            self.current = parse_extinf(trimmed);
            return;
        }

        // #EXTM3U, #EXTGRP, #EXTVLCOPT, ...
        if trimmed.starts_with('#') {
            return;
        }

        // Any other line closes the pending EXTINF as its URL
        if let Some(extinf) = self.current.take() {
            self.entries.push(PlaylistEntry {
                name: extinf.name(),
                group: extinf
                    .attributes
                    .get("group-title")
                    .map(|g| g.trim().to_string())
                    .unwrap_or_default(),
                url: trimmed.to_string(),
            });
        }
    }

    pub fn finish(self) -> Vec<PlaylistEntry> {
        self.entries
    }
}

pub fn parse_playlist(text: &str) -> Vec<PlaylistEntry> {
    let mut parser = PlaylistParser::new();
    for line in text.lines() {
        parser.push_line(line);
    }
    parser.finish()
}

fn sanitize(value: &str) -> String {
    value.replace(';', ",")
}

/// Render entries as the semicolon channel file, 0-based index
pub fn render_rows(entries: &[PlaylistEntry]) -> String {
    let mut out = String::from(DUMP_HEADER);
    out.push('\n');
    for (index, entry) in entries.iter().enumerate() {
        out.push_str(&format!(
            "{};{};{};{}\n",
            index,
            sanitize(&entry.name),
            sanitize(&entry.group),
            sanitize(&entry.url)
        ));
    }
    out
}

pub struct PlaylistDumper {
    client: Client,
    max_retries: u32,
}

impl PlaylistDumper {
    pub fn new(user_agent: &str, timeout_ms: u64, max_retries: u32) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_millis(timeout_ms))
            .gzip(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            max_retries,
        })
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<Response> {
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            let backoff = Duration::from_millis((1u64 << attempt.min(10)).saturating_mul(500).min(10_000));

            match self.client.get(url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS && attempt < self.max_retries {
                        warn!("fetch_retry" = attempt + 1, "reason" = "429", "backoff_ms" = backoff.as_millis() as u64);
                        sleep(backoff).await;
                        continue;
                    }
                    bail!(
                        "HTTP {}: {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("Error")
                    );
                }
                Err(err) => {
                    last_err = Some(err);
                    if attempt < self.max_retries {
                        warn!("fetch_retry" = attempt + 1, "reason" = "network", "backoff_ms" = backoff.as_millis() as u64);
                        sleep(backoff).await;
                    }
                }
            }
        }

        match last_err {
            Some(e) => Err(e.into()),
            None => Err(anyhow!("Unknown fetch error")),
        }
    }

    /// Download and parse the playlist, streaming the body line by line
    pub async fn fetch_entries(&self, url: &str) -> Result<Vec<PlaylistEntry>> {
        let parsed = url::Url::parse(url).with_context(|| format!("Invalid playlist URL: {}", url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("Unsupported playlist URL scheme: {}", parsed.scheme());
        }

        info!("Downloading playlist {}", url);
        let response = self.fetch_with_retry(url).await?;

        let stream_reader = StreamReader::new(
            response
                .bytes_stream()
                .map(|result| result.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))),
        );
        let mut reader = BufReader::new(stream_reader);
        let mut line = String::new();
        let mut parser = PlaylistParser::new();

        loop {
            line.clear();
            let bytes_read = tokio::time::timeout(READ_LINE_TIMEOUT, reader.read_line(&mut line))
                .await
                .map_err(|_| anyhow!("Timed out while reading playlist line"))??;

            if bytes_read == 0 {
                break;
            }
            if line.len() > MAX_LINE_BYTES {
                bail!("Playlist line exceeds max length of {} bytes", MAX_LINE_BYTES);
            }

            parser.push_line(&line);
        }

        Ok(parser.finish())
    }

    /// Fetch `url` and write the channel file to `output`; returns the entry count
    pub async fn dump(&self, url: &str, output: &Path) -> Result<usize> {
        let entries = self.fetch_entries(url).await?;

        tokio::fs::write(output, render_rows(&entries))
            .await
            .with_context(|| format!("Failed to write {}", output.display()))?;

        info!("Playlist dumped: {} entries written to {}", entries.len(), output.display());
        for (index, entry) in entries.iter().take(PREVIEW_ENTRIES).enumerate() {
            info!("{}: {} [{}] {}", index, entry.name, entry.group, entry.url);
        }

        Ok(entries.len())
    }
}
