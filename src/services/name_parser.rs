use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "Nome S01E08", "Nome [L] S05E14", ...
    static ref EPISODE_SUFFIX: Regex =
        Regex::new(r"(?i)^(.+?)(?:\s*\[.*?\])?\s+S(\d+)E(\d+)$").unwrap();
}

/// Result of splitting a combined episode name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameParts {
    /// Name ended in an `SxxEyy` suffix
    Episode {
        title: String,
        season: u32,
        episode: u32,
    },
    /// No suffix: the whole name is a one-episode show
    Single(String),
}

impl NameParts {
    /// Title of the owning show
    pub fn parent_title(&self) -> &str {
        match self {
            NameParts::Episode { title, .. } => title,
            NameParts::Single(name) => name,
        }
    }

    pub fn season(&self) -> u32 {
        match self {
            NameParts::Episode { season, .. } => *season,
            NameParts::Single(_) => 1,
        }
    }

    pub fn episode(&self) -> u32 {
        match self {
            NameParts::Episode { episode, .. } => *episode,
            NameParts::Single(_) => 1,
        }
    }

    /// Episode label, e.g. `E05 - Breaking Bad` with `width` 2
    pub fn display_title(&self, width: usize) -> String {
        match self {
            NameParts::Episode { title, episode, .. } => {
                format!("E{:0width$} - {}", episode, title, width = width)
            }
            NameParts::Single(name) => name.clone(),
        }
    }
}

/// Split `Title [tag] SxxEyy` into its parts. The tag is optional and dropped.
/// Anything else is returned whole.
pub fn decompose(name: &str) -> NameParts {
    match EPISODE_SUFFIX.captures(name) {
        Some(caps) => NameParts::Episode {
            title: caps
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default(),
            season: parse_number(caps.get(2).map(|m| m.as_str())),
            episode: parse_number(caps.get(3).map(|m| m.as_str())),
        },
        None => NameParts::Single(name.to_string()),
    }
}

/// Season/episode digits; overflow and zero fall back to 1
fn parse_number(digits: Option<&str>) -> u32 {
    digits
        .and_then(|d| d.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}
