//! Catalog identifiers
//!
//! Every public id carries a per-catalog prefix, so ids from different files
//! never collide. Requests are routed by parsing the id once into [`MediaId`].

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{ContentType, EpisodicKind, MovieCollection};

pub const CHANNEL_PREFIX: &str = "catalog_tv_";

lazy_static! {
    static ref NON_ALNUM_RUN: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Grouping key for show names: lowercase ASCII, accents folded,
/// punctuation runs collapsed to `-`
pub fn slugify(value: &str) -> String {
    let folded: String = value
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    NON_ALNUM_RUN
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}

/// Row id: explicit `index` column value when present, else the 1-based row ordinal
pub fn row_id(prefix: &str, index_value: &str, ordinal: usize) -> String {
    if index_value.is_empty() {
        format!("{}{}", prefix, ordinal)
    } else {
        format!("{}{}", prefix, index_value)
    }
}

/// `<show id>_sSSeEE`, with the episode padded to `width` digits
pub fn episode_id(show_id: &str, season: u32, episode: u32, width: usize) -> String {
    format!("{}_s{:02}e{:0width$}", show_id, season, episode, width = width)
}

/// Request id, classified by catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaId {
    Channel(String),
    Movie {
        collection: MovieCollection,
        id: String,
    },
    Show {
        kind: EpisodicKind,
        id: String,
    },
    Episode {
        kind: EpisodicKind,
        id: String,
    },
}

impl MediaId {
    /// Classify a raw id by prefix. Show slugs never contain `_`, so an
    /// underscore after the show prefix marks an episode id.
    pub fn parse(raw: &str) -> Option<Self> {
        let has_key = |prefix: &str| raw.strip_prefix(prefix).filter(|rest| !rest.is_empty());

        if has_key(CHANNEL_PREFIX).is_some() {
            return Some(MediaId::Channel(raw.to_string()));
        }

        for collection in [MovieCollection::Catalog, MovieCollection::Personal] {
            if has_key(collection.id_prefix()).is_some() {
                return Some(MediaId::Movie {
                    collection,
                    id: raw.to_string(),
                });
            }
        }

        for kind in [EpisodicKind::Series, EpisodicKind::SoapOpera] {
            if let Some(rest) = has_key(kind.id_prefix()) {
                let id = raw.to_string();
                return Some(if rest.contains('_') {
                    MediaId::Episode { kind, id }
                } else {
                    MediaId::Show { kind, id }
                });
            }
        }

        None
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            MediaId::Channel(_) => ContentType::Tv,
            MediaId::Movie { .. } => ContentType::Movie,
            MediaId::Show { .. } | MediaId::Episode { .. } => ContentType::Series,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MediaId::Channel(id) => id,
            MediaId::Movie { id, .. } | MediaId::Show { id, .. } | MediaId::Episode { id, .. } => {
                id
            }
        }
    }
}
