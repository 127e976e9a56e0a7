use serde::Serialize;
use std::collections::HashMap;

/// Live TV channel (one per row of the channels file)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub group: String,
    pub url: String,
    pub logo: String,
}

/// Movie entry, shared by the main movie catalog and the requested movies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
    /// Raw year column, kept as written in the source file
    pub year: String,
    pub genre: String,
    pub logo: String,
    pub backdrop: String,
    pub synopsis: String,
    pub url: String,
}

impl Movie {
    /// Numeric release year, if the year column starts with digits
    pub fn release_year(&self) -> Option<u16> {
        let digits: String = self
            .year
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok().filter(|year| *year > 0)
    }
}

/// Which movie collection a movie row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovieCollection {
    Catalog,
    Personal,
}

impl MovieCollection {
    pub fn id_prefix(self) -> &'static str {
        match self {
            MovieCollection::Catalog => "catalog_movie_",
            MovieCollection::Personal => "catalog_pmovie_",
        }
    }
}

/// Episodic catalog flavour. Series and novelas share one loader and differ
/// only in id prefix, episode padding and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EpisodicKind {
    Series,
    SoapOpera,
}

impl EpisodicKind {
    pub fn id_prefix(self) -> &'static str {
        match self {
            EpisodicKind::Series => "catalog_series_",
            EpisodicKind::SoapOpera => "catalog_novela_",
        }
    }

    /// Zero-pad width of the episode number in ids and display titles
    pub fn episode_width(self) -> usize {
        match self {
            EpisodicKind::Series => 2,
            EpisodicKind::SoapOpera => 3,
        }
    }

    /// Letter used for positional container keys when the title has no slug
    pub fn fallback_letter(self) -> char {
        match self {
            EpisodicKind::Series => 's',
            EpisodicKind::SoapOpera => 'n',
        }
    }

    /// Description used when a container has no group
    pub fn default_description(self) -> &'static str {
        match self {
            EpisodicKind::Series => "Série",
            EpisodicKind::SoapOpera => "Novela",
        }
    }

    /// Genre used when a container has no group
    pub fn default_genre(self) -> Option<&'static str> {
        match self {
            EpisodicKind::Series => None,
            EpisodicKind::SoapOpera => Some("Novela"),
        }
    }
}

impl std::fmt::Display for EpisodicKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EpisodicKind::Series => write!(f, "series"),
            EpisodicKind::SoapOpera => write!(f, "novelas"),
        }
    }
}

/// Series or novela container. Group and logo come from the first row
/// that supplies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Show {
    pub id: String,
    pub name: String,
    pub group: String,
    pub logo: String,
}

/// Single episode of a show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Episode {
    pub id: String,
    pub show_id: String,
    pub show_name: String,
    pub season: u32,
    pub episode: u32,
    pub title: String,
    pub group: String,
    pub logo: String,
    pub url: String,
}

/// Grouped result of loading one episodic file
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodicCatalog {
    pub kind: EpisodicKind,
    /// Containers sorted by display name (case-insensitive)
    pub shows: Vec<Show>,
    /// Episodes per container id, sorted by (season, episode)
    pub episodes_by_show: HashMap<String, Vec<Episode>>,
    pub episodes_by_id: HashMap<String, Episode>,
}

impl EpisodicCatalog {
    pub fn new(kind: EpisodicKind) -> Self {
        Self {
            kind,
            shows: Vec::new(),
            episodes_by_show: HashMap::new(),
            episodes_by_id: HashMap::new(),
        }
    }

    pub fn show(&self, id: &str) -> Option<&Show> {
        self.shows.iter().find(|show| show.id == id)
    }

    pub fn episode(&self, id: &str) -> Option<&Episode> {
        self.episodes_by_id.get(id)
    }

    pub fn episodes(&self, show_id: &str) -> &[Episode] {
        self.episodes_by_show
            .get(show_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first_episode(&self, show_id: &str) -> Option<&Episode> {
        self.episodes(show_id).first()
    }

    pub fn episode_count(&self) -> usize {
        self.episodes_by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie_with_year(year: &str) -> Movie {
        Movie {
            id: "catalog_movie_1".to_string(),
            title: "Matrix".to_string(),
            year: year.to_string(),
            genre: String::new(),
            logo: String::new(),
            backdrop: String::new(),
            synopsis: String::new(),
            url: "http://x/matrix.mp4".to_string(),
        }
    }

    #[test]
    fn test_release_year() {
        assert_eq!(movie_with_year("1999").release_year(), Some(1999));
        assert_eq!(movie_with_year("2010 (remaster)").release_year(), Some(2010));
        assert_eq!(movie_with_year("").release_year(), None);
        assert_eq!(movie_with_year("unknown").release_year(), None);
        assert_eq!(movie_with_year("0").release_year(), None);
    }

    #[test]
    fn test_episodic_kind_settings() {
        assert_eq!(EpisodicKind::Series.episode_width(), 2);
        assert_eq!(EpisodicKind::SoapOpera.episode_width(), 3);
        assert_eq!(EpisodicKind::SoapOpera.default_genre(), Some("Novela"));
        assert!(EpisodicKind::Series.default_genre().is_none());
    }

    #[test]
    fn test_empty_catalog_lookups() {
        let catalog = EpisodicCatalog::new(EpisodicKind::Series);
        assert!(catalog.episodes("catalog_series_x").is_empty());
        assert!(catalog.first_episode("catalog_series_x").is_none());
        assert!(catalog.show("catalog_series_x").is_none());
        assert_eq!(catalog.episode_count(), 0);
    }
}
