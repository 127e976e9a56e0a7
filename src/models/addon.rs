use serde::Serialize;

/// Content types understood by the player client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Tv,
    Movie,
    Series,
}

impl ContentType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tv" => Some(ContentType::Tv),
            "movie" => Some(ContentType::Movie),
            "series" => Some(ContentType::Series),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Tv => write!(f, "tv"),
            ContentType::Movie => write!(f, "movie"),
            ContentType::Series => write!(f, "series"),
        }
    }
}

/// The five browsable catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Channels,
    Movies,
    PersonalMovies,
    Series,
    SoapOperas,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 5] = [
        CatalogKind::Channels,
        CatalogKind::Movies,
        CatalogKind::PersonalMovies,
        CatalogKind::Series,
        CatalogKind::SoapOperas,
    ];

    /// Catalog id as used in `/catalog/:type/:id.json`
    pub fn id(self) -> &'static str {
        match self {
            CatalogKind::Channels => "channels",
            CatalogKind::Movies => "movies",
            CatalogKind::PersonalMovies => "personal_movies",
            CatalogKind::Series => "series",
            CatalogKind::SoapOperas => "soap_operas",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            CatalogKind::Channels => "StreamCine IPTV",
            CatalogKind::Movies => "StreamCine Filmes",
            CatalogKind::PersonalMovies => "StreamCine Pedidos",
            CatalogKind::Series => "StreamCine Séries",
            CatalogKind::SoapOperas => "StreamCine Novelas",
        }
    }

    pub fn content_type(self) -> ContentType {
        match self {
            CatalogKind::Channels => ContentType::Tv,
            CatalogKind::Movies | CatalogKind::PersonalMovies => ContentType::Movie,
            CatalogKind::Series | CatalogKind::SoapOperas => ContentType::Series,
        }
    }

    /// Resolve a (type, catalog id) pair; unknown pairs yield None
    pub fn lookup(content_type: ContentType, catalog_id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.content_type() == content_type && kind.id() == catalog_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PosterShape {
    Square,
    Poster,
}

/// Catalog entry / meta detail sent to the client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaItem {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub name: String,
    pub poster: String,
    pub poster_shape: PosterShape,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Episode list, only present on series meta details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<Video>>,
}

/// Episode reference inside a series meta
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub season: u32,
    pub episode: u32,
}

/// Playable stream descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stream {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub metas: Vec<MetaItem>,
}

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    pub meta: Option<MetaItem>,
}

#[derive(Debug, Serialize)]
pub struct StreamsResponse {
    pub streams: Vec<Stream>,
}

/// Add-on manifest
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub logo: String,
    pub resources: Vec<ManifestResource>,
    pub types: Vec<ContentType>,
    pub catalogs: Vec<ManifestCatalog>,
    pub behavior_hints: BehaviorHints,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestResource {
    pub name: String,
    pub types: Vec<ContentType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub id_prefixes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ManifestCatalog {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub id: String,
    pub name: String,
    pub extra: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub configurable: bool,
    pub configuration_required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        assert_eq!(
            CatalogKind::lookup(ContentType::Tv, "channels"),
            Some(CatalogKind::Channels)
        );
        assert_eq!(
            CatalogKind::lookup(ContentType::Series, "soap_operas"),
            Some(CatalogKind::SoapOperas)
        );
        // Right id, wrong type
        assert_eq!(CatalogKind::lookup(ContentType::Tv, "movies"), None);
        assert_eq!(CatalogKind::lookup(ContentType::Movie, "unknown"), None);
    }

    #[test]
    fn test_meta_item_serialization() {
        let meta = MetaItem {
            id: "catalog_tv_1".to_string(),
            content_type: ContentType::Tv,
            name: "Canal A".to_string(),
            poster: "http://logo".to_string(),
            poster_shape: PosterShape::Square,
            description: "Noticias".to_string(),
            year: None,
            genres: vec!["Noticias".to_string()],
            background: None,
            videos: None,
        };

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "tv");
        assert_eq!(json["posterShape"], "square");
        assert!(json.get("year").is_none());
        assert!(json.get("videos").is_none());
    }
}
