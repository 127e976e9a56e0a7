//! Catalog / meta / stream protocol operations
//!
//! Every lookup miss (unknown type, catalog or id) is an empty answer, never
//! an error. Only catalog loading failures surface as `Err`.

use tracing::info;

use crate::config::Config;
use crate::models::{
    BehaviorHints, CatalogKind, Channel, ContentType, EpisodicCatalog, EpisodicKind, Manifest,
    ManifestCatalog, ManifestResource, MetaItem, Movie, MovieCollection, PosterShape, Show, Stream,
    Video,
};
use crate::services::catalog_store::{CatalogStatus, CatalogStore};
use crate::services::csv_reader::CatalogError;
use crate::services::ids::{MediaId, CHANNEL_PREFIX};
use crate::services::stream_selector::pick_best_stream;

const ADDON_ID: &str = "org.streamcine.iptv";
const PERSONAL_MOVIE_GENRE: &str = "Pedido";
const PERSONAL_MOVIE_DESCRIPTION: &str = "Filme de pedidos";
const CHANNEL_DESCRIPTION: &str = "Canal de TV";

/// Add-on backend: catalog store plus presentation defaults
pub struct AddonService {
    store: CatalogStore,
    default_poster: String,
}

impl AddonService {
    pub fn new(config: &Config) -> Self {
        Self {
            store: CatalogStore::new(config),
            default_poster: config.default_poster.clone(),
        }
    }

    pub fn catalog_status(&self) -> Vec<CatalogStatus> {
        self.store.status()
    }

    pub fn manifest(&self) -> Manifest {
        let all_types = vec![ContentType::Tv, ContentType::Movie, ContentType::Series];
        let id_prefixes: Vec<String> = [
            CHANNEL_PREFIX,
            MovieCollection::Catalog.id_prefix(),
            MovieCollection::Personal.id_prefix(),
            EpisodicKind::Series.id_prefix(),
            EpisodicKind::SoapOpera.id_prefix(),
        ]
        .iter()
        .map(|prefix| prefix.to_string())
        .collect();

        Manifest {
            id: ADDON_ID.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: "StreamCine".to_string(),
            description:
                "Canais de TV, filmes, filmes pedidos, séries e novelas a partir de listas e CSVs personalizados"
                    .to_string(),
            logo: self.default_poster.clone(),
            resources: vec![
                ManifestResource {
                    name: "catalog".to_string(),
                    types: all_types.clone(),
                    id_prefixes: Vec::new(),
                },
                ManifestResource {
                    name: "meta".to_string(),
                    types: all_types.clone(),
                    id_prefixes: id_prefixes.clone(),
                },
                ManifestResource {
                    name: "stream".to_string(),
                    types: all_types.clone(),
                    id_prefixes,
                },
            ],
            types: all_types,
            catalogs: CatalogKind::ALL
                .into_iter()
                .map(|kind| ManifestCatalog {
                    content_type: kind.content_type(),
                    id: kind.id().to_string(),
                    name: kind.display_name().to_string(),
                    extra: Vec::new(),
                })
                .collect(),
            behavior_hints: BehaviorHints {
                configurable: false,
                configuration_required: false,
            },
        }
    }

    /// Summary entries of one catalog; unknown (type, id) pairs are empty
    pub async fn list_catalog(
        &self,
        content_type: &str,
        catalog_id: &str,
    ) -> Result<Vec<MetaItem>, CatalogError> {
        let Some(kind) =
            ContentType::parse(content_type).and_then(|t| CatalogKind::lookup(t, catalog_id))
        else {
            return Ok(Vec::new());
        };

        let metas: Vec<MetaItem> = match kind {
            CatalogKind::Channels => self
                .store
                .channels()
                .await?
                .iter()
                .map(|channel| self.channel_preview(channel))
                .collect(),
            CatalogKind::Movies | CatalogKind::PersonalMovies => {
                let collection = if kind == CatalogKind::Movies {
                    MovieCollection::Catalog
                } else {
                    MovieCollection::Personal
                };
                self.store
                    .movies(collection)
                    .await?
                    .iter()
                    .map(|movie| self.movie_preview(movie, collection))
                    .collect()
            }
            CatalogKind::Series | CatalogKind::SoapOperas => {
                let episodic = if kind == CatalogKind::Series {
                    EpisodicKind::Series
                } else {
                    EpisodicKind::SoapOpera
                };
                self.store
                    .episodic(episodic)
                    .await?
                    .shows
                    .iter()
                    .map(|show| self.show_preview(show, episodic))
                    .collect()
            }
        };

        info!("Catalog {} requested. Total entries: {}", kind.id(), metas.len());
        Ok(metas)
    }

    /// Detail record for an id. Episode ids resolve to their show, with the
    /// full episode list attached.
    pub async fn get_meta(&self, content_type: &str, id: &str) -> Result<Option<MetaItem>, CatalogError> {
        info!("Meta requested: {} {}", content_type, id);

        let Some(media_id) = self.resolve(content_type, id) else {
            info!("Meta not found: {}", id);
            return Ok(None);
        };

        let meta = match media_id {
            MediaId::Channel(id) => self
                .store
                .channels()
                .await?
                .iter()
                .find(|channel| channel.id == id)
                .map(|channel| self.channel_meta(channel)),
            MediaId::Movie { collection, id } => self
                .store
                .movies(collection)
                .await?
                .iter()
                .find(|movie| movie.id == id)
                .map(|movie| self.movie_meta(movie, collection)),
            MediaId::Show { kind, id } => {
                let catalog = self.store.episodic(kind).await?;
                catalog.show(&id).map(|show| self.show_meta(show, catalog))
            }
            MediaId::Episode { kind, id } => {
                let catalog = self.store.episodic(kind).await?;
                catalog.episode(&id).map(|episode| {
                    let show = catalog.show(&episode.show_id).cloned().unwrap_or_else(|| Show {
                        id: episode.show_id.clone(),
                        name: episode.show_name.clone(),
                        group: episode.group.clone(),
                        logo: episode.logo.clone(),
                    });
                    self.show_meta(&show, catalog)
                })
            }
        };

        if meta.is_none() {
            info!("Meta not found: {}", id);
        }
        Ok(meta)
    }

    /// Zero or one stream. Show ids play their first episode.
    pub async fn get_streams(&self, content_type: &str, id: &str) -> Result<Vec<Stream>, CatalogError> {
        let Some(media_id) = self.resolve(content_type, id) else {
            info!("Stream not found: {}", id);
            return Ok(Vec::new());
        };
        info!("Stream requested: {} {}", content_type, media_id.as_str());

        let source = match media_id {
            MediaId::Channel(id) => self
                .store
                .channels()
                .await?
                .iter()
                .find(|channel| channel.id == id)
                .map(|channel| (channel.name.clone(), channel.url.clone())),
            MediaId::Movie { collection, id } => self
                .store
                .movies(collection)
                .await?
                .iter()
                .find(|movie| movie.id == id)
                .map(|movie| (movie.title.clone(), movie.url.clone())),
            MediaId::Show { kind, id } => self
                .store
                .episodic(kind)
                .await?
                .first_episode(&id)
                .map(|episode| {
                    info!("Playing {} episode S{}E{}", episode.show_name, episode.season, episode.episode);
                    (episode.title.clone(), episode.url.clone())
                }),
            MediaId::Episode { kind, id } => self
                .store
                .episodic(kind)
                .await?
                .episode(&id)
                .map(|episode| {
                    info!("Playing {} episode S{}E{}", episode.show_name, episode.season, episode.episode);
                    (episode.title.clone(), episode.url.clone())
                }),
        };

        let Some((title, url)) = source else {
            info!("Stream not found: {}", id);
            return Ok(Vec::new());
        };

        info!("Original URL: {}", url);
        let streams: Vec<Stream> = pick_best_stream(&title, &url).into_iter().collect();
        if let Some(stream) = streams.first() {
            info!("Final URL used: {}", stream.url);
        }
        Ok(streams)
    }

    /// Parse the id and check it belongs to the requested type
    fn resolve(&self, content_type: &str, id: &str) -> Option<MediaId> {
        let content_type = ContentType::parse(content_type)?;
        MediaId::parse(id).filter(|media_id| media_id.content_type() == content_type)
    }

    fn poster(&self, logo: &str) -> String {
        if logo.is_empty() {
            self.default_poster.clone()
        } else {
            logo.to_string()
        }
    }

    fn channel_preview(&self, channel: &Channel) -> MetaItem {
        MetaItem {
            id: channel.id.clone(),
            content_type: ContentType::Tv,
            name: channel.name.clone(),
            poster: self.poster(&channel.logo),
            poster_shape: PosterShape::Square,
            description: channel.group.clone(),
            year: None,
            genres: non_empty(&channel.group).into_iter().collect(),
            background: None,
            videos: None,
        }
    }

    fn channel_meta(&self, channel: &Channel) -> MetaItem {
        MetaItem {
            description: non_empty(&channel.group).unwrap_or_else(|| CHANNEL_DESCRIPTION.to_string()),
            background: non_empty(&channel.logo),
            ..self.channel_preview(channel)
        }
    }

    fn movie_preview(&self, movie: &Movie, collection: MovieCollection) -> MetaItem {
        let genres = match (non_empty(&movie.genre), collection) {
            (Some(genre), _) => vec![genre],
            (None, MovieCollection::Personal) => vec![PERSONAL_MOVIE_GENRE.to_string()],
            (None, MovieCollection::Catalog) => Vec::new(),
        };

        MetaItem {
            id: movie.id.clone(),
            content_type: ContentType::Movie,
            name: movie.title.clone(),
            poster: self.poster(&movie.logo),
            poster_shape: PosterShape::Poster,
            description: movie.synopsis.clone(),
            year: movie.release_year(),
            genres,
            background: None,
            videos: None,
        }
    }

    fn movie_meta(&self, movie: &Movie, collection: MovieCollection) -> MetaItem {
        let description = match (non_empty(&movie.synopsis), collection) {
            (Some(synopsis), _) => synopsis,
            (None, MovieCollection::Personal) => PERSONAL_MOVIE_DESCRIPTION.to_string(),
            (None, MovieCollection::Catalog) => String::new(),
        };
        let background = non_empty(&movie.backdrop).unwrap_or_else(|| self.poster(&movie.logo));

        MetaItem {
            description,
            background: Some(background),
            ..self.movie_preview(movie, collection)
        }
    }

    fn show_preview(&self, show: &Show, kind: EpisodicKind) -> MetaItem {
        let genres = match non_empty(&show.group) {
            Some(group) => vec![group],
            None => kind.default_genre().map(str::to_string).into_iter().collect(),
        };
        let description = non_empty(&show.group)
            .or_else(|| kind.default_genre().map(str::to_string))
            .unwrap_or_default();

        MetaItem {
            id: show.id.clone(),
            content_type: ContentType::Series,
            name: show.name.clone(),
            poster: self.poster(&show.logo),
            poster_shape: PosterShape::Poster,
            description,
            year: None,
            genres,
            background: None,
            videos: None,
        }
    }

    fn show_meta(&self, show: &Show, catalog: &EpisodicCatalog) -> MetaItem {
        let videos = catalog
            .episodes(&show.id)
            .iter()
            .map(|episode| Video {
                id: episode.id.clone(),
                title: episode.title.clone(),
                season: episode.season,
                episode: episode.episode,
            })
            .collect();

        MetaItem {
            description: non_empty(&show.group)
                .unwrap_or_else(|| catalog.kind.default_description().to_string()),
            background: Some(self.poster(&show.logo)),
            videos: Some(videos),
            ..self.show_preview(show, catalog.kind)
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSTER: &str = "https://www.stremio.com/website/stremio-logo-small.png";

    fn service_with(files: &[(&str, &str)]) -> (tempfile::TempDir, AddonService) {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            std::fs::write(dir.path().join(name), contents).unwrap();
        }
        let service = AddonService::new(&Config::for_data_dir(dir.path()));
        (dir, service)
    }

    fn fixture_files() -> Vec<(&'static str, &'static str)> {
        vec![
            (
                "canais_tv.csv",
                "nome;grupo;url\nCanal A;Noticias;http://x/a.ts\nCanal B;Esportes;http://x/b.m3u8\n",
            ),
            (
                "filmes.csv",
                "titulo,ano,genero,logo,fundo,sinopse,url\nMatrix,1999,Ficcao,http://l/m.png,http://f/m.png,Neo,http://x/m.mp4\n",
            ),
            (
                "filmes_pessoais.csv",
                "titulo;url\nFilme da Familia;https://drive.google.com/file/d/ABC123/view?usp=sharing\n",
            ),
            (
                "series_episodios.csv",
                "nome;grupo;url\nDark S01E02;Netflix;http://x/d2.ts\nDark S01E01;;http://x/d1.ts\n",
            ),
            ("novelas.csv", "nome;url\nAvenida Brasil S01E01;http://x/ab1.mp4\n"),
        ]
    }

    #[tokio::test]
    async fn test_channel_catalog_end_to_end() {
        let (_dir, service) = service_with(&fixture_files());

        let metas = service.list_catalog("tv", "channels").await.unwrap();
        let names: Vec<&str> = metas.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Canal B", "Canal A"]);
        assert_eq!(metas[0].poster, POSTER);
        assert_eq!(metas[0].poster_shape, PosterShape::Square);
        assert_eq!(metas[0].genres, vec!["Esportes"]);

        for meta in &metas {
            let streams = service.get_streams("tv", &meta.id).await.unwrap();
            assert_eq!(streams.len(), 1);
            assert!(streams[0].url.ends_with(".m3u8"));
            assert!(streams[0].title.ends_with("(HLS)"));
        }
    }

    #[tokio::test]
    async fn test_unknown_catalogs_are_empty() {
        let (_dir, service) = service_with(&fixture_files());

        assert!(service.list_catalog("tv", "movies").await.unwrap().is_empty());
        assert!(service.list_catalog("radio", "channels").await.unwrap().is_empty());
        assert!(service.get_meta("tv", "nope").await.unwrap().is_none());
        assert!(service.get_streams("movie", "catalog_movie_99").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_type_must_match_id() {
        let (_dir, service) = service_with(&fixture_files());
        let channel_id = service.list_catalog("tv", "channels").await.unwrap()[0].id.clone();

        assert!(service.get_meta("movie", &channel_id).await.unwrap().is_none());
        assert!(service.get_streams("series", &channel_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_movie_meta() {
        let (_dir, service) = service_with(&fixture_files());

        let meta = service.get_meta("movie", "catalog_movie_1").await.unwrap().unwrap();
        assert_eq!(meta.name, "Matrix");
        assert_eq!(meta.year, Some(1999));
        assert_eq!(meta.description, "Neo");
        assert_eq!(meta.background.as_deref(), Some("http://f/m.png"));
        assert_eq!(meta.genres, vec!["Ficcao"]);
    }

    #[tokio::test]
    async fn test_personal_movie_defaults_and_drive_stream() {
        let (_dir, service) = service_with(&fixture_files());

        let metas = service.list_catalog("movie", "personal_movies").await.unwrap();
        assert_eq!(metas[0].genres, vec!["Pedido"]);

        let meta = service.get_meta("movie", "catalog_pmovie_1").await.unwrap().unwrap();
        assert_eq!(meta.description, "Filme de pedidos");
        assert_eq!(meta.background.as_deref(), Some(POSTER));

        let streams = service.get_streams("movie", "catalog_pmovie_1").await.unwrap();
        assert_eq!(
            streams[0].url,
            "https://drive.google.com/uc?export=download&id=ABC123"
        );
        assert_eq!(streams[0].title, "Filme da Familia");
    }

    #[tokio::test]
    async fn test_series_meta_from_show_and_episode_ids() {
        let (_dir, service) = service_with(&fixture_files());

        let from_show = service
            .get_meta("series", "catalog_series_dark")
            .await
            .unwrap()
            .unwrap();
        let from_episode = service
            .get_meta("series", "catalog_series_dark_s01e02")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(from_show, from_episode);

        let videos = from_show.videos.unwrap();
        let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["catalog_series_dark_s01e01", "catalog_series_dark_s01e02"]);
        assert_eq!(videos[0].title, "E01 - Dark");
        assert_eq!(from_show.description, "Netflix");
    }

    #[tokio::test]
    async fn test_show_stream_plays_first_episode() {
        let (_dir, service) = service_with(&fixture_files());

        let streams = service.get_streams("series", "catalog_series_dark").await.unwrap();
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].url, "http://x/d1.m3u8");
        assert_eq!(streams[0].title, "E01 - Dark (HLS)");

        let streams = service
            .get_streams("series", "catalog_series_dark_s01e02")
            .await
            .unwrap();
        assert_eq!(streams[0].url, "http://x/d2.m3u8");
    }

    #[tokio::test]
    async fn test_novela_defaults() {
        let (_dir, service) = service_with(&fixture_files());

        let metas = service.list_catalog("series", "soap_operas").await.unwrap();
        assert_eq!(metas[0].id, "catalog_novela_avenida-brasil");
        assert_eq!(metas[0].description, "Novela");
        assert_eq!(metas[0].genres, vec!["Novela"]);

        let meta = service
            .get_meta("series", "catalog_novela_avenida-brasil_s01e001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(meta.videos.unwrap()[0].title, "E001 - Avenida Brasil");
    }

    #[tokio::test]
    async fn test_empty_data_dir() {
        let (_dir, service) = service_with(&[]);

        for kind in CatalogKind::ALL {
            let metas = service
                .list_catalog(&kind.content_type().to_string(), kind.id())
                .await
                .unwrap();
            assert!(metas.is_empty());
        }
        assert!(service.catalog_status().iter().all(|s| s.loaded && s.entries == 0));
    }

    #[test]
    fn test_manifest() {
        let (_dir, service) = service_with(&[]);
        let manifest = service.manifest();

        assert_eq!(manifest.id, "org.streamcine.iptv");
        assert_eq!(manifest.catalogs.len(), 5);
        assert_eq!(manifest.resources[1].id_prefixes.len(), 5);
        assert!(manifest.resources[0].id_prefixes.is_empty());
    }
}
