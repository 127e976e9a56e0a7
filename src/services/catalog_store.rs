use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::info;

use crate::config::Config;
use crate::models::{CatalogKind, Channel, EpisodicCatalog, EpisodicKind, Movie, MovieCollection};
use crate::services::csv_reader::{read_records, CatalogError};
use crate::services::loaders::{self, NAMED_REQUIRED_COLUMNS, TITLED_REQUIRED_COLUMNS};
use crate::services::metrics::CATALOG_LOADS_TOTAL;

/// Load state of one catalog, reported by `/health`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatus {
    pub catalog: &'static str,
    pub loaded: bool,
    pub entries: usize,
}

/// In-memory catalogs, each loaded from its file on first access and kept
/// for the lifetime of the process.
///
/// A failed load leaves the cell empty, so the next request tries again.
pub struct CatalogStore {
    channels_path: PathBuf,
    movies_path: PathBuf,
    personal_movies_path: PathBuf,
    series_path: PathBuf,
    soap_operas_path: PathBuf,

    channels: OnceCell<Vec<Channel>>,
    movies: OnceCell<Vec<Movie>>,
    personal_movies: OnceCell<Vec<Movie>>,
    series: OnceCell<EpisodicCatalog>,
    soap_operas: OnceCell<EpisodicCatalog>,
}

impl CatalogStore {
    pub fn new(config: &Config) -> Self {
        let dir = &config.data_dir;
        Self {
            channels_path: dir.join(&config.channels_file),
            movies_path: dir.join(&config.movies_file),
            personal_movies_path: dir.join(&config.personal_movies_file),
            series_path: dir.join(&config.series_file),
            soap_operas_path: dir.join(&config.soap_operas_file),
            channels: OnceCell::new(),
            movies: OnceCell::new(),
            personal_movies: OnceCell::new(),
            series: OnceCell::new(),
            soap_operas: OnceCell::new(),
        }
    }

    pub async fn channels(&self) -> Result<&[Channel], CatalogError> {
        self.channels
            .get_or_try_init(|| async move {
                let records = read_records(&self.channels_path, NAMED_REQUIRED_COLUMNS).await?;
                record_load(CatalogKind::Channels, &self.channels_path);
                Ok::<_, CatalogError>(loaders::load_channels(&records))
            })
            .await
            .map(Vec::as_slice)
    }

    pub async fn movies(&self, collection: MovieCollection) -> Result<&[Movie], CatalogError> {
        let (cell, path, kind) = match collection {
            MovieCollection::Catalog => (&self.movies, &self.movies_path, CatalogKind::Movies),
            MovieCollection::Personal => (
                &self.personal_movies,
                &self.personal_movies_path,
                CatalogKind::PersonalMovies,
            ),
        };

        cell.get_or_try_init(|| async move {
            let records = read_records(path, TITLED_REQUIRED_COLUMNS).await?;
            record_load(kind, path);
            Ok::<_, CatalogError>(loaders::load_movies(&records, collection))
        })
        .await
        .map(Vec::as_slice)
    }

    pub async fn episodic(&self, kind: EpisodicKind) -> Result<&EpisodicCatalog, CatalogError> {
        let (cell, path, catalog) = match kind {
            EpisodicKind::Series => (&self.series, &self.series_path, CatalogKind::Series),
            EpisodicKind::SoapOpera => {
                (&self.soap_operas, &self.soap_operas_path, CatalogKind::SoapOperas)
            }
        };

        cell.get_or_try_init(|| async move {
            let records = read_records(path, NAMED_REQUIRED_COLUMNS).await?;
            record_load(catalog, path);
            Ok::<_, CatalogError>(loaders::load_episodic(&records, kind))
        })
        .await
    }

    /// Snapshot of which catalogs are loaded; never triggers a load
    pub fn status(&self) -> Vec<CatalogStatus> {
        CatalogKind::ALL
            .into_iter()
            .map(|kind| {
                let entries = match kind {
                    CatalogKind::Channels => self.channels.get().map(Vec::len),
                    CatalogKind::Movies => self.movies.get().map(Vec::len),
                    CatalogKind::PersonalMovies => self.personal_movies.get().map(Vec::len),
                    CatalogKind::Series => self.series.get().map(|c| c.shows.len()),
                    CatalogKind::SoapOperas => self.soap_operas.get().map(|c| c.shows.len()),
                };
                CatalogStatus {
                    catalog: kind.id(),
                    loaded: entries.is_some(),
                    entries: entries.unwrap_or(0),
                }
            })
            .collect()
    }
}

fn record_load(kind: CatalogKind, path: &Path) {
    CATALOG_LOADS_TOTAL.with_label_values(&[kind.id()]).inc();
    info!("Catalog {} loaded from {}", kind.id(), path.display());
}
