//! Row → entity loaders for the five catalog files
//!
//! Loaders never fail: rows without a name/title or url are skipped and
//! unresolved columns read as empty strings.

use std::collections::HashMap;
use tracing::info;

use crate::models::{
    Channel, Episode, EpisodicCatalog, EpisodicKind, Movie, MovieCollection, Show,
};
use crate::services::csv_reader::{field, DelimitedRecords};
use crate::services::ids::{self, CHANNEL_PREFIX};
use crate::services::name_parser;

/// Required columns of the channel, series and novela files
pub const NAMED_REQUIRED_COLUMNS: &[&str] = &["nome", "url"];
/// Required columns of both movie files
pub const TITLED_REQUIRED_COLUMNS: &[&str] = &["titulo", "url"];

const LOGO_COLUMNS: &[&str] = &["logo", "tvg-logo"];

/// Load live channels, sorted by (group, name) case-insensitively
pub fn load_channels(records: &DelimitedRecords) -> Vec<Channel> {
    if records.is_empty() {
        return Vec::new();
    }

    let index_col = records.column_index(&["index"]);
    let name_col = records.column_index(&["nome"]);
    let group_col = records.column_index(&["grupo"]);
    let url_col = records.column_index(&["url"]);
    let logo_col = records.column_index(LOGO_COLUMNS);

    let mut channels: Vec<Channel> = records
        .rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let parts = records.split(row);

            let name = field(&parts, name_col);
            let url = field(&parts, url_col);
            if name.is_empty() || url.is_empty() {
                return None;
            }

            Some(Channel {
                id: ids::row_id(CHANNEL_PREFIX, field(&parts, index_col), i + 1),
                name: name.to_string(),
                group: field(&parts, group_col).to_string(),
                url: url.to_string(),
                logo: field(&parts, logo_col).to_string(),
            })
        })
        .collect();

    channels.sort_by_cached_key(|c| (c.group.to_lowercase(), c.name.to_lowercase()));

    info!("Total TV channels loaded: {}", channels.len());
    channels
}

/// Load a movie file. Catalog movies sort by (genre, title), personal
/// movies by title only.
pub fn load_movies(records: &DelimitedRecords, collection: MovieCollection) -> Vec<Movie> {
    if records.is_empty() {
        return Vec::new();
    }

    let index_col = records.column_index(&["index"]);
    let title_col = records.column_index(&["titulo"]);
    let year_col = records.column_index(&["ano"]);
    let genre_col = records.column_index(&["genero"]);
    let logo_col = records.column_index(&["logo"]);
    let backdrop_col = records.column_index(&["fundo"]);
    let synopsis_col = records.column_index(&["sinopse"]);
    let url_col = records.column_index(&["url"]);

    let mut movies: Vec<Movie> = records
        .rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let parts = records.split(row);

            let title = field(&parts, title_col);
            let url = field(&parts, url_col);
            if title.is_empty() || url.is_empty() {
                return None;
            }

            Some(Movie {
                id: ids::row_id(collection.id_prefix(), field(&parts, index_col), i + 1),
                title: title.to_string(),
                year: field(&parts, year_col).to_string(),
                genre: field(&parts, genre_col).to_string(),
                logo: field(&parts, logo_col).to_string(),
                backdrop: field(&parts, backdrop_col).to_string(),
                synopsis: field(&parts, synopsis_col).to_string(),
                url: url.to_string(),
            })
        })
        .collect();

    match collection {
        MovieCollection::Catalog => {
            movies.sort_by_cached_key(|m| (m.genre.to_lowercase(), m.title.to_lowercase()))
        }
        MovieCollection::Personal => movies.sort_by_cached_key(|m| m.title.to_lowercase()),
    }

    info!("Total movies loaded ({:?}): {}", collection, movies.len());
    movies
}

/// Group episode rows into shows.
///
/// Each row's name is decomposed into (show title, season, episode); rows
/// whose titles share a slug land in the same show, whatever their order.
pub fn load_episodic(records: &DelimitedRecords, kind: EpisodicKind) -> EpisodicCatalog {
    let mut catalog = EpisodicCatalog::new(kind);
    if records.is_empty() {
        return catalog;
    }

    let name_col = records.column_index(&["nome"]);
    let group_col = records.column_index(&["grupo"]);
    let url_col = records.column_index(&["url"]);
    let logo_col = records.column_index(LOGO_COLUMNS);

    let width = kind.episode_width();
    // slug -> position in `shows`
    let mut show_positions: HashMap<String, usize> = HashMap::new();
    let mut shows: Vec<Show> = Vec::new();

    for row in &records.rows {
        let parts = records.split(row);

        let full_name = field(&parts, name_col);
        let url = field(&parts, url_col);
        if full_name.is_empty() || url.is_empty() {
            continue;
        }

        let group = field(&parts, group_col);
        let logo = field(&parts, logo_col);

        let name = name_parser::decompose(full_name);
        let show_name = name.parent_title();

        let mut slug = ids::slugify(show_name);
        if slug.is_empty() {
            slug = format!("{}{}", kind.fallback_letter(), show_positions.len() + 1);
        }

        let position = *show_positions.entry(slug).or_insert_with_key(|slug| {
            shows.push(Show {
                id: format!("{}{}", kind.id_prefix(), slug),
                name: show_name.to_string(),
                group: String::new(),
                logo: String::new(),
            });
            shows.len() - 1
        });

        let show = &mut shows[position];
        if show.group.is_empty() && !group.is_empty() {
            show.group = group.to_string();
        }
        if show.logo.is_empty() && !logo.is_empty() {
            show.logo = logo.to_string();
        }

        let (season, number) = (name.season(), name.episode());
        let episode = Episode {
            id: ids::episode_id(&show.id, season, number, width),
            show_id: show.id.clone(),
            show_name: show_name.to_string(),
            season,
            episode: number,
            title: name.display_title(width),
            group: group.to_string(),
            logo: logo.to_string(),
            url: url.to_string(),
        };

        catalog
            .episodes_by_id
            .insert(episode.id.clone(), episode.clone());
        catalog
            .episodes_by_show
            .entry(episode.show_id.clone())
            .or_default()
            .push(episode);
    }

    shows.sort_by_cached_key(|s| s.name.to_lowercase());
    for episodes in catalog.episodes_by_show.values_mut() {
        // stable: equal (season, episode) keep row order
        episodes.sort_by_key(|e| (e.season, e.episode));
    }
    catalog.shows = shows;

    info!("Total {} detected: {}", kind, catalog.shows.len());
    info!("Total episodes in {}: {}", kind, catalog.episode_count());

    catalog
}
