use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::models::{CatalogResponse, MetaResponse, StreamsResponse};
use crate::services::csv_reader::CatalogError;
use crate::services::metrics::REQUESTS_TOTAL;
use crate::AppState;

type ApiError = (StatusCode, Json<serde_json::Value>);

/// Path segments arrive as `channels.json`, `catalog_tv_1.json`, ...
fn strip_json(segment: &str) -> &str {
    segment.strip_suffix(".json").unwrap_or(segment)
}

fn internal_error(resource: &str, err: CatalogError) -> ApiError {
    tracing::error!("{} request failed: {}", resource, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": err.to_string() })),
    )
}

/// GET /manifest.json
pub async fn manifest(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    REQUESTS_TOTAL.with_label_values(&["manifest"]).inc();
    Json(state.addon.manifest())
}

/// GET /catalog/:type/:id.json
pub async fn catalog(
    State(state): State<Arc<AppState>>,
    Path((content_type, catalog_id)): Path<(String, String)>,
) -> Result<Json<CatalogResponse>, ApiError> {
    REQUESTS_TOTAL.with_label_values(&["catalog"]).inc();

    let metas = state
        .addon
        .list_catalog(&content_type, strip_json(&catalog_id))
        .await
        .map_err(|e| internal_error("catalog", e))?;

    Ok(Json(CatalogResponse { metas }))
}

/// GET /meta/:type/:id.json
pub async fn meta(
    State(state): State<Arc<AppState>>,
    Path((content_type, id)): Path<(String, String)>,
) -> Result<Json<MetaResponse>, ApiError> {
    REQUESTS_TOTAL.with_label_values(&["meta"]).inc();

    let meta = state
        .addon
        .get_meta(&content_type, strip_json(&id))
        .await
        .map_err(|e| internal_error("meta", e))?;

    Ok(Json(MetaResponse { meta }))
}

/// GET /stream/:type/:id.json
pub async fn stream(
    State(state): State<Arc<AppState>>,
    Path((content_type, id)): Path<(String, String)>,
) -> Result<Json<StreamsResponse>, ApiError> {
    REQUESTS_TOTAL.with_label_values(&["stream"]).inc();

    let streams = state
        .addon
        .get_streams(&content_type, strip_json(&id))
        .await
        .map_err(|e| internal_error("stream", e))?;

    Ok(Json(StreamsResponse { streams }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;

    fn app(dir: &std::path::Path) -> axum::Router {
        crate::build_router(Arc::new(AppState::new(Config::for_data_dir(dir))))
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_strip_json() {
        assert_eq!(strip_json("channels.json"), "channels");
        assert_eq!(strip_json("catalog_tv_1"), "catalog_tv_1");
    }

    #[tokio::test]
    async fn test_channel_flow() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("canais_tv.csv"),
            "nome;grupo;url\nCanal A;Noticias;http://x/a.ts\nCanal B;Esportes;http://x/b.m3u8\n",
        )
        .unwrap();

        let (status, body) = get_json(app(dir.path()), "/catalog/tv/channels.json").await;
        assert_eq!(status, StatusCode::OK);
        let metas = body["metas"].as_array().unwrap();
        assert_eq!(metas.len(), 2);
        assert_eq!(metas[0]["name"], "Canal B");
        assert_eq!(metas[0]["type"], "tv");
        assert_eq!(metas[0]["posterShape"], "square");

        let id = metas[1]["id"].as_str().unwrap().to_string();
        let (_, body) = get_json(app(dir.path()), &format!("/meta/tv/{}.json", id)).await;
        assert_eq!(body["meta"]["name"], "Canal A");
        assert_eq!(body["meta"]["description"], "Noticias");

        let (_, body) = get_json(app(dir.path()), &format!("/stream/tv/{}.json", id)).await;
        assert_eq!(body["streams"][0]["url"], "http://x/a.m3u8");
        assert_eq!(body["streams"][0]["title"], "Canal A (HLS)");
    }

    #[tokio::test]
    async fn test_unknown_ids_are_empty_not_errors() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = get_json(app(dir.path()), "/catalog/radio/channels.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metas"].as_array().unwrap().len(), 0);

        let (status, body) = get_json(app(dir.path()), "/meta/movie/catalog_movie_1.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["meta"].is_null());

        let (_, body) = get_json(app(dir.path()), "/stream/series/whatever.json").await;
        assert_eq!(body["streams"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_catalog_is_500() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("filmes.csv")).unwrap();

        let (status, body) = get_json(app(dir.path()), "/catalog/movie/movies.json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("filmes.csv"));
    }

    #[tokio::test]
    async fn test_manifest_route() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = get_json(app(dir.path()), "/manifest.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "org.streamcine.iptv");
        assert_eq!(body["catalogs"].as_array().unwrap().len(), 5);
        assert_eq!(body["behaviorHints"]["configurable"], false);
        assert_eq!(body["resources"][1]["idPrefixes"][0], "catalog_tv_");
    }
}
