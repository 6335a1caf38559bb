pub mod catchers;
pub mod peers;

use crate::backend::{Backend, BackendState, TreeState};
use crate::errors::{ErrorBody, FieldError, PeducServeError};
use crate::indexer::{Indexer, IndexerSignal};
use crate::peer::{Peer, PeerId};
use rocket::{http::Status, serde::json::Json, State};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(description = "Peduc peer service"),
    paths(
        peers::create_peer,
        peers::update_peer,
        peers::get_all_peers,
        peers::get_peer,
        peers::delete_peer,
        peers::search_peers,
        reindex_peers,
        backend_status,
    ),
    components(schemas(
        Peer,
        PeerId,
        ErrorBody,
        FieldError,
        BackendState,
        TreeState,
    ))
)]
pub struct ApiDoc;

/// Management routes are mounted at a fixed path, everything else under the base path.
const MANAGEMENT_PATH: &str = "/management";

/// The OpenAPI document with the peer routes placed under `base`, the configured mount
/// point. `base` is a [`PeducConfig::location_base`](crate::config::PeducConfig::location_base).
pub fn api_doc(base: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let paths = std::mem::take(&mut doc.paths.paths);
    for (path, item) in paths {
        let path = if path.starts_with(MANAGEMENT_PATH) {
            path
        } else {
            format!("{base}{path}")
        };
        doc.paths.paths.insert(path, item);
    }
    doc
}

#[utoipa::path(
    tag = "peers",
    responses(
        (status = 202, description = "Rebuild of the search index queued"),
        (status = 500, description = "Server error", body = ErrorBody)
    )
)]
#[post("/_index/peers")]
/// Rebuild the peer search index from the stored peers, in the background
pub fn reindex_peers(indexer: &State<Indexer>) -> Result<Status, PeducServeError> {
    log::debug!("REST request to reindex Peers");
    indexer.signal(IndexerSignal::Reindex)?;
    Ok(Status::Accepted)
}

#[utoipa::path(
    tag = "Backend",
    context_path = "/management",
    responses(
        (status = 200, description = "Backend status success", body = BackendState),
        (status = 500, description = "Server error", body = ErrorBody)
    )
)]
#[get("/status")]
/// Get backend status
pub fn backend_status(backend: &State<Backend>) -> Result<Json<BackendState>, PeducServeError> {
    Ok(Json(backend.status()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(base: &str) -> Vec<String> {
        api_doc(base).paths.paths.keys().cloned().collect()
    }

    #[test]
    fn peer_routes_follow_the_base_path() {
        let paths = paths("/v2");
        for expected in ["/v2/peers", "/v2/peers/{id}", "/v2/_search/peers", "/v2/_index/peers"] {
            assert!(paths.iter().any(|p| p == expected), "{expected} missing from {paths:?}");
        }
        assert!(paths.iter().any(|p| p == "/management/status"));
        assert!(!paths.iter().any(|p| p.starts_with("/api")));
    }

    #[test]
    fn root_mount_documents_bare_paths() {
        let paths = paths("");
        assert!(paths.iter().any(|p| p == "/peers"));
        assert!(paths.iter().any(|p| p == "/management/status"));
    }
}
