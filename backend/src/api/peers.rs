use crate::{
    errors::PeducServeError,
    gateway::{EntityResponse, PeerGateway},
    peer::{Peer, PeerId},
};
use rocket::{serde::json::Json, State};
use utoipa as openapi;

/// Create a new peer. The payload must not carry an id.
#[openapi::path(
    tag = "peers",
    request_body = Peer,
    responses(
        (status = 201, description = "Peer created, Location points at it", body = Peer),
        (status = 400, description = "Payload has an id or is invalid", body = crate::errors::ErrorBody),
        (status = 500, description = "Server error", body = crate::errors::ErrorBody),
    )
)]
#[post("/peers", data = "<peer>")]
pub fn create_peer(
    peer: Json<Peer>,
    gateway: &State<PeerGateway>,
) -> Result<EntityResponse<Peer>, PeducServeError> {
    Ok(gateway.create(peer.into_inner())?)
}

/// Replace an existing peer. The payload must carry the id.
#[openapi::path(
    tag = "peers",
    request_body = Peer,
    responses(
        (status = 200, description = "Peer updated", body = Peer),
        (status = 400, description = "Payload has no id or is invalid", body = crate::errors::ErrorBody),
        (status = 404, description = "No peer with that id", body = crate::errors::ErrorBody),
        (status = 500, description = "Server error", body = crate::errors::ErrorBody),
    )
)]
#[put("/peers", data = "<peer>")]
pub fn update_peer(
    peer: Json<Peer>,
    gateway: &State<PeerGateway>,
) -> Result<EntityResponse<Peer>, PeducServeError> {
    Ok(gateway.update(peer.into_inner())?)
}

/// Get all the peers, in id order.
#[openapi::path(
    tag = "peers",
    responses(
        (status = 200, description = "All peers", body = Vec<Peer>),
        (status = 500, description = "Server error", body = crate::errors::ErrorBody),
    )
)]
#[get("/peers")]
pub fn get_all_peers(
    gateway: &State<PeerGateway>,
) -> Result<EntityResponse<Vec<Peer>>, PeducServeError> {
    Ok(gateway.list_all()?)
}

#[openapi::path(
    tag = "peers",
    params(
        ("id" = u64, Path, description = "Id of the peer"),
    ),
    responses(
        (status = 200, description = "Peer found", body = Peer),
        (status = 404, description = "Peer not found"),
        (status = 500, description = "Server error", body = crate::errors::ErrorBody),
    )
)]
#[get("/peers/<id>")]
pub fn get_peer(
    id: PeerId,
    gateway: &State<PeerGateway>,
) -> Result<EntityResponse<Peer>, PeducServeError> {
    Ok(gateway.get_by_id(id)?)
}

/// Delete a peer. Deleting an unknown id succeeds too.
#[openapi::path(
    tag = "peers",
    params(
        ("id" = u64, Path, description = "Id of the peer"),
    ),
    responses(
        (status = 200, description = "Peer deleted"),
        (status = 500, description = "Server error", body = crate::errors::ErrorBody),
    )
)]
#[delete("/peers/<id>")]
pub fn delete_peer(
    id: PeerId,
    gateway: &State<PeerGateway>,
) -> Result<EntityResponse<()>, PeducServeError> {
    Ok(gateway.delete(id)?)
}

/// Full-text search over the peers. `term*` matches by prefix.
#[openapi::path(
    tag = "peers",
    params(
        ("query" = String, Query, description = "Free-text query"),
    ),
    responses(
        (status = 200, description = "Matching peers, most relevant first", body = Vec<Peer>),
        (status = 500, description = "Server error", body = crate::errors::ErrorBody),
    )
)]
#[get("/_search/peers?<query>")]
pub fn search_peers(
    query: &str,
    gateway: &State<PeerGateway>,
) -> Result<EntityResponse<Vec<Peer>>, PeducServeError> {
    Ok(gateway.search(query)?)
}
