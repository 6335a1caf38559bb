//! Peer gateway
//!
//! Maps the REST verbs on peers onto the two collaborators and builds the response
//! envelopes. The gateway checks id presence and payload validity before any collaborator
//! call; everything else, including every collaborator error, is passed through as is.

use std::{io::Cursor, sync::Arc};

use rocket::{
    http::{ContentType, Header, Status},
    response::Responder,
    Request, Response,
};
use serde::Serialize;

use crate::{
    config::PeducConfig,
    errors::PeducError,
    headers::HeaderUtil,
    peer::{Peer, PeerId},
    service::{PersistenceService, SearchService},
};

pub const ENTITY_NAME: &str = "peer";

/// Status, optional JSON body and headers of a successful call.
#[derive(Clone, Debug)]
pub struct EntityResponse<T> {
    pub status: Status,
    pub body: Option<T>,
    pub headers: Vec<Header<'static>>,
}

impl<T> EntityResponse<T> {
    pub fn ok(body: T) -> Self {
        Self {
            status: Status::Ok,
            body: Some(body),
            headers: vec![],
        }
    }

    pub fn created(body: T, location: String) -> Self {
        Self {
            status: Status::Created,
            body: Some(body),
            headers: vec![Header::new("Location", location)],
        }
    }

    pub fn empty(status: Status) -> Self {
        Self {
            status,
            body: None,
            headers: vec![],
        }
    }

    pub fn with_headers(mut self, headers: Vec<Header<'static>>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Value of the first header named `name`, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name().as_str().eq_ignore_ascii_case(name))
            .map(|h| h.value())
    }
}

impl<'r, T: Serialize> Responder<'r, 'static> for EntityResponse<T> {
    fn respond_to(self, _req: &'r Request<'_>) -> rocket::response::Result<'static> {
        let mut response = Response::build();
        response.status(self.status);
        for header in self.headers {
            response.header(header);
        }
        if let Some(body) = self.body {
            let json = match serde_json::to_vec(&body) {
                Ok(json) => json,
                Err(e) => {
                    log::error!(err = e.to_string(); "failed to serialize response body");
                    return Err(Status::InternalServerError);
                }
            };
            response
                .header(ContentType::JSON)
                .sized_body(json.len(), Cursor::new(json));
        }
        response.ok()
    }
}

pub struct PeerGateway {
    persistence: Arc<dyn PersistenceService>,
    search: Arc<dyn SearchService>,
    alerts: HeaderUtil,
    location_base: String,
}

impl PeerGateway {
    pub fn new(
        persistence: Arc<dyn PersistenceService>,
        search: Arc<dyn SearchService>,
        config: &PeducConfig,
    ) -> Self {
        Self {
            persistence,
            search,
            alerts: HeaderUtil::new(&config.application_name),
            location_base: config.location_base().to_string(),
        }
    }

    /// Store a new peer. 201 with `Location` and a creation alert.
    pub fn create(&self, peer: Peer) -> Result<EntityResponse<Peer>, PeducError> {
        log::debug!("REST request to save Peer : {peer:?}");
        if peer.id.is_some() {
            return Err(PeducError::bad_request("id must not be set", ENTITY_NAME, "idexists"));
        }
        peer.validate()?;

        let result = self.persistence.save(peer)?;
        let id = result
            .id
            .ok_or_else(|| PeducError::Oops("store returned a peer without an id".to_string()))?;
        let location = format!("{}/peers/{id}", self.location_base);
        let alert = self.alerts.entity_creation_alert(ENTITY_NAME, &id.to_string());
        Ok(EntityResponse::created(result, location).with_headers(alert))
    }

    /// Replace a stored peer. Existence is left to the store.
    pub fn update(&self, peer: Peer) -> Result<EntityResponse<Peer>, PeducError> {
        log::debug!("REST request to update Peer : {peer:?}");
        let id = match peer.id {
            Some(id) => id,
            None => {
                return Err(PeducError::bad_request("id must not be null", ENTITY_NAME, "idnull"))
            }
        };
        peer.validate()?;

        let result = self.persistence.save(peer)?;
        let alert = self.alerts.entity_update_alert(ENTITY_NAME, &id.to_string());
        Ok(EntityResponse::ok(result).with_headers(alert))
    }

    pub fn list_all(&self) -> Result<EntityResponse<Vec<Peer>>, PeducError> {
        log::debug!("REST request to get all Peers");
        Ok(EntityResponse::ok(self.persistence.find_all()?))
    }

    /// 200 with the peer, or 404 with no body.
    pub fn get_by_id(&self, id: PeerId) -> Result<EntityResponse<Peer>, PeducError> {
        log::debug!("REST request to get Peer : {id}");
        match self.persistence.find_by_id(id)? {
            Some(peer) => Ok(EntityResponse::ok(peer)),
            None => Ok(EntityResponse::empty(Status::NotFound)),
        }
    }

    /// Always 200 with a deletion alert, whether or not the peer existed.
    pub fn delete(&self, id: PeerId) -> Result<EntityResponse<()>, PeducError> {
        log::debug!("REST request to delete Peer : {id}");
        self.persistence.delete_by_id(id)?;
        let alert = self.alerts.entity_deletion_alert(ENTITY_NAME, &id.to_string());
        Ok(EntityResponse::empty(Status::Ok).with_headers(alert))
    }

    pub fn search(&self, query: &str) -> Result<EntityResponse<Vec<Peer>>, PeducError> {
        log::debug!("REST request to search Peers for query {query}");
        Ok(EntityResponse::ok(self.search.query(query)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPeerStore;

    fn gateway() -> (PeerGateway, Arc<MemoryPeerStore>) {
        let store = Arc::new(MemoryPeerStore::new());
        let gateway = PeerGateway::new(store.clone(), store.clone(), &PeducConfig::default());
        (gateway, store)
    }

    fn reason(err: PeducError) -> &'static str {
        match err {
            PeducError::BadRequest { reason, .. } => reason,
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn create_assigns_fresh_ids() {
        let (gateway, _) = gateway();
        let a = gateway.create(Peer::new("A")).unwrap();
        let b = gateway.create(Peer::new("B")).unwrap();
        assert_eq!(a.status, Status::Created);
        let a_id = a.body.as_ref().and_then(|p| p.id).unwrap();
        let b_id = b.body.as_ref().and_then(|p| p.id).unwrap();
        assert_ne!(a_id, b_id);
        assert_eq!(a.header("location"), Some(format!("/api/peers/{a_id}").as_str()));
        assert_eq!(a.header("X-peducApp-alert"), Some("peducApp.peer.created"));
        assert_eq!(a.header("X-peducApp-params"), Some(a_id.to_string().as_str()));
    }

    #[test]
    fn create_with_id_is_rejected_without_writing() {
        let (gateway, store) = gateway();
        // invalid payloads still fail on the id first
        for peer in [Peer::new("A").with_id(PeerId(3)), Peer::new("").with_id(PeerId(3))] {
            let err = gateway.create(peer).unwrap_err();
            assert_eq!(reason(err), "idexists");
        }
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn update_without_id_is_rejected_without_writing() {
        let (gateway, store) = gateway();
        let err = gateway.update(Peer::new("A")).unwrap_err();
        assert_eq!(reason(err), "idnull");
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn invalid_payload_is_rejected_before_save() {
        let (gateway, store) = gateway();
        let err = gateway.create(Peer::new(" ")).unwrap_err();
        assert!(matches!(err, PeducError::Validation(_)));
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let (gateway, _) = gateway();
        let res = gateway.get_by_id(PeerId(42)).unwrap();
        assert_eq!(res.status, Status::NotFound);
        assert!(res.body.is_none());
    }

    #[test]
    fn get_after_create_returns_same_record() {
        let (gateway, _) = gateway();
        let created = gateway
            .create(Peer::new("A").with_email("a@example.org"))
            .unwrap()
            .body
            .unwrap();
        let fetched = gateway.get_by_id(created.id.unwrap()).unwrap();
        assert_eq!(fetched.status, Status::Ok);
        assert_eq!(fetched.body, Some(created));
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let (gateway, _) = gateway();
        let id = gateway.create(Peer::new("A")).unwrap().body.unwrap().id.unwrap();
        let deleted = gateway.delete(id).unwrap();
        assert_eq!(deleted.status, Status::Ok);
        assert_eq!(deleted.header("X-peducApp-alert"), Some("peducApp.peer.deleted"));
        assert_eq!(gateway.get_by_id(id).unwrap().status, Status::NotFound);

        // a second delete looks the same
        assert_eq!(gateway.delete(id).unwrap().status, Status::Ok);
    }

    #[test]
    fn lifecycle_scenario() {
        let (gateway, _) = gateway();
        let created = gateway.create(Peer::new("A")).unwrap();
        assert_eq!(created.status, Status::Created);
        let id = created.body.unwrap().id.unwrap();
        assert_eq!(id, PeerId(1));

        assert_eq!(gateway.get_by_id(id).unwrap().body, Some(Peer::new("A").with_id(id)));

        let updated = gateway.update(Peer::new("B").with_id(id)).unwrap();
        assert_eq!(updated.status, Status::Ok);
        assert_eq!(updated.header("X-peducApp-alert"), Some("peducApp.peer.updated"));
        assert_eq!(updated.body, Some(Peer::new("B").with_id(id)));
        assert_eq!(gateway.get_by_id(id).unwrap().body, Some(Peer::new("B").with_id(id)));

        assert_eq!(gateway.delete(id).unwrap().status, Status::Ok);
        assert_eq!(gateway.get_by_id(id).unwrap().status, Status::NotFound);
    }

    #[test]
    fn list_and_search_delegate() {
        let (gateway, _) = gateway();
        gateway.create(Peer::new("Ada Lovelace")).unwrap();
        gateway.create(Peer::new("Grace Hopper")).unwrap();

        let all = gateway.list_all().unwrap().body.unwrap();
        assert_eq!(all.len(), 2);

        let found = gateway.search("hopper").unwrap().body.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Grace Hopper");
    }

    #[test]
    fn collaborator_errors_pass_through() {
        let store = Arc::new(MemoryPeerStore::new());
        store.fail_with(PeducError::Oops("store down".to_string()));
        let gateway = PeerGateway::new(store.clone(), store.clone(), &PeducConfig::default());
        match gateway.list_all() {
            Err(PeducError::Oops(msg)) => assert_eq!(msg, "store down"),
            other => panic!("expected store error, got {other:?}"),
        }
        assert!(gateway.search("a").is_err());
    }
}
