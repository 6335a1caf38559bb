//! In-memory collaborators for the gateway tests, counting writes and failing on demand.

use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Mutex,
};

use dashmap::DashMap;

use crate::{
    errors::PeducError,
    peer::{Peer, PeerId},
    search::{parse_query, peer_terms, QueryTerm},
    service::{PersistenceService, SearchService},
};

#[derive(Default)]
pub struct MemoryPeerStore {
    peers: DashMap<PeerId, Peer>,
    last_id: AtomicU64,
    writes: AtomicUsize,
    failure: Mutex<Option<PeducError>>,
}

impl MemoryPeerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of save and delete calls that reached the store.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every following call fail with `err`.
    pub fn fail_with(&self, err: PeducError) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(err);
        }
    }

    fn check(&self) -> Result<(), PeducError> {
        match self.failure.lock() {
            Ok(failure) => match failure.as_ref() {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            },
            Err(e) => Err(PeducError::Oops(e.to_string())),
        }
    }
}

impl PersistenceService for MemoryPeerStore {
    fn save(&self, mut peer: Peer) -> Result<Peer, PeducError> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let id = match peer.id {
            Some(id) => {
                if !self.peers.contains_key(&id) {
                    return Err(PeducError::PeerNotFound(id));
                }
                id
            }
            None => PeerId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1),
        };
        peer.id = Some(id);
        self.peers.insert(id, peer.clone());
        Ok(peer)
    }

    fn find_all(&self) -> Result<Vec<Peer>, PeducError> {
        self.check()?;
        let mut peers: Vec<Peer> = self.peers.iter().map(|e| e.value().clone()).collect();
        peers.sort_by_key(|p| p.id);
        Ok(peers)
    }

    fn find_by_id(&self, id: PeerId) -> Result<Option<Peer>, PeducError> {
        self.check()?;
        Ok(self.peers.get(&id).map(|e| e.value().clone()))
    }

    fn delete_by_id(&self, id: PeerId) -> Result<(), PeducError> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.peers.remove(&id);
        Ok(())
    }
}

impl SearchService for MemoryPeerStore {
    /// Same matching and ranking as the sled index, by scanning every peer.
    fn query(&self, text: &str) -> Result<Vec<Peer>, PeducError> {
        self.check()?;
        let query = parse_query(text);
        let mut scored: Vec<(usize, Peer)> = vec![];
        for peer in self.find_all()? {
            let terms = peer_terms(&peer);
            let score = query
                .iter()
                .filter(|q| match q {
                    QueryTerm::Exact(t) => terms.contains(t),
                    QueryTerm::Prefix(p) => terms.iter().any(|t| t.starts_with(p.as_str())),
                })
                .count();
            if score > 0 {
                scored.push((score, peer));
            }
        }
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored.into_iter().map(|(_, peer)| peer).collect())
    }
}
