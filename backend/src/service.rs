//! Collaborators of the peer gateway.
//!
//! The gateway owns no state. Everything it returns comes from one of these two services,
//! and every error they raise is passed to the caller untouched.

use crate::{
    errors::PeducError,
    peer::{Peer, PeerId},
};

pub trait PersistenceService: Send + Sync {
    /// Store a peer. A peer without an id is inserted and gets a fresh id, a peer with an
    /// id replaces the stored record.
    fn save(&self, peer: Peer) -> Result<Peer, PeducError>;

    /// Every stored peer, in id order.
    fn find_all(&self) -> Result<Vec<Peer>, PeducError>;

    fn find_by_id(&self, id: PeerId) -> Result<Option<Peer>, PeducError>;

    /// Remove a peer. Removing an unknown id is not an error.
    fn delete_by_id(&self, id: PeerId) -> Result<(), PeducError>;
}

pub trait SearchService: Send + Sync {
    /// Full-text match over the indexed text fields, most relevant first.
    fn query(&self, text: &str) -> Result<Vec<Peer>, PeducError>;
}
