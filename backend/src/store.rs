use sled::{
    transaction::{ConflictableTransactionError, ConflictableTransactionResult},
    Transactional, Tree,
};

use crate::{
    errors::PeducError,
    objects::ToFromStore,
    peer::{Peer, PeerId},
    search::{
        index::{index_peer, unindex_peer},
        PeerIndex,
    },
    service::PersistenceService,
};

pub const PEERS_TREE: &str = "peduc::peers";

/// Peer records in a sled tree, keyed by id.
///
/// Every write also updates the search index inside the same transaction, so a peer is
/// searchable exactly when it is stored.
#[derive(Clone)]
pub struct PeerStore {
    pub(crate) db: sled::Db,
    pub(crate) peers: Tree,
    pub(crate) index: PeerIndex,
}

impl PeerStore {
    pub fn new(db: sled::Db, peers: Tree, index: PeerIndex) -> Self {
        Self { db, peers, index }
    }

    /// Fresh id. Ids start at 1 and are never handed out twice, across restarts too.
    fn next_id(&self) -> Result<PeerId, PeducError> {
        Ok(PeerId(self.db.generate_id()? + 1))
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl PersistenceService for PeerStore {
    /// Insert when the peer has no id. Otherwise replace the stored record; replacing a
    /// record that does not exist fails with `PeerNotFound` rather than creating it under
    /// an id the generator never issued.
    fn save(&self, mut peer: Peer) -> Result<Peer, PeducError> {
        let (id, insert) = match peer.id {
            Some(id) => (id, false),
            None => (self.next_id()?, true),
        };
        peer.id = Some(id);
        let bytes = peer.to_object()?;

        (&self.peers, &self.index.fwd, &self.index.rev).transaction(
            |(peers, fwd, rev)| -> ConflictableTransactionResult<(), PeducError> {
                let key = &id.to_key()[..];
                if !insert && peers.get(key)?.is_none() {
                    return Err(ConflictableTransactionError::Abort(PeducError::PeerNotFound(id)));
                }
                peers.insert(key, bytes.clone())?;
                index_peer(fwd, rev, &peer, id)?;
                Ok(())
            },
        )?;

        log::debug!(id = id.0, insert = insert; "peer saved");
        Ok(peer)
    }

    fn find_all(&self) -> Result<Vec<Peer>, PeducError> {
        let mut peers = vec![];
        for entry in self.peers.iter() {
            let (_, bytes) = entry?;
            peers.push(Peer::from_object(&bytes)?);
        }
        Ok(peers)
    }

    fn find_by_id(&self, id: PeerId) -> Result<Option<Peer>, PeducError> {
        match self.peers.get(id.to_key()) {
            Ok(Some(bytes)) => Ok(Some(Peer::from_object(&bytes)?)),
            Ok(None) => Ok(None),
            Err(e) => {
                log::error!(id = id.0, err = e.to_string(); "failed to read peer");
                Err(PeducError::SledError(e))
            }
        }
    }

    fn delete_by_id(&self, id: PeerId) -> Result<(), PeducError> {
        let removed = (&self.peers, &self.index.fwd, &self.index.rev).transaction(
            |(peers, fwd, rev)| -> ConflictableTransactionResult<bool, PeducError> {
                let old = peers.remove(&id.to_key()[..])?;
                unindex_peer(fwd, rev, id)?;
                Ok(old.is_some())
            },
        )?;
        log::debug!(id = id.0, removed = removed; "peer deleted");
        Ok(())
    }
}
