//! Inverted index over peers
//!
//! `fwd` maps a term to the sorted ids of the peers containing it. `rev` maps an id to the
//! terms it was indexed under so an update or delete can take the old postings out.
//! Writes go through [`index_peer`] and [`unindex_peer`], always inside the same sled
//! transaction that writes the peer record.

use std::collections::{BTreeMap, BTreeSet};

use sled::{
    transaction::{ConflictableTransactionResult, TransactionalTree},
    Transactional, Tree,
};

use super::{parse_query, peer_terms, QueryTerm};
use crate::{
    errors::PeducError,
    objects::{decode, encode, ToFromStore},
    peer::{Peer, PeerId},
    service::SearchService,
};

pub const FWD_TREE: &str = "peduc::index::fwd";
pub const REV_TREE: &str = "peduc::index::rev";

#[derive(Clone)]
pub struct PeerIndex {
    pub(crate) peers: Tree,
    pub(crate) fwd: Tree,
    pub(crate) rev: Tree,
}

impl PeerIndex {
    pub fn new(peers: Tree, fwd: Tree, rev: Tree) -> Self {
        Self { peers, fwd, rev }
    }

    /// Ids matching a single query term.
    pub fn lookup(&self, term: &QueryTerm) -> Result<BTreeSet<PeerId>, PeducError> {
        let mut ids = BTreeSet::new();
        match term {
            QueryTerm::Exact(t) => {
                if let Some(bytes) = self.fwd.get(t.as_bytes())? {
                    ids.extend(decode::<Vec<u64>>(&bytes)?.into_iter().map(PeerId));
                }
            }
            QueryTerm::Prefix(p) => {
                for entry in self.fwd.scan_prefix(p.as_bytes()) {
                    let (_, bytes) = entry?;
                    ids.extend(decode::<Vec<u64>>(&bytes)?.into_iter().map(PeerId));
                }
            }
        }
        Ok(ids)
    }

    /// Number of distinct indexed terms.
    pub fn len(&self) -> usize {
        self.fwd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fwd.is_empty()
    }

    /// Reindex every stored peer, then drop postings of ids that are no longer stored.
    /// Returns the number of peers indexed.
    pub fn rebuild(&self) -> Result<usize, PeducError> {
        let mut count = 0;
        for entry in self.peers.iter() {
            let (key, _) = entry?;
            let id = PeerId::try_from(&key)?;
            let indexed = (&self.peers, &self.fwd, &self.rev).transaction(
                |(peers, fwd, rev)| -> ConflictableTransactionResult<bool, PeducError> {
                    // the peer may have been deleted since the scan saw it
                    match peers.get(&key)? {
                        Some(bytes) => {
                            let peer = Peer::from_object(&bytes)?;
                            index_peer(fwd, rev, &peer, id)?;
                            Ok(true)
                        }
                        None => Ok(false),
                    }
                },
            )?;
            if indexed {
                count += 1;
            }
        }

        for entry in self.rev.iter() {
            let (key, _) = entry?;
            let id = PeerId::try_from(&key)?;
            (&self.peers, &self.fwd, &self.rev).transaction(
                |(peers, fwd, rev)| -> ConflictableTransactionResult<(), PeducError> {
                    if peers.get(&key)?.is_none() {
                        log::debug!(id = id.0; "dropping postings of removed peer");
                        unindex_peer(fwd, rev, id)?;
                    }
                    Ok(())
                },
            )?;
        }

        log::info!(peers = count, terms = self.len(); "search index rebuilt");
        Ok(count)
    }
}

impl SearchService for PeerIndex {
    fn query(&self, text: &str) -> Result<Vec<Peer>, PeducError> {
        let terms = parse_query(text);
        if terms.is_empty() {
            return Ok(vec![]);
        }

        let mut scores: BTreeMap<PeerId, usize> = BTreeMap::new();
        for term in &terms {
            for id in self.lookup(term)? {
                *scores.entry(id).or_default() += 1;
            }
        }

        // BTreeMap yields ascending ids and the sort is stable, so ties stay in id order
        let mut ranked: Vec<(PeerId, usize)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let mut peers = vec![];
        for (id, _) in ranked {
            match self.peers.get(id.to_key())? {
                Some(bytes) => peers.push(Peer::from_object(&bytes)?),
                None => log::warn!(id = id.0; "index references a missing peer"),
            }
        }
        Ok(peers)
    }
}

/// Replace the postings of `id` with the terms of `peer`.
pub(crate) fn index_peer(
    fwd: &TransactionalTree,
    rev: &TransactionalTree,
    peer: &Peer,
    id: PeerId,
) -> ConflictableTransactionResult<(), PeducError> {
    unindex_peer(fwd, rev, id)?;
    let terms = peer_terms(peer);
    for term in &terms {
        let mut ids: Vec<u64> = match fwd.get(term.as_bytes())? {
            Some(bytes) => decode(&bytes)?,
            None => vec![],
        };
        if let Err(pos) = ids.binary_search(&id.0) {
            ids.insert(pos, id.0);
        }
        fwd.insert(term.as_bytes(), encode(&ids)?)?;
    }
    rev.insert(&id.to_key()[..], encode(&terms)?)?;
    Ok(())
}

/// Take `id` out of every posting list it was indexed under.
///
/// A posting list left empty is removed together with its term.
pub(crate) fn unindex_peer(
    fwd: &TransactionalTree,
    rev: &TransactionalTree,
    id: PeerId,
) -> ConflictableTransactionResult<(), PeducError> {
    let terms: Vec<String> = match rev.remove(&id.to_key()[..])? {
        Some(bytes) => decode(&bytes)?,
        None => return Ok(()),
    };
    for term in terms {
        if let Some(bytes) = fwd.get(term.as_bytes())? {
            let mut ids: Vec<u64> = decode(&bytes)?;
            ids.retain(|x| *x != id.0);
            if ids.is_empty() {
                fwd.remove(term.as_bytes())?;
            } else {
                fwd.insert(term.as_bytes(), encode(&ids)?)?;
            }
        }
    }
    Ok(())
}
