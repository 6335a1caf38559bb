use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::AppConfig,
    errors::PeducError,
    search::{
        index::{FWD_TREE, REV_TREE},
        PeerIndex,
    },
    store::{PeerStore, PEERS_TREE},
};

#[derive(Clone)]
pub struct Backend {
    db: sled::Db,
    store: PeerStore,
    index: PeerIndex,
}

impl Backend {
    /// Open the backend from a config
    pub fn open(config: &AppConfig) -> Result<Self, PeducError> {
        let sled_config: sled::Config = config.sled.clone().into();
        let db = sled_config.open()?;
        Self::from_db(db)
    }

    /// Open the peer and index trees of an already opened database
    pub fn from_db(db: sled::Db) -> Result<Self, PeducError> {
        let peers = db.open_tree(PEERS_TREE)?;
        let index = PeerIndex::new(peers.clone(), db.open_tree(FWD_TREE)?, db.open_tree(REV_TREE)?);
        let store = PeerStore::new(db.clone(), peers, index.clone());
        log::info!(peers = store.len(), terms = index.len(); "backend opened");
        Ok(Self { db, store, index })
    }

    pub fn peer_store(&self) -> PeerStore {
        self.store.clone()
    }

    pub fn peer_index(&self) -> PeerIndex {
        self.index.clone()
    }

    /// Flush dirty pages to disk
    pub fn flush(&self) -> Result<usize, PeducError> {
        Ok(self.db.flush()?)
    }

    /// Get backend status
    pub fn status(&self) -> Result<BackendState, PeducError> {
        self.clone().try_into()
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct TreeState {
    pub checksum: u32,
    pub name: String,
    pub len: usize,
}

impl TryFrom<sled::Tree> for TreeState {
    type Error = PeducError;

    fn try_from(tree: sled::Tree) -> Result<Self, Self::Error> {
        let checksum = tree.checksum()?;
        let len = tree.len();
        let name = String::from_utf8(tree.name().to_vec())?;
        Ok(TreeState {
            checksum,
            name,
            len,
        })
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct BackendState {
    pub checksum: u32,
    pub name: String,
    pub size: u64,
    pub trees: Vec<TreeState>,
    pub recovered: bool,
}

impl TryFrom<Backend> for BackendState {
    type Error = PeducError;

    fn try_from(backend: Backend) -> Result<Self, Self::Error> {
        let name = String::from_utf8(backend.db.name().to_vec())?;
        let checksum = backend.db.checksum()?;
        let size = backend.db.size_on_disk()?;
        let recovered = backend.db.was_recovered();
        let mut trees: Vec<TreeState> = vec![];
        for tree_name in backend.db.tree_names() {
            trees.push(backend.db.open_tree(tree_name)?.try_into()?);
        }
        Ok(BackendState {
            checksum,
            name,
            size,
            trees,
            recovered,
        })
    }
}
