//! Indexer
//!
//! Saves and deletes keep the search index current on their own. The indexer is the
//! background worker for whole-index jobs: it owns a Tx/Rx pair, receives `Reindex`
//! signals from the API (or at liftoff) and rebuilds the index from the stored peers on a
//! blocking thread. `Shutdown` ends the loop.

use std::time::Duration;

use flume::{Receiver, Sender};

use crate::{errors::PeducError, search::PeerIndex};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexerSignal {
    Reindex,
    Shutdown,
}

#[derive(Clone)]
pub struct Indexer {
    index: PeerIndex,
    chan: (Sender<IndexerSignal>, Receiver<IndexerSignal>),
    report_every: Duration,
}

impl Indexer {
    pub fn new(index: PeerIndex, report_secs: u64) -> Self {
        Self {
            index,
            chan: flume::unbounded(),
            report_every: Duration::from_secs(report_secs.max(1)),
        }
    }

    /// Queue a signal for the worker. Signals sent before the worker starts are kept.
    pub fn signal(&self, sig: IndexerSignal) -> Result<(), PeducError> {
        Ok(self.chan.0.send(sig)?)
    }

    pub fn pending(&self) -> usize {
        self.chan.1.len()
    }

    pub async fn run(self) -> Result<(), PeducError> {
        let mut report = tokio::time::interval(self.report_every);
        loop {
            tokio::select! {
                _ = report.tick() => {
                    log::info!(terms = self.index.len(), pending = self.pending(); "Indexer is alive");
                }
                sig = self.chan.1.recv_async() => {
                    match sig {
                        Ok(IndexerSignal::Reindex) => self.reindex().await,
                        Ok(IndexerSignal::Shutdown) => {
                            log::info!("Indexer shutting down");
                            return Ok(());
                        }
                        Err(e) => {
                            log::error!("indexer channel error {e}");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    async fn reindex(&self) {
        let index = self.index.clone();
        match tokio::task::spawn_blocking(move || index.rebuild()).await {
            Ok(Ok(n)) => log::info!("reindexed {n} peers"),
            Ok(Err(e)) => log::error!("reindex failed {e}"),
            Err(e) => log::error!("reindex task panicked {e}"),
        }
    }
}
