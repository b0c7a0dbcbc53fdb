use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ahash::AHashSet;
use common::*;
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};
use tokio::runtime::Runtime;

use unit::ChunkCoordinate;
use world::ChunkSnapshot;

use crate::executor::{ChunkPlacementResult, PlacementContext, PlacementExecutor};

/// Drives chunk placement computations on a background thread pool, per the
/// async pipeline: a chunk's [`ChunkSnapshot`] and [`NeighborSnapshot`] are
/// captured on the main thread before a worker ever sees them, so the
/// executor's mutable state never needs to cross a thread boundary.
pub struct ChunkProcessor {
    runtime: Runtime,
    result_tx: mpsc::UnboundedSender<ChunkPlacementResult>,
    result_rx: mpsc::UnboundedReceiver<ChunkPlacementResult>,
    in_progress: AHashSet<ChunkCoordinate>,
}

impl ChunkProcessor {
    pub fn new(threads: usize) -> std::io::Result<Self> {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder.worker_threads(threads.max(1)).thread_name_fn(|| {
            static ATOMIC_ID: AtomicUsize = AtomicUsize::new(0);
            let id = ATOMIC_ID.fetch_add(1, Ordering::SeqCst);
            format!("placement-worker-{}", id)
        });
        let runtime = builder.enable_time().build()?;
        let (result_tx, result_rx) = mpsc::unbounded();

        Ok(Self {
            runtime,
            result_tx,
            result_rx,
            in_progress: AHashSet::default(),
        })
    }

    pub fn is_in_progress(&self, coord: ChunkCoordinate) -> bool {
        self.in_progress.contains(&coord)
    }

    /// Spawns a placement computation for `coord` unless it's already stored
    /// or mid-flight. The neighbor snapshot is captured from `executor`
    /// before spawning, so the worker reads a frozen view of its neighbors.
    pub fn launch_task(
        &mut self,
        executor: &PlacementExecutor,
        snapshot: ChunkSnapshot,
    ) {
        let coord = snapshot.coord;
        if executor.is_processed(coord) || self.in_progress.contains(&coord) {
            return;
        }

        let context = Arc::clone(executor.context());
        let neighbors = executor.neighbors_of(coord);
        let mut tx = self.result_tx.clone();

        self.in_progress.insert(coord);
        self.runtime.spawn(async move {
            let result = context.compute_chunk_entities(&snapshot, &neighbors);
            if let Err(e) = tx.send(result).await {
                error!("failed to send placement result"; "chunk" => coord, "error" => %e);
            }
        });
    }

    /// Drains every result that has arrived so far without blocking, storing
    /// each into `executor`. Returns the number of chunks completed.
    pub fn poll_completed(&mut self, executor: &mut PlacementExecutor) -> usize {
        let mut completed = 0;
        while let Ok(Some(result)) = self.result_rx.try_next() {
            self.in_progress.remove(&result.coord);
            executor.store_chunk_result(result);
            completed += 1;
        }
        completed
    }

    /// Blocks until every in-flight computation has been stored. Used on
    /// shutdown so no worker outlives the runtime it was spawned on.
    pub fn wait_all(&mut self, executor: &mut PlacementExecutor) {
        while !self.in_progress.is_empty() {
            let result = self.runtime.block_on(self.result_rx.next());
            match result {
                Some(result) => {
                    self.in_progress.remove(&result.coord);
                    executor.store_chunk_result(result);
                }
                None => break,
            }
        }
    }

    /// Drains every in-flight task and drops tracking state. Called on
    /// shutdown; no worker is left holding a reference to `executor`
    /// afterwards.
    pub fn clear(&mut self, executor: &mut PlacementExecutor) {
        self.wait_all(executor);
        self.in_progress.clear();
    }
}
