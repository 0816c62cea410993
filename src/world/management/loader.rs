//! Asynchronous chunk loading.
//!
//! A chunk that is requested while not resident is registered as loading
//! before its reader future is created, so duplicate requests collapse into
//! the one in-flight load. Completion fans out to every registered waiter
//! exactly once. In-flight loads cannot be cancelled; a load that finishes
//! for a chunk nobody needs any more is simply installed or discarded.

use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use rustc_hash::FxHashMap;

use crate::error::EngineResult;
use crate::world::core::ChunkPos;
use crate::world::serialization::{SerializedBlock, SerializedChunk};

/// Source of chunk contents: network, worker, or direct generation
pub trait ChunkReader {
    fn get_chunk(&self, pos: ChunkPos) -> LocalBoxFuture<'static, EngineResult<ChunkDelivery>>;
}

/// A loaded chunk plus blocks it spilled into other chunks
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDelivery {
    pub chunk: SerializedChunk,
    pub spill: Vec<SerializedBlock>,
}

impl ChunkDelivery {
    pub fn new(chunk: SerializedChunk) -> Self {
        Self {
            chunk,
            spill: Vec::new(),
        }
    }
}

/// What a lookup should do when the chunk is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPolicy {
    NoLoad,
    LoadIfMissing,
}

/// Result of asking for a chunk load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadRequest {
    Resident,
    Started,
    AlreadyLoading,
    NoReader,
}

pub(crate) type LoadOutcome = EngineResult<()>;

type PendingLoad = LocalBoxFuture<'static, (ChunkPos, EngineResult<ChunkDelivery>)>;

pub(crate) struct LoadQueue {
    reader: Option<Box<dyn ChunkReader>>,
    loading: FxHashMap<ChunkPos, Vec<oneshot::Sender<LoadOutcome>>>,
    in_flight: FuturesUnordered<PendingLoad>,
}

impl LoadQueue {
    pub fn new() -> Self {
        Self {
            reader: None,
            loading: FxHashMap::default(),
            in_flight: FuturesUnordered::new(),
        }
    }

    pub fn set_reader(&mut self, reader: Box<dyn ChunkReader>) {
        self.reader = Some(reader);
    }

    pub fn has_reader(&self) -> bool {
        self.reader.is_some()
    }

    pub fn is_loading(&self, pos: ChunkPos) -> bool {
        self.loading.contains_key(&pos)
    }

    pub fn loading_count(&self) -> usize {
        self.loading.len()
    }

    /// Register `pos` as loading and start its reader future
    pub fn start(&mut self, pos: ChunkPos) -> LoadRequest {
        if self.loading.contains_key(&pos) {
            return LoadRequest::AlreadyLoading;
        }
        let Some(reader) = self.reader.as_ref() else {
            return LoadRequest::NoReader;
        };

        self.loading.insert(pos, Vec::new());
        let load = reader.get_chunk(pos);
        self.in_flight
            .push(async move { (pos, load.await) }.boxed_local());
        LoadRequest::Started
    }

    /// Waiter notified when the load of `pos` completes
    pub fn subscribe(&mut self, pos: ChunkPos) -> Option<oneshot::Receiver<LoadOutcome>> {
        let waiters = self.loading.get_mut(&pos)?;
        let (sender, receiver) = oneshot::channel();
        waiters.push(sender);
        Some(receiver)
    }

    /// A finished load, if one is ready right now
    pub fn poll_completed(&mut self) -> Option<(ChunkPos, EngineResult<ChunkDelivery>)> {
        self.in_flight.next().now_or_never().flatten()
    }

    /// Wait for the next load to finish; `None` when nothing is in flight
    pub async fn next_completed(&mut self) -> Option<(ChunkPos, EngineResult<ChunkDelivery>)> {
        self.in_flight.next().await
    }

    /// Leave the loading state and notify every waiter
    pub fn finish(&mut self, pos: ChunkPos, outcome: &LoadOutcome) {
        let Some(waiters) = self.loading.remove(&pos) else {
            return;
        };
        log::debug!(
            "[LoadQueue::finish] Chunk {} finished loading, notifying {} waiters",
            pos,
            waiters.len()
        );
        for waiter in waiters {
            // A dropped receiver just means nobody is waiting any more
            let _ = waiter.send(outcome.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingReader {
        calls: Rc<Cell<usize>>,
    }

    impl ChunkReader for CountingReader {
        fn get_chunk(&self, pos: ChunkPos) -> LocalBoxFuture<'static, EngineResult<ChunkDelivery>> {
            self.calls.set(self.calls.get() + 1);
            async move {
                Err(EngineError::LoadFailed {
                    chunk: pos.key(),
                    error: "offline".to_string(),
                })
            }
            .boxed_local()
        }
    }

    #[test]
    fn test_duplicate_requests_collapse() {
        let calls = Rc::new(Cell::new(0));
        let mut queue = LoadQueue::new();
        assert_eq!(queue.start(ChunkPos::new(0, 0)), LoadRequest::NoReader);

        queue.set_reader(Box::new(CountingReader {
            calls: Rc::clone(&calls),
        }));
        let pos = ChunkPos::new(2, 3);
        assert_eq!(queue.start(pos), LoadRequest::Started);
        assert_eq!(queue.start(pos), LoadRequest::AlreadyLoading);
        assert_eq!(calls.get(), 1);
        assert!(queue.is_loading(pos));
    }

    #[test]
    fn test_waiters_notified_once() {
        let mut queue = LoadQueue::new();
        queue.set_reader(Box::new(CountingReader {
            calls: Rc::new(Cell::new(0)),
        }));
        let pos = ChunkPos::new(0, 1);
        queue.start(pos);
        let mut first = queue.subscribe(pos).unwrap();
        let mut second = queue.subscribe(pos).unwrap();

        let (done, result) = queue.poll_completed().unwrap();
        assert_eq!(done, pos);
        let outcome = result.map(|_| ());
        queue.finish(pos, &outcome);

        assert!(first.try_recv().unwrap().unwrap().is_err());
        assert!(second.try_recv().unwrap().unwrap().is_err());
        assert!(!queue.is_loading(pos));
        assert!(queue.subscribe(pos).is_none());
        assert!(queue.poll_completed().is_none());
    }
}
