#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use filestore_clean::filestore::{Filestore, Key, ListRes, ScanStream, Status};

/// Request context handed through to every store call
#[derive(Debug, Clone)]
pub struct Req {
    pub id: u32,
}

/// Something the cleaner asked the store to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    BasicScan {
        req: u32,
        level: u32,
        concurrency: usize,
    },
    FullScan {
        req: u32,
        level: u32,
        concurrency: usize,
        skip_orphans: bool,
    },
    Delete {
        req: u32,
        key: Key,
    },
}

/// In-memory store with scripted verification results.
///
/// `leaves` are reported by the basic scan, `graph` by the full scans
/// (orphans are left out when the caller skips them). Deleted keys drop
/// out of later scans.
#[derive(Default)]
pub struct ScriptedStore {
    pub leaves: Vec<ListRes>,
    pub graph: Vec<ListRes>,
    pub fail_basic_start: bool,
    pub fail_full_start: bool,
    pub interrupt_full: bool,
    pub fail_delete: Option<Key>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    events: Vec<Event>,
    deleted: HashSet<Key>,
}

impl ScriptedStore {
    pub fn new(leaves: Vec<ListRes>, graph: Vec<ListRes>) -> Self {
        Self {
            leaves,
            graph,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    /// Keys deleted so far, in call order
    pub fn deleted(&self) -> Vec<Key> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Delete { key, .. } => Some(key),
                _ => None,
            })
            .collect()
    }

    fn live(&self, entries: &[ListRes]) -> Vec<ListRes> {
        let state = self.state.lock().unwrap();
        entries
            .iter()
            .filter(|e| !state.deleted.contains(&e.key))
            .cloned()
            .collect()
    }

    fn record(&self, event: Event) {
        self.state.lock().unwrap().events.push(event);
    }
}

impl Filestore for ScriptedStore {
    type Request = Req;

    fn verify_basic(&self, req: &Req, level: u32, concurrency: usize) -> anyhow::Result<ScanStream> {
        if self.fail_basic_start {
            anyhow::bail!("datastore unavailable");
        }
        self.record(Event::BasicScan {
            req: req.id,
            level,
            concurrency,
        });
        let items: Vec<anyhow::Result<ListRes>> =
            self.live(&self.leaves).into_iter().map(Ok).collect();
        Ok(Box::new(items.into_iter()))
    }

    fn verify_full(
        &self,
        req: &Req,
        level: u32,
        concurrency: usize,
        skip_orphans: bool,
    ) -> anyhow::Result<ScanStream> {
        if self.fail_full_start {
            anyhow::bail!("cannot walk graph");
        }
        self.record(Event::FullScan {
            req: req.id,
            level,
            concurrency,
            skip_orphans,
        });
        let mut items: Vec<anyhow::Result<ListRes>> = self
            .live(&self.graph)
            .into_iter()
            .filter(|e| !(skip_orphans && e.status == Status::Orphan))
            .map(Ok)
            .collect();
        if self.interrupt_full {
            items.push(Err(anyhow::anyhow!("walk interrupted")));
        }
        Ok(Box::new(items.into_iter()))
    }

    fn delete(&self, req: &Req, key: &Key) -> anyhow::Result<()> {
        if self.fail_delete.as_ref() == Some(key) {
            anyhow::bail!("entry is locked");
        }
        let mut state = self.state.lock().unwrap();
        state.events.push(Event::Delete {
            req: req.id,
            key: key.clone(),
        });
        state.deleted.insert(key.clone());
        Ok(())
    }
}

pub fn key(n: u8) -> Key {
    Key::new(vec![0x12, 0x20, n])
}

pub fn entry(n: u8, status: Status) -> ListRes {
    ListRes::new(key(n), status)
}

/// A store with something to find in every stage
pub fn mixed_store() -> ScriptedStore {
    ScriptedStore::new(
        vec![
            entry(1, Status::Ok),
            entry(2, Status::FileChanged),
            entry(3, Status::FileError),
            entry(4, Status::FileMissing),
            entry(5, Status::FileChanged),
        ],
        vec![
            entry(10, Status::Complete),
            entry(11, Status::Orphan),
            entry(12, Status::Incomplete),
            entry(13, Status::Complete),
            entry(14, Status::Incomplete),
            entry(15, Status::Orphan),
        ],
    )
}
