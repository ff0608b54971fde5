use serde::Serialize;

use super::category::CleanPlan;
use crate::common::config::CleanConfig;
use crate::common::errors::CleanError;
use crate::filestore::{Filestore, Key, ScanStream};

/// One verification pass of a cleanup run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Shallow check of every entry against its backing file
    LeafValidity,
    /// Graph walk for nodes with missing descendants
    Incomplete,
    /// Graph walk for nodes unreachable from any root
    Orphan,
}

impl Stage {
    /// Execution order. Cheap per-entry checks go first, and removing
    /// incomplete nodes shrinks the graph before the orphan walk.
    pub const ORDER: [Stage; 3] = [Stage::LeafValidity, Stage::Incomplete, Stage::Orphan];

    /// Progress line written just before the stage's scan starts
    pub fn header(&self, config: &CleanConfig) -> String {
        match self {
            Stage::LeafValidity => format!(
                "Scanning for invalid leaf nodes ('verify --basic -l{}') ...",
                config.basic_level
            ),
            Stage::Incomplete => format!(
                "Scanning for incomplete nodes ('verify -l{} --skip-orphans') ...",
                config.full_level
            ),
            Stage::Orphan => format!("Scanning for orphans ('verify -l{}') ...", config.full_level),
        }
    }

    /// Start the verification pass that backs this stage
    pub fn scan<S: Filestore + ?Sized>(
        &self,
        store: &S,
        req: &S::Request,
        config: &CleanConfig,
    ) -> Result<ScanStream, CleanError> {
        let started = match self {
            Stage::LeafValidity => {
                store.verify_basic(req, config.basic_level, config.basic_concurrency)
            }
            Stage::Incomplete => {
                store.verify_full(req, config.full_level, config.full_concurrency, true)
            }
            Stage::Orphan => {
                store.verify_full(req, config.full_level, config.full_concurrency, false)
            }
        };
        started.map_err(|source| CleanError::ScanStart {
            stage: *self,
            source,
        })
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::LeafValidity => write!(f, "leaf validity"),
            Stage::Incomplete => write!(f, "incomplete"),
            Stage::Orphan => write!(f, "orphan"),
        }
    }
}

/// Drain a stage's scan and keep the keys the plan wants removed.
///
/// The whole stream is consumed before returning, so nothing is deleted
/// while the store is still being walked. Keys come back in scan order.
pub fn collect_pending(
    stage: Stage,
    stream: ScanStream,
    plan: &CleanPlan,
) -> Result<Vec<Key>, CleanError> {
    let mut pending = Vec::new();
    let mut scanned = 0usize;

    for res in stream {
        let res = res.map_err(|source| CleanError::ScanInterrupted { stage, source })?;
        scanned += 1;
        if plan.should_remove(res.status) {
            pending.push(res.key);
        }
    }

    tracing::debug!(
        %stage,
        scanned,
        matched = pending.len(),
        "Scan drained"
    );
    Ok(pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filestore::{ListRes, Status};

    fn stream(items: Vec<anyhow::Result<ListRes>>) -> ScanStream {
        Box::new(items.into_iter())
    }

    #[test]
    fn test_default_headers() {
        let config = CleanConfig::default();
        assert_eq!(
            Stage::LeafValidity.header(&config),
            "Scanning for invalid leaf nodes ('verify --basic -l6') ..."
        );
        assert_eq!(
            Stage::Incomplete.header(&config),
            "Scanning for incomplete nodes ('verify -l1 --skip-orphans') ..."
        );
        assert_eq!(
            Stage::Orphan.header(&config),
            "Scanning for orphans ('verify -l1') ..."
        );
    }

    #[test]
    fn test_order_is_cheap_first() {
        assert_eq!(
            Stage::ORDER,
            [Stage::LeafValidity, Stage::Incomplete, Stage::Orphan]
        );
    }

    #[test]
    fn test_collect_keeps_matches_in_order() {
        let plan = CleanPlan::resolve(&["invalid"]).unwrap();
        let pending = collect_pending(
            Stage::LeafValidity,
            stream(vec![
                Ok(ListRes::new(vec![3u8], Status::FileMissing)),
                Ok(ListRes::new(vec![1u8], Status::Ok)),
                Ok(ListRes::new(vec![2u8], Status::FileChanged)),
                Ok(ListRes::new(vec![4u8], Status::FileError)),
            ]),
            &plan,
        )
        .unwrap();
        assert_eq!(pending, vec![Key::new(vec![3u8]), Key::new(vec![2u8])]);
    }

    #[test]
    fn test_collect_stops_on_stream_error() {
        let plan = CleanPlan::resolve(&["orphan"]).unwrap();
        let err = collect_pending(
            Stage::Orphan,
            stream(vec![
                Ok(ListRes::new(vec![1u8], Status::Orphan)),
                Err(anyhow::anyhow!("walk aborted")),
            ]),
            &plan,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CleanError::ScanInterrupted {
                stage: Stage::Orphan,
                ..
            }
        ));
    }
}
