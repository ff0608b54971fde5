use serde::Serialize;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use super::category::CleanPlan;
use super::progress::{progress_pipe, ProgressReader, ProgressSink, QuietSink};
use super::stage::{collect_pending, Stage};
use crate::common::config::CleanConfig;
use crate::common::errors::CleanError;
use crate::common::format;
use crate::filestore::{Filestore, Key};

/// Result of one stage that ran to completion
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub removed: usize,
    pub duration_secs: f64,
}

/// Result of a cleanup run that finished without error
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanSummary {
    pub stages: Vec<StageReport>,
}

impl CleanSummary {
    pub fn total_removed(&self) -> usize {
        self.stages.iter().map(|s| s.removed).sum()
    }
}

/// Start a cleanup run with the default verification settings.
///
/// See [`clean_with_config`].
pub fn clean<S, T>(store: Arc<S>, req: S::Request, categories: &[T], quiet: bool) -> ProgressReader
where
    S: Filestore,
    T: AsRef<str>,
{
    clean_with_config(store, req, categories, quiet, &CleanConfig::default())
}

/// Start a cleanup run on a worker thread and return its progress reader.
///
/// Returns before any work is done. Category errors, scan failures and
/// delete failures all arrive through the reader. With `quiet` set the
/// reader gets no text, but entries are deleted exactly as they would be
/// otherwise.
pub fn clean_with_config<S, T>(
    store: Arc<S>,
    req: S::Request,
    categories: &[T],
    quiet: bool,
    config: &CleanConfig,
) -> ProgressReader
where
    S: Filestore,
    T: AsRef<str>,
{
    let tokens: Vec<String> = categories.iter().map(|c| c.as_ref().to_string()).collect();
    let config = config.clone();
    let (writer, reader) = progress_pipe();
    let sink: Box<dyn ProgressSink> = if quiet {
        Box::new(QuietSink::new(writer))
    } else {
        Box::new(writer)
    };

    let spawned = thread::Builder::new()
        .name("filestore-clean".into())
        .spawn(move || run_clean(store.as_ref(), &req, &tokens, sink, &config));
    if let Err(e) = spawned {
        // The sink went down with the closure; the reader reports a lost worker.
        tracing::error!(error = %e, "Failed to spawn cleanup worker");
    }

    reader
}

/// Body of the cleanup worker: resolve, run every stage, end the stream
pub fn run_clean<S, T>(
    store: &S,
    req: &S::Request,
    categories: &[T],
    mut sink: Box<dyn ProgressSink>,
    config: &CleanConfig,
) where
    S: Filestore + ?Sized,
    T: AsRef<str>,
{
    let outcome = CleanPlan::resolve(categories)
        .and_then(|plan| execute(store, req, &plan, sink.as_mut(), config));

    match outcome {
        Ok(summary) => {
            tracing::info!(
                removed = %format::format_count(summary.total_removed()),
                stages = summary.stages.len(),
                "Cleanup finished"
            );
            sink.close();
        }
        Err(err) => {
            tracing::warn!(error = %err, "Cleanup aborted");
            sink.close_with_error(err);
        }
    }
}

/// Run the active stages of a resolved plan in order.
///
/// Each stage writes its header, drains its scan, then deletes what it
/// collected before the next stage starts. The first error stops the run;
/// entries already deleted stay deleted. The sink is not closed here.
pub fn execute<S>(
    store: &S,
    req: &S::Request,
    plan: &CleanPlan,
    sink: &mut dyn ProgressSink,
    config: &CleanConfig,
) -> Result<CleanSummary, CleanError>
where
    S: Filestore + ?Sized,
{
    let mut summary = CleanSummary::default();

    for stage in plan.stages.active() {
        let start = Instant::now();
        tracing::debug!(%stage, "Starting stage");

        sink.write_line(&stage.header(config));
        let stream = stage.scan(store, req, config)?;
        let pending = collect_pending(stage, stream, plan)?;
        let removed = delete_pending(store, req, pending)?;

        let duration_secs = start.elapsed().as_secs_f64();
        tracing::info!(
            %stage,
            removed = %format::format_count(removed),
            took = %format::format_duration(duration_secs),
            "Stage complete"
        );
        summary.stages.push(StageReport {
            stage,
            removed,
            duration_secs,
        });
    }

    Ok(summary)
}

/// Delete collected keys one at a time, in order.
///
/// Stops at the first failure; keys after it are left alone.
pub fn delete_pending<S>(store: &S, req: &S::Request, pending: Vec<Key>) -> Result<usize, CleanError>
where
    S: Filestore + ?Sized,
{
    let total = pending.len();
    for key in pending {
        if let Err(e) = store.delete(req, &key) {
            return Err(CleanError::deletion(store.encode_for_display(&key), &e));
        }
        tracing::trace!(%key, "Deleted entry");
    }
    Ok(total)
}
