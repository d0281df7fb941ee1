//! Run orchestration
//!
//! One run: index the library and resolve playlist references concurrently,
//! classify once both complete, then execute (or preview) the quarantine
//! moves. Fatal errors in either read phase stop the run before any mutation;
//! classification never sees an incomplete reference set. Every run
//! recomputes all state from the current filesystem, and an interrupted or
//! partially failed run is resumed by simply running again.

use crate::config::Config;
use crate::services::duplicate_classifier;
use crate::services::library_indexer::LibraryIndexer;
use crate::services::playlist_reader::PlaylistReader;
use crate::services::quarantine_executor::QuarantineExecutor;
use crate::types::{MoveOutcome, QuarantineRecord, RunSummary};
use crate::{Error, Result};
use tracing::info;

/// Pipeline for one engine run
pub struct Pipeline {
    config: Config,
    dry_run: bool,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            dry_run: false,
        }
    }

    /// Preview mode: classify and assign destinations but move nothing.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Execute the full pipeline and return the run summary.
    pub async fn run(&self) -> Result<RunSummary> {
        // The walk and the playlist read are independent and read-only; run
        // them side by side and join before classification.
        let indexer = LibraryIndexer::new().with_excluded_dir(&self.config.quarantine_dir);
        let library_root = self.config.library_root.clone();
        let index_task = tokio::task::spawn_blocking(move || indexer.index(&library_root));

        let reader = PlaylistReader::new(&self.config.library_root, &self.config.playlists_root);
        let resolve_task = tokio::task::spawn_blocking(move || reader.resolve());

        let (groups, referenced) = tokio::try_join!(
            async { index_task.await.map_err(join_error)?.map_err(Error::from) },
            async { resolve_task.await.map_err(join_error)?.map_err(Error::from) },
        )?;

        info!(
            groups = groups.len(),
            references = referenced.len(),
            "Index and reference resolution complete"
        );

        let classifications =
            duplicate_classifier::classify(&groups, &referenced, &self.config.library_root);

        let mut protected_total = 0usize;
        let mut candidates = Vec::new();
        for result in classifications.values() {
            protected_total += result.protected.len();
            candidates.extend(result.removable.iter().cloned());
        }
        let removable_total = candidates.len();

        info!(
            protected = protected_total,
            removable = removable_total,
            dry_run = self.dry_run,
            "Classification complete"
        );

        let executor = QuarantineExecutor::new(&self.config.quarantine_dir);
        let records: Vec<QuarantineRecord> = if self.dry_run {
            executor
                .plan(&candidates)
                .into_iter()
                .map(|(path, destination)| QuarantineRecord {
                    path,
                    destination,
                    outcome: MoveOutcome::Planned,
                })
                .collect()
        } else {
            tokio::task::spawn_blocking(move || executor.execute(&candidates))
                .await
                .map_err(join_error)??
        };

        let moved = records.iter().filter(|r| r.is_moved()).count();
        let failed = records.iter().filter(|r| r.is_failed()).count();

        info!(moved, failed, "Run complete");

        Ok(RunSummary {
            groups: groups.len(),
            referenced_entries: referenced.len(),
            protected: protected_total,
            removable: removable_total,
            moved,
            failed,
            dry_run: self.dry_run,
            records,
        })
    }
}

fn join_error(e: tokio::task::JoinError) -> Error {
    Error::Internal(format!("Worker task failed: {e}"))
}
