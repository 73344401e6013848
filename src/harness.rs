//! Determinism harness: runs the same sheet repeatedly, optionally across
//! worker threads, and compares output and run-log hashes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::grid::SheetData;
use crate::lexicon::Similarity;
use crate::pipeline::Pipeline;
use crate::types::ContentHash;

pub const DEFAULT_REPETITIONS: usize = 10;
pub const DEFAULT_WORKER_COUNTS: [usize; 3] = [1, 4, 12];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
}

/// Hashes observed for one (sheet, worker count) combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashManifest {
    pub input_hash: ContentHash,
    /// Output hash of run 0; every other run is compared against it.
    pub output_hash: ContentHash,
    pub run_log_hash: ContentHash,
    pub runs: usize,
    pub workers: usize,
    pub verdict: Verdict,
    /// Runs whose output or run-log hash differs from run 0.
    pub divergent_runs: Vec<usize>,
    pub created_at: DateTime<Utc>, // informational only
}

impl HashManifest {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }
}

/// One manifest per worker count. Passes only when every manifest passes
/// and all of them agree on the output hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerReport {
    pub manifests: Vec<HashManifest>,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    input_hash: ContentHash,
    output_hash: ContentHash,
    run_log_hash: ContentHash,
}

pub struct DeterminismHarness<'p, S> {
    pipeline: &'p Pipeline<S>,
    repetitions: usize,
}

impl<'p, S> DeterminismHarness<'p, S>
where
    S: Similarity,
{
    pub fn new(pipeline: &'p Pipeline<S>) -> Self {
        Self {
            pipeline,
            repetitions: DEFAULT_REPETITIONS,
        }
    }

    /// At least one run is always made.
    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions.max(1);
        self
    }

    /// Sequential runs on the calling thread.
    pub fn verify(&self, sheet: &SheetData) -> Result<HashManifest, PipelineError> {
        let fingerprints = (0..self.repetitions)
            .map(|_| self.fingerprint(sheet))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.manifest(fingerprints, 1))
    }

    /// Runs spread round-robin over `workers` scoped threads, once per entry
    /// of `worker_counts`. A zero count is treated as one worker.
    pub fn verify_across_workers(
        &self,
        sheet: &SheetData,
        worker_counts: &[usize],
    ) -> Result<WorkerReport, PipelineError> {
        let mut manifests = Vec::with_capacity(worker_counts.len());
        for &workers in worker_counts {
            let workers = workers.max(1);
            let total = self.repetitions.max(workers);

            let mut results: Vec<(usize, Result<Fingerprint, PipelineError>)> =
                std::thread::scope(|scope| {
                    let handles: Vec<_> = (0..workers)
                        .map(|worker| {
                            scope.spawn(move || {
                                (worker..total)
                                    .step_by(workers)
                                    .map(|run| (run, self.fingerprint(sheet)))
                                    .collect::<Vec<_>>()
                            })
                        })
                        .collect();

                    handles
                        .into_iter()
                        .flat_map(|handle| match handle.join() {
                            Ok(runs) => runs,
                            Err(payload) => std::panic::resume_unwind(payload),
                        })
                        .collect()
                });
            results.sort_by_key(|(run, _)| *run);

            let fingerprints = results
                .into_iter()
                .map(|(_, fingerprint)| fingerprint)
                .collect::<Result<Vec<_>, _>>()?;
            manifests.push(self.manifest(fingerprints, workers));
        }

        let agreed = manifests
            .windows(2)
            .all(|pair| pair[0].output_hash == pair[1].output_hash);
        let verdict = if agreed && manifests.iter().all(HashManifest::passed) {
            Verdict::Pass
        } else {
            Verdict::Fail
        };
        if verdict == Verdict::Fail {
            warn!(
                "DeterminismHarness: output differs across worker counts {:?}",
                worker_counts
            );
        }

        Ok(WorkerReport { manifests, verdict })
    }

    fn fingerprint(&self, sheet: &SheetData) -> Result<Fingerprint, PipelineError> {
        let output = self.pipeline.run(sheet)?;
        Ok(Fingerprint {
            input_hash: output.input_hash,
            output_hash: output.content_hash,
            run_log_hash: output.run_log.hash()?,
        })
    }

    /// `fingerprints` is never empty: both callers make at least one run.
    fn manifest(&self, fingerprints: Vec<Fingerprint>, workers: usize) -> HashManifest {
        let runs = fingerprints.len();
        let mut iter = fingerprints.into_iter();
        let first = iter.next();

        let divergent_runs: Vec<usize> = match &first {
            Some(first) => iter
                .enumerate()
                .filter(|(_, f)| f != first)
                .map(|(i, _)| i + 1)
                .collect(),
            None => Vec::new(),
        };
        let verdict = if first.is_some() && divergent_runs.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail
        };

        let Fingerprint {
            input_hash,
            output_hash,
            run_log_hash,
        } = first.unwrap_or_else(|| Fingerprint {
            input_hash: ContentHash::from_bytes(b""),
            output_hash: ContentHash::from_bytes(b""),
            run_log_hash: ContentHash::from_bytes(b""),
        });

        match verdict {
            Verdict::Pass => info!(
                "DeterminismHarness: runs={} workers={} output_hash={} verdict=pass",
                runs, workers, output_hash
            ),
            Verdict::Fail => warn!(
                "DeterminismHarness: runs={} workers={} divergent_runs={:?} verdict=fail",
                runs, workers, divergent_runs
            ),
        }

        HashManifest {
            input_hash,
            output_hash,
            run_log_hash,
            runs,
            workers,
            verdict,
            divergent_runs,
            created_at: Utc::now(),
        }
    }
}
