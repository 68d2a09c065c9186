//! Leaderboard Service
//!
//! Verifies signed submissions and maintains one ordered top-10 list per
//! circuit. Every read-modify-write on a circuit runs under that circuit's
//! lock, so concurrent submissions never lose updates.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::record::ScoreRecord;
use super::store::{RecordStore, StoreError};
use crate::security::pseudo::{validate_pseudo, PseudoError};
use crate::security::signature::check_submission;

/// Maximum entries kept per circuit.
pub const LEADERBOARD_SIZE: usize = 10;

/// Leaderboard errors.
///
/// A bad signature or sentinel chrono is not an error: it yields an
/// unaccepted [`SubmitOutcome`].
#[derive(Debug, Error)]
pub enum LeaderboardError {
    /// Request is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PseudoError> for LeaderboardError {
    fn from(e: PseudoError) -> Self {
        LeaderboardError::InvalidInput(e.to_string())
    }
}

/// Result of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Whether the score entered the list
    pub accepted: bool,
    /// 1-based position of the new entry when accepted
    pub rank: Option<usize>,
    /// Current list after the submission
    pub records: Vec<ScoreRecord>,
}

/// Insert `record` into an ascending list and cap it at [`LEADERBOARD_SIZE`].
///
/// The new entry goes before the first entry that is not strictly better,
/// so it beats existing ties. Returns its 1-based rank, or `None` (list
/// untouched) when it would land past the cap.
pub fn insert_ranked(records: &mut Vec<ScoreRecord>, record: ScoreRecord) -> Option<usize> {
    let index = records
        .iter()
        .position(|r| r.centiseconds >= record.centiseconds)
        .unwrap_or(records.len());
    if index >= LEADERBOARD_SIZE {
        return None;
    }
    records.insert(index, record);
    records.truncate(LEADERBOARD_SIZE);
    Some(index + 1)
}

/// Leaderboard over a record store.
pub struct Leaderboard<S> {
    store: S,
    locks: Mutex<BTreeMap<u32, Arc<Mutex<()>>>>,
}

impl<S: RecordStore> Leaderboard<S> {
    /// Create a leaderboard over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Mutex::new(BTreeMap::new()),
        }
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run `f` under the lock of `circuit`.
    ///
    /// Entries are created on demand and dropped once no caller holds them,
    /// so the registry only holds circuits with requests in flight.
    fn with_circuit_lock<R>(&self, circuit: u32, f: impl FnOnce() -> R) -> R {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(circuit).or_default().clone()
        };

        let result = {
            let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
            f()
        };
        drop(lock);

        // Clones are only taken under the registry lock, so a count of one
        // here means nobody else is waiting on this circuit.
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks.get(&circuit).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(&circuit);
        }
        result
    }

    /// Stored list, sorted ascending and capped at [`LEADERBOARD_SIZE`].
    ///
    /// Hand-edited or legacy files may hold more entries or be out of order.
    fn load_ranked(&self, circuit: u32) -> Result<Vec<ScoreRecord>, StoreError> {
        let mut records = self.store.load(circuit)?;
        records.sort_by_key(|r| r.centiseconds);
        records.truncate(LEADERBOARD_SIZE);
        Ok(records)
    }

    /// Current ordered list for `circuit` (empty if none stored yet).
    pub fn get(&self, circuit: u32) -> Result<Vec<ScoreRecord>, LeaderboardError> {
        validate_circuit(circuit)?;
        Ok(self.with_circuit_lock(circuit, || self.load_ranked(circuit))?)
    }

    /// Submit a signed score.
    ///
    /// `chrono_centiseconds <= 0` counts as the unset sentinel. Rejected
    /// submissions return the unchanged list without saying why.
    #[instrument(skip(self, pseudo, token, key))]
    pub fn submit(
        &self,
        circuit: u32,
        pseudo: &str,
        chrono_centiseconds: i64,
        token: &str,
        key: &str,
    ) -> Result<SubmitOutcome, LeaderboardError> {
        validate_circuit(circuit)?;
        let pseudo = validate_pseudo(pseudo)?;
        self.with_circuit_lock(circuit, || self.submit_locked(circuit, pseudo, chrono_centiseconds, token, key))
    }

    fn submit_locked(
        &self,
        circuit: u32,
        pseudo: String,
        chrono_centiseconds: i64,
        token: &str,
        key: &str,
    ) -> Result<SubmitOutcome, LeaderboardError> {
        let mut records = self.load_ranked(circuit)?;

        let centiseconds = match check_submission(chrono_centiseconds, token, key) {
            Ok(c) => c,
            Err(rejection) => {
                debug!(circuit, %rejection, "submission not inserted");
                return Ok(SubmitOutcome {
                    accepted: false,
                    rank: None,
                    records,
                });
            }
        };

        let rank = insert_ranked(&mut records, ScoreRecord::new(pseudo, centiseconds));
        match rank {
            Some(rank) => {
                self.store.save(circuit, &records)?;
                info!(circuit, rank, centiseconds, "new leaderboard entry");
            }
            None => debug!(circuit, centiseconds, "score outside top list"),
        }

        Ok(SubmitOutcome {
            accepted: rank.is_some(),
            rank,
            records,
        })
    }
}

fn validate_circuit(circuit: u32) -> Result<(), LeaderboardError> {
    if circuit == 0 {
        return Err(LeaderboardError::InvalidInput("circuit must be a positive integer".into()));
    }
    Ok(())
}
