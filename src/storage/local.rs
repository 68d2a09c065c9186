//! Personal bests and player preferences on top of a [`KeyValueStore`].

use std::collections::BTreeMap;

use super::{KeyValueStore, StorageError};
use crate::security::pseudo::DEFAULT_PSEUDO;

/// Key holding the JSON map `circuit -> best seconds`.
pub const RECORDS_KEY: &str = "sourisRecords";

/// Key holding the chosen pseudo.
pub const PSEUDO_KEY: &str = "sourisPseudo";

/// Key holding the last visited circuit.
pub const LAST_CIRCUIT_KEY: &str = "sourisLastCircuit";

/// Circuit shown when none was visited yet.
pub const DEFAULT_CIRCUIT: u32 = 1;

/// Per-circuit personal best times, in seconds.
#[derive(Debug, Clone)]
pub struct LocalRecords<S> {
    store: S,
}

impl<S: KeyValueStore> LocalRecords<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Every saved best time.
    pub fn all(&self) -> Result<BTreeMap<u32, f64>, StorageError> {
        match self.store.get(RECORDS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(BTreeMap::new()),
        }
    }

    fn write(&self, records: &BTreeMap<u32, f64>) -> Result<(), StorageError> {
        self.store.set(RECORDS_KEY, &serde_json::to_string(records)?)
    }

    /// Best time for `circuit`, if any.
    pub fn get(&self, circuit: u32) -> Result<Option<f64>, StorageError> {
        Ok(self.all()?.get(&circuit).copied())
    }

    /// Save `seconds` if it strictly beats the current best.
    ///
    /// Returns whether it was a new personal best.
    pub fn save(&self, circuit: u32, seconds: f64) -> Result<bool, StorageError> {
        if !seconds.is_finite() {
            return Ok(false);
        }
        let mut records = self.all()?;
        let previous = records.get(&circuit).copied().unwrap_or(f64::INFINITY);
        if seconds >= previous {
            return Ok(false);
        }
        records.insert(circuit, seconds);
        self.write(&records)?;
        Ok(true)
    }

    /// Forget the best time of one circuit. Returns whether one existed.
    pub fn delete(&self, circuit: u32) -> Result<bool, StorageError> {
        let mut records = self.all()?;
        if records.remove(&circuit).is_none() {
            return Ok(false);
        }
        self.write(&records)?;
        Ok(true)
    }

    /// Forget every best time.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.write(&BTreeMap::new())
    }
}

/// Pseudo and last-circuit preferences.
#[derive(Debug, Clone)]
pub struct UserPreferences<S> {
    store: S,
}

impl<S: KeyValueStore> UserPreferences<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Saved pseudo, or `Anonyme`.
    pub fn pseudo(&self) -> Result<String, StorageError> {
        Ok(self
            .store
            .get(PSEUDO_KEY)?
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PSEUDO.to_string()))
    }

    /// Remember the pseudo.
    pub fn set_pseudo(&self, pseudo: &str) -> Result<(), StorageError> {
        self.store.set(PSEUDO_KEY, pseudo)
    }

    /// Last visited circuit, or circuit 1.
    pub fn last_circuit(&self) -> Result<u32, StorageError> {
        Ok(self
            .store
            .get(LAST_CIRCUIT_KEY)?
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_CIRCUIT))
    }

    /// Remember the last visited circuit.
    pub fn set_last_circuit(&self, circuit: u32) -> Result<(), StorageError> {
        self.store.set(LAST_CIRCUIT_KEY, &circuit.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    #[test]
    fn test_only_strictly_better_times_are_saved() {
        let records = LocalRecords::new(MemoryStorage::new());
        assert_eq!(records.get(3).unwrap(), None);

        assert!(records.save(3, 12.5).unwrap());
        assert!(!records.save(3, 12.5).unwrap());
        assert!(!records.save(3, 14.0).unwrap());
        assert!(records.save(3, 11.25).unwrap());
        assert!(!records.save(3, f64::NAN).unwrap());

        assert_eq!(records.get(3).unwrap(), Some(11.25));
    }

    #[test]
    fn test_delete_and_clear() {
        let records = LocalRecords::new(MemoryStorage::new());
        records.save(1, 5.0).unwrap();
        records.save(2, 6.0).unwrap();
        assert_eq!(records.all().unwrap().len(), 2);

        assert!(records.delete(1).unwrap());
        assert!(!records.delete(1).unwrap());
        assert_eq!(records.get(2).unwrap(), Some(6.0));

        records.clear().unwrap();
        assert!(records.all().unwrap().is_empty());
    }

    #[test]
    fn test_records_stored_as_json_map() {
        let store = Arc::new(MemoryStorage::new());
        let records = LocalRecords::new(store.clone());
        records.save(7, 9.5).unwrap();
        assert_eq!(store.get(RECORDS_KEY).unwrap().as_deref(), Some(r#"{"7":9.5}"#));
    }

    #[test]
    fn test_preference_defaults() {
        let prefs = UserPreferences::new(MemoryStorage::new());
        assert_eq!(prefs.pseudo().unwrap(), "Anonyme");
        assert_eq!(prefs.last_circuit().unwrap(), 1);

        prefs.set_pseudo("Alice").unwrap();
        prefs.set_last_circuit(12).unwrap();
        assert_eq!(prefs.pseudo().unwrap(), "Alice");
        assert_eq!(prefs.last_circuit().unwrap(), 12);
    }

    #[test]
    fn test_unparseable_last_circuit_falls_back() {
        let store = Arc::new(MemoryStorage::new());
        store.set(LAST_CIRCUIT_KEY, "abc").unwrap();
        let prefs = UserPreferences::new(store);
        assert_eq!(prefs.last_circuit().unwrap(), DEFAULT_CIRCUIT);
    }
}
