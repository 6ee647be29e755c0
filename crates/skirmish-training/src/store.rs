//! Durable storage of the best parameter vector found so far.
//!
//! The record is a flat JSON document mapping every parameter name to its value:
//!
//! ```json
//! {
//!   "retreat_threshold": 0.31,
//!   "shoot_accuracy": 12.4
//! }
//! ```
//!
//! A run has at most one writer per store target. Writes replace the previous record
//! atomically from a reader's point of view: the document is written to a temporary file in
//! the same directory and then renamed over the target.

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
    sync::Arc,
};

use rand::Rng;

use crate::{
    error::PersistenceError,
    params::{DomainTable, ParameterVector},
};

/// Where the best record of a run is kept.
pub trait BestSolutionStore {
    /// Replaces the stored record with `params`.
    ///
    /// # Errors
    ///
    /// Fails if the record could not be written; the previous record is then left intact.
    fn persist(&mut self, params: &ParameterVector) -> Result<(), PersistenceError>;

    /// Returns the stored record, or `None` if there is none or it does not match the
    /// domain table exactly.
    fn load(&self) -> Option<ParameterVector>;
}

/// A [`BestSolutionStore`] backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    domains: Arc<DomainTable>,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, domains: Arc<DomainTable>) -> Self {
        Self {
            path: path.into(),
            domains,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map_or_else(|| "best".into(), |n| n.to_string_lossy().into_owned());
        self.path.with_file_name(format!(".{file_name}.tmp"))
    }

    fn read_record(&self) -> Option<BTreeMap<String, f64>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to open best record: {e}");
                return None;
            }
        };
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "ignoring malformed best record: {e}");
                None
            }
        }
    }

    /// Loads the stored record leniently.
    ///
    /// Known parameters are taken from the file (clamped into their domains), missing ones
    /// are sampled at random and unknown ones are ignored. Without a readable file the result
    /// is entirely random.
    pub fn load_merged<R>(&self, rng: &mut R) -> ParameterVector
    where
        R: Rng + ?Sized,
    {
        match self.read_record() {
            Some(record) => ParameterVector::merge_from_map(&self.domains, &record, rng),
            None => ParameterVector::sample_random(&self.domains, rng),
        }
    }
}

impl BestSolutionStore for JsonFileStore {
    fn persist(&mut self, params: &ParameterVector) -> Result<(), PersistenceError> {
        let temp_path = self.temp_path();
        let write_temp = || -> Result<(), PersistenceError> {
            let file = File::create(&temp_path).map_err(PersistenceError::io(&temp_path))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, params)
                .map_err(|source| PersistenceError::Encode { source })?;
            writeln!(writer).map_err(PersistenceError::io(&temp_path))?;
            let file = writer
                .into_inner()
                .map_err(|e| PersistenceError::io(&temp_path)(e.into_error()))?;
            file.sync_all().map_err(PersistenceError::io(&temp_path))?;
            Ok(())
        };
        let result = write_temp().and_then(|()| {
            fs::rename(&temp_path, &self.path).map_err(PersistenceError::io(&self.path))
        });
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    fn load(&self) -> Option<ParameterVector> {
        let record = self.read_record()?;
        match ParameterVector::from_map(&self.domains, &record) {
            Ok(params) => Some(params),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "ignoring malformed best record: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn domains() -> Arc<DomainTable> {
        Arc::new(
            DomainTable::new([
                ("retreat_threshold", 0.0, 1.0),
                ("distance_weight", 0.1, 5.0),
                ("aggressiveness", 0.0, 1.0),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_persist_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let domains = domains();
        let mut store = JsonFileStore::new(dir.path().join("best.json"), Arc::clone(&domains));
        let mut rng = Pcg64Mcg::seed_from_u64(17);

        assert!(store.load().is_none());
        for _ in 0..20 {
            let params = ParameterVector::sample_random(&domains, &mut rng);
            store.persist(&params).unwrap();
            assert_eq!(store.load(), Some(params));
        }
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_load_rejects_malformed_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best.json");
        let store = JsonFileStore::new(&path, domains());

        fs::write(&path, "not json").unwrap();
        assert!(store.load().is_none());

        fs::write(&path, r#"{ "retreat_threshold": 0.5 }"#).unwrap();
        assert!(store.load().is_none());

        fs::write(
            &path,
            r#"{ "retreat_threshold": 0.5, "distance_weight": 1.0, "aggressiveness": 0.2, "extra": 1.0 }"#,
        )
        .unwrap();
        assert!(store.load().is_none());

        fs::write(
            &path,
            r#"{ "retreat_threshold": 0.5, "distance_weight": "far", "aggressiveness": 0.2 }"#,
        )
        .unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_load_merged_keeps_known_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best.json");
        let store = JsonFileStore::new(&path, domains());
        let mut rng = Pcg64Mcg::seed_from_u64(3);

        let random = store.load_merged(&mut rng);
        assert!(random.is_within_domains());

        fs::write(&path, r#"{ "distance_weight": 2.5, "extra": 9.0 }"#).unwrap();
        let merged = store.load_merged(&mut rng);
        assert_eq!(merged.get("distance_weight"), Some(2.5));
        assert!(merged.is_within_domains());
    }

    #[test]
    fn test_persist_reports_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let domains = domains();
        let mut rng = Pcg64Mcg::seed_from_u64(8);
        let params = ParameterVector::sample_random(&domains, &mut rng);

        let mut store = JsonFileStore::new(dir.path().join("missing/best.json"), domains);
        assert!(matches!(
            store.persist(&params),
            Err(PersistenceError::Io { .. })
        ));
    }

    #[test]
    fn test_failed_persist_keeps_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let domains = domains();
        let mut rng = Pcg64Mcg::seed_from_u64(10);
        let first = ParameterVector::sample_random(&domains, &mut rng);
        let second = ParameterVector::sample_random(&domains, &mut rng);

        let path = dir.path().join("best.json");
        let mut store = JsonFileStore::new(&path, domains);
        store.persist(&first).unwrap();

        // a directory in place of the temporary file makes the next write fail
        let temp_path = dir.path().join(".best.json.tmp");
        fs::create_dir(&temp_path).unwrap();
        assert!(matches!(
            store.persist(&second),
            Err(PersistenceError::Io { .. })
        ));

        assert_eq!(store.load(), Some(first));
        assert!(temp_path.is_dir());
        assert_eq!(fs::read_dir(&temp_path).unwrap().count(), 0);
        let mut entries = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect::<Vec<_>>();
        entries.sort();
        assert_eq!(entries, [".best.json.tmp", "best.json"]);
    }
}
