//! Append-only CSV record of every evaluated individual.
//!
//! Each row holds one `(generation, individual, fitness, params)` tuple, with `params` being
//! the flat JSON mapping also used by the best-record store:
//!
//! ```text
//! generation,individual,fitness,params
//! 0,0,112.5,"{""aggressiveness"":0.42,""retreat_threshold"":0.1}"
//! ```
//!
//! The log is for offline analysis only; nothing in the training loop reads it back.

use std::{
    fs::OpenOptions,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{error::PersistenceError, population::ScoredIndividual};

const HEADER: &str = "generation,individual,fitness,params";

/// Writer of training log rows.
pub struct TrainingLog {
    writer: Box<dyn Write>,
    path: PathBuf,
}

impl std::fmt::Debug for TrainingLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainingLog")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl TrainingLog {
    /// Opens `path` for appending, writing the header if the file is new or empty.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or the header cannot be written.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(PersistenceError::io(&path))?;
        let is_empty = file
            .metadata()
            .map_err(PersistenceError::io(&path))?
            .len()
            == 0;
        let mut log = Self {
            writer: Box::new(BufWriter::new(file)),
            path,
        };
        if is_empty {
            log.write_header()?;
        }
        Ok(log)
    }

    /// Wraps an arbitrary writer. The header is written immediately.
    ///
    /// # Errors
    ///
    /// Fails if the header cannot be written.
    pub fn from_writer(writer: Box<dyn Write>) -> Result<Self, PersistenceError> {
        let mut log = Self {
            writer,
            path: PathBuf::from("<writer>"),
        };
        log.write_header()?;
        Ok(log)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_header(&mut self) -> Result<(), PersistenceError> {
        writeln!(self.writer, "{HEADER}").map_err(PersistenceError::io(&self.path))
    }

    /// Appends one row per scored individual and flushes.
    ///
    /// # Errors
    ///
    /// Fails if a row cannot be encoded or written.
    pub fn append_generation(
        &mut self,
        generation: usize,
        scored: &[ScoredIndividual],
    ) -> Result<(), PersistenceError> {
        for (index, individual) in scored.iter().enumerate() {
            let params = serde_json::to_string(individual.params())
                .map_err(|source| PersistenceError::Encode { source })?;
            writeln!(
                self.writer,
                "{generation},{index},{},{}",
                individual.fitness(),
                quote_csv(&params)
            )
            .map_err(PersistenceError::io(&self.path))?;
        }
        self.writer.flush().map_err(PersistenceError::io(&self.path))
    }
}

fn quote_csv(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::Arc};

    use super::*;
    use crate::params::{DomainTable, ParameterVector};

    fn scored() -> Vec<ScoredIndividual> {
        let domains = Arc::new(
            DomainTable::new([("aggressiveness", 0.0, 1.0), ("retreat_threshold", 0.0, 1.0)])
                .unwrap(),
        );
        vec![
            ScoredIndividual::new(
                ParameterVector::from_values(&domains, vec![0.5, 0.25]).unwrap(),
                112.5,
                3,
            ),
            ScoredIndividual::new(
                ParameterVector::from_values(&domains, vec![1.0, 0.0]).unwrap(),
                -4.0,
                3,
            ),
        ]
    }

    #[test]
    fn test_rows_are_quoted_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let mut log = TrainingLog::open(&path).unwrap();
        log.append_generation(3, &scored()).unwrap();
        drop(log);

        let content = fs::read_to_string(&path).unwrap();
        let lines = content.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                HEADER,
                r#"3,0,112.5,"{""aggressiveness"":0.5,""retreat_threshold"":0.25}""#,
                r#"3,1,-4,"{""aggressiveness"":1.0,""retreat_threshold"":0.0}""#,
            ]
        );
    }

    #[test]
    fn test_reopening_appends_without_second_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        TrainingLog::open(&path)
            .unwrap()
            .append_generation(0, &scored())
            .unwrap();
        TrainingLog::open(&path)
            .unwrap()
            .append_generation(1, &scored())
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches(HEADER).count(), 1);
        assert_eq!(content.lines().count(), 5);
    }
}
