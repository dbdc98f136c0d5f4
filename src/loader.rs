use crate::record::{PersonRecord, RecordError, parse_records};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: RecordError,
    },
}

/// Result of loading all requested sources. Successful sources keep their
/// requested order; failures are surfaced per source rather than aborting
/// the whole load.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub sources: Vec<Vec<PersonRecord>>,
    pub failures: Vec<SourceError>,
}

/// Reads and parses every source concurrently, one thread per file, and
/// joins on a counting barrier: the outcome is assembled only once every
/// read has reported in. Results are slotted by request index, so the
/// downstream merge is insensitive to which file finishes first.
pub fn load_sources(paths: &[PathBuf]) -> LoadOutcome {
    let mut slots: Vec<Option<Result<Vec<PersonRecord>, SourceError>>> =
        (0..paths.len()).map(|_| None).collect();

    thread::scope(|scope| {
        let (tx, rx) = mpsc::channel();
        for (index, path) in paths.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move || {
                let _ = tx.send((index, load_one(path)));
            });
        }
        drop(tx);
        for (index, result) in rx.iter().take(paths.len()) {
            slots[index] = Some(result);
        }
    });

    let mut outcome = LoadOutcome::default();
    for slot in slots.into_iter().flatten() {
        match slot {
            Ok(records) => outcome.sources.push(records),
            Err(error) => outcome.failures.push(error),
        }
    }
    outcome
}

fn load_one(path: &Path) -> Result<Vec<PersonRecord>, SourceError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&contents).map_err(|source| SourceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
