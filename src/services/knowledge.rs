use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;

use crate::models::{Catalog, IntentsFile, KnowledgeBase, PatternTable, Schedule};

pub const PRODUCTS_FILE: &str = "products.json";
pub const SCHEDULE_FILE: &str = "schedule.json";
pub const INTENTS_FILE: &str = "intents.json";

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
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
        source: serde_json::Error,
    },
}

/// Everything read from the data directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedKnowledge {
    pub kb: Arc<KnowledgeBase>,
    pub patterns: Arc<PatternTable>,
}

/// Reads the data directory at most once per loader. Concurrent first callers
/// block on the same initialisation and all see the finished value.
#[derive(Debug)]
pub struct KnowledgeLoader {
    dir: PathBuf,
    cell: OnceLock<LoadedKnowledge>,
    loads: AtomicUsize,
}

impl KnowledgeLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cell: OnceLock::new(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn get(&self) -> &LoadedKnowledge {
        self.cell.get_or_init(|| {
            self.loads.fetch_add(1, Ordering::SeqCst);
            load_dir(&self.dir)
        })
    }

    /// Number of times the directory was actually read.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

/// Loads the three data files. A missing or malformed file is logged and
/// replaced by its default; the others still load.
pub fn load_dir(dir: &Path) -> LoadedKnowledge {
    let catalog: Catalog = read_or_default(&dir.join(PRODUCTS_FILE));
    let schedule: Schedule = read_or_default(&dir.join(SCHEDULE_FILE));

    let patterns = match read_json::<IntentsFile>(&dir.join(INTENTS_FILE)) {
        Ok(file) => PatternTable::from_file(file),
        Err(e) => {
            tracing::warn!(error = %e, "using built-in intent patterns");
            PatternTable::builtin()
        }
    };

    tracing::info!(
        services = catalog.services.len(),
        intents = patterns.len(),
        has_hours = schedule.business_hours.is_some(),
        "knowledge base loaded"
    );

    LoadedKnowledge {
        kb: Arc::new(KnowledgeBase { catalog, schedule }),
        patterns: Arc::new(patterns),
    }
}

fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    read_json(path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to empty data");
        T::default()
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, KnowledgeError> {
    let raw = fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| KnowledgeError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
