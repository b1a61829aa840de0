//! # Persistence Port
//!
//! Storage trait for the product catalog, with a JSON file adapter for the
//! console application and an in-memory adapter for tests.
//!
//! ```text
//! ┌───────────────────────────────────────┐
//! │        Persistence (trait)            │
//! │  ├── load()  -> Vec<Product>          │
//! │  └── save(&[Product])                 │
//! └───────────────────────────────────────┘
//!                    ▲
//!          ┌─────────┴──────────┐
//!  ┌───────┴────────┐  ┌────────┴────────┐
//!  │JsonFile        │  │Memory           │
//!  │Persistence     │  │Persistence      │
//!  └────────────────┘  └─────────────────┘
//! ```

use crate::error::{StoreError, StoreResult};
use crate::product::Product;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Storage backend for the catalog.
///
/// `load` never fails: missing or unreadable state means "start empty".
/// `save` must report failures so stock changes are never silently lost.
pub trait Persistence: Send + Sync {
    /// Read every stored product.
    fn load(&self) -> Vec<Product>;

    /// Overwrite the stored products.
    fn save(&self, products: &[Product]) -> StoreResult<()>;

    /// Short description of where the data lives (for logging).
    fn describe(&self) -> String;
}

/// Type alias for a boxed persistence backend (dynamic dispatch)
pub type BoxedPersistence = Box<dyn Persistence>;

/// Products stored as a pretty-printed JSON array on disk
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "products.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Persistence for JsonFilePersistence {
    fn load(&self) -> Vec<Product> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No catalog file, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Catalog file unreadable, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Product>>(&content) {
            Ok(products) => products,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Catalog file corrupt, starting empty");
                Vec::new()
            }
        }
    }

    fn save(&self, products: &[Product]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write aside and rename so a crash never leaves a truncated file
        let json = serde_json::to_string_pretty(products)?;
        let temp = self.temp_path();
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;

        debug!(path = %self.path.display(), count = products.len(), "Catalog saved");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    products: Vec<Product>,
    saves: usize,
    fail_saves: bool,
}

/// Shared in-memory storage.
///
/// Clones share the same state, so a test can hand one clone to the catalog
/// and keep another to inspect what was saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryPersistence {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with products
    pub fn with_products(products: Vec<Product>) -> Self {
        let storage = Self::new();
        storage.lock().products = products;
        storage
    }

    /// Make every following `save` fail (or succeed again)
    pub fn set_fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    /// Snapshot of the stored products
    pub fn stored(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    fn save(&self, products: &[Product]) -> StoreResult<()> {
        let mut state = self.lock();
        if state.fail_saves {
            return Err(StoreError::Persistence("memory storage rejected save".into()));
        }
        state.products = products.to_vec();
        state.saves += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
