use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::configuration::{ConfigDocument, Configuration};
use crate::error::Result;

/// Holds the single process-wide [`Configuration`] behind a lock-free snapshot and
/// persists every change atomically to `path`.
///
/// Readers (the proxy controller, the dispatch queue) take a cheap `Arc` snapshot via
/// [`ConfigStore::current`] and never block a writer; the admin surface is the only
/// writer and always goes through [`ConfigStore::update`].
pub struct ConfigStore {
    path: PathBuf,
    current: ArcSwap<Configuration>,
}

impl ConfigStore {
    /// Load the configuration document at `path` if it exists, otherwise persist and
    /// use `bootstrap`.
    pub fn load(path: impl Into<PathBuf>, bootstrap: Configuration) -> Result<Self> {
        let path = path.into();

        let config = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let doc: ConfigDocument = serde_json::from_str(&raw)?;
            log::info!("loaded existing configuration document from {}", path.display());
            Configuration::from_document(doc)?
        } else {
            log::info!("no configuration document found at {}, bootstrapping", path.display());
            bootstrap
        };

        let store = Self {
            path,
            current: ArcSwap::new(Arc::new(config)),
        };
        store.persist(&store.current.load())?;
        Ok(store)
    }

    /// Current configuration snapshot. Cheap, wait-free, safe to call from any task.
    pub fn current(&self) -> Arc<Configuration> {
        self.current.load_full()
    }

    /// Apply `mutate` to a clone of the current configuration, persist the result, then
    /// publish it as the new snapshot. Returns the updated snapshot.
    pub fn update<F>(&self, mutate: F) -> Result<Arc<Configuration>>
    where
        F: FnOnce(&mut Configuration) -> Result<()>,
    {
        let mut next = (**self.current.load()).clone();
        mutate(&mut next)?;
        self.persist(&next)?;

        let next = Arc::new(next);
        self.current.store(next.clone());
        Ok(next)
    }

    fn persist(&self, config: &Configuration) -> Result<()> {
        write_atomic(&self.path, &config.to_document())
    }
}

fn write_atomic(path: &Path, document: &ConfigDocument) -> Result<()> {
    let body = serde_json::to_vec_pretty(document)?;
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(&temp_path, &body)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::random_hex_token;

    fn bootstrap() -> Configuration {
        Configuration::new(
            "https://generativelanguage.googleapis.com/v1beta".to_string(),
            "upstream-secret".to_string(),
            "gemini-2.0-flash".to_string(),
            random_hex_token(32),
            "bootstrap-password".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn bootstraps_and_persists_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let store = ConfigStore::load(&path, bootstrap()).unwrap();
        assert!(path.exists());
        assert_eq!(store.current().default_model, "gemini-2.0-flash");
    }

    #[test]
    fn reloads_persisted_document_on_next_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let store = ConfigStore::load(&path, bootstrap()).unwrap();
        store
            .update(|c| {
                c.default_model = "gemini-2.5-pro".to_string();
                Ok(())
            })
            .unwrap();

        let reloaded = ConfigStore::load(&path, bootstrap()).unwrap();
        assert_eq!(reloaded.current().default_model, "gemini-2.5-pro");
    }

    #[test]
    fn update_rejects_invalid_patch_without_mutating_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = ConfigStore::load(&path, bootstrap()).unwrap();

        let result = store.update(|c| {
            c.apply_patch(crate::configuration::ConfigPatch {
                upstream_base_url: Some("http://insecure.example".to_string()),
                upstream_api_key: None,
                default_model: None,
            })
        });

        assert!(result.is_err());
        assert_eq!(
            store.current().upstream_base_url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta"
        );
    }
}
