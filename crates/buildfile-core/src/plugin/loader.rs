use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use crate::context::Context;

use super::{ArtifactOpener, LoadedPlugin, NativeOpener, PluginError};

lazy_static! {
    static ref SHARED_LOADER: Arc<PluginLoader> = Arc::new(PluginLoader::new());
}

struct CacheEntry {
    /// `None` when the artifact could not be stat'ed
    modified: Option<SystemTime>,
    outcome: Result<Arc<LoadedPlugin>, PluginError>,
}

struct LoaderState<O> {
    opener: O,
    entries: HashMap<PathBuf, CacheEntry>,
}

/// Loads custom validators and caches them by artifact path and mtime.
///
/// A cached instance or failure is reused as long as the artifact's
/// modification time is unchanged. Any change triggers exactly one reload;
/// the superseded entry is dropped only once its replacement is stored. The
/// whole lookup, load and replace sequence runs under one lock.
pub struct PluginLoader<O: ArtifactOpener = NativeOpener> {
    state: Mutex<LoaderState<O>>,
}

impl PluginLoader<NativeOpener> {
    pub fn new() -> Self {
        Self::with_opener(NativeOpener::default())
    }

    /// Process-wide loader for long-lived hosts
    pub fn shared() -> Arc<PluginLoader> {
        SHARED_LOADER.clone()
    }
}

impl Default for PluginLoader<NativeOpener> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: ArtifactOpener> PluginLoader<O> {
    pub fn with_opener(opener: O) -> Self {
        Self { state: Mutex::new(LoaderState { opener, entries: HashMap::new() }) }
    }

    pub fn load(&self, path: &Path, ctx: &Context) -> Result<Arc<LoadedPlugin>, PluginError> {
        let key = normalize_path(path);
        let modified = modified_time(&key);

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = state.entries.get(&key) {
            if entry.modified == modified {
                return entry.outcome.clone();
            }
            ctx.try_info(format!("Custom validator {} changed, reloading", key.display()));
        }

        let outcome = if modified.is_none() && !key.exists() {
            Err(PluginError::Missing(key.clone()))
        } else {
            state
                .opener
                .open(&key)
                .and_then(|artifact| LoadedPlugin::instantiate(&key, artifact))
                .map(Arc::new)
        };

        if let Ok(plugin) = &outcome {
            ctx.try_info(format!(
                "Loaded custom validator {} from {} ({} checks)",
                plugin.entry_point(),
                key.display(),
                plugin.checks().len()
            ));
        }

        let previous =
            state.entries.insert(key.clone(), CacheEntry { modified, outcome: outcome.clone() });
        if let Some(CacheEntry { outcome: Ok(plugin), .. }) = previous {
            ctx.try_info(format!("Releasing custom validator {}", plugin.entry_point()));
            drop(plugin);
        }
        outcome
    }

    /// Drops the cache entry for `path`; the next load starts from scratch.
    pub fn forget(&self, path: &Path) -> bool {
        let key = normalize_path(path);
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.entries.remove(&key).is_some()
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        let key = normalize_path(path);
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.entries.contains_key(&key)
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|metadata| metadata.modified()).ok()
}

/// Absolute form of `path` with `.` and `..` folded away, without touching
/// the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
