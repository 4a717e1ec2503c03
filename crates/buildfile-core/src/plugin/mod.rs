//! Custom validator plugins: loading, caching and the loaded instance.

mod loader;
mod native;

use std::any::Any;
use std::path::{Path, PathBuf};

use buildfile_kit::plugin::{
    CheckSpecification, ConstructedValidator, CustomValidator, PluginManifest,
};
use buildfile_kit::KIT_VERSION;

pub use loader::{normalize_path, PluginLoader};
pub use native::NativeOpener;

/// Why a custom validator could not be loaded.
///
/// Cloneable so that a cached failure is handed back unchanged on every call
/// until the artifact changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginError {
    #[error("custom validator not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("unable to open custom validator {}: {message}", path.display())]
    Open { path: PathBuf, message: String },

    #[error("{} does not export a validator manifest: {message}", path.display())]
    MissingManifest { path: PathBuf, message: String },

    #[error("{} was built against buildfile-kit {found}, this engine uses {expected}", path.display())]
    IncompatibleKit { path: PathBuf, found: String, expected: String },

    #[error("unable to instantiate {entry_point}: {message}")]
    Instantiation { entry_point: String, message: String },
}

/// What an [`ArtifactOpener`] hands back for one artifact.
pub struct OpenedArtifact {
    pub manifest: PluginManifest,
    /// Keeps the artifact's code mapped. Dropped only after everything built
    /// from the manifest.
    pub guard: Box<dyn Any + Send + Sync>,
}

/// Turns an artifact on disk into a manifest the loader can instantiate.
pub trait ArtifactOpener: Send {
    fn open(&mut self, path: &Path) -> Result<OpenedArtifact, PluginError>;
}

/// A successfully instantiated custom validator.
///
/// Checks and the validator run code from the artifact, so they must not be
/// kept past the last handle on this value.
pub struct LoadedPlugin {
    entry_point: String,
    name: String,
    checks: Vec<CheckSpecification>,
    _validator: Box<dyn CustomValidator>,
    // declared last: dropped after the code that lives in it
    _guard: Box<dyn Any + Send + Sync>,
}

impl LoadedPlugin {
    /// Checks the manifest against this engine and builds the validator.
    pub(crate) fn instantiate(
        path: &Path,
        artifact: OpenedArtifact,
    ) -> Result<LoadedPlugin, PluginError> {
        let OpenedArtifact { manifest, guard } = artifact;
        if manifest.kit_version != KIT_VERSION {
            return Err(PluginError::IncompatibleKit {
                path: path.to_path_buf(),
                found: manifest.kit_version.to_string(),
                expected: KIT_VERSION.to_string(),
            });
        }
        let entry_point = manifest.entry_point.to_string();

        let ConstructedValidator { name, checks, validator } = (manifest.construct)()
            .map_err(|message| PluginError::Instantiation { entry_point: entry_point.clone(), message })?;

        Ok(LoadedPlugin { entry_point, name, checks, _validator: validator, _guard: guard })
    }

    /// Fully qualified name of the plugin's entry-point type
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn checks(&self) -> &[CheckSpecification] {
        &self.checks
    }
}

impl std::fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("entry_point", &self.entry_point)
            .field("name", &self.name)
            .field("checks", &self.checks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory artifacts for exercising the loader without a dynamic library.

    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use buildfile_kit::plugin::{
        construct, CheckSpecification, CustomValidator, NodeKind, PluginManifest,
    };
    use buildfile_kit::types::{DeploymentStatement, Diagnostic};
    use buildfile_kit::KIT_VERSION;

    use super::{ArtifactOpener, OpenedArtifact, PluginError};

    /// Flags every deployment under `/tmp`, fails on `/fail`, panics on `/panic`.
    #[derive(Default)]
    pub struct TmpGuard;

    impl CustomValidator for TmpGuard {
        fn checks(&self) -> Vec<CheckSpecification> {
            vec![
                CheckSpecification::typed("noPanic", |statement: &DeploymentStatement, _sink| {
                    if statement.path == "/panic" {
                        panic!("check exploded");
                    }
                    Ok(())
                }),
                CheckSpecification::typed("noTmp", |statement: &DeploymentStatement, sink| {
                    if statement.path == "/fail" {
                        sink.report(Diagnostic::warning("partial finding").with_code("noTmp"));
                        return Err(buildfile_kit::plugin::CheckError::msg("cannot inspect /fail"));
                    }
                    if statement.path.starts_with("/tmp") {
                        sink.report(Diagnostic::warning("deploying into /tmp").with_code("noTmp"));
                    }
                    Ok(())
                }),
                CheckSpecification::new("modelSeen", NodeKind::Model, |_, _| Ok(())),
            ]
        }
    }

    pub struct Exploding;

    impl Default for Exploding {
        fn default() -> Self {
            panic!("constructor exploded")
        }
    }

    impl CustomValidator for Exploding {
        fn checks(&self) -> Vec<CheckSpecification> {
            vec![]
        }
    }

    #[derive(Clone, Copy, PartialEq, Eq)]
    pub enum Behaviour {
        Working,
        NoManifest,
        WrongKit,
        PanickingConstructor,
    }

    struct ReleaseCounter(Arc<AtomicUsize>);

    impl Drop for ReleaseCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Counts how often artifacts are opened and released.
    #[derive(Clone)]
    pub struct FakeOpener {
        pub behaviour: Behaviour,
        pub opens: Arc<AtomicUsize>,
        pub releases: Arc<AtomicUsize>,
        pub opened_paths: Arc<std::sync::Mutex<Vec<PathBuf>>>,
    }

    impl FakeOpener {
        pub fn new(behaviour: Behaviour) -> Self {
            Self {
                behaviour,
                opens: Arc::new(AtomicUsize::new(0)),
                releases: Arc::new(AtomicUsize::new(0)),
                opened_paths: Arc::default(),
            }
        }

        pub fn opens(&self) -> usize {
            self.opens.load(Ordering::SeqCst)
        }

        pub fn releases(&self) -> usize {
            self.releases.load(Ordering::SeqCst)
        }
    }

    impl ArtifactOpener for FakeOpener {
        fn open(&mut self, path: &Path) -> Result<OpenedArtifact, PluginError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut paths) = self.opened_paths.lock() {
                paths.push(path.to_path_buf());
            }
            let manifest = match self.behaviour {
                Behaviour::NoManifest => {
                    return Err(PluginError::MissingManifest {
                        path: path.to_path_buf(),
                        message: "undefined symbol".into(),
                    })
                }
                Behaviour::WrongKit => PluginManifest {
                    kit_version: "0.0.1",
                    entry_point: "fake::TmpGuard",
                    construct: construct::<TmpGuard>,
                },
                Behaviour::PanickingConstructor => PluginManifest {
                    kit_version: KIT_VERSION,
                    entry_point: "fake::Exploding",
                    construct: construct::<Exploding>,
                },
                Behaviour::Working => PluginManifest {
                    kit_version: KIT_VERSION,
                    entry_point: "fake::TmpGuard",
                    construct: construct::<TmpGuard>,
                },
            };
            Ok(OpenedArtifact {
                manifest,
                guard: Box::new(ReleaseCounter(self.releases.clone())),
            })
        }
    }
}
