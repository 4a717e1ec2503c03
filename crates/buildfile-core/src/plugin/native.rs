use std::fs::File;
use std::io;
use std::path::Path;

use buildfile_kit::plugin::{PluginManifest, MANIFEST_SYMBOL};
use libloading::Library;
use tempfile::{TempDir, TempPath};

use super::{ArtifactOpener, OpenedArtifact, PluginError};

/// Opens plugin artifacts as native dynamic libraries.
///
/// Each artifact is copied to a private shadow file before it is mapped, so
/// the original can be rebuilt in place while an older copy is still in use.
#[derive(Default)]
pub struct NativeOpener {
    shadow_dir: Option<TempDir>,
}

struct NativeLibrary {
    // field order matters: unmap before deleting the shadow copy
    _library: Library,
    _shadow: TempPath,
}

impl NativeOpener {
    fn shadow_dir(&mut self) -> io::Result<&Path> {
        if self.shadow_dir.is_none() {
            self.shadow_dir = Some(tempfile::Builder::new().prefix("buildfile-plugins").tempdir()?);
        }
        match &self.shadow_dir {
            Some(dir) => Ok(dir.path()),
            None => Err(io::Error::new(io::ErrorKind::Other, "shadow directory unavailable")),
        }
    }

    fn shadow_copy(&mut self, path: &Path) -> io::Result<TempPath> {
        let suffix = path
            .extension()
            .map(|extension| format!(".{}", extension.to_string_lossy()))
            .unwrap_or_default();
        let dir = self.shadow_dir()?.to_path_buf();
        let mut shadow =
            tempfile::Builder::new().prefix("validator-").suffix(&suffix).tempfile_in(dir)?;
        let mut source = File::open(path)?;
        io::copy(&mut source, shadow.as_file_mut())?;
        shadow.as_file().sync_all()?;
        Ok(shadow.into_temp_path())
    }
}

impl ArtifactOpener for NativeOpener {
    fn open(&mut self, path: &Path) -> Result<OpenedArtifact, PluginError> {
        let open_error =
            |message: String| PluginError::Open { path: path.to_path_buf(), message };

        let shadow = self.shadow_copy(path).map_err(|e| open_error(e.to_string()))?;

        // SAFETY: loading runs the library's initializers; plugin artifacts are
        // trusted code supplied by the operator.
        let library =
            unsafe { Library::new(shadow.as_os_str()) }.map_err(|e| open_error(e.to_string()))?;

        // SAFETY: the symbol is emitted by `export_validator!` as a
        // `PluginManifest` static; the kit version is checked before use.
        let manifest = unsafe {
            library
                .get::<*const PluginManifest>(MANIFEST_SYMBOL)
                .map(|symbol| **symbol)
                .map_err(|e| PluginError::MissingManifest {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?
        };

        Ok(OpenedArtifact {
            manifest,
            guard: Box::new(NativeLibrary { _library: library, _shadow: shadow }),
        })
    }
}
