use std::env;
use std::path::PathBuf;

/// Environment variable naming the custom validator artifact.
pub const CUSTOM_VALIDATOR_ENV: &str = "BUILDFILE_CUSTOM_VALIDATOR";

/// Tells the orchestrator which plugin artifact, if any, to load.
///
/// Queried on every validation pass, so an implementation may change its
/// answer between passes.
pub trait CustomValidatorPathProvider: Send + Sync {
    fn validator_path(&self) -> Option<PathBuf>;
}

/// No custom validator
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCustomValidator;

impl CustomValidatorPathProvider for NoCustomValidator {
    fn validator_path(&self) -> Option<PathBuf> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct FixedCustomValidator(pub PathBuf);

impl CustomValidatorPathProvider for FixedCustomValidator {
    fn validator_path(&self) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// Reads [`CUSTOM_VALIDATOR_ENV`]; unset or blank means no validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCustomValidator;

impl CustomValidatorPathProvider for EnvCustomValidator {
    fn validator_path(&self) -> Option<PathBuf> {
        let value = env::var_os(CUSTOM_VALIDATOR_ENV)?;
        if value.to_string_lossy().trim().is_empty() {
            return None;
        }
        Some(PathBuf::from(value))
    }
}
