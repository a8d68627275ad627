use std::path::PathBuf;

/// Env switch mirroring the build property that enables index writing.
pub const ENABLED_ENV_KEY: &str = "BACKREFS_INDEX_ENABLED";

/// Front end whose output shape the index format is built for. A session
/// driven by any other compiler discards the index and stays disabled.
pub const PRIMARY_COMPILER_ID: &str = "javac";

/// Per-build-session parameters supplied by the orchestrator.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Build data root; the index lives in a subdirectory of it.
    pub storage_root: PathBuf,
    pub enabled: bool,
    /// Identity of the front-end compiler driving this build.
    pub compiler_id: String,
    /// Forced full recompilation: discard any existing index and start fresh.
    pub is_rebuild: bool,
}

impl SessionConfig {
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
            enabled: false,
            compiler_id: PRIMARY_COMPILER_ID.to_string(),
            is_rebuild: false,
        }
    }

    /// Read the enablement flag from the environment, defaulting to off.
    pub fn from_env(storage_root: impl Into<PathBuf>, compiler_id: &str, is_rebuild: bool) -> Self {
        let enabled = std::env::var(ENABLED_ENV_KEY)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Self {
            storage_root: storage_root.into(),
            enabled,
            compiler_id: compiler_id.to_string(),
            is_rebuild,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn compiler(mut self, compiler_id: &str) -> Self {
        self.compiler_id = compiler_id.to_string();
        self
    }

    pub fn rebuild(mut self, is_rebuild: bool) -> Self {
        self.is_rebuild = is_rebuild;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let cfg = SessionConfig::new("/tmp/build");
        assert!(!cfg.enabled);
        assert!(!cfg.is_rebuild);
        assert_eq!(cfg.compiler_id, PRIMARY_COMPILER_ID);
    }

    #[test]
    fn test_builder_overrides() {
        let cfg = SessionConfig::new("/tmp/build")
            .enabled(true)
            .compiler("ecj")
            .rebuild(true);
        assert!(cfg.enabled);
        assert!(cfg.is_rebuild);
        assert_eq!(cfg.compiler_id, "ecj");
    }
}
