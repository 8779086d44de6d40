//! Version information for the application, populated at build time.
//!
//! Display format:
//! - Prod: `stable:{version}`
//! - Local/Test: `main:{commit}`

/// Runtime environment the service was started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    /// Local development
    Local,
    /// Test environment
    Test,
    /// Production
    Prod,
}

/// Get the build date in RFC3339 format
pub fn build_date() -> &'static str {
    env!("BUILD_DATE")
}

/// Get the git commit hash (short)
pub fn build_commit() -> &'static str {
    env!("BUILD_COMMIT")
}

/// Get the package version
pub fn build_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Format version string for a runtime-determined environment.
pub fn format_version_for_runtime_env(env: RuntimeEnv) -> String {
    match env {
        RuntimeEnv::Test | RuntimeEnv::Local => format!("main:{}", build_commit()),
        RuntimeEnv::Prod => format!("stable:{}", build_version()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_date_not_empty() {
        assert!(!build_date().is_empty());
    }

    #[test]
    fn test_build_commit_not_empty() {
        assert!(!build_commit().is_empty());
    }

    #[test]
    fn test_format_version_for_runtime_env_local() {
        let version = format_version_for_runtime_env(RuntimeEnv::Local);
        assert!(version.starts_with("main:"));
    }

    #[test]
    fn test_format_version_for_runtime_env_prod() {
        let version = format_version_for_runtime_env(RuntimeEnv::Prod);
        assert!(version.starts_with("stable:"));
        assert!(version.ends_with(build_version()));
    }
}
