use std::path::{Path, PathBuf};

#[cfg(windows)]
const DEFAULT_RUNTIME_HOME: &str = r"C:\Program Files\OpenJDK\jdk-22.0.2";
#[cfg(target_os = "macos")]
const DEFAULT_RUNTIME_HOME: &str = "/Library/Java/Home";
#[cfg(all(unix, not(target_os = "macos")))]
const DEFAULT_RUNTIME_HOME: &str = "/usr/lib/jvm/default-java";

#[cfg(windows)]
const JAVA_BINARY: &str = "java.exe";
#[cfg(not(windows))]
const JAVA_BINARY: &str = "java";

/// Java runtime installation the cluster client needs.
///
/// Passed to sessions as a value; the process environment is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeHome {
    path: PathBuf,
}

impl RuntimeHome {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Per-platform fallback used when nothing is configured.
    pub fn platform_default() -> Self {
        Self::new(DEFAULT_RUNTIME_HOME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.path.join("bin")
    }

    pub fn java_binary(&self) -> PathBuf {
        self.bin_dir().join(JAVA_BINARY)
    }

    pub fn is_installed(&self) -> bool {
        self.java_binary().is_file()
    }

    pub fn log_status(&self) {
        if self.is_installed() {
            tracing::debug!("Using Java runtime at {}", self.path.display());
        } else {
            tracing::warn!(
                "⚠️ No Java binary found at {}",
                self.java_binary().display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_java_binary_layout() {
        let home = RuntimeHome::new("/opt/jdk");
        assert_eq!(home.bin_dir(), PathBuf::from("/opt/jdk").join("bin"));
        assert!(home.java_binary().starts_with("/opt/jdk"));
    }

    #[test]
    fn test_is_installed() {
        let dir = TempDir::new().unwrap();
        let home = RuntimeHome::new(dir.path());
        assert!(!home.is_installed());

        std::fs::create_dir_all(home.bin_dir()).unwrap();
        std::fs::write(home.java_binary(), b"").unwrap();
        assert!(home.is_installed());
    }

    #[test]
    fn test_platform_default_is_absolute() {
        assert!(RuntimeHome::platform_default().path().is_absolute());
    }
}
