use std::path::PathBuf;

/// Returns the root evcat directory path.
///
/// Resolution order:
/// 1. `EVCAT_ROOT` environment variable (if set)
/// 2. Current working directory + `.evcat`
pub fn evcat_root() -> PathBuf {
    if let Ok(root) = std::env::var("EVCAT_ROOT") {
        PathBuf::from(root)
    } else {
        PathBuf::from(".evcat")
    }
}

/// Returns the path to the configuration file.
pub fn config_file() -> PathBuf {
    evcat_root().join("config.yaml")
}
