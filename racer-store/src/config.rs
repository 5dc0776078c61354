use std::{
    env,
    path::{Path, PathBuf},
};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_MAPS_DIR: &str = "assets/maps";
pub const LEDGER_FILE_NAME: &str = "best_times.db";
pub const REPLAYS_DIR_NAME: &str = "replays";

/// Where records live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Holds the ledger database and the `replays/` directory.
    pub data_dir: PathBuf,
    /// Track files, one `{track_id}.json` each.
    pub maps_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            maps_dir: PathBuf::from(DEFAULT_MAPS_DIR),
        }
    }
}

impl StoreConfig {
    /// Reads `RACER_DATA_DIR` and `RACER_MAPS_DIR`, falling back to the
    /// working-directory defaults.
    pub fn from_env() -> Self {
        Self {
            data_dir: read_env_path("RACER_DATA_DIR", DEFAULT_DATA_DIR),
            maps_dir: read_env_path("RACER_MAPS_DIR", DEFAULT_MAPS_DIR),
        }
    }

    /// Everything under one root; used by tests and sandboxes.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            data_dir: root.join(DEFAULT_DATA_DIR),
            maps_dir: root.join("maps"),
        }
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(LEDGER_FILE_NAME)
    }

    pub fn replays_dir(&self) -> PathBuf {
        self.data_dir.join(REPLAYS_DIR_NAME)
    }
}

pub fn read_env_path(name: &str, default: &str) -> PathBuf {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

pub fn read_env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variables_fall_back_to_defaults() {
        assert_eq!(
            read_env_path("RACER_TEST_UNSET_PATH_VARIABLE", "fallback"),
            PathBuf::from("fallback")
        );
        assert_eq!(read_env_u32("RACER_TEST_UNSET_U32_VARIABLE", 7), 7);
    }

    #[test]
    fn rooted_layout() {
        let config = StoreConfig::rooted_at(Path::new("/tmp/racer"));
        assert_eq!(config.ledger_path(), Path::new("/tmp/racer/data/best_times.db"));
        assert_eq!(config.replays_dir(), Path::new("/tmp/racer/data/replays"));
        assert_eq!(config.maps_dir, Path::new("/tmp/racer/maps"));
    }
}
