use std::{
    fs, io,
    path::{Path, PathBuf},
};

use racer_core::{ArtifactStore, Replay, ReplaySlot, StoreError, Track, TrackFile};

const LAST_REPLAY_SUFFIX: &str = "_last.json";

/// Replays under `{replays_dir}/{track}_{last|creator}.json` and track
/// files under `{maps_dir}/{track}.json`.
pub struct FileArtifacts {
    replays_dir: PathBuf,
    maps_dir: PathBuf,
}

impl FileArtifacts {
    pub fn new(replays_dir: PathBuf, maps_dir: PathBuf) -> Self {
        Self {
            replays_dir,
            maps_dir,
        }
    }

    pub fn replays_dir(&self) -> &Path {
        &self.replays_dir
    }

    pub fn maps_dir(&self) -> &Path {
        &self.maps_dir
    }

    /// Track ids become file names, so only `[A-Za-z0-9_-]` is accepted.
    fn validate_track_id(track_id: &str) -> Result<&str, String> {
        if track_id.is_empty() {
            return Err("invalid track id: empty".to_string());
        }
        if !track_id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
        {
            return Err(format!(
                "invalid track id (allowed: letters, digits, '_' and '-'): {track_id}"
            ));
        }
        Ok(track_id)
    }

    pub fn replay_path(&self, track_id: &str, slot: ReplaySlot) -> Result<PathBuf, String> {
        let track_id = Self::validate_track_id(track_id)?;
        Ok(self
            .replays_dir
            .join(format!("{track_id}_{}.json", slot.as_str())))
    }

    pub fn track_path(&self, track_id: &str) -> Result<PathBuf, String> {
        let track_id = Self::validate_track_id(track_id)?;
        Ok(self.maps_dir.join(format!("{track_id}.json")))
    }

    pub fn load_track(&self, track_id: &str) -> Result<Track, String> {
        let path = self.track_path(track_id)?;
        let text = fs::read_to_string(&path)
            .map_err(|e| format!("failed to read track {}: {e}", path.display()))?;
        Track::from_json(&text).map_err(|e| format!("invalid track {}: {e}", path.display()))
    }

    /// Ids of every `*.json` file in the maps directory, sorted.
    pub fn track_ids(&self) -> Result<Vec<String>, String> {
        let entries = match fs::read_dir(&self.maps_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(format!(
                    "failed to read maps dir {}: {e}",
                    self.maps_dir.display()
                ))
            }
        };

        let mut ids: Vec<String> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let id = name.strip_suffix(".json")?;
                Self::validate_track_id(id).ok().map(str::to_string)
            })
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn write_file(dir: &Path, path: &Path, contents: &str) -> Result<(), String> {
        fs::create_dir_all(dir)
            .map_err(|e| format!("failed to create dir {}: {e}", dir.display()))?;
        fs::write(path, contents).map_err(|e| format!("failed to write {}: {e}", path.display()))
    }
}

impl ArtifactStore for FileArtifacts {
    fn load_replay(&self, track_id: &str, slot: ReplaySlot) -> Result<Option<Replay>, StoreError> {
        let path = self.replay_path(track_id, slot)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::new(format!(
                    "failed to read replay {}: {e}",
                    path.display()
                )))
            }
        };
        Replay::from_json(&text)
            .map(Some)
            .map_err(|e| StoreError::new(format!("{}: {e}", path.display())))
    }

    fn replay_exists(&self, track_id: &str, slot: ReplaySlot) -> bool {
        self.replay_path(track_id, slot)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    fn save_replay(
        &mut self,
        track_id: &str,
        slot: ReplaySlot,
        replay: &Replay,
    ) -> Result<(), StoreError> {
        let path = self.replay_path(track_id, slot)?;
        let json = replay
            .to_json()
            .map_err(|e| StoreError::new(e.to_string()))?;
        Ok(Self::write_file(&self.replays_dir, &path, &json)?)
    }

    fn remove_replay(&mut self, track_id: &str, slot: ReplaySlot) -> Result<(), StoreError> {
        let path = self.replay_path(track_id, slot)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::new(format!(
                "failed to remove replay {}: {e}",
                path.display()
            ))),
        }
    }

    fn clear_last_replays(&mut self) -> Result<usize, StoreError> {
        let entries = match fs::read_dir(&self.replays_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(StoreError::new(format!(
                    "failed to read replays dir {}: {e}",
                    self.replays_dir.display()
                )))
            }
        };

        let mut removed = 0usize;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if !name_str.ends_with(LAST_REPLAY_SUFFIX) {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    tracing::info!(file = %name_str, "removed last replay");
                    removed += 1;
                }
                Err(e) => {
                    tracing::warn!(file = %name_str, "failed to remove last replay: {e}");
                }
            }
        }

        Ok(removed)
    }

    fn save_track(&mut self, track_id: &str, track: &TrackFile) -> Result<(), StoreError> {
        let path = self.track_path(track_id)?;
        let json = serde_json::to_string_pretty(track)
            .map_err(|e| StoreError::new(format!("failed to encode track {track_id}: {e}")))?;
        Ok(Self::write_file(&self.maps_dir, &path, &json)?)
    }
}
