use std::collections::{HashMap, HashSet};

use crate::error::StoreError;
use crate::replay::Replay;
use crate::track::TrackFile;

/// Per-track best times and creator state, keyed by track id. Times are
/// whole milliseconds.
pub trait Ledger {
    fn best_time(&self, track_id: &str) -> Result<Option<u64>, StoreError>;
    fn set_best_time(&mut self, track_id: &str, ms: u64) -> Result<(), StoreError>;
    fn clear_best_time(&mut self, track_id: &str) -> Result<(), StoreError>;

    fn creator_time(&self, track_id: &str) -> Result<Option<u64>, StoreError>;
    fn set_creator_time(&mut self, track_id: &str, ms: u64) -> Result<(), StoreError>;

    fn creator_beaten(&self, track_id: &str) -> Result<bool, StoreError>;
    fn set_creator_beaten(&mut self, track_id: &str) -> Result<(), StoreError>;
    fn clear_creator_beaten(&mut self, track_id: &str) -> Result<(), StoreError>;

    fn clear_all_best_times(&mut self) -> Result<(), StoreError>;
    fn clear_all_creator_beaten(&mut self) -> Result<(), StoreError>;
}

/// Which of a track's two replay files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReplaySlot {
    /// The player's most recent finished race.
    Last,
    /// The reference run recorded from the editor.
    Creator,
}

impl ReplaySlot {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Last => "last",
            Self::Creator => "creator",
        }
    }
}

/// Replay and custom-track persistence. Missing artifacts are not errors.
pub trait ArtifactStore {
    fn load_replay(&self, track_id: &str, slot: ReplaySlot) -> Result<Option<Replay>, StoreError>;
    fn replay_exists(&self, track_id: &str, slot: ReplaySlot) -> bool;
    fn save_replay(
        &mut self,
        track_id: &str,
        slot: ReplaySlot,
        replay: &Replay,
    ) -> Result<(), StoreError>;
    /// Ensures the replay is absent; succeeds when it never existed.
    fn remove_replay(&mut self, track_id: &str, slot: ReplaySlot) -> Result<(), StoreError>;
    /// Removes every `Last` replay and returns how many were deleted.
    fn clear_last_replays(&mut self) -> Result<usize, StoreError>;
    fn save_track(&mut self, track_id: &str, track: &TrackFile) -> Result<(), StoreError>;
}

/// Clears every best time, every creator-beaten flag and every `Last`
/// replay. Creator times and creator replays survive.
pub fn reset_player_records<S>(store: &mut S) -> Result<usize, StoreError>
where
    S: Ledger + ArtifactStore + ?Sized,
{
    store.clear_all_best_times()?;
    store.clear_all_creator_beaten()?;
    store.clear_last_replays()
}

/// Flips the creator-beaten flag across `track_ids` as a group: when any
/// track is still unbeaten every flag is set, otherwise every flag is
/// cleared. Returns whether the flags are now set.
pub fn toggle_cheat_mode<S>(store: &mut S, track_ids: &[String]) -> Result<bool, StoreError>
where
    S: Ledger + ?Sized,
{
    let mut enable = false;
    for id in track_ids {
        if !store.creator_beaten(id)? {
            enable = true;
            break;
        }
    }
    for id in track_ids {
        if enable {
            store.set_creator_beaten(id)?;
        } else {
            store.clear_creator_beaten(id)?;
        }
    }
    Ok(enable)
}

/// In-memory collaborator for tests and headless runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryRecords {
    best_times: HashMap<String, u64>,
    creator_times: HashMap<String, u64>,
    creator_beaten: HashSet<String>,
    replays: HashMap<(String, ReplaySlot), Replay>,
    tracks: HashMap<String, TrackFile>,
    fail_writes: bool,
}

impl MemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every write fails, for exercising recovery paths.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn saved_track(&self, track_id: &str) -> Option<&TrackFile> {
        self.tracks.get(track_id)
    }

    fn check_write(&self, what: &str, track_id: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::new(format!(
                "failed to write {what} for {track_id}: store is read-only"
            )));
        }
        Ok(())
    }
}

impl Ledger for MemoryRecords {
    fn best_time(&self, track_id: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.best_times.get(track_id).copied())
    }

    fn set_best_time(&mut self, track_id: &str, ms: u64) -> Result<(), StoreError> {
        self.check_write("best time", track_id)?;
        self.best_times.insert(track_id.to_owned(), ms);
        Ok(())
    }

    fn clear_best_time(&mut self, track_id: &str) -> Result<(), StoreError> {
        self.check_write("best time", track_id)?;
        self.best_times.remove(track_id);
        Ok(())
    }

    fn creator_time(&self, track_id: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.creator_times.get(track_id).copied())
    }

    fn set_creator_time(&mut self, track_id: &str, ms: u64) -> Result<(), StoreError> {
        self.check_write("creator time", track_id)?;
        self.creator_times.insert(track_id.to_owned(), ms);
        Ok(())
    }

    fn creator_beaten(&self, track_id: &str) -> Result<bool, StoreError> {
        Ok(self.creator_beaten.contains(track_id))
    }

    fn set_creator_beaten(&mut self, track_id: &str) -> Result<(), StoreError> {
        self.check_write("creator flag", track_id)?;
        self.creator_beaten.insert(track_id.to_owned());
        Ok(())
    }

    fn clear_creator_beaten(&mut self, track_id: &str) -> Result<(), StoreError> {
        self.check_write("creator flag", track_id)?;
        self.creator_beaten.remove(track_id);
        Ok(())
    }

    fn clear_all_best_times(&mut self) -> Result<(), StoreError> {
        self.check_write("best times", "all tracks")?;
        self.best_times.clear();
        Ok(())
    }

    fn clear_all_creator_beaten(&mut self) -> Result<(), StoreError> {
        self.check_write("creator flags", "all tracks")?;
        self.creator_beaten.clear();
        Ok(())
    }
}

impl ArtifactStore for MemoryRecords {
    fn load_replay(&self, track_id: &str, slot: ReplaySlot) -> Result<Option<Replay>, StoreError> {
        Ok(self.replays.get(&(track_id.to_owned(), slot)).cloned())
    }

    fn replay_exists(&self, track_id: &str, slot: ReplaySlot) -> bool {
        self.replays.contains_key(&(track_id.to_owned(), slot))
    }

    fn save_replay(
        &mut self,
        track_id: &str,
        slot: ReplaySlot,
        replay: &Replay,
    ) -> Result<(), StoreError> {
        self.check_write("replay", track_id)?;
        self.replays
            .insert((track_id.to_owned(), slot), replay.clone());
        Ok(())
    }

    fn remove_replay(&mut self, track_id: &str, slot: ReplaySlot) -> Result<(), StoreError> {
        self.check_write("replay", track_id)?;
        self.replays.remove(&(track_id.to_owned(), slot));
        Ok(())
    }

    fn clear_last_replays(&mut self) -> Result<usize, StoreError> {
        self.check_write("replays", "all tracks")?;
        let before = self.replays.len();
        self.replays.retain(|(_, slot), _| *slot != ReplaySlot::Last);
        Ok(before - self.replays.len())
    }

    fn save_track(&mut self, track_id: &str, track: &TrackFile) -> Result<(), StoreError> {
        self.check_write("track", track_id)?;
        self.tracks.insert(track_id.to_owned(), track.clone());
        Ok(())
    }
}
