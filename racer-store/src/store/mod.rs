mod db;
mod files;

use racer_core::{ArtifactStore, Ledger, Replay, ReplaySlot, StoreError, TrackFile};

use crate::config::StoreConfig;

pub use db::{LedgerRow, SqliteLedger};
pub use files::FileArtifacts;

/// SQLite ledger plus on-disk replays and tracks, opened from one config.
pub struct DiskRecords {
    ledger: SqliteLedger,
    artifacts: FileArtifacts,
}

impl DiskRecords {
    pub fn open(config: &StoreConfig) -> Result<Self, String> {
        let ledger = SqliteLedger::open(&config.ledger_path())?;
        let artifacts = FileArtifacts::new(config.replays_dir(), config.maps_dir.clone());
        Ok(Self { ledger, artifacts })
    }

    pub fn ledger(&self) -> &SqliteLedger {
        &self.ledger
    }

    pub fn artifacts(&self) -> &FileArtifacts {
        &self.artifacts
    }
}

impl Ledger for DiskRecords {
    fn best_time(&self, track_id: &str) -> Result<Option<u64>, StoreError> {
        self.ledger.best_time(track_id)
    }

    fn set_best_time(&mut self, track_id: &str, ms: u64) -> Result<(), StoreError> {
        self.ledger.set_best_time(track_id, ms)
    }

    fn clear_best_time(&mut self, track_id: &str) -> Result<(), StoreError> {
        self.ledger.clear_best_time(track_id)
    }

    fn creator_time(&self, track_id: &str) -> Result<Option<u64>, StoreError> {
        self.ledger.creator_time(track_id)
    }

    fn set_creator_time(&mut self, track_id: &str, ms: u64) -> Result<(), StoreError> {
        self.ledger.set_creator_time(track_id, ms)
    }

    fn creator_beaten(&self, track_id: &str) -> Result<bool, StoreError> {
        self.ledger.creator_beaten(track_id)
    }

    fn set_creator_beaten(&mut self, track_id: &str) -> Result<(), StoreError> {
        self.ledger.set_creator_beaten(track_id)
    }

    fn clear_creator_beaten(&mut self, track_id: &str) -> Result<(), StoreError> {
        self.ledger.clear_creator_beaten(track_id)
    }

    fn clear_all_best_times(&mut self) -> Result<(), StoreError> {
        self.ledger.clear_all_best_times()
    }

    fn clear_all_creator_beaten(&mut self) -> Result<(), StoreError> {
        self.ledger.clear_all_creator_beaten()
    }
}

impl ArtifactStore for DiskRecords {
    fn load_replay(&self, track_id: &str, slot: ReplaySlot) -> Result<Option<Replay>, StoreError> {
        self.artifacts.load_replay(track_id, slot)
    }

    fn replay_exists(&self, track_id: &str, slot: ReplaySlot) -> bool {
        self.artifacts.replay_exists(track_id, slot)
    }

    fn save_replay(
        &mut self,
        track_id: &str,
        slot: ReplaySlot,
        replay: &Replay,
    ) -> Result<(), StoreError> {
        self.artifacts.save_replay(track_id, slot, replay)
    }

    fn remove_replay(&mut self, track_id: &str, slot: ReplaySlot) -> Result<(), StoreError> {
        self.artifacts.remove_replay(track_id, slot)
    }

    fn clear_last_replays(&mut self) -> Result<usize, StoreError> {
        self.artifacts.clear_last_replays()
    }

    fn save_track(&mut self, track_id: &str, track: &TrackFile) -> Result<(), StoreError> {
        self.artifacts.save_track(track_id, track)
    }
}
