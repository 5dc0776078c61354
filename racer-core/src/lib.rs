pub mod car;
pub mod checkpoints;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod input;
pub mod physics;
pub mod records;
pub mod replay;
pub mod sim;
pub mod surface;
pub mod track;
pub mod verify;

pub use car::{Car, CarSpec};
pub use config::{PhysicsConfig, SessionOptions};
pub use error::{DraftError, ReplayError, StoreError, TrackError, VerifyError};
pub use input::InputSnapshot;
pub use records::{
    reset_player_records, toggle_cheat_mode, ArtifactStore, Ledger, MemoryRecords, ReplaySlot,
};
pub use replay::{Replay, ReplayMeta, ReplayRecorder};
pub use sim::session::{FrameReport, Phase, RaceSession, RunOutcome, SessionMode, TrackRecords};
pub use sim::{step_car, ticks_to_ms, GhostKind, GhostLane, GhostState, RunClock, StepReport};
pub use track::{TileKind, TilePos, Track, TrackDraft, TrackFile};
pub use verify::{
    replay_inputs, trace_fingerprint, trace_replay, verify_replay, ReplayResult, TraceSample,
    VerifiedRun,
};
