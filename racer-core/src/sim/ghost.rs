use tracing::debug;

use crate::car::{Car, CarSpec};
use crate::config::PhysicsConfig;
use crate::input::InputSnapshot;
use crate::replay::Replay;
use crate::sim::step_car;
use crate::track::Track;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GhostKind {
    /// The player's own last finished run.
    Player,
    /// The track author's reference run.
    Creator,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GhostState {
    Inactive,
    Active {
        car: Car,
        inputs: Vec<InputSnapshot>,
        cursor: usize,
    },
    /// Buffer consumed; the car stays where it stopped.
    Exhausted { car: Car },
}

/// One ghost car slot in a session.
#[derive(Clone, Debug)]
pub struct GhostLane {
    kind: GhostKind,
    enabled: bool,
    state: GhostState,
}

impl GhostLane {
    pub fn new(kind: GhostKind, enabled: bool) -> Self {
        Self {
            kind,
            enabled,
            state: GhostState::Inactive,
        }
    }

    pub fn kind(&self) -> GhostKind {
        self.kind
    }

    pub fn state(&self) -> &GhostState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling drops any ghost car immediately.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.state = GhostState::Inactive;
        }
    }

    pub fn reset(&mut self) {
        self.state = GhostState::Inactive;
    }

    /// Starts playback of `replay` from the start tile. Lanes stay inactive
    /// when disabled, when no replay is given, or when the replay was
    /// recorded under different constants. An empty replay arms and is
    /// exhausted on the first tick.
    pub fn arm(
        &mut self,
        replay: Option<&Replay>,
        track: &Track,
        config: &PhysicsConfig,
        spec: CarSpec,
    ) -> bool {
        self.state = GhostState::Inactive;
        if !self.enabled {
            return false;
        }
        let Some(replay) = replay else {
            return false;
        };
        if let Err(reason) = replay.compatibility(config, track.start_angle()) {
            debug!(lane = ?self.kind, %reason, "ghost replay discarded");
            return false;
        }

        self.state = GhostState::Active {
            car: Car::spawn(track, spec, config.tile_size),
            inputs: replay.inputs.clone(),
            cursor: 0,
        };
        debug!(lane = ?self.kind, ticks = replay.len(), "ghost armed");
        true
    }

    /// Advances the ghost by one tick. The tick that finds the buffer empty
    /// only transitions to `Exhausted`.
    pub fn tick(&mut self, track: &Track, config: &PhysicsConfig) {
        let GhostState::Active {
            car,
            inputs,
            cursor,
        } = &mut self.state
        else {
            return;
        };

        let stopped = match inputs.get(*cursor).copied() {
            Some(input) => {
                step_car(car, input, track, config);
                *cursor += 1;
                None
            }
            None => Some(*car),
        };
        if let Some(car) = stopped {
            self.state = GhostState::Exhausted { car };
        }
    }

    /// The visible ghost car, if any.
    pub fn car(&self) -> Option<&Car> {
        match &self.state {
            GhostState::Inactive => None,
            GhostState::Active { car, .. } | GhostState::Exhausted { car } => Some(car),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, GhostState::Active { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, GhostState::Exhausted { .. })
    }

    /// Ticks consumed so far; `None` when not playing.
    pub fn cursor(&self) -> Option<usize> {
        match &self.state {
            GhostState::Active { cursor, .. } => Some(*cursor),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::ReplayMeta;

    fn corridor() -> Track {
        Track::from_json(
            r#"{
                "width": 10, "height": 3,
                "tiles": ["1111111111", "1300000041", "1111111111"],
                "legend": {"0": "road", "1": "wall", "3": "start", "4": "finish"}
            }"#,
        )
        .unwrap()
    }

    fn replay(ticks: usize) -> Replay {
        Replay::new(
            ReplayMeta::current(&PhysicsConfig::default(), 0.0),
            vec![InputSnapshot::ACCELERATE; ticks],
        )
    }

    #[test]
    fn plays_then_exhausts_without_an_extra_step() {
        let track = corridor();
        let config = PhysicsConfig::default();
        let mut lane = GhostLane::new(GhostKind::Player, true);
        assert!(lane.arm(Some(&replay(3)), &track, &config, CarSpec::default()));

        for _ in 0..3 {
            lane.tick(&track, &config);
        }
        assert_eq!(lane.cursor(), Some(3));
        let after_buffer = *lane.car().unwrap();

        lane.tick(&track, &config);
        assert!(lane.is_exhausted());
        assert_eq!(lane.car(), Some(&after_buffer));

        lane.tick(&track, &config);
        assert_eq!(lane.car(), Some(&after_buffer));
    }

    #[test]
    fn disabled_or_missing_replay_stays_inactive() {
        let track = corridor();
        let config = PhysicsConfig::default();

        let mut lane = GhostLane::new(GhostKind::Creator, false);
        assert!(!lane.arm(Some(&replay(5)), &track, &config, CarSpec::default()));
        assert_eq!(lane.state(), &GhostState::Inactive);

        let mut lane = GhostLane::new(GhostKind::Player, true);
        assert!(!lane.arm(None, &track, &config, CarSpec::default()));
        assert!(lane.car().is_none());
    }

    #[test]
    fn empty_replay_arms_then_exhausts_at_the_start() {
        let track = corridor();
        let config = PhysicsConfig::default();
        let mut lane = GhostLane::new(GhostKind::Player, true);
        assert!(lane.arm(Some(&replay(0)), &track, &config, CarSpec::default()));
        assert!(lane.is_active());
        assert_eq!(lane.cursor(), Some(0));

        let spawn = Car::spawn(&track, CarSpec::default(), config.tile_size);
        lane.tick(&track, &config);
        assert!(lane.is_exhausted());
        assert_eq!(lane.car(), Some(&spawn));
    }

    #[test]
    fn incompatible_meta_is_silently_dropped() {
        let track = corridor();
        let config = PhysicsConfig::default();
        let mut lane = GhostLane::new(GhostKind::Player, true);

        let mut stale = replay(5);
        stale.meta.start_angle = Some(std::f64::consts::PI);
        assert!(!lane.arm(Some(&stale), &track, &config, CarSpec::default()));

        let legacy = Replay::new(ReplayMeta::default(), vec![InputSnapshot::ACCELERATE; 5]);
        assert!(!lane.arm(Some(&legacy), &track, &config, CarSpec::default()));
        assert_eq!(lane.state(), &GhostState::Inactive);
    }

    #[test]
    fn disabling_drops_the_car() {
        let track = corridor();
        let config = PhysicsConfig::default();
        let mut lane = GhostLane::new(GhostKind::Player, true);
        lane.arm(Some(&replay(5)), &track, &config, CarSpec::default());
        lane.tick(&track, &config);

        lane.set_enabled(false);
        assert!(lane.car().is_none());
        lane.tick(&track, &config);
        assert!(lane.car().is_none());
    }
}
