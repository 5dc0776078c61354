use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::error::{ReplayError, VerifyError};
use crate::input::InputSnapshot;

/// Physics constants a replay was recorded under.
///
/// Every field is optional so files from older builds still load; a replay
/// with any field missing never plays back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_timestep: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mud_accel_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mud_speed_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mud_turn_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mud_sticky_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_angle: Option<f64>,
}

impl ReplayMeta {
    pub fn current(config: &PhysicsConfig, start_angle: f64) -> Self {
        Self {
            fixed_timestep: Some(config.fixed_timestep),
            mud_accel_multiplier: Some(config.mud_accel_multiplier),
            mud_speed_multiplier: Some(config.mud_speed_multiplier),
            mud_turn_multiplier: Some(config.mud_turn_multiplier),
            mud_sticky_time: Some(config.mud_sticky_time),
            start_angle: Some(start_angle),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, value)| value.is_none())
    }

    fn fields(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("fixed_timestep", self.fixed_timestep),
            ("mud_accel_multiplier", self.mud_accel_multiplier),
            ("mud_speed_multiplier", self.mud_speed_multiplier),
            ("mud_turn_multiplier", self.mud_turn_multiplier),
            ("mud_sticky_time", self.mud_sticky_time),
            ("start_angle", self.start_angle),
        ]
    }

    /// Name of the first constant that is missing or differs from `live`.
    /// Values are compared exactly.
    pub fn first_mismatch(&self, live: &ReplayMeta) -> Option<&'static str> {
        self.fields()
            .into_iter()
            .zip(live.fields())
            .find(|((_, recorded), (_, current))| match (recorded, current) {
                (Some(recorded), Some(current)) => recorded != current,
                _ => true,
            })
            .map(|((name, _), _)| name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReplayFile {
    Legacy(Vec<InputSnapshot>),
    Wrapped {
        #[serde(default)]
        meta: ReplayMeta,
        #[serde(default)]
        inputs: Vec<InputSnapshot>,
    },
}

/// Recorded run: one input snapshot per physics tick plus the constants it
/// was driven under.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Replay {
    pub meta: ReplayMeta,
    pub inputs: Vec<InputSnapshot>,
}

impl Replay {
    pub fn new(meta: ReplayMeta, inputs: Vec<InputSnapshot>) -> Self {
        Self { meta, inputs }
    }

    /// Parses either the wrapped `{meta, inputs}` form or a legacy bare list,
    /// which loads with empty meta.
    pub fn from_json(text: &str) -> Result<Self, ReplayError> {
        let file: ReplayFile = serde_json::from_str(text).map_err(|err| ReplayError::Parse {
            message: err.to_string(),
        })?;
        Ok(match file {
            ReplayFile::Legacy(inputs) => Self {
                meta: ReplayMeta::default(),
                inputs,
            },
            ReplayFile::Wrapped { meta, inputs } => Self { meta, inputs },
        })
    }

    pub fn to_json(&self) -> Result<String, ReplayError> {
        serde_json::to_string(self).map_err(|err| ReplayError::Encode {
            message: err.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn compatibility(
        &self,
        config: &PhysicsConfig,
        start_angle: f64,
    ) -> Result<(), VerifyError> {
        if self.meta.is_empty() {
            return Err(VerifyError::MissingMeta);
        }
        match self
            .meta
            .first_mismatch(&ReplayMeta::current(config, start_angle))
        {
            Some(field) => Err(VerifyError::MetaMismatch { field }),
            None => Ok(()),
        }
    }

    pub fn is_compatible(&self, config: &PhysicsConfig, start_angle: f64) -> bool {
        self.compatibility(config, start_angle).is_ok()
    }
}

/// Input buffer for the run in progress.
#[derive(Clone, Debug, Default)]
pub struct ReplayRecorder {
    inputs: Vec<InputSnapshot>,
}

impl ReplayRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.inputs.clear();
    }

    pub fn record(&mut self, input: InputSnapshot) {
        self.inputs.push(input);
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn inputs(&self) -> &[InputSnapshot] {
        &self.inputs
    }

    pub fn to_replay(&self, meta: ReplayMeta) -> Replay {
        Replay::new(meta, self.inputs.clone())
    }
}
