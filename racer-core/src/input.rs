use serde::{Deserialize, Serialize};

/// Controls sampled once per physics tick.
///
/// The JSON record is fixed-shape; keys missing from older files read as
/// `false` and unknown keys are ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    pub accelerate: bool,
    pub brake: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl InputSnapshot {
    pub const IDLE: Self = Self {
        accelerate: false,
        brake: false,
        turn_left: false,
        turn_right: false,
    };

    pub const ACCELERATE: Self = Self {
        accelerate: true,
        brake: false,
        turn_left: false,
        turn_right: false,
    };

    /// True when any control is held.
    #[inline]
    pub fn any(self) -> bool {
        self.accelerate || self.brake || self.turn_left || self.turn_right
    }
}

const ACCELERATE_BIT: u8 = 0x01;
const BRAKE_BIT: u8 = 0x02;
const TURN_LEFT_BIT: u8 = 0x04;
const TURN_RIGHT_BIT: u8 = 0x08;
const RESERVED_BITS: u8 = 0xF0;

#[inline]
pub fn encode_input_byte(input: InputSnapshot) -> u8 {
    (if input.accelerate { ACCELERATE_BIT } else { 0 })
        | (if input.brake { BRAKE_BIT } else { 0 })
        | (if input.turn_left { TURN_LEFT_BIT } else { 0 })
        | (if input.turn_right { TURN_RIGHT_BIT } else { 0 })
}

/// Returns `None` when any of the reserved high bits are set.
#[inline]
pub fn decode_input_byte(byte: u8) -> Option<InputSnapshot> {
    if byte & RESERVED_BITS != 0 {
        return None;
    }

    Some(InputSnapshot {
        accelerate: (byte & ACCELERATE_BIT) != 0,
        brake: (byte & BRAKE_BIT) != 0,
        turn_left: (byte & TURN_LEFT_BIT) != 0,
        turn_right: (byte & TURN_RIGHT_BIT) != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_byte_roundtrip_for_all_valid_bit_patterns() {
        for byte in 0u8..=0x0F {
            let decoded = decode_input_byte(byte).expect("low nibble is valid");
            assert_eq!(encode_input_byte(decoded), byte);
        }
    }

    #[test]
    fn reserved_bits_are_rejected() {
        assert_eq!(decode_input_byte(0x10), None);
        assert_eq!(decode_input_byte(0x81), None);
    }

    #[test]
    fn missing_keys_default_to_released() {
        let input: InputSnapshot = serde_json::from_str(r#"{"accelerate": true}"#).unwrap();
        assert_eq!(input, InputSnapshot::ACCELERATE);

        let input: InputSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(input, InputSnapshot::IDLE);
    }

    #[test]
    fn json_record_uses_the_four_named_flags() {
        let input = InputSnapshot {
            accelerate: false,
            brake: true,
            turn_left: true,
            turn_right: false,
        };
        let value = serde_json::to_value(input).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "accelerate": false,
                "brake": true,
                "turn_left": true,
                "turn_right": false,
            })
        );
    }

    #[test]
    fn any_detects_each_control() {
        assert!(!InputSnapshot::IDLE.any());
        assert!(InputSnapshot::ACCELERATE.any());
        assert!(InputSnapshot {
            turn_right: true,
            ..InputSnapshot::IDLE
        }
        .any());
    }
}
