//! Analog keypad and start button decoding
//!
//! The five keypad buttons share one analog input through a resistor
//! ladder. A key is reported when it is released, so a held key produces
//! exactly one command.

use super::command::Command;

/// Keypad sample period
pub const KEYPAD_PERIOD_MS: u32 = 150;

/// Minimum press of the start button
pub const START_MIN_PRESS_MS: u32 = 150;

/// Decode a 10-bit ladder reading into the key held down, if any
pub fn decode_ladder(raw: u16) -> Option<Command> {
    match raw {
        0..=49 => Some(Command::Right),
        50..=249 => Some(Command::Up),
        250..=449 => Some(Command::Down),
        450..=649 => Some(Command::Left),
        650..=849 => Some(Command::Select),
        _ => None,
    }
}

/// Release-edge detector for the keypad ladder
#[derive(Debug, Clone)]
pub struct KeypadDecoder {
    period_ms: u32,
    last_sample_ms: Option<u32>,
    held: Option<Command>,
}

impl Default for KeypadDecoder {
    fn default() -> Self {
        Self::new(KEYPAD_PERIOD_MS)
    }
}

impl KeypadDecoder {
    /// Create a decoder sampling at most once per `period_ms`
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            last_sample_ms: None,
            held: None,
        }
    }

    /// Feed a reading; returns the key just released
    ///
    /// Readings arriving faster than the sample period are dropped.
    pub fn update(&mut self, now_ms: u32, raw: u16) -> Option<Command> {
        if let Some(last) = self.last_sample_ms {
            if now_ms.wrapping_sub(last) <= self.period_ms {
                return None;
            }
        }
        self.last_sample_ms = Some(now_ms);

        let key = decode_ladder(raw);
        match (self.held, key) {
            (Some(released), None) => {
                self.held = None;
                Some(released)
            }
            _ => {
                self.held = key;
                None
            }
        }
    }
}

/// Release-edge detector for the start button
#[derive(Debug, Clone)]
pub struct StartButton {
    min_press_ms: u32,
    pressed_since: Option<u32>,
}

impl Default for StartButton {
    fn default() -> Self {
        Self::new(START_MIN_PRESS_MS)
    }
}

impl StartButton {
    /// Create a detector reporting a release no earlier than
    /// `min_press_ms` after the press began
    ///
    /// A release seen sooner is ignored; the first released sample after
    /// that point reports `Start`, so a tap and a long press both end up
    /// reported once the delay has passed.
    pub fn new(min_press_ms: u32) -> Self {
        Self {
            min_press_ms,
            pressed_since: None,
        }
    }

    /// Feed the button level; returns `Start` on a qualifying release
    pub fn update(&mut self, now_ms: u32, pressed: bool) -> Option<Command> {
        match (self.pressed_since, pressed) {
            (None, true) => {
                self.pressed_since = Some(now_ms);
                None
            }
            (Some(since), false) => {
                if now_ms.wrapping_sub(since) > self.min_press_ms {
                    self.pressed_since = None;
                    Some(Command::Start)
                } else {
                    // Too short: keep waiting, the next long-enough
                    // sample still counts as the release
                    None
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_thresholds() {
        assert_eq!(decode_ladder(0), Some(Command::Right));
        assert_eq!(decode_ladder(49), Some(Command::Right));
        assert_eq!(decode_ladder(50), Some(Command::Up));
        assert_eq!(decode_ladder(300), Some(Command::Down));
        assert_eq!(decode_ladder(500), Some(Command::Left));
        assert_eq!(decode_ladder(700), Some(Command::Select));
        assert_eq!(decode_ladder(900), None);
        assert_eq!(decode_ladder(1023), None);
    }

    #[test]
    fn test_key_reported_on_release() {
        let mut keypad = KeypadDecoder::new(150);

        assert_eq!(keypad.update(0, 700), None);
        assert_eq!(keypad.update(200, 700), None);
        assert_eq!(keypad.update(400, 1023), Some(Command::Select));
        assert_eq!(keypad.update(600, 1023), None);
    }

    #[test]
    fn test_samples_inside_period_dropped() {
        let mut keypad = KeypadDecoder::new(150);

        keypad.update(0, 10);
        // Released, but too soon to be sampled
        assert_eq!(keypad.update(100, 1023), None);
        assert_eq!(keypad.update(151, 1023), Some(Command::Right));
    }

    #[test]
    fn test_last_held_key_wins() {
        let mut keypad = KeypadDecoder::new(150);

        keypad.update(0, 100);
        keypad.update(200, 300);
        assert_eq!(keypad.update(400, 1023), Some(Command::Down));
    }

    #[test]
    fn test_start_button_reports_release() {
        let mut button = StartButton::new(150);

        assert_eq!(button.update(1000, true), None);
        assert_eq!(button.update(1100, true), None);
        assert_eq!(button.update(1200, false), Some(Command::Start));
        assert_eq!(button.update(1300, false), None);
    }

    #[test]
    fn test_start_button_tap_reported_after_delay() {
        let mut button = StartButton::new(150);

        button.update(1000, true);
        assert_eq!(button.update(1050, false), None);
        assert_eq!(button.update(1200, false), Some(Command::Start));
    }
}
