//! Keypad commands and their meaning per state

use crate::config::MachineConfig;
use crate::state::{Operation, ProcessState};

/// One discrete operator action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Keypad right: start, or fine increment in settings
    Right,
    /// Keypad left: fine decrement in settings
    Left,
    /// Keypad up: coarse increment, or jog forward in `Init`
    Up,
    /// Keypad down: coarse decrement, or jog back in `Init`
    Down,
    /// Keypad select: abort, enter settings, or confirm
    Select,
    /// Dedicated start button
    Start,
}

/// Map a command onto an operation for the current state
///
/// `limit_engaged` is the current level of the limit-switch line.
/// Returns `None` for commands that mean nothing here; those are ignored
/// without a report. Everything else goes through the transition table,
/// which reports operations it does not permit.
pub fn interpret(
    command: Command,
    state: ProcessState,
    limit_engaged: bool,
    config: &MachineConfig,
) -> Option<Operation> {
    let settings = state.is_settings();
    let steps = &config.settings;
    // Right shares the start meaning, so the same lockout covers it everywhere
    let right_blocked = limit_engaged && config.block_start_while_limit_engaged;

    match command {
        Command::Right if right_blocked => None,
        Command::Right if settings => Some(Operation::Adjust(steps.fine_step)),
        Command::Left if settings => Some(Operation::Adjust(-steps.fine_step)),
        Command::Up if settings => Some(Operation::Adjust(steps.coarse_step)),
        Command::Down if settings => Some(Operation::Adjust(-steps.coarse_step)),

        Command::Right | Command::Start => {
            if settings || right_blocked {
                None
            } else {
                Some(Operation::Start)
            }
        }
        Command::Left => None,

        Command::Up | Command::Down => {
            if state != ProcessState::Init || !config.jog_in_init || limit_engaged {
                return None;
            }
            if command == Command::Up {
                Some(Operation::Jog(config.jog_forward_mm))
            } else {
                Some(Operation::Jog(-config.jog_reverse_mm))
            }
        }

        Command::Select => match state {
            ProcessState::Calibrating | ProcessState::Wrapping | ProcessState::MovingHome => {
                Some(Operation::Abort)
            }
            ProcessState::Home if config.abort_from_home => Some(Operation::Abort),
            ProcessState::Home | ProcessState::Ready | ProcessState::Init => {
                Some(Operation::EnterSettings)
            }
            ProcessState::SettingTurns | ProcessState::SettingLeft | ProcessState::SettingRight => {
                Some(Operation::Confirm)
            }
        },
    }
}
