//! Gamepad polling through gilrs.
//!
//! The first pad seen connected becomes the active one and stays active
//! until it disconnects; the next pad to connect then takes over.

use gilrs::{Axis, Event, EventType, GamepadId, Gilrs};
use tracing::{info, warn};

use crate::input::GamepadAxes;

pub struct GamepadInput {
    gilrs: Option<Gilrs>,
    active: Option<GamepadId>,
}

impl GamepadInput {
    /// Open the platform gamepad backend. Without one the simulator runs on
    /// the keyboard alone.
    pub fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => gilrs,
            Err(e) => {
                warn!(error = %e, "Gamepad backend unavailable, keyboard only");
                return GamepadInput {
                    gilrs: None,
                    active: None,
                };
            }
        };

        let active = gilrs.gamepads().next().map(|(id, pad)| {
            info!(gamepad = pad.name(), "Gamepad connected");
            id
        });
        GamepadInput {
            gilrs: Some(gilrs),
            active,
        }
    }

    /// Drain pending connection events and read the active pad's sticks.
    ///
    /// Returns `None` when no pad is connected.
    pub fn poll(&mut self) -> Option<GamepadAxes> {
        let gilrs = self.gilrs.as_mut()?;
        while let Some(Event { id, event, .. }) = gilrs.next_event() {
            match event {
                EventType::Connected if self.active.is_none() => {
                    let name = gilrs.gamepad(id).name().to_owned();
                    info!(gamepad = name, "Gamepad connected");
                    self.active = Some(id);
                }
                EventType::Disconnected if self.active == Some(id) => {
                    info!("Gamepad disconnected, back to keyboard");
                    self.active = None;
                }
                _ => {}
            }
        }

        let pad = gilrs.connected_gamepad(self.active?)?;
        Some(GamepadAxes::from_sticks(
            pad.value(Axis::LeftStickX),
            pad.value(Axis::LeftStickY),
            pad.value(Axis::RightStickX),
            pad.value(Axis::RightStickY),
        ))
    }
}
