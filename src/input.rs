//! Keyboard and gamepad state turned into drive commands and menu actions.
//!
//! The window backend captures an [`InputSnapshot`] once per tick; everything
//! here is a pure function of that snapshot plus the [`Debouncer`].

use std::collections::BTreeSet;

use fieldsim_kinematics::{MecanumCommand, TankCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    H,
    F,
    T,
    P,
    Left,
    Right,
}

/// Standard-layout gamepad axes, each in `[-1, 1]`.
///
/// 0: left stick x, 1: left stick y (down is positive), 2: right stick x,
/// 3: right stick y.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GamepadAxes(pub [f64; 4]);

impl GamepadAxes {
    /// Build standard-layout axes from stick readings that are positive up.
    ///
    /// # Arguments
    ///
    /// * `left_x`, `left_y`: Left stick, right and up positive.
    /// * `right_x`, `right_y`: Right stick, right and up positive.
    pub fn from_sticks(left_x: f32, left_y: f32, right_x: f32, right_y: f32) -> Self {
        GamepadAxes([
            f64::from(left_x),
            -f64::from(left_y),
            f64::from(right_x),
            -f64::from(right_y),
        ])
    }

    fn axis(&self, index: usize) -> f64 {
        self.0[index]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    held: BTreeSet<Key>,
    gamepad: Option<GamepadAxes>,
}

impl InputSnapshot {
    pub fn new(held: impl IntoIterator<Item = Key>, gamepad: Option<GamepadAxes>) -> Self {
        InputSnapshot {
            held: held.into_iter().collect(),
            gamepad,
        }
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn gamepad(&self) -> Option<&GamepadAxes> {
        self.gamepad.as_ref()
    }
}

/// Turns held keys into one-shot presses: a key fires once and stays
/// handled until it is seen released.
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    handled: BTreeSet<Key>,
}

impl Debouncer {
    pub fn new_press(&mut self, snapshot: &InputSnapshot, key: Key) -> bool {
        if !snapshot.is_down(key) {
            self.handled.remove(&key);
            return false;
        }
        self.handled.insert(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    DecreaseAccel,
    IncreaseAccel,
    ToggleTelemetry,
    NextField,
    SwitchDrivetrain,
    TogglePathFollow,
}

const MENU_KEYS: [(Key, MenuAction); 6] = [
    (Key::Q, MenuAction::DecreaseAccel),
    (Key::E, MenuAction::IncreaseAccel),
    (Key::H, MenuAction::ToggleTelemetry),
    (Key::F, MenuAction::NextField),
    (Key::T, MenuAction::SwitchDrivetrain),
    (Key::P, MenuAction::TogglePathFollow),
];

/// Menu actions newly triggered this tick.
pub fn menu_actions(debouncer: &mut Debouncer, snapshot: &InputSnapshot) -> Vec<MenuAction> {
    MENU_KEYS
        .iter()
        .filter(|(key, _)| debouncer.new_press(snapshot, *key))
        .map(|(_, action)| *action)
        .collect()
}

/// Zero out inputs whose magnitude is below `width`.
pub fn deadband(input: f64, width: f64) -> f64 {
    if input.abs() < width { 0.0 } else { input }
}

fn key_axis(snapshot: &InputSnapshot, positive: Key, negative: Key, magnitude: f64) -> f64 {
    let mut value = 0.0;
    if snapshot.is_down(positive) {
        value += magnitude;
    }
    if snapshot.is_down(negative) {
        value -= magnitude;
    }
    value
}

/// Split-arcade mapping for tank drive. The gamepad wins when connected.
///
/// Left stick y is throttle and right stick x is turn; on the keyboard `w`/`s`
/// drive and `d`/`a` turn at half rate.
pub fn tank_command(snapshot: &InputSnapshot, deadzone: f64) -> TankCommand {
    let (throttle, turn) = match snapshot.gamepad() {
        Some(pad) => (
            deadband(-pad.axis(1), deadzone),
            deadband(pad.axis(2), deadzone),
        ),
        None => (
            key_axis(snapshot, Key::W, Key::S, 1.0),
            key_axis(snapshot, Key::D, Key::A, 0.5),
        ),
    };
    TankCommand::new(throttle + turn, throttle - turn)
}

/// Holonomic mapping for mecanum drive. The gamepad wins when connected.
///
/// Left stick drives and strafes, right stick x turns; on the keyboard `w`/`s`
/// drive, `d`/`a` strafe and the arrow keys turn at half rate.
pub fn mecanum_command(snapshot: &InputSnapshot, deadzone: f64) -> MecanumCommand {
    let (forward, right, turn) = match snapshot.gamepad() {
        Some(pad) => (
            deadband(-pad.axis(1), deadzone),
            deadband(pad.axis(0), deadzone),
            deadband(pad.axis(2), deadzone),
        ),
        None => (
            key_axis(snapshot, Key::W, Key::S, 1.0),
            key_axis(snapshot, Key::D, Key::A, 1.0),
            key_axis(snapshot, Key::Right, Key::Left, 0.5),
        ),
    };
    MecanumCommand::mix(forward, right, turn)
}
