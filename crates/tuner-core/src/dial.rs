//! Dial input controller — raw pointer/wheel/key events in, value deltas out.
//!
//! Design principles (same as the rest of the engine):
//! - The controller owns its interaction state (armed gate, drag angle).
//! - It never mutates shared state; `handle_event` returns `Vec<DialAction>`
//!   for the owner to dispatch.
//! - State is committed before actions are emitted, in a fixed order, so the
//!   owner always observes a consistent controller when it reacts.

use tracing::debug;

/// Degrees of value change per degree of pointer rotation, before damping.
pub const DRAG_GAIN: f64 = 2.0;
/// Damping applied to drag deltas to reduce sensitivity.
pub const DRAG_DAMPING: f64 = 0.3;
/// Value change per wheel notch or arrow key press.
pub const STEP: i32 = 1;

/// A raw input event, as forwarded by whatever surface hosts the dial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DialEvent {
    /// Click/tap on the knob — toggles the armed gate.
    Click,
    /// Wheel movement; positive `delta_y` scrolls down (value decreases).
    Wheel { delta_y: f64 },
    /// Pointer pressed at surface coordinates.
    Press { x: f64, y: f64 },
    /// Pointer moved while pressed.
    Move { x: f64, y: f64 },
    /// Pointer released.
    Release,
    Key(DialKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialKey {
    ArrowUp,
    ArrowDown,
}

/// What the controller reports back to its owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DialAction {
    /// The tuned value changed (already clamped).
    ValueChanged(i32),
    /// The armed gate flipped.  Emitted once per transition.
    ArmedChanged(bool),
    /// The knob disarmed — the owner should treat this value as landed and
    /// run its one-shot downstream work (regeneration, persistence).
    Committed(i32),
}

pub struct DialController {
    /// Center of the control on the host surface, for drag-angle math.
    center: (f64, f64),
    min: i32,
    max: i32,
    /// Continuous accumulator; reported values are the rounded clamp of this.
    value: f64,
    armed: bool,
    /// Angle recorded on press / last move.  None while not dragging.
    last_angle: Option<f64>,
}

impl DialController {
    pub fn new(center: (f64, f64), min: i32, max: i32, value: i32) -> Self {
        Self {
            center,
            min,
            max,
            value: value.clamp(min, max) as f64,
            armed: false,
            last_angle: None,
        }
    }

    pub fn armed(&self) -> bool {
        self.armed
    }

    pub fn value(&self) -> i32 {
        (self.value.round() as i32).clamp(self.min, self.max)
    }

    /// Reposition the control (host surface resized).  Ends any drag so the
    /// next move cannot apply a delta computed against the old center.
    pub fn set_center(&mut self, center: (f64, f64)) {
        self.center = center;
        self.last_angle = None;
    }

    /// Reset to a new axis: range, current value, disarm, drop any drag.
    pub fn retarget(&mut self, min: i32, max: i32, value: i32) {
        self.min = min;
        self.max = max;
        self.value = value.clamp(min, max) as f64;
        self.last_angle = None;
    }

    /// Handle one raw event.  Out-of-range or NaN input clamps or no-ops
    /// silently; nothing here ever errors.
    pub fn handle_event(&mut self, event: DialEvent) -> Vec<DialAction> {
        match event {
            DialEvent::Click => self.toggle_armed(),
            _ if !self.armed => Vec::new(),
            DialEvent::Wheel { delta_y } => {
                if delta_y == 0.0 || delta_y.is_nan() {
                    return Vec::new();
                }
                let step = if delta_y > 0.0 { -STEP } else { STEP };
                self.apply_delta(step as f64)
            }
            DialEvent::Press { x, y } => {
                // Initialise the drag reference here, never on first move —
                // otherwise the first move applies a spurious delta from 0°.
                self.last_angle = Some(self.pointer_angle(x, y));
                Vec::new()
            }
            DialEvent::Move { x, y } => {
                let Some(last) = self.last_angle else {
                    return Vec::new();
                };
                let angle = self.pointer_angle(x, y);
                if angle.is_nan() {
                    return Vec::new();
                }
                let delta = shortest_angle_delta(angle - last);
                self.last_angle = Some(angle);
                self.apply_delta(drag_delta(delta))
            }
            DialEvent::Release => {
                self.last_angle = None;
                Vec::new()
            }
            DialEvent::Key(key) => {
                let step = match key {
                    DialKey::ArrowUp => STEP,
                    DialKey::ArrowDown => -STEP,
                };
                self.apply_delta(step as f64)
            }
        }
    }

    fn toggle_armed(&mut self) -> Vec<DialAction> {
        self.armed = !self.armed;
        self.last_angle = None;
        let mut actions = vec![DialAction::ArmedChanged(self.armed)];
        if !self.armed {
            debug!("dial disarmed, committing value {}", self.value());
            actions.push(DialAction::Committed(self.value()));
        }
        actions
    }

    fn apply_delta(&mut self, delta: f64) -> Vec<DialAction> {
        if delta == 0.0 || delta.is_nan() {
            return Vec::new();
        }
        let before = self.value();
        self.value = (self.value + delta).clamp(self.min as f64, self.max as f64);
        let after = self.value();
        if after == before {
            return Vec::new();
        }
        vec![DialAction::ValueChanged(after)]
    }

    /// Angle in degrees from the control center to the pointer.
    fn pointer_angle(&self, x: f64, y: f64) -> f64 {
        (y - self.center.1).atan2(x - self.center.0).to_degrees()
    }
}

/// Shortest signed equivalent of an angular delta, wrapping across the
/// ±180° seam.
pub fn shortest_angle_delta(delta: f64) -> f64 {
    if delta > 180.0 {
        delta - 360.0
    } else if delta < -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

/// Raw value change for an angular delta, before clamping.
pub fn drag_delta(angle_delta: f64) -> f64 {
    angle_delta * DRAG_GAIN * DRAG_DAMPING
}
