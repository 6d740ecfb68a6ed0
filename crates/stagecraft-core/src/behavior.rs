//! # Behavior Module
//!
//! Per-frame behaviors composed onto nodes.
//!
//! A node owns any number of behaviors; each one gets `on_update` after the
//! node's own element has updated, with mutable access to that element.
//! Behaviors only touch the element through its facets, so the same behavior
//! works on any element that exposes a transform.

use crate::document::parse_f32;
use crate::element::Element;
use crate::types::Transform2D;
use glam::Vec2;
use tracing::warn;

pub trait Behavior: std::fmt::Debug {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn on_update(&mut self, element: &mut dyn Element, dt: f32);

    /// Current parameters in the order a factory accepts them.
    fn params(&self) -> Vec<String>;

    /// Puts back the transform fields this behavior animates, as they were
    /// before its first update.
    fn restore_authored(&self, _transform: &mut Transform2D) {}
}

/// Reads the `index`-th numeric parameter, keeping `default` if it is
/// missing or not a number.
pub fn param_or(params: &[String], index: usize, default: f32, name: &str) -> f32 {
    let Some(raw) = params.get(index) else {
        return default;
    };
    match parse_f32(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(param = name, error = %e, default, "bad behavior parameter; using default");
            default
        }
    }
}

fn sanitize(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

/// Spins the element at a constant rate, keeping rotation in `[0, 360)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rotate {
    /// Degrees per second.
    pub speed: f32,
}

impl Rotate {
    pub const DEFAULT_SPEED: f32 = 90.0;

    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    pub fn from_params(params: &[String]) -> Self {
        Self::new(param_or(params, 0, Self::DEFAULT_SPEED, "speed"))
    }
}

impl Behavior for Rotate {
    fn name(&self) -> &'static str {
        "rotate"
    }

    fn on_update(&mut self, element: &mut dyn Element, dt: f32) {
        if let Some(t) = element.transform_mut() {
            t.rotation = (t.rotation + self.speed * sanitize(dt)).rem_euclid(360.0);
        }
    }

    fn params(&self) -> Vec<String> {
        vec![self.speed.to_string()]
    }
}

/// Swings the element horizontally around the x position it started at.
#[derive(Debug, Clone, PartialEq)]
pub struct Oscillate {
    pub amplitude: f32,
    /// Angular frequency in radians per second.
    pub frequency: f32,
    origin_x: f32,
    time: f32,
}

impl Oscillate {
    pub const DEFAULT_AMPLITUDE: f32 = 0.1;
    pub const DEFAULT_FREQUENCY: f32 = 2.0;

    pub fn new(amplitude: f32, frequency: f32, origin_x: f32) -> Self {
        Self {
            amplitude,
            frequency,
            origin_x,
            time: 0.0,
        }
    }

    pub fn from_params(params: &[String], origin_x: f32) -> Self {
        Self::new(
            param_or(params, 0, Self::DEFAULT_AMPLITUDE, "amplitude"),
            param_or(params, 1, Self::DEFAULT_FREQUENCY, "frequency"),
            origin_x,
        )
    }

    pub fn origin_x(&self) -> f32 {
        self.origin_x
    }
}

impl Behavior for Oscillate {
    fn name(&self) -> &'static str {
        "oscillate"
    }

    fn on_update(&mut self, element: &mut dyn Element, dt: f32) {
        self.time += sanitize(dt);
        if let Some(t) = element.transform_mut() {
            t.position.x = self.origin_x + self.amplitude * (self.frequency * self.time).sin();
        }
    }

    fn params(&self) -> Vec<String> {
        vec![self.amplitude.to_string(), self.frequency.to_string()]
    }

    fn restore_authored(&self, transform: &mut Transform2D) {
        transform.position.x = self.origin_x;
    }
}

/// Breathes the element's uniform scale around a base value.
#[derive(Debug, Clone, PartialEq)]
pub struct Pulse {
    pub base_scale: f32,
    pub amount: f32,
    pub frequency: f32,
    time: f32,
    /// Scale the element had when the first update overwrote it.
    authored_scale: Option<Vec2>,
}

impl Pulse {
    pub const DEFAULT_BASE: f32 = 1.0;
    pub const DEFAULT_AMOUNT: f32 = 0.2;
    pub const DEFAULT_FREQUENCY: f32 = 3.0;

    pub fn new(base_scale: f32, amount: f32, frequency: f32) -> Self {
        Self {
            base_scale,
            amount,
            frequency,
            time: 0.0,
            authored_scale: None,
        }
    }

    pub fn from_params(params: &[String]) -> Self {
        Self::new(
            param_or(params, 0, Self::DEFAULT_BASE, "base_scale"),
            param_or(params, 1, Self::DEFAULT_AMOUNT, "pulse_amount"),
            param_or(params, 2, Self::DEFAULT_FREQUENCY, "frequency"),
        )
    }
}

impl Behavior for Pulse {
    fn name(&self) -> &'static str {
        "pulse"
    }

    fn on_update(&mut self, element: &mut dyn Element, dt: f32) {
        self.time += sanitize(dt);
        if let Some(t) = element.transform_mut() {
            self.authored_scale.get_or_insert(t.scale);
            let s = self.base_scale + self.amount * (self.frequency * self.time).sin();
            t.scale.x = s;
            t.scale.y = s;
        }
    }

    fn params(&self) -> Vec<String> {
        vec![
            self.base_scale.to_string(),
            self.amount.to_string(),
            self.frequency.to_string(),
        ]
    }

    fn restore_authored(&self, transform: &mut Transform2D) {
        if let Some(scale) = self.authored_scale {
            transform.scale = scale;
        }
    }
}
