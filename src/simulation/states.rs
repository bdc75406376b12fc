//! Core state types for the orbit simulation.
//!
//! Defines the point entities the simulation moves around:
//! - `Body`   a point moved along a path by an orbit updater
//! - `Center` a reference point (a star) that bodies orbit
//!
//! `System` holds both lists and the current simulation time `t`.

use nalgebra::Vector3;
pub type NVec3 = Vector3<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub x: NVec3, // position
}

impl Body {
    pub fn new(x: NVec3) -> Self {
        Self { x }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Center {
    pub x: NVec3, // position, read every tick
}

impl Center {
    pub fn new(x: NVec3) -> Self {
        Self { x }
    }
}

#[derive(Debug, Clone, Default)]
pub struct System {
    pub bodies: Vec<Body>, // moving bodies
    pub centers: Vec<Center>, // fixed reference points
    pub t: f64, // time
}
