//! Closed parametric paths that orbiting bodies travel along
//!
//! A [`Path`] maps a fraction in `[0, 1)` to a point, with `0` and `1` naming
//! the same point. Two shapes are provided:
//! - [`Ellipse`]  analytic, parametrised by eccentric angle, counter-clockwise
//! - [`Polyline`] closed polygon parametrised by arc length
//!
//! [`PathShape`] dispatches over both so scenarios can hold either.

use std::f64::consts::TAU;

use crate::error::ConfigError;
use crate::simulation::states::NVec3;

/// Closed curve sampled by fraction of the way around
pub trait Path {
    /// Point at fraction `f`. Values outside `[0, 1)` wrap around.
    fn point_at_fraction(&self, f: f64) -> NVec3;

    /// Derivative of the point with respect to the fraction, if the shape
    /// has one in closed form.
    fn derivative_at_fraction(&self, _f: f64) -> Option<NVec3> {
        None
    }
}

impl<P: Path + ?Sized> Path for &P {
    fn point_at_fraction(&self, f: f64) -> NVec3 {
        (**self).point_at_fraction(f)
    }

    fn derivative_at_fraction(&self, f: f64) -> Option<NVec3> {
        (**self).derivative_at_fraction(f)
    }
}

impl<P: Path + ?Sized> Path for Box<P> {
    fn point_at_fraction(&self, f: f64) -> NVec3 {
        (**self).point_at_fraction(f)
    }

    fn derivative_at_fraction(&self, f: f64) -> Option<NVec3> {
        (**self).derivative_at_fraction(f)
    }
}

/// Ellipse in the xy-plane
///
/// `p(f) = center + R(rotation) * (a cos 2πf, b sin 2πf, 0)`, so `f = 0` sits
/// on the +x vertex (before rotation) and `f = 0.75` at the bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    pub center: NVec3,
    pub a: f64, // semi-axis along x
    pub b: f64, // semi-axis along y
    pub rotation: f64, // radians about +z
}

impl Ellipse {
    pub fn new(center: NVec3, a: f64, b: f64, rotation: f64) -> Result<Self, ConfigError> {
        if !(a.is_finite() && a > 0.0 && b.is_finite() && b > 0.0) {
            return Err(ConfigError::InvalidPath(format!(
                "ellipse semi-axes must be positive, got a = {a}, b = {b}"
            )));
        }
        if !rotation.is_finite() {
            return Err(ConfigError::InvalidPath(format!("rotation must be finite, got {rotation}")));
        }
        Ok(Self { center, a, b, rotation })
    }

    pub fn circle(center: NVec3, radius: f64) -> Result<Self, ConfigError> {
        Self::new(center, radius, radius, 0.0)
    }

    /// Ellipse whose +x focus sits on `focus`, e.g. a star the orbit is drawn around.
    pub fn with_right_focus(focus: NVec3, a: f64, b: f64) -> Result<Self, ConfigError> {
        if b > a {
            return Err(ConfigError::InvalidPath(format!(
                "focus-anchored ellipse needs a >= b, got a = {a}, b = {b}"
            )));
        }
        let c = (a * a - b * b).sqrt();
        Self::new(focus - NVec3::new(c, 0.0, 0.0), a, b, 0.0)
    }

    /// Focal distance from the center
    pub fn focal_distance(&self) -> f64 {
        (self.a * self.a - self.b * self.b).abs().sqrt()
    }

    /// Both foci, major-axis positive end first
    pub fn foci(&self) -> [NVec3; 2] {
        let c = self.focal_distance();
        let axis = if self.a >= self.b {
            self.rotate(NVec3::new(c, 0.0, 0.0))
        } else {
            self.rotate(NVec3::new(0.0, c, 0.0))
        };
        [self.center + axis, self.center - axis]
    }

    fn rotate(&self, v: NVec3) -> NVec3 {
        let (sin, cos) = self.rotation.sin_cos();
        NVec3::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos, v.z)
    }
}

impl Path for Ellipse {
    fn point_at_fraction(&self, f: f64) -> NVec3 {
        let (sin, cos) = (TAU * f).sin_cos();
        self.center + self.rotate(NVec3::new(self.a * cos, self.b * sin, 0.0))
    }

    fn derivative_at_fraction(&self, f: f64) -> Option<NVec3> {
        let (sin, cos) = (TAU * f).sin_cos();
        Some(self.rotate(NVec3::new(-TAU * self.a * sin, TAU * self.b * cos, 0.0)))
    }
}

/// Closed polygon through `points`, parametrised by arc length
///
/// Fraction `f` is the share of the perimeter travelled from `points[0]`,
/// with the closing edge back to `points[0]` included.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<NVec3>,
    cumulative: Vec<f64>, // arc length at the start of each edge, plus the perimeter
}

impl Polyline {
    pub fn new(points: Vec<NVec3>) -> Result<Self, ConfigError> {
        if points.len() < 3 {
            return Err(ConfigError::InvalidPath(format!(
                "closed polyline needs at least 3 points, got {}",
                points.len()
            )));
        }
        if points.iter().any(|p| !p.iter().all(|c| c.is_finite())) {
            return Err(ConfigError::InvalidPath("polyline points must be finite".into()));
        }

        let n = points.len();
        let mut cumulative = Vec::with_capacity(n + 1);
        let mut total = 0.0;
        cumulative.push(total);
        for i in 0..n {
            total += (points[(i + 1) % n] - points[i]).norm();
            cumulative.push(total);
        }

        if total <= 0.0 {
            return Err(ConfigError::InvalidPath("polyline has zero perimeter".into()));
        }

        Ok(Self { points, cumulative })
    }

    pub fn points(&self) -> &[NVec3] {
        &self.points
    }

    pub fn perimeter(&self) -> f64 {
        self.cumulative[self.points.len()]
    }
}

impl Path for Polyline {
    fn point_at_fraction(&self, f: f64) -> NVec3 {
        let n = self.points.len();
        let target = f.rem_euclid(1.0) * self.perimeter();

        // Edge i spans cumulative[i]..cumulative[i + 1]
        let i = self
            .cumulative
            .partition_point(|&c| c <= target)
            .saturating_sub(1)
            .min(n - 1);

        let start = self.points[i];
        let end = self.points[(i + 1) % n];
        let len = self.cumulative[i + 1] - self.cumulative[i];
        if len <= 0.0 {
            return start;
        }
        let t = (target - self.cumulative[i]) / len;
        start + t * (end - start)
    }
}

/// Any of the supported path shapes
#[derive(Debug, Clone, PartialEq)]
pub enum PathShape {
    Ellipse(Ellipse),
    Polyline(Polyline),
}

impl Path for PathShape {
    fn point_at_fraction(&self, f: f64) -> NVec3 {
        match self {
            PathShape::Ellipse(e) => e.point_at_fraction(f),
            PathShape::Polyline(p) => p.point_at_fraction(f),
        }
    }

    fn derivative_at_fraction(&self, f: f64) -> Option<NVec3> {
        match self {
            PathShape::Ellipse(e) => e.derivative_at_fraction(f),
            PathShape::Polyline(p) => p.derivative_at_fraction(f),
        }
    }
}

impl From<Ellipse> for PathShape {
    fn from(e: Ellipse) -> Self {
        PathShape::Ellipse(e)
    }
}

impl From<Polyline> for PathShape {
    fn from(p: Polyline) -> Self {
        PathShape::Polyline(p)
    }
}
