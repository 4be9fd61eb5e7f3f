//! Point-wise transforms that bend a planar shape onto a cylindrical shell.
//!
//! Coordinate convention: Z is the cylinder axis, the angle is measured in
//! the X–Y plane from +X toward +Y, and the radius is measured in that
//! plane. `cylindrical_to_cartesian(r, 0.0, z)` therefore lands on the +X
//! half-plane at `(r, 0, z)`.

use crate::types::{Point, Value};

/// Default shell radius of the wrapped plate, in application units.
pub const DEFAULT_BASE_RADIUS: Value = 30.0;

/// Default wrap rate in radians of cylinder swept per unit of plate `x`.
pub const DEFAULT_WRAP_RATE: Value = 0.04;

/// Converts cylindrical coordinates `(radius, angle, z-along-axis)` to a
/// Cartesian point.
#[inline]
pub fn cylindrical_to_cartesian(radius: Value, angle: Value, z: Value) -> Point {
    Point::new(radius * angle.cos(), radius * angle.sin(), z)
}

/// Recovers `(radius, angle, z-along-axis)` from a Cartesian point.
///
/// Inverse of [`cylindrical_to_cartesian`] up to angle wrapping; the angle
/// is returned in `(-π, π]`.
#[inline]
pub fn cartesian_to_cylindrical(p: Point) -> (Value, Value, Value) {
    (p.x.hypot(p.y), p.y.atan2(p.x), p.z)
}

/// A pluggable per-vertex coordinate transform.
///
/// Applied independently and identically to every vertex of a shape, with no
/// coupling between vertices. That makes it trivially parallel and lets the
/// same shape be bent onto any target surface family without the shape
/// constructor knowing which.
///
/// Any `Fn(Point) -> Point + Send + Sync` closure qualifies.
pub trait PointTransform: Send + Sync {
    /// Maps one input vertex to one output vertex.
    ///
    /// Total over all real triples; no error conditions.
    fn apply(&self, p: Point) -> Point;
}

impl<F> PointTransform for F
where
    F: Fn(Point) -> Point + Send + Sync,
{
    fn apply(&self, p: Point) -> Point {
        self(p)
    }
}

/// The built-in box-to-cylinder wrap policies.
///
/// Both interpret the input frame the same way: plate `x` sweeps around the
/// cylinder, plate `y` runs along the axis, and plate `z` (the emboss
/// direction) displaces radially outward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CylinderWrap {
    /// Plain cylindrical shell:
    ///
    /// ```text
    /// z'   = y
    /// r'   = base_radius + z
    /// phi' = -wrap_rate * x
    /// ```
    Basic {
        /// Radius of the shell at the plate's nominal plane.
        base_radius: Value,
        /// Radians swept per unit of plate `x`.
        wrap_rate: Value,
    },
    /// Corrugated shell with an overhang-compensating shear.
    ///
    /// A sinusoidal ripple of `amplitude` repeated `frequency` times per
    /// radian is added to the radius, and the axial coordinate is sheared by
    /// `tan(overhang)` so that overhanging walls print at the given angle:
    ///
    /// ```text
    /// phi' = -wrap_rate * x
    /// z'   = y + amplitude * cos(frequency * phi') + tan(overhang) * z
    /// r'   = base_radius + amplitude * sin(frequency * phi') + z
    /// ```
    Corrugated {
        base_radius: Value,
        wrap_rate: Value,
        /// Ripple depth in application units.
        amplitude: Value,
        /// Ripple repetitions per radian of cylinder angle.
        frequency: Value,
        /// Overhang compensation angle, in degrees.
        overhang_deg: Value,
    },
}

impl Default for CylinderWrap {
    fn default() -> Self {
        Self::Basic {
            base_radius: DEFAULT_BASE_RADIUS,
            wrap_rate: DEFAULT_WRAP_RATE,
        }
    }
}

impl CylinderWrap {
    /// A corrugated wrap with the documented reference constants.
    pub fn corrugated() -> Self {
        Self::Corrugated {
            base_radius: DEFAULT_BASE_RADIUS,
            wrap_rate: DEFAULT_WRAP_RATE,
            amplitude: 5.0,
            frequency: 3.0,
            overhang_deg: 30.0,
        }
    }

    /// Computes the intermediate cylindrical coordinates
    /// `(radius, angle, z-along-axis)` for one input vertex.
    pub fn to_cylindrical(&self, p: Point) -> (Value, Value, Value) {
        match *self {
            Self::Basic {
                base_radius,
                wrap_rate,
            } => {
                let angle = -wrap_rate * p.x;
                (base_radius + p.z, angle, p.y)
            }
            Self::Corrugated {
                base_radius,
                wrap_rate,
                amplitude,
                frequency,
                overhang_deg,
            } => {
                let angle = -wrap_rate * p.x;
                let z = p.y
                    + amplitude * (frequency * angle).cos()
                    + overhang_deg.to_radians().tan() * p.z;
                let radius = base_radius + amplitude * (frequency * angle).sin() + p.z;
                (radius, angle, z)
            }
        }
    }
}

impl PointTransform for CylinderWrap {
    fn apply(&self, p: Point) -> Point {
        let (radius, angle, z) = self.to_cylindrical(p);
        cylindrical_to_cartesian(radius, angle, z)
    }
}
