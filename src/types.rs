use nalgebra::{Point3, Vector3};

/// Scalar value used throughout the crate (samples, heights, coordinates).
pub type Value = f32;

/// A 3D point with [`Value`] components.
pub type Point = Point3<Value>;

/// A 3D vector with [`Value`] components.
pub type Vector = Vector3<Value>;

/// A height policy function: maps a normalized grayscale sample in `[0, 1]`
/// (0 = black, 1 = white) to an emboss height in application units.
pub type CompiledHeight = dyn Fn(Value) -> Value + Send + Sync;

/// A point transform function: maps one vertex [`Point`] to another.
///
/// Applied independently and identically to every vertex of a shape, so it
/// must be `Send + Sync` for the parallel remap stage.
pub type CompiledTransform = dyn Fn(Point) -> Point + Send + Sync;
