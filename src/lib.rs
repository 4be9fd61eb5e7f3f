pub mod error;
pub mod field;
pub mod height;
pub mod mesh;
pub mod plugin;
pub mod types;
pub mod wrap;

pub use plugin::ReliefWrapPlugin;
