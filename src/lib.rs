pub mod error;
pub mod config;
pub mod vector;
pub mod matrix;
pub mod quaternion;

pub use crate::error::{GyreError, GyreResult};
pub use crate::vector::Vec3;
pub use crate::matrix::Mat4;
pub use crate::quaternion::{Quaternion, AxisAngle};
