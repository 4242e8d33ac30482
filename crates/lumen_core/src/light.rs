use lumen_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::Color;

/// A point light. Its color is the radiance it contributes, unattenuated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub position: Vec3,
    pub color: Color,
}

impl Light {
    pub fn new(position: Vec3, color: Color) -> Self {
        Self { position, color }
    }
}
