//! Point light payload carried by scene-graph light nodes.

use cgmath::Vector3;

use crate::data_structures::editable::EditableValue;

/// A point light. Its world position is taken from the owning node every frame.
#[derive(Clone, Debug)]
pub struct LightData {
    pub label: String,
    pub base_color: Vector3<f32>,
    pub intensity: EditableValue,
}

impl LightData {
    pub const DEFAULT_INTENSITY: f32 = 1.0;
    pub const MIN_INTENSITY: f32 = 0.0;
    pub const MAX_INTENSITY: f32 = 1.3;

    pub fn new(label: &str, base_color: Vector3<f32>) -> Self {
        Self::with_intensity(
            label,
            base_color,
            Self::DEFAULT_INTENSITY,
            Self::MIN_INTENSITY,
            Self::MAX_INTENSITY,
        )
    }

    pub fn with_intensity(
        label: &str,
        base_color: Vector3<f32>,
        default: f32,
        min: f32,
        max: f32,
    ) -> Self {
        Self {
            label: label.to_string(),
            base_color,
            intensity: EditableValue::new(label, default, min, max),
        }
    }

    /// `base_color · intensity`
    pub fn color(&self) -> Vector3<f32> {
        self.base_color * self.intensity.value()
    }
}
