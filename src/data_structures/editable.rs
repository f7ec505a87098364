//! Bounded values that the user can tweak at runtime (light intensity,
//! material multipliers, ambient strength).

/// A float clamped into `[min, max]` on every write.
#[derive(Clone, Debug, PartialEq)]
pub struct EditableValue {
    pub label: String,
    pub default: f32,
    pub min: f32,
    pub max: f32,
    value: f32,
}

impl EditableValue {
    pub fn new(label: &str, default: f32, min: f32, max: f32) -> Self {
        if min > max {
            log::warn!(
                "Editable {} has min {} above max {}, swapping the bounds",
                label,
                min,
                max
            );
        }
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        Self {
            label: label.to_string(),
            default: default.clamp(min, max),
            min,
            max,
            value: default.clamp(min, max),
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set(&mut self, value: f32) {
        self.value = value.clamp(self.min, self.max);
    }

    pub fn apply_delta(&mut self, delta: f32) {
        self.set(self.value + delta);
    }

    pub fn reset(&mut self) {
        self.value = self.default;
    }
}

impl std::fmt::Display for EditableValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:.2}", self.label, self.value)
    }
}

/**
 * Drives several editables from one slider in `[0, 2]`.
 *
 * `1` puts every member at its default. Below that a member moves linearly
 * between its own min (at `0`) and default, above it between default and
 * its own max (at `2`).
 */
#[derive(Clone, Debug)]
pub struct EditableValueGroup {
    control: EditableValue,
    members: Vec<EditableValue>,
}

impl EditableValueGroup {
    pub fn new(label: &str) -> Self {
        Self {
            control: EditableValue::new(label, 1.0, 0.0, 2.0),
            members: Vec::new(),
        }
    }

    pub fn with(mut self, member: EditableValue) -> Self {
        self.add(member);
        self
    }

    /// Adds `member`, replacing any member with the same label.
    pub fn add(&mut self, member: EditableValue) {
        match self.members.iter_mut().find(|m| m.label == member.label) {
            Some(existing) => *existing = member,
            None => self.members.push(member),
        }
    }

    pub fn value(&self) -> f32 {
        self.control.value()
    }

    pub fn set(&mut self, value: f32) {
        self.control.set(value);
        let slider = self.control.value();
        for member in self.members.iter_mut() {
            let mapped = normalize(slider, member);
            member.set(mapped);
        }
    }

    pub fn apply_delta(&mut self, delta: f32) {
        self.set(self.control.value() + delta);
    }

    pub fn reset(&mut self) {
        self.set(self.control.default);
    }

    pub fn member(&self, label: &str) -> Option<&EditableValue> {
        self.members.iter().find(|m| m.label == label)
    }

    pub fn members(&self) -> &[EditableValue] {
        &self.members
    }
}

fn normalize(slider: f32, member: &EditableValue) -> f32 {
    let between = |t: f32, lo: f32, hi: f32| t * (hi - lo) + lo;
    if slider <= 1.0 {
        between(slider, member.min, member.default)
    } else {
        between(slider - 1.0, member.default, member.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_clamped() {
        let mut value = EditableValue::new("intensity", 1.0, 0.0, 1.3);
        value.set(5.0);
        assert_eq!(value.value(), 1.3);
        value.apply_delta(-10.0);
        assert_eq!(value.value(), 0.0);
        value.reset();
        assert_eq!(value.value(), 1.0);
    }

    #[test]
    fn group_maps_halves_onto_min_default_and_default_max() {
        let mut group = EditableValueGroup::new("lights")
            .with(EditableValue::new("a", 1.0, 0.0, 2.0))
            .with(EditableValue::new("b", 0.5, 0.0, 0.75));

        group.set(0.5);
        assert!((group.member("a").unwrap().value() - 0.5).abs() < 1e-6);
        assert!((group.member("b").unwrap().value() - 0.25).abs() < 1e-6);

        group.set(1.5);
        assert!((group.member("a").unwrap().value() - 1.5).abs() < 1e-6);
        assert!((group.member("b").unwrap().value() - 0.625).abs() < 1e-6);

        group.set(9.0);
        assert_eq!(group.value(), 2.0);
        assert_eq!(group.member("b").unwrap().value(), 0.75);
    }
}
