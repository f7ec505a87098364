//! Keyboard and mouse state, fed by winit events and queried by animators.
//!
//! Held keys are level triggered. Presses are also recorded as edges that
//! stay visible until [`Input::end_frame`], and fire any callbacks
//! registered with [`Input::on_key_press`] the moment they arrive.

use std::collections::{HashMap, HashSet};

use cgmath::{InnerSpace, Vector2, Vector3, Zero};
use winit::{
    event::{DeviceEvent, ElementState, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Pixels per line for touchpads that report scrolling in pixels.
const PIXELS_PER_LINE: f32 = 20.0;

type KeyCallback = Box<dyn FnMut()>;

pub struct Input {
    held: HashSet<KeyCode>,
    pressed: HashSet<KeyCode>,
    callbacks: HashMap<KeyCode, Vec<KeyCallback>>,
    mouse_delta: Vector2<f32>,
    scroll_delta: Vector2<f32>,
}

impl Input {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            pressed: HashSet::new(),
            callbacks: HashMap::new(),
            mouse_delta: Vector2::zero(),
            scroll_delta: Vector2::zero(),
        }
    }

    /// Registers `callback` to run on every press of `key` (not on repeats).
    pub fn on_key_press(&mut self, key: KeyCode, callback: impl FnMut() + 'static) {
        self.callbacks
            .entry(key)
            .or_default()
            .push(Box::new(callback));
    }

    pub fn press_key(&mut self, key: KeyCode) {
        if !self.held.insert(key) {
            return;
        }
        self.pressed.insert(key);
        if let Some(callbacks) = self.callbacks.get_mut(&key) {
            callbacks.iter_mut().for_each(|callback| callback());
        }
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.held.remove(&key);
    }

    pub fn add_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.mouse_delta += Vector2::new(dx, dy);
    }

    pub fn add_scroll_delta(&mut self, dx: f32, dy: f32) {
        self.scroll_delta += Vector2::new(dx, dy);
    }

    /// Feeds a winit window event. Returns true if the event was consumed.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return false;
                };
                match event.state {
                    ElementState::Pressed => self.press_key(code),
                    ElementState::Released => self.release_key(code),
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                match delta {
                    MouseScrollDelta::LineDelta(x, y) => self.add_scroll_delta(*x, *y),
                    MouseScrollDelta::PixelDelta(pos) => self.add_scroll_delta(
                        pos.x as f32 / PIXELS_PER_LINE,
                        pos.y as f32 / PIXELS_PER_LINE,
                    ),
                }
                true
            }
            WindowEvent::Focused(false) => {
                // Releases are lost while unfocused.
                self.held.clear();
                false
            }
            _ => false,
        }
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.add_mouse_delta(*dx as f32, *dy as f32);
        }
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// True if `key` went down since the last [`Input::end_frame`].
    pub fn was_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// `1` while only `positive` is held, `-1` while only `negative` is held, else `0`.
    pub fn axis_1d(&self, positive: KeyCode, negative: KeyCode) -> f32 {
        let mut value = 0.0;
        if self.is_key_held(positive) {
            value += 1.0;
        }
        if self.is_key_held(negative) {
            value -= 1.0;
        }
        value
    }

    /// Unit length (or zero) direction from two key pairs.
    pub fn axis_2d(
        &self,
        x_positive: KeyCode,
        x_negative: KeyCode,
        y_positive: KeyCode,
        y_negative: KeyCode,
    ) -> Vector2<f32> {
        let axis = Vector2::new(
            self.axis_1d(x_positive, x_negative),
            self.axis_1d(y_positive, y_negative),
        );
        if axis.is_zero() { axis } else { axis.normalize() }
    }

    /// Unit length (or zero) direction from three key pairs.
    pub fn axis_3d(
        &self,
        x_positive: KeyCode,
        x_negative: KeyCode,
        y_positive: KeyCode,
        y_negative: KeyCode,
        z_positive: KeyCode,
        z_negative: KeyCode,
    ) -> Vector3<f32> {
        let axis = Vector3::new(
            self.axis_1d(x_positive, x_negative),
            self.axis_1d(y_positive, y_negative),
            self.axis_1d(z_positive, z_negative),
        );
        if axis.is_zero() { axis } else { axis.normalize() }
    }

    pub fn mouse_delta(&self) -> Vector2<f32> {
        self.mouse_delta
    }

    pub fn scroll_delta(&self) -> Vector2<f32> {
        self.scroll_delta
    }

    /// Forgets press edges and accumulated mouse/scroll motion. Called once per frame.
    pub fn end_frame(&mut self) {
        self.pressed.clear();
        self.mouse_delta = Vector2::zero();
        self.scroll_delta = Vector2::zero();
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;

    #[test]
    fn press_edges_last_until_end_of_frame() {
        let mut input = Input::new();
        input.press_key(KeyCode::KeyT);
        input.press_key(KeyCode::KeyT);
        assert!(input.was_pressed(KeyCode::KeyT));
        assert!(input.is_key_held(KeyCode::KeyT));
        input.end_frame();
        assert!(!input.was_pressed(KeyCode::KeyT));
        assert!(input.is_key_held(KeyCode::KeyT));
    }

    #[test]
    fn callbacks_fire_once_per_press() {
        let count = Rc::new(Cell::new(0));
        let mut input = Input::new();
        let counter = Rc::clone(&count);
        input.on_key_press(KeyCode::KeyP, move || counter.set(counter.get() + 1));

        input.press_key(KeyCode::KeyP);
        input.press_key(KeyCode::KeyP);
        input.release_key(KeyCode::KeyP);
        input.press_key(KeyCode::KeyP);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn diagonal_axis_is_normalized() {
        let mut input = Input::new();
        input.press_key(KeyCode::KeyD);
        input.press_key(KeyCode::KeyW);
        let axis = input.axis_2d(KeyCode::KeyD, KeyCode::KeyA, KeyCode::KeyW, KeyCode::KeyS);
        assert!((axis.magnitude() - 1.0).abs() < 1e-6);
        assert!(axis.x > 0.0 && axis.y > 0.0);

        input.press_key(KeyCode::KeyA);
        assert_eq!(input.axis_1d(KeyCode::KeyD, KeyCode::KeyA), 0.0);
    }
}
