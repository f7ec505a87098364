//! Frame loop over an abstract window.
//!
//! A [`Flow`] owns everything that changes from frame to frame: the scene
//! graph, input state, camera, lights and animators. The window and the
//! GPU stay behind the [`Window`] and [`RenderApi`] traits.
//!
//! # Lifecycle
//!
//! Each frame:
//! 1. Move the camera from the current input
//! 2. Run every animator, which mutates the scene graph (world matrices follow eagerly)
//! 3. Refresh the light snapshot from the graph
//! 4. Dispatch draw calls per shading variant
//! 5. Clear per-frame input edges, then swap buffers and poll new events
//!

use instant::Instant;

use crate::{
    animation::Animator,
    camera::Camera,
    data_structures::scene_graph::SceneGraph,
    input::Input,
    pipelines::{RenderApi, light::LightRegistry},
    render::{FrameStats, RenderDispatcher},
};

/// Upper bound for a single frame delta, in seconds.
pub const MAX_FRAME_DELTA: f32 = 0.25;

/// Initializes logging once. Further calls only print a warning.
pub fn init_logger() {
    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            println!("Warning: Could not initialize logger: {}", e);
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        }
    }
}

/// Measures the time between consecutive ticks.
#[derive(Debug)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous tick, capped at [`MAX_FRAME_DELTA`].
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt.min(MAX_FRAME_DELTA)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// The window side of the loop: timing, close requests and event polling.
pub trait Window {
    /// Seconds elapsed since the previous call.
    fn delta_time(&mut self) -> f32;
    fn should_close(&self) -> bool;
    fn aspect_ratio(&self) -> f32;
    /// Presents the frame and feeds pending events into `input`.
    fn swap_and_poll(&mut self, input: &mut Input) -> anyhow::Result<()>;
}

pub struct Flow {
    pub graph: SceneGraph,
    pub input: Input,
    pub camera: Camera,
    pub lights: LightRegistry,
    pub dispatcher: RenderDispatcher,
    animators: Vec<Box<dyn Animator>>,
    frames: u64,
}

impl Flow {
    pub fn new(
        graph: SceneGraph,
        camera: Camera,
        lights: LightRegistry,
        dispatcher: RenderDispatcher,
    ) -> Self {
        Self {
            graph,
            input: Input::new(),
            camera,
            lights,
            dispatcher,
            animators: Vec::new(),
            frames: 0,
        }
    }

    /// Animators run in the order they were added.
    pub fn add_animator(&mut self, animator: Box<dyn Animator>) {
        self.animators.push(animator);
    }

    pub fn animator_count(&self) -> usize {
        self.animators.len()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Updates and draws one frame without touching the window.
    pub fn frame(&mut self, api: &mut dyn RenderApi, dt: f32, aspect: f32) -> FrameStats {
        self.camera.update(&self.input, dt);
        for animator in self.animators.iter_mut() {
            animator.update(&mut self.graph, &self.input, dt);
        }
        let camera = self.camera.uniforms(aspect);
        let snapshot = self.lights.refresh(&self.graph);
        let stats = self.dispatcher.dispatch(api, &self.graph, &camera, snapshot);
        self.input.end_frame();
        self.frames += 1;
        stats
    }

    /**
     * Runs frames until the window asks to close.
     *
     * A failing swap ends the loop with the error after logging it.
     */
    pub fn run(&mut self, window: &mut dyn Window, api: &mut dyn RenderApi) -> anyhow::Result<()> {
        log::info!("Starting frame loop with {} animators", self.animators.len());
        while !window.should_close() {
            let dt = window.delta_time();
            let aspect = window.aspect_ratio();
            self.frame(api, dt, aspect);
            if let Err(e) = window.swap_and_poll(&mut self.input) {
                log::error!("Frame {} failed: {:#}", self.frames, e);
                return Err(e);
            }
        }
        log::info!("Frame loop stopped after {} frames", self.frames);
        Ok(())
    }
}
