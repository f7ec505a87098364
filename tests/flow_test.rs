use std::{cell::RefCell, rc::Rc};

use anyhow::anyhow;
use grove_ngin::{
    Deg, KeyCode, Matrix4, Point3, Vector3,
    animation::Animator,
    camera::{Camera, CameraConfig},
    data_structures::{
        material::ShadingVariant,
        scene_graph::{MeshNode, NodeId, NodeKind, SceneGraph},
    },
    flow::{Flow, FrameClock, MAX_FRAME_DELTA, Window},
    input::Input,
    pipelines::{
        basic::{ProgramSet, ShaderSources},
        light::LightRegistry,
    },
    render::RenderDispatcher,
};

use crate::common::test_utils::{RecordingApi, dummy_mesh};

mod common;

/// Moves its node one unit along X per frame and remembers which keys it saw.
struct Slide {
    node: NodeId,
    saw_key: Rc<RefCell<Vec<bool>>>,
}

impl Animator for Slide {
    fn update(&mut self, graph: &mut SceneGraph, input: &Input, _dt: f32) {
        graph.translate(self.node, Vector3::new(1.0, 0.0, 0.0));
        self.saw_key.borrow_mut().push(input.was_pressed(KeyCode::KeyT));
    }
}

/// Closes after `frames` swaps, optionally failing the swap numbered `fail_at`.
struct ScriptedWindow {
    frames: u32,
    swaps: u32,
    fail_at: Option<u32>,
    press_on_swap: Option<KeyCode>,
}

impl ScriptedWindow {
    fn closing_after(frames: u32) -> Self {
        Self {
            frames,
            swaps: 0,
            fail_at: None,
            press_on_swap: None,
        }
    }
}

impl Window for ScriptedWindow {
    fn delta_time(&mut self) -> f32 {
        0.1
    }

    fn should_close(&self) -> bool {
        self.swaps >= self.frames
    }

    fn aspect_ratio(&self) -> f32 {
        1.5
    }

    fn swap_and_poll(&mut self, input: &mut Input) -> anyhow::Result<()> {
        self.swaps += 1;
        if self.fail_at == Some(self.swaps) {
            return Err(anyhow!("surface lost"));
        }
        if let Some(key) = self.press_on_swap {
            input.press_key(key);
            input.release_key(key);
        }
        Ok(())
    }
}

fn flow_with_box(api: &mut RecordingApi) -> (Flow, NodeId) {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let mesh = dummy_mesh("box", &[("box", ShadingVariant::Lit)], 500);
    let node = graph
        .spawn(root, "box", NodeKind::Mesh(MeshNode::new(mesh)))
        .expect("box");
    let programs = ProgramSet::create(api, &ShaderSources::default()).expect("programs");
    let flow = Flow::new(
        graph,
        Camera::default(),
        LightRegistry::default(),
        RenderDispatcher::new(programs),
    );
    (flow, node)
}

#[test]
fn animators_run_before_the_frame_is_drawn() {
    let mut api = RecordingApi::new();
    let (mut flow, node) = flow_with_box(&mut api);
    flow.add_animator(Box::new(Slide {
        node,
        saw_key: Rc::default(),
    }));
    api.clear();

    let stats = flow.frame(&mut api, 0.1, 1.0);

    assert_eq!(stats.draw_calls, 1);
    assert_eq!(
        api.model_matrices,
        vec![Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0))]
    );
    assert_eq!(flow.frames(), 1);
}

#[test]
fn loop_stops_when_the_window_closes() {
    let mut api = RecordingApi::new();
    let (mut flow, node) = flow_with_box(&mut api);
    flow.add_animator(Box::new(Slide {
        node,
        saw_key: Rc::default(),
    }));
    let mut window = ScriptedWindow::closing_after(3);

    flow.run(&mut window, &mut api).expect("run");

    assert_eq!(flow.frames(), 3);
    assert_eq!(
        flow.graph.transform(node).map(|t| t.position),
        Some(Vector3::new(3.0, 0.0, 0.0))
    );
}

#[test]
fn key_presses_are_seen_for_exactly_one_frame() {
    let mut api = RecordingApi::new();
    let (mut flow, node) = flow_with_box(&mut api);
    let seen = Rc::new(RefCell::new(Vec::new()));
    flow.input.press_key(KeyCode::KeyT);
    flow.input.release_key(KeyCode::KeyT);
    flow.add_animator(Box::new(Slide {
        node,
        saw_key: Rc::clone(&seen),
    }));

    flow.frame(&mut api, 0.1, 1.0);
    flow.frame(&mut api, 0.1, 1.0);

    assert_eq!(*seen.borrow(), vec![true, false]);
    assert!(!flow.input.was_pressed(KeyCode::KeyT));
}

#[test]
fn presses_polled_after_a_frame_reach_the_next_one() {
    let mut api = RecordingApi::new();
    let (mut flow, _) = flow_with_box(&mut api);
    let mut window = ScriptedWindow::closing_after(1);
    window.press_on_swap = Some(KeyCode::KeyT);

    flow.run(&mut window, &mut api).expect("run");

    assert!(flow.input.was_pressed(KeyCode::KeyT));
}

#[test]
fn a_failing_swap_ends_the_loop_with_its_error() {
    let mut api = RecordingApi::new();
    let (mut flow, _) = flow_with_box(&mut api);
    let mut window = ScriptedWindow::closing_after(10);
    window.fail_at = Some(2);

    let err = flow.run(&mut window, &mut api).expect_err("swap failure");

    assert_eq!(err.to_string(), "surface lost");
    assert_eq!(flow.frames(), 2);
}

#[test]
fn frame_clock_caps_long_pauses() {
    let mut clock = FrameClock::new();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let dt = clock.tick();
    assert!(dt > 0.0);
    assert!(dt <= MAX_FRAME_DELTA);
}

#[test]
fn pitch_is_clamped() {
    let mut camera = Camera::default();
    camera.look(0.0, -1000.0, 1.0);
    assert_eq!(camera.pitch(), Deg(89.0));
    camera.look(0.0, 1000.0, 1.0);
    assert_eq!(camera.pitch(), Deg(-89.0));
    assert!(camera.forward().y < 0.0);
}

#[test]
fn zoom_is_clamped_to_the_fov_range() {
    let mut camera = Camera::default();
    camera.zoom(10.0, 1.0);
    assert_eq!(camera.fov(), Deg(1.0));
    camera.zoom(-10.0, 1.0);
    assert_eq!(camera.fov(), Deg(45.0));
}

#[test]
fn moves_leaving_the_bounds_are_dropped() {
    let mut camera = Camera::default();
    let start = camera.position;

    camera.move_by(Vector3::new(0.0, 0.0, 1.0), false, 10.0);
    assert_eq!(camera.position, start);
    camera.move_by(Vector3::new(0.0, -1.0, 0.0), true, 1.0);
    assert_eq!(camera.position, start);

    camera.move_by(Vector3::new(0.0, 0.0, -1.0), false, 1.0);
    assert_eq!(camera.position, Point3::new(0.0, 15.0, -7.0));
}

#[test]
fn unbounded_camera_flies_anywhere() {
    let mut camera = Camera::new(CameraConfig {
        bounds: None,
        ..Default::default()
    });
    camera.move_by(Vector3::new(0.0, -1.0, 0.0), false, 10.0);
    assert_eq!(camera.position, Point3::new(0.0, -85.0, 3.0));
}

#[test]
fn held_keys_move_the_camera_each_frame() {
    let mut camera = Camera::default();
    let mut input = Input::new();
    input.press_key(KeyCode::KeyW);
    camera.update(&input, 0.5);
    assert_eq!(camera.position, Point3::new(0.0, 15.0, -2.0));
}

#[test]
fn logger_can_be_initialized_twice() {
    grove_ngin::flow::init_logger();
    grove_ngin::flow::init_logger();
}
