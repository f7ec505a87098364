//! Procedural assembly of the forest diorama.
//!
//! [`Diorama::build`] loads every model through the [`AssetRegistry`],
//! wires the nodes into one scene graph and attaches the animators that
//! bring it to life. The result is a ready [`Flow`].
//!
//! # Controls
//!
//! - `H` toggles the stirring spoon and the cauldron fumes
//! - `U` makes the first gnome hop, the others hop on their own
//! - `C` / `V` open and close the frog's croak
//! - `L` / `K` brighten and dim the lamp, `O` / `I` the firefly
//! - `P` toggles wireframe rendering
//!

use std::rc::Rc;

use cgmath::{Deg, Vector2, Vector3};
use rand::{Rng, SeedableRng, rngs::StdRng};
use winit::keyboard::KeyCode;

use crate::{
    animation::{
        Animator,
        croak::{CroakConfig, CroakPose},
        hop::{HopConfig, Hopper},
        hover::{HoverConfig, HoverMotion},
        orbit::{OrbitConfig, OrbitMotion},
        particles::{ParticleConfig, ParticleSystem},
        sample_range,
        stir::{StirConfig, StirringProp},
        wander::{ConfinementRegion, WanderConfig, WanderSteering},
    },
    camera::{Camera, CameraConfig},
    data_structures::{
        editable::{EditableValue, EditableValueGroup},
        light::LightData,
        material::ShadingVariant,
        model::MeshAsset,
        scene_graph::{MeshNode, NodeId, NodeKind, SceneGraph},
        transform::Transform,
    },
    flow::{Flow, Window},
    input::Input,
    pipelines::{
        RenderApi,
        basic::{ProgramSet, ShaderSources},
        light::LightRegistry,
    },
    render::RenderDispatcher,
    resources::{AssetSource, registry::AssetRegistry},
};

/// Material that glows instead of being shaded (lamp bulb, firefly abdomen).
pub const GLOWING_MATERIAL: &str = "lit_part";

/// Tree material drawn from both sides.
pub const LEAF_MATERIAL: &str = "leaves";

/// A model path plus the optional texture used for faces without a material.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelRef {
    pub path: String,
    pub texture: Option<String>,
}

impl ModelRef {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            texture: None,
        }
    }

    pub fn textured(path: &str, texture: &str) -> Self {
        Self {
            path: path.to_string(),
            texture: Some(texture.to_string()),
        }
    }
}

/// Where every model of the diorama lives, relative to the asset root.
#[derive(Clone, Debug)]
pub struct DioramaAssets {
    pub terrain: ModelRef,
    pub cauldron: ModelRef,
    pub spoon: ModelRef,
    pub fumes: Vec<ModelRef>,
    pub lamp: ModelRef,
    pub water: ModelRef,
    pub lily_pad: ModelRef,
    pub firefly: ModelRef,
    pub gnomes: Vec<ModelRef>,
    pub elemental: ModelRef,
    pub tree: ModelRef,
    pub grass: ModelRef,
    pub frog_body: ModelRef,
    pub frog_head: ModelRef,
    pub frog_throat: ModelRef,
}

impl Default for DioramaAssets {
    fn default() -> Self {
        Self {
            terrain: ModelRef::new("terrain/terrain.obj"),
            cauldron: ModelRef::new("cauldron/cauldron.obj"),
            spoon: ModelRef::new("spoon/spoon.obj"),
            fumes: vec![
                ModelRef::new("particles/skull1/Skull.obj"),
                ModelRef::new("particles/bubble/bubble.obj"),
            ],
            lamp: ModelRef::new("lamp/HangingLamp.obj"),
            water: ModelRef::new("pond/water.obj"),
            lily_pad: ModelRef::new("lilypad/lilypad.obj"),
            firefly: ModelRef::new("Firefly/firefly.obj"),
            gnomes: vec![
                ModelRef::textured("gnomes/gnome1/gnome.obj", "gnome.png"),
                ModelRef::textured("gnomes/gnome2/gnome.obj", "gnome.png"),
            ],
            elemental: ModelRef::new("elemental-fire/FireElemental.obj"),
            tree: ModelRef::new("tree/tree.obj"),
            grass: ModelRef::new("grass/grass.obj"),
            frog_body: ModelRef::textured("frog/body.obj", "frog.jpg"),
            frog_head: ModelRef::textured("frog/head.obj", "frog.jpg"),
            frog_throat: ModelRef::textured("frog/throat.obj", "frog.jpg"),
        }
    }
}

/// Grid of grass blades with a little random rotation, scale and offset each.
#[derive(Clone, Debug)]
pub struct GrassConfig {
    /// Extent on the ground plane (x, z), centered on the patch node.
    pub area: Vector2<f32>,
    pub lines: usize,
    /// Blades per line. Also sets the spacing between lines.
    pub per_line: usize,
    /// Yaw range in degrees.
    pub rotation: (f32, f32),
    pub scale_min: Vector3<f32>,
    pub scale_max: Vector3<f32>,
    /// Largest offset from the grid point in each direction.
    pub jitter: Vector3<f32>,
}

impl Default for GrassConfig {
    fn default() -> Self {
        Self {
            area: Vector2::new(6.0, 6.0),
            lines: 4,
            per_line: 6,
            rotation: (0.0, 15.0),
            scale_min: Vector3::new(1.0, 0.7, 1.0),
            scale_max: Vector3::new(1.0, 1.2, 1.0),
            jitter: Vector3::new(0.25, 0.0, 0.05),
        }
    }
}

/// Local transforms of every blade of a grass patch. Lines that would fall
/// outside the area are dropped.
pub fn grass_layout(config: &GrassConfig, rng: &mut impl Rng) -> Vec<Transform> {
    let mut blades = Vec::new();
    if config.per_line == 0 {
        return blades;
    }
    let start = config.area * -0.5;
    let end = config.area * 0.5;
    let step = config.area / config.per_line as f32;
    for line in 0..config.lines {
        let z = start.y + line as f32 * step.y;
        if z > end.y {
            break;
        }
        for column in 0..config.per_line {
            let x = start.x + column as f32 * step.x;
            let jitter = Vector3::new(
                sample_range(rng, (-config.jitter.x, config.jitter.x)),
                sample_range(rng, (-config.jitter.y, config.jitter.y)),
                sample_range(rng, (-config.jitter.z, config.jitter.z)),
            );
            let yaw = sample_range(rng, config.rotation).to_radians();
            let scale = Vector3::new(
                sample_range(rng, (config.scale_min.x, config.scale_max.x)),
                sample_range(rng, (config.scale_min.y, config.scale_max.y)),
                sample_range(rng, (config.scale_min.z, config.scale_max.z)),
            );
            blades.push(Transform {
                position: Vector3::new(x, 0.0, z) + jitter,
                rotation: Vector3::new(0.0, yaw, 0.0),
                scale,
                ..Default::default()
            });
        }
    }
    blades
}

#[derive(Clone, Debug)]
pub struct DioramaConfig {
    pub assets: DioramaAssets,
    pub shaders: ShaderSources,
    pub camera: CameraConfig,
    pub grass: GrassConfig,
    pub ambient: Vector3<f32>,
    /// Seeds every randomized animator.
    pub seed: u64,
}

impl Default for DioramaConfig {
    fn default() -> Self {
        Self {
            assets: DioramaAssets::default(),
            shaders: ShaderSources::default(),
            camera: CameraConfig::default(),
            grass: GrassConfig::default(),
            ambient: Vector3::new(0.3, 0.3, 0.3),
            seed: 42,
        }
    }
}

/**
 * Drives the intensity of several light nodes from one 0..2 slider.
 *
 * Every tracked node contributes its own intensity range to an
 * [`EditableValueGroup`]; after the slider moves, each light node receives
 * the group member that carries its label.
 */
pub struct LightControl {
    group: EditableValueGroup,
    nodes: Vec<NodeId>,
    raise_key: Option<KeyCode>,
    lower_key: Option<KeyCode>,
    /// Slider units per second while a key is held.
    pub rate: f32,
}

impl LightControl {
    pub fn new(label: &str) -> Self {
        Self {
            group: EditableValueGroup::new(label),
            nodes: Vec::new(),
            raise_key: None,
            lower_key: None,
            rate: 1.0,
        }
    }

    pub fn with_keys(mut self, raise: KeyCode, lower: KeyCode) -> Self {
        self.raise_key = Some(raise);
        self.lower_key = Some(lower);
        self
    }

    /// Starts controlling `node`. Nodes without a light payload are ignored.
    pub fn track(&mut self, graph: &SceneGraph, node: NodeId) {
        let Some(NodeKind::Light(light)) = graph.node(node).map(|n| &n.kind) else {
            log::warn!("Node {:?} carries no light and cannot be dimmed", node);
            return;
        };
        let intensity = &light.intensity;
        self.group.add(EditableValue::new(
            &light.label,
            intensity.default,
            intensity.min,
            intensity.max,
        ));
        self.nodes.push(node);
    }

    pub fn group(&self) -> &EditableValueGroup {
        &self.group
    }

    pub fn value(&self) -> f32 {
        self.group.value()
    }

    pub fn set(&mut self, graph: &mut SceneGraph, value: f32) {
        self.group.set(value);
        self.push(graph);
    }

    pub fn apply_delta(&mut self, graph: &mut SceneGraph, delta: f32) {
        self.group.apply_delta(delta);
        self.push(graph);
    }

    pub fn reset(&mut self, graph: &mut SceneGraph) {
        self.group.reset();
        self.push(graph);
    }

    fn push(&self, graph: &mut SceneGraph) {
        for &node in &self.nodes {
            if let Some(NodeKind::Light(light)) = graph.kind_mut(node) {
                if let Some(member) = self.group.member(&light.label) {
                    light.intensity.set(member.value());
                }
            }
        }
    }
}

impl Animator for LightControl {
    fn update(&mut self, graph: &mut SceneGraph, input: &Input, dt: f32) {
        let (Some(raise), Some(lower)) = (self.raise_key, self.lower_key) else {
            return;
        };
        let direction = input.axis_1d(raise, lower);
        if direction != 0.0 {
            self.apply_delta(graph, direction * self.rate * dt);
        }
    }
}

/// Handles of the nodes the diorama is made of.
#[derive(Clone, Debug)]
pub struct DioramaNodes {
    pub terrain: NodeId,
    pub cauldron: NodeId,
    pub spoon: NodeId,
    pub fumes: NodeId,
    pub lamp: NodeId,
    pub lamp_lights: [NodeId; 2],
    pub water: NodeId,
    pub lily_pad: NodeId,
    pub firefly: NodeId,
    pub firefly_light: NodeId,
    pub gnomes: Vec<NodeId>,
    pub elemental: NodeId,
    pub trees: Vec<NodeId>,
    pub grass: NodeId,
    pub frog: NodeId,
    pub frog_head: NodeId,
    pub frog_throat: NodeId,
}

pub struct Diorama {
    pub flow: Flow,
    pub registry: AssetRegistry,
    pub nodes: DioramaNodes,
}

struct Builder<'a> {
    assets: &'a dyn AssetSource,
    api: &'a mut dyn RenderApi,
    registry: AssetRegistry,
    graph: SceneGraph,
    rng: StdRng,
    animators: Vec<Box<dyn Animator>>,
}

impl Builder<'_> {
    fn mesh(&mut self, model: &ModelRef) -> anyhow::Result<Rc<MeshAsset>> {
        self.registry
            .get_or_load(self.assets, self.api, &model.path, model.texture.as_deref())
    }

    fn spawn(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> anyhow::Result<NodeId> {
        Ok(self.graph.spawn(parent, name, kind)?)
    }

    fn spawn_mesh(&mut self, parent: NodeId, name: &str, model: &ModelRef) -> anyhow::Result<NodeId> {
        let mesh = self.mesh(model)?;
        self.spawn(parent, name, NodeKind::Mesh(MeshNode::new(mesh)))
    }

    /// A generator seeded from the diorama's own.
    fn child_rng(&mut self) -> StdRng {
        StdRng::from_rng(&mut self.rng)
    }

    fn cauldron(&mut self, assets: &DioramaAssets) -> anyhow::Result<(NodeId, NodeId, NodeId)> {
        let root = self.graph.root();
        let cauldron = self.spawn(root, "cauldron", NodeKind::Empty)?;
        self.graph.set_position(cauldron, Vector3::new(10.0, 0.0, -40.0));

        let pot = self.spawn_mesh(cauldron, "pot", &assets.cauldron)?;
        self.graph.set_uniform_scale(pot, 0.6);

        let stir = StirConfig::default();
        let spoon = self.spawn_mesh(cauldron, "spoon", &assets.spoon)?;
        self.graph.set_position(spoon, stir.move_center);
        self.animators.push(Box::new(StirringProp::new(spoon, stir.clone())));

        let fumes = self.spawn(cauldron, "fumes", NodeKind::Empty)?;
        self.graph.set_position(fumes, Vector3::new(0.0, 5.0, 0.0));
        let meshes = assets
            .fumes
            .iter()
            .map(|model| self.mesh(model))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let config = ParticleConfig {
            toggle_key: stir.toggle_key,
            ..Default::default()
        };
        let rng = self.child_rng();
        self.animators
            .push(Box::new(ParticleSystem::new(fumes, meshes, config, rng)));
        Ok((cauldron, spoon, fumes))
    }

    fn lamp(&mut self, assets: &DioramaAssets) -> anyhow::Result<(NodeId, [NodeId; 2])> {
        let root = self.graph.root();
        let lamp = self.spawn(root, "lamp", NodeKind::Empty)?;
        self.graph.set_position(lamp, Vector3::new(-15.0, 30.0, -45.0));

        let model = self.mesh(&assets.lamp)?;
        let node = MeshNode::new(model).with_override(GLOWING_MATERIAL, ShadingVariant::Unlit);
        let mesh = self.spawn(lamp, "lamp mesh", NodeKind::Mesh(node))?;
        self.graph.set_uniform_scale(mesh, 0.01);

        let mut control = LightControl::new("lamp").with_keys(KeyCode::KeyL, KeyCode::KeyK);
        let mut lights = [lamp; 2];
        for (slot, side) in lights.iter_mut().zip([-1.0, 1.0]) {
            let label = if side < 0.0 { "lamp front" } else { "lamp back" };
            let data = LightData::with_intensity(label, Vector3::new(0.0, 0.8, 0.5), 0.5, 0.0, 0.75);
            let light = self.spawn(lamp, label, NodeKind::Light(data))?;
            self.graph.set_position(light, Vector3::new(0.0, -23.0, side));
            control.track(&self.graph, light);
            *slot = light;
        }
        self.animators.push(Box::new(control));
        Ok((lamp, lights))
    }

    fn pond(&mut self, assets: &DioramaAssets) -> anyhow::Result<(NodeId, NodeId)> {
        let root = self.graph.root();
        let water = self.spawn_mesh(root, "water", &assets.water)?;
        self.graph.set_position(water, Vector3::new(20.0, 0.1, -60.0));

        let lily_pad = self.spawn_mesh(water, "lily pad", &assets.lily_pad)?;
        let region = ConfinementRegion::centered(Vector2::new(4.0, 4.0));
        let rng = self.child_rng();
        self.animators.push(Box::new(WanderSteering::new(
            lily_pad,
            region,
            Vector2::new(1.0, 0.5),
            WanderConfig::default(),
            rng,
        )));
        Ok((water, lily_pad))
    }

    fn firefly(&mut self, assets: &DioramaAssets) -> anyhow::Result<(NodeId, NodeId)> {
        let root = self.graph.root();
        let firefly = self.spawn(root, "firefly", NodeKind::Empty)?;

        let model = self.mesh(&assets.firefly)?;
        let node = MeshNode::new(model).with_override(GLOWING_MATERIAL, ShadingVariant::Unlit);
        let mesh = self.spawn(firefly, "firefly mesh", NodeKind::Mesh(node))?;
        self.graph.set_uniform_scale(mesh, 50.0);

        let data = LightData::with_intensity("firefly", Vector3::new(0.8, 0.7, 0.0), 1.0, 0.0, 1.5);
        let light = self.spawn(firefly, "firefly light", NodeKind::Light(data))?;
        self.graph.set_position(light, Vector3::new(0.0, 1.0, -3.0));

        let mut control = LightControl::new("firefly").with_keys(KeyCode::KeyO, KeyCode::KeyI);
        control.track(&self.graph, light);
        self.animators.push(Box::new(control));

        let orbit = OrbitConfig {
            center: Vector3::new(0.0, 12.0, -50.0),
            radius: 15.0,
            frequency: 0.5,
            hover: Some((1.0, 1.0)),
        };
        let motion = OrbitMotion::new(firefly, orbit);
        let (position, yaw) = motion.sample(0.0);
        self.graph.set_position(firefly, position);
        self.graph.set_rotation(firefly, Vector3::new(0.0, yaw, 0.0));
        self.animators.push(Box::new(motion));
        Ok((firefly, light))
    }

    fn gnomes(&mut self, assets: &DioramaAssets) -> anyhow::Result<Vec<NodeId>> {
        let root = self.graph.root();
        let mut gnomes = Vec::with_capacity(assets.gnomes.len());
        for (i, model) in assets.gnomes.iter().enumerate() {
            let gnome = self.spawn_mesh(root, &format!("gnome {}", i), model)?;
            self.graph
                .set_position(gnome, Vector3::new(-8.0 + 4.0 * i as f32, 0.0, -30.0));
            self.graph.set_uniform_scale(gnome, 0.1);
            let config = HopConfig {
                jump_key: (i == 0).then_some(KeyCode::KeyU),
                auto_jump: i != 0,
                ..Default::default()
            };
            let rng = self.child_rng();
            self.animators.push(Box::new(Hopper::new(gnome, config, rng)));
            gnomes.push(gnome);
        }
        Ok(gnomes)
    }

    fn elemental(&mut self, assets: &DioramaAssets) -> anyhow::Result<NodeId> {
        let root = self.graph.root();
        let elemental = self.spawn(root, "elemental", NodeKind::Empty)?;
        self.graph.set_position(elemental, Vector3::new(0.0, 3.0, -35.0));

        let model = self.mesh(&assets.elemental)?;
        let node = MeshNode::new(model).with_all(ShadingVariant::Unlit);
        let mesh = self.spawn(elemental, "elemental mesh", NodeKind::Mesh(node))?;
        self.graph.set_uniform_scale(mesh, 0.25);
        self.graph
            .set_rotation(mesh, Vector3::new(0.0, -90f32.to_radians(), 0.0));

        self.animators
            .push(Box::new(HoverMotion::new(elemental, HoverConfig::default())));
        Ok(elemental)
    }

    fn foliage(
        &mut self,
        assets: &DioramaAssets,
        grass: &GrassConfig,
    ) -> anyhow::Result<(Vec<NodeId>, NodeId)> {
        let root = self.graph.root();
        let tree = self.mesh(&assets.tree)?;
        let spots = [
            Vector3::new(30.0, 0.0, -35.0),
            Vector3::new(-35.0, 0.0, -65.0),
            Vector3::new(35.0, 0.0, -75.0),
        ];
        let mut trees = Vec::with_capacity(spots.len());
        for (i, spot) in spots.into_iter().enumerate() {
            let node = MeshNode::new(tree.clone())
                .with_override(LEAF_MATERIAL, ShadingVariant::LitBackface);
            let id = self.spawn(root, &format!("tree {}", i), NodeKind::Mesh(node))?;
            self.graph.set_position(id, spot);
            trees.push(id);
        }

        let blade = self.mesh(&assets.grass)?;
        let patch = self.spawn(root, "grass", NodeKind::Empty)?;
        self.graph.set_position(patch, Vector3::new(5.0, 0.0, -22.0));
        let mut rng = self.child_rng();
        for (i, transform) in grass_layout(grass, &mut rng).into_iter().enumerate() {
            let node = MeshNode::new(blade.clone()).with_all(ShadingVariant::LitBackface);
            let id = self.spawn(patch, &format!("grass {}", i), NodeKind::Mesh(node))?;
            self.graph.set_transform(id, transform);
        }
        Ok((trees, patch))
    }

    fn frog(&mut self, assets: &DioramaAssets) -> anyhow::Result<(NodeId, NodeId, NodeId)> {
        let root = self.graph.root();
        let frog = self.spawn(root, "frog", NodeKind::Empty)?;
        self.graph.set_position(frog, Vector3::new(-20.0, 0.0, -50.0));
        self.graph.set_uniform_scale(frog, 2.0);

        self.spawn_mesh(frog, "frog body", &assets.frog_body)?;
        let head = self.spawn_mesh(frog, "frog head", &assets.frog_head)?;
        let throat = self.spawn_mesh(frog, "frog throat", &assets.frog_throat)?;

        let mut croak = CroakPose::new(head, throat, CroakConfig::default());
        croak.animate(&mut self.graph, 0.0);
        self.animators.push(Box::new(croak));
        Ok((frog, head, throat))
    }

    fn assemble(&mut self, config: &DioramaConfig) -> anyhow::Result<DioramaNodes> {
        let a = &config.assets;
        let root = self.graph.root();
        let terrain = self.spawn_mesh(root, "terrain", &a.terrain)?;
        let (cauldron, spoon, fumes) = self.cauldron(a)?;
        let (lamp, lamp_lights) = self.lamp(a)?;
        let (water, lily_pad) = self.pond(a)?;
        let (firefly, firefly_light) = self.firefly(a)?;
        let gnomes = self.gnomes(a)?;
        let elemental = self.elemental(a)?;
        let (trees, grass) = self.foliage(a, &config.grass)?;
        let (frog, frog_head, frog_throat) = self.frog(a)?;
        Ok(DioramaNodes {
            terrain,
            cauldron,
            spoon,
            fumes,
            lamp,
            lamp_lights,
            water,
            lily_pad,
            firefly,
            firefly_light,
            gnomes,
            elemental,
            trees,
            grass,
            frog,
            frog_head,
            frog_throat,
        })
    }
}

impl Diorama {
    /// Loads every model and assembles the scene. Any missing or malformed
    /// asset fails the build after releasing what was already uploaded.
    pub fn build(
        assets: &dyn AssetSource,
        api: &mut dyn RenderApi,
        config: &DioramaConfig,
    ) -> anyhow::Result<Self> {
        let programs = ProgramSet::create(api, &config.shaders)?;
        let mut builder = Builder {
            assets,
            api,
            registry: AssetRegistry::new(),
            graph: SceneGraph::new(),
            rng: StdRng::seed_from_u64(config.seed),
            animators: Vec::new(),
        };

        let nodes = match builder.assemble(config) {
            Ok(nodes) => nodes,
            Err(e) => {
                log::error!(
                    "Diorama build failed, releasing {} loaded meshes",
                    builder.registry.len()
                );
                builder.registry.destroy(builder.api);
                return Err(e);
            }
        };

        let Builder {
            registry,
            graph,
            animators,
            ..
        } = builder;
        log::info!(
            "Diorama built: {} nodes, {} meshes, {} animators",
            graph.len(),
            registry.len(),
            animators.len()
        );

        let mut flow = Flow::new(
            graph,
            Camera::new(config.camera.clone()),
            LightRegistry::new(config.ambient),
            RenderDispatcher::new(programs),
        );
        flow.camera.set_yaw_pitch(Deg(0.0), Deg(-15.0));
        let wireframe = flow.dispatcher.wireframe();
        flow.input.on_key_press(KeyCode::KeyP, move || wireframe.flip());
        for animator in animators {
            flow.add_animator(animator);
        }

        Ok(Self {
            flow,
            registry,
            nodes,
        })
    }

    /// Runs the frame loop, then releases every GPU resource of the scene.
    pub fn run(&mut self, window: &mut dyn Window, api: &mut dyn RenderApi) -> anyhow::Result<()> {
        let result = self.flow.run(window, api);
        self.registry.destroy(api);
        result
    }
}
