//! Scene graph and hierarchical scene organization.
//!
//! Nodes live in a generational arena and refer to each other by [`NodeId`],
//! so reparenting and subtree removal never leave dangling references. Every
//! node caches its local and world matrices; any mutating call recomputes
//! the local matrix from the canonical [`Transform`] fields and eagerly
//! pushes the new world matrix down the whole subtree.
//!
//! Eager propagation costs O(subtree size) per mutation.

use std::{collections::HashMap, rc::Rc};

use cgmath::{Matrix4, Rad, SquareMatrix, Vector3};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::data_structures::{
    light::LightData, material::ShadingVariant, model::MeshAsset, transform::Transform,
};

new_key_type! {
    /// Stable handle to a node of a [`SceneGraph`].
    pub struct NodeId;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("node {0:?} does not exist (it was removed or belongs to another graph)")]
    NodeNotFound(NodeId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
}

/// A drawable node's payload: a shared mesh plus per-node shading overrides.
#[derive(Clone, Debug)]
pub struct MeshNode {
    pub mesh: Rc<MeshAsset>,
    /// Material name to variant. Takes precedence over the material's own tag.
    pub variant_overrides: HashMap<String, ShadingVariant>,
}

impl MeshNode {
    pub fn new(mesh: Rc<MeshAsset>) -> Self {
        Self {
            mesh,
            variant_overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, material: &str, variant: ShadingVariant) -> Self {
        self.variant_overrides.insert(material.to_string(), variant);
        self
    }

    /// Forces every material of this node into `variant`.
    pub fn with_all(mut self, variant: ShadingVariant) -> Self {
        let names: Vec<String> = self
            .mesh
            .submeshes
            .iter()
            .map(|sub| sub.material_name.clone())
            .collect();
        for name in names {
            self.variant_overrides.insert(name, variant);
        }
        self
    }

    pub fn variant_of(&self, material_name: &str, tagged: ShadingVariant) -> ShadingVariant {
        self.variant_overrides
            .get(material_name)
            .copied()
            .unwrap_or(tagged)
    }
}

#[derive(Clone, Debug, Default)]
pub enum NodeKind {
    /// Pure container; only groups and transforms its children.
    #[default]
    Empty,
    Mesh(MeshNode),
    Light(LightData),
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub visible: bool,
    transform: Transform,
    local: Matrix4<f32>,
    world: Matrix4<f32>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            visible: true,
            transform: Transform::new(),
            local: Matrix4::identity(),
            world: Matrix4::identity(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn local(&self) -> &Matrix4<f32> {
        &self.local
    }

    pub fn world(&self) -> &Matrix4<f32> {
        &self.world
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A forest of transform nodes rooted at one container.
pub struct SceneGraph {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new("root", NodeKind::Empty));
        Self { nodes, root }
    }

    /// The container every rendered node descends from.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Creates a standalone node. It is not rendered until attached below the root.
    pub fn create(&mut self, name: &str, kind: NodeKind) -> NodeId {
        self.nodes.insert(Node::new(name, kind))
    }

    /// Creates a node and immediately attaches it under `parent`.
    pub fn spawn(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: NodeKind,
    ) -> Result<NodeId, GraphError> {
        let id = self.create(name, kind);
        if let Err(e) = self.add_child(parent, id) {
            self.nodes.remove(id);
            return Err(e);
        }
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn kind_mut(&mut self, id: NodeId) -> Option<&mut NodeKind> {
        self.nodes.get_mut(id).map(|node| &mut node.kind)
    }

    pub fn world(&self, id: NodeId) -> Option<Matrix4<f32>> {
        self.nodes.get(id).map(|node| node.world)
    }

    pub fn transform(&self, id: NodeId) -> Option<Transform> {
        self.nodes.get(id).map(|node| node.transform)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// True if `ancestor` is `id` or lies on the path from `id` to its root.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /**
     * Attaches `child` as the last child of `parent`.
     *
     * The child is detached from its previous parent first. Attaching a node
     * under itself or under one of its own descendants is rejected and leaves
     * the graph untouched.
     */
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), GraphError> {
        if !self.nodes.contains_key(parent) {
            return Err(GraphError::NodeNotFound(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(GraphError::NodeNotFound(child));
        }
        if self.is_ancestor(child, parent) {
            return Err(GraphError::Cycle { parent, child });
        }
        self.detach(child);
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        self.refresh_world(child);
        Ok(())
    }

    /// Detaches `id` from its parent, turning it into a standalone root.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|&c| c != id);
        }
        self.nodes[id].parent = None;
        self.refresh_world(id);
    }

    /// Destroys `id` and its whole subtree. Returns the number of removed nodes.
    ///
    /// The root container cannot be removed; removing it clears its children instead.
    pub fn remove(&mut self, id: NodeId) -> usize {
        if !self.nodes.contains_key(id) {
            log::warn!("Tried to remove node {:?} which does not exist", id);
            return 0;
        }
        if id == self.root {
            let children = self.nodes[id].children.clone();
            return children.into_iter().map(|child| self.remove(child)).sum();
        }
        if let Some(parent) = self.parent(id) {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|&c| c != id);
            }
        }
        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        removed
    }

    pub fn set_position(&mut self, id: NodeId, position: Vector3<f32>) {
        self.mutate(id, |t| t.position = position);
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: Vector3<f32>) {
        self.mutate(id, |t| t.rotation = rotation);
    }

    pub fn set_scale(&mut self, id: NodeId, scale: Vector3<f32>) {
        self.mutate(id, |t| t.scale = scale);
    }

    pub fn set_uniform_scale(&mut self, id: NodeId, scale: f32) {
        self.set_scale(id, Vector3::new(scale, scale, scale));
    }

    pub fn set_pivot(&mut self, id: NodeId, pivot: Vector3<f32>) {
        self.mutate(id, |t| t.pivot = pivot);
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) {
        self.mutate(id, |t| *t = transform);
    }

    pub fn translate(&mut self, id: NodeId, delta: Vector3<f32>) {
        self.mutate(id, |t| t.position += delta);
    }

    pub fn rotate(&mut self, id: NodeId, angle: Rad<f32>, axis: Vector3<f32>, around_self: bool) {
        self.mutate(id, |t| t.rotate(angle, axis, around_self));
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        match self.nodes.get_mut(id) {
            Some(node) => node.visible = visible,
            None => log::warn!("Tried to change visibility of missing node {:?}", id),
        }
    }

    /// True if `id` and all of its ancestors are visible.
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.nodes.get(node_id) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /**
     * Single entry point of every transform mutation.
     *
     * The local matrix is rebuilt from the canonical fields; the world
     * matrices of the subtree are only recomputed if it actually changed.
     */
    fn mutate(&mut self, id: NodeId, mutation: impl FnOnce(&mut Transform)) {
        let Some(node) = self.nodes.get_mut(id) else {
            log::warn!("Tried to transform node {:?} which does not exist", id);
            return;
        };
        mutation(&mut node.transform);
        let local = node.transform.to_matrix();
        if local != node.local {
            node.local = local;
            self.refresh_world(id);
        }
    }

    /// Recomputes `world = parent.world · local` for `id` and every descendant, parents first.
    fn refresh_world(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let parent_world = self
                .nodes
                .get(current)
                .and_then(|node| node.parent)
                .and_then(|parent| self.nodes.get(parent))
                .map(|parent| parent.world);
            let Some(node) = self.nodes.get_mut(current) else {
                continue;
            };
            node.world = match parent_world {
                Some(parent_world) => parent_world * node.local,
                None => node.local,
            };
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Depth-first pre-order walk starting at `start`, children in insertion order.
    pub fn depth_first(&self, start: NodeId) -> DepthFirst<'_> {
        DepthFirst {
            graph: self,
            stack: if self.contains(start) { vec![start] } else { vec![] },
            skip_hidden: false,
        }
    }

    /// Like [`SceneGraph::depth_first`] but never enters hidden subtrees.
    pub fn visible_depth_first(&self, start: NodeId) -> DepthFirst<'_> {
        DepthFirst {
            graph: self,
            stack: if self.contains(start) { vec![start] } else { vec![] },
            skip_hidden: true,
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

pub struct DepthFirst<'a> {
    graph: &'a SceneGraph,
    stack: Vec<NodeId>,
    skip_hidden: bool,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let Some(node) = self.graph.nodes.get(id) else {
                continue;
            };
            if self.skip_hidden && !node.visible {
                continue;
            }
            self.stack.extend(node.children.iter().rev().copied());
            return Some((id, node));
        }
        None
    }
}
