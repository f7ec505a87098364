use grove_ngin::{
    InnerSpace, Matrix4, Rad, SquareMatrix, Vector3, Vector4,
    data_structures::{
        scene_graph::{GraphError, NodeId, NodeKind, SceneGraph},
        transform::Transform,
    },
};

fn assert_matrix_close(a: &Matrix4<f32>, b: &Matrix4<f32>) {
    for c in 0..4 {
        for r in 0..4 {
            assert!(
                (a[c][r] - b[c][r]).abs() < 1e-4,
                "matrices differ at ({}, {}): {:?} != {:?}",
                r,
                c,
                a,
                b
            );
        }
    }
}

/// Recomputes every world matrix from scratch and compares with the cache.
fn assert_world_consistent(graph: &SceneGraph, id: NodeId, parent_world: Matrix4<f32>) {
    let node = graph.node(id).expect("node exists");
    let expected = parent_world * node.transform().to_matrix();
    assert_matrix_close(node.world(), &expected);
    for &child in node.children() {
        assert_world_consistent(graph, child, expected);
    }
}

fn chain(graph: &mut SceneGraph, depth: usize) -> Vec<NodeId> {
    let mut ids = Vec::new();
    let mut parent = graph.root();
    for i in 0..depth {
        let id = graph
            .spawn(parent, &format!("link {}", i), NodeKind::Empty)
            .expect("spawn");
        ids.push(id);
        parent = id;
    }
    ids
}

#[test]
fn world_matrices_follow_every_mutation() {
    let mut graph = SceneGraph::new();
    let ids = chain(&mut graph, 4);

    graph.set_position(ids[0], Vector3::new(1.0, 2.0, 3.0));
    graph.set_rotation(ids[1], Vector3::new(0.2, 0.4, -0.1));
    graph.set_uniform_scale(ids[2], 2.0);
    graph.set_pivot(ids[3], Vector3::new(0.0, -0.5, 0.0));
    graph.rotate(ids[3], Rad(0.3), Vector3::unit_z(), true);
    graph.translate(ids[1], Vector3::new(0.0, 0.0, -4.0));

    assert_world_consistent(&graph, graph.root(), Matrix4::identity());
}

#[test]
fn parent_change_propagates_to_grandchildren() {
    let mut graph = SceneGraph::new();
    let ids = chain(&mut graph, 3);
    graph.set_position(ids[2], Vector3::new(0.0, 1.0, 0.0));
    graph.set_position(ids[0], Vector3::new(5.0, 0.0, 0.0));

    let origin = graph.world(ids[2]).expect("world") * Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert!((origin.truncate() - Vector3::new(5.0, 1.0, 0.0)).magnitude() < 1e-5);
}

#[test]
fn standalone_node_world_equals_local() {
    let mut graph = SceneGraph::new();
    let loose = graph.create("loose", NodeKind::Empty);
    graph.set_transform(
        loose,
        Transform {
            position: Vector3::new(1.0, 1.0, 1.0),
            scale: Vector3::new(2.0, 2.0, 2.0),
            ..Default::default()
        },
    );
    let node = graph.node(loose).expect("node");
    assert_eq!(node.world(), node.local());
    assert_eq!(graph.parent(loose), None);
}

#[test]
fn attaching_an_ancestor_under_its_descendant_is_rejected() {
    let mut graph = SceneGraph::new();
    let ids = chain(&mut graph, 3);

    let result = graph.add_child(ids[2], ids[0]);
    assert_eq!(
        result,
        Err(GraphError::Cycle {
            parent: ids[2],
            child: ids[0]
        })
    );
    assert_eq!(graph.parent(ids[0]), Some(graph.root()));
    assert_eq!(graph.add_child(ids[1], ids[1]), Err(GraphError::Cycle { parent: ids[1], child: ids[1] }));
}

#[test]
fn reattaching_detaches_from_the_previous_parent() {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let a = graph.spawn(root, "a", NodeKind::Empty).expect("spawn");
    let b = graph.spawn(root, "b", NodeKind::Empty).expect("spawn");
    let child = graph.spawn(a, "child", NodeKind::Empty).expect("spawn");
    graph.set_position(b, Vector3::new(0.0, 3.0, 0.0));

    graph.add_child(b, child).expect("attach");

    assert!(graph.children(a).is_empty());
    assert_eq!(graph.children(b), &[child]);
    assert_world_consistent(&graph, root, Matrix4::identity());
}

#[test]
fn remove_destroys_the_whole_subtree() {
    let mut graph = SceneGraph::new();
    let ids = chain(&mut graph, 4);
    let before = graph.len();

    assert_eq!(graph.remove(ids[1]), 3);
    assert_eq!(graph.len(), before - 3);
    assert!(!graph.contains(ids[3]));
    assert!(graph.children(ids[0]).is_empty());
    assert_eq!(graph.remove(ids[2]), 0);
}

#[test]
fn removing_the_root_only_clears_it() {
    let mut graph = SceneGraph::new();
    chain(&mut graph, 2);
    graph.remove(graph.root());
    assert_eq!(graph.len(), 1);
    assert!(graph.contains(graph.root()));
}

#[test]
fn depth_first_visits_children_in_insertion_order_and_skips_hidden() {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let a = graph.spawn(root, "a", NodeKind::Empty).expect("spawn");
    let a1 = graph.spawn(a, "a1", NodeKind::Empty).expect("spawn");
    let b = graph.spawn(root, "b", NodeKind::Empty).expect("spawn");
    let b1 = graph.spawn(b, "b1", NodeKind::Empty).expect("spawn");

    let order: Vec<NodeId> = graph.depth_first(root).map(|(id, _)| id).collect();
    assert_eq!(order, vec![root, a, a1, b, b1]);

    graph.set_visible(b, false);
    let visible: Vec<NodeId> = graph.visible_depth_first(root).map(|(id, _)| id).collect();
    assert_eq!(visible, vec![root, a, a1]);
    assert!(!graph.is_effectively_visible(b1));
}
