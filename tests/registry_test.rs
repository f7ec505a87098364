use std::{collections::HashSet, rc::Rc};

use grove_ngin::resources::registry::AssetRegistry;

use crate::common::test_utils::{Call, RecordingApi, cube_assets};

mod common;

#[test]
fn repeated_requests_share_one_asset() {
    let assets = cube_assets();
    let mut api = RecordingApi::new();
    let mut registry = AssetRegistry::new();

    let first = registry
        .get_or_load(&assets, &mut api, "cube/cube.obj", None)
        .expect("first load");
    let uploads = api.count(|call| matches!(call, Call::CreateVertexBuffer(..)));
    let second = registry
        .get_or_load(&assets, &mut api, "cube/cube.obj", None)
        .expect("second load");

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(registry.loads(), 1);
    assert_eq!(registry.len(), 1);
    assert_eq!(
        api.count(|call| matches!(call, Call::CreateVertexBuffer(..))),
        uploads
    );
}

#[test]
fn a_different_fallback_texture_is_a_different_asset() {
    let assets = cube_assets();
    let mut api = RecordingApi::new();
    let mut registry = AssetRegistry::new();

    let plain = registry
        .get_or_load(&assets, &mut api, "cube/cube.obj", None)
        .expect("plain");
    let textured = registry
        .get_or_load(&assets, &mut api, "cube/cube.obj", Some("wood.png"))
        .expect("textured");

    assert!(!Rc::ptr_eq(&plain, &textured));
    assert_eq!(registry.loads(), 2);
    assert!(textured.library.fallback().is_some());
    assert!(plain.library.fallback().is_none());
}

#[test]
fn failed_loads_are_not_cached() {
    let assets = cube_assets();
    let mut api = RecordingApi::new();
    let mut registry = AssetRegistry::new();

    assert!(
        registry
            .get_or_load(&assets, &mut api, "missing/model.obj", None)
            .is_err()
    );
    assert!(registry.is_empty());
    assert_eq!(registry.loads(), 0);
}

#[test]
fn a_failed_load_releases_its_fallback_texture() {
    let assets = cube_assets()
        .with("broken/broken.obj", "v 0 0 0\nf 1 2 3\n")
        .with("broken/tex.png", "");
    let mut api = RecordingApi::new();
    let mut registry = AssetRegistry::new();

    assert!(
        registry
            .get_or_load(&assets, &mut api, "broken/broken.obj", Some("tex.png"))
            .is_err()
    );
    assert!(registry.is_empty());
    assert_eq!(api.count(|call| matches!(call, Call::LoadTexture(_))), 1);
    assert_eq!(api.count(|call| matches!(call, Call::DestroyTexture(_))), 1);
}

#[test]
fn destroy_releases_every_buffer_and_texture_once() {
    let assets = cube_assets();
    let mut api = RecordingApi::new();
    let mut registry = AssetRegistry::new();
    registry
        .get_or_load(&assets, &mut api, "cube/cube.obj", None)
        .expect("plain");
    registry
        .get_or_load(&assets, &mut api, "cube/cube.obj", Some("wood.png"))
        .expect("textured");
    // the textured cube loads its fallback besides its own material texture
    let loaded_textures = api.count(|call| matches!(call, Call::LoadTexture(_)));
    assert_eq!(loaded_textures, 3);
    api.clear();

    registry.destroy(&mut api);

    // one vertex and one index buffer per cube
    assert_eq!(api.count(|call| matches!(call, Call::DestroyBuffer(_))), 4);
    let destroyed: Vec<_> = api
        .calls
        .iter()
        .filter_map(|call| match call {
            Call::DestroyTexture(texture) => Some(*texture),
            _ => None,
        })
        .collect();
    let unique: HashSet<_> = destroyed.iter().copied().collect();
    assert_eq!(destroyed.len(), unique.len());
    assert_eq!(destroyed.len(), loaded_textures);
    assert!(registry.is_empty());
}
