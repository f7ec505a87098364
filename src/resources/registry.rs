//! Process-lifetime cache of uploaded meshes.

use std::{
    collections::{BTreeSet, HashMap},
    rc::Rc,
};

use crate::{
    data_structures::model::MeshAsset,
    pipelines::RenderApi,
    resources::{AssetSource, mesh},
};

type AssetKey = (String, Option<String>);

/// Loads every distinct `(path, fallback texture)` pair once and hands out shared references.
#[derive(Default)]
pub struct AssetRegistry {
    meshes: HashMap<AssetKey, Rc<MeshAsset>>,
    loads: usize,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(
        &mut self,
        assets: &dyn AssetSource,
        api: &mut dyn RenderApi,
        path: &str,
        fallback_texture: Option<&str>,
    ) -> anyhow::Result<Rc<MeshAsset>> {
        let key = (path.to_string(), fallback_texture.map(str::to_string));
        if let Some(mesh) = self.meshes.get(&key) {
            return Ok(Rc::clone(mesh));
        }
        let data = mesh::load_obj(assets, api, path, fallback_texture)?;
        let asset = Rc::new(mesh::upload(path, data, api)?);
        self.loads += 1;
        self.meshes.insert(key, Rc::clone(&asset));
        Ok(asset)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// How many times a model was actually parsed and uploaded.
    pub fn loads(&self) -> usize {
        self.loads
    }

    /**
     * Releases every buffer and texture of every cached mesh.
     *
     * Nodes may still hold `Rc`s to the assets afterwards; their GPU handles
     * are dead and must not be drawn again.
     */
    pub fn destroy(&mut self, api: &mut dyn RenderApi) {
        let mut textures = BTreeSet::new();
        for (_, mesh) in self.meshes.drain() {
            api.destroy_buffer(mesh.vertex_buffer);
            for sub in &mesh.submeshes {
                api.destroy_buffer(sub.index_buffer);
            }
            textures.extend(mesh.library.textures());
        }
        for texture in textures {
            api.destroy_texture(texture);
        }
        log::debug!("Asset registry destroyed");
    }
}
