//! Materials and name-keyed material libraries.

use std::collections::HashMap;

use cgmath::Vector3;

use crate::pipelines::TextureHandle;

/// Which shader program a submesh is drawn with.
///
/// The declaration order is the order in which the dispatcher draws buckets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShadingVariant {
    #[default]
    Lit,
    /// Lit, with back-face culling disabled (thin double sided geometry like leaves).
    LitBackface,
    /// Ignores point lights; only the ambient term and the texture contribute.
    Unlit,
}

impl ShadingVariant {
    pub const ALL: [ShadingVariant; 3] = [
        ShadingVariant::Lit,
        ShadingVariant::LitBackface,
        ShadingVariant::Unlit,
    ];

    /// Whether programs of this variant consume point light uniforms.
    pub fn is_lit(&self) -> bool {
        !matches!(self, ShadingVariant::Unlit)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightingCoefficients {
    pub ka: Vector3<f32>,
    pub kd: Vector3<f32>,
    pub ks: Vector3<f32>,
    pub ns: f32,
}

impl Default for LightingCoefficients {
    fn default() -> Self {
        Self {
            ka: Vector3::new(1.0, 1.0, 1.0),
            kd: Vector3::new(1.0, 1.0, 1.0),
            ks: Vector3::new(1.0, 1.0, 1.0),
            ns: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub texture: TextureHandle,
    pub coefficients: LightingCoefficients,
    pub variant: ShadingVariant,
}

impl Material {
    /// A material that only carries a texture, used for the unnamed fallback slot.
    pub fn textured(name: &str, texture: TextureHandle) -> Self {
        Self {
            name: name.to_string(),
            texture,
            coefficients: LightingCoefficients::default(),
            variant: ShadingVariant::Lit,
        }
    }
}

/**
 * Materials of one model, keyed by their `newmtl` name.
 *
 * A name mapped to `None` was declared but never received a texture. The
 * fallback slot holds the material built from the caller supplied fallback
 * texture and is used for faces outside any `usemtl` and for names that do
 * not resolve to a usable material.
 */
#[derive(Clone, Debug, Default)]
pub struct MaterialLibrary {
    materials: HashMap<String, Option<Material>>,
    fallback: Option<Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, material: Option<Material>) {
        self.materials.insert(name.to_string(), material);
    }

    pub fn set_fallback(&mut self, material: Material) {
        self.fallback = Some(material);
    }

    pub fn fallback(&self) -> Option<&Material> {
        self.fallback.as_ref()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    /// The material bound to `name` if it was declared with a texture.
    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name).and_then(|m| m.as_ref())
    }

    /// `get`, degrading to the fallback slot.
    pub fn get_or_fallback(&self, name: &str) -> Option<&Material> {
        self.get(name).or(self.fallback.as_ref())
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn textures(&self) -> impl Iterator<Item = TextureHandle> + '_ {
        self.materials
            .values()
            .flatten()
            .chain(self.fallback.iter())
            .map(|m| m.texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_materials_are_lit() {
        assert_eq!(ShadingVariant::default(), ShadingVariant::Lit);
        let material = Material::textured("", TextureHandle(1));
        assert_eq!(material.variant, ShadingVariant::default());
    }

    #[test]
    fn variants_sort_in_draw_order() {
        let mut variants = vec![ShadingVariant::Unlit, ShadingVariant::Lit, ShadingVariant::LitBackface];
        variants.sort();
        assert_eq!(variants, ShadingVariant::ALL);
    }
}
