//! Wavefront OBJ parsing into deduplicated, indexed vertex data.

use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
};

use anyhow::Context;
use thiserror::Error;

use crate::{
    data_structures::{
        material::{Material, MaterialLibrary},
        model::{MeshAsset, ModelVertex, SubMesh, Vertex},
    },
    pipelines::{RenderApi, TextureLoader},
    resources::{AssetSource, mtl, texture},
};

#[derive(Debug, Error, PartialEq)]
pub enum ObjError {
    #[error("line {line}: face corner `{corner}` has no texture coordinate")]
    MissingTexCoord { line: usize, corner: String },
    #[error("line {line}: {kind} index {index} is out of range, {count} defined so far")]
    IndexOutOfRange {
        line: usize,
        kind: &'static str,
        index: i64,
        count: usize,
    },
    #[error("line {line}: could not parse `{token}` as a number")]
    Parse { line: usize, token: String },
    #[error("line {line}: `{directive}` expects {expected} value(s)")]
    MissingValues {
        line: usize,
        directive: &'static str,
        expected: usize,
    },
    #[error("material `{0}` does not exist and there is no fallback material")]
    UnknownMaterial(String),
}

/// Triangles sharing one `usemtl` name, already resolved to a material.
#[derive(Clone, Debug)]
pub struct MaterialBucket {
    pub name: String,
    pub material: Material,
    pub indices: Vec<u32>,
}

/// Parsed, not yet uploaded model.
#[derive(Clone, Debug)]
pub struct ObjData {
    pub vertices: Vec<ModelVertex>,
    /// In first-use order.
    pub buckets: Vec<MaterialBucket>,
    pub library: MaterialLibrary,
}

/// Composite key of a face corner: zero based position, uv and optional normal index.
type CornerKey = (usize, usize, Option<usize>);

#[derive(Default)]
struct ObjParser {
    positions: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    vertices: Vec<ModelVertex>,
    slots: HashMap<CornerKey, u32>,
    buckets: Vec<(String, Vec<u32>)>,
    active_material: String,
    active_bucket: Option<usize>,
}

/**
 * Loads the model at `path` (relative to the asset root).
 *
 * `fallback_texture` is looked up like a `map_Kd` reference of the model's
 * own directory and becomes the library's fallback material: it is used
 * for faces before any `usemtl` and for names without a usable material.
 * Textures loaded before a failure are destroyed again.
 */
pub fn load_obj<T: TextureLoader + ?Sized>(
    assets: &dyn AssetSource,
    textures: &mut T,
    path: &str,
    fallback_texture: Option<&str>,
) -> anyhow::Result<ObjData> {
    let path = Path::new(path);
    let dir = path.parent().unwrap_or_else(|| Path::new(""));

    let mut library = MaterialLibrary::new();
    if let Some(fallback) = fallback_texture {
        let handle = texture::load_texture(assets, textures, dir, fallback)
            .with_context(|| format!("Fallback texture of {}", path.display()))?;
        library.set_fallback(Material::textured("", handle));
    }

    match parse_model(assets, textures, path, dir, &mut library) {
        Ok((vertices, buckets)) => Ok(ObjData {
            vertices,
            buckets,
            library,
        }),
        Err(e) => {
            release_textures(textures, &library);
            Err(e)
        }
    }
}

fn parse_model<T: TextureLoader + ?Sized>(
    assets: &dyn AssetSource,
    textures: &mut T,
    path: &Path,
    dir: &Path,
    library: &mut MaterialLibrary,
) -> anyhow::Result<(Vec<ModelVertex>, Vec<MaterialBucket>)> {
    let text = assets
        .load_string(path)
        .with_context(|| format!("Could not read model {}", path.display()))?;

    let mut parser = ObjParser::default();
    for (idx, line) in text.lines().enumerate() {
        parser
            .parse_line(idx + 1, line, assets, textures, dir, library)
            .with_context(|| format!("Malformed model {}", path.display()))?;
    }

    let buckets = parser
        .buckets
        .into_iter()
        .map(|(name, indices)| {
            let material = resolve_material(library, &name)?;
            Ok(MaterialBucket {
                name,
                material,
                indices,
            })
        })
        .collect::<Result<Vec<_>, ObjError>>()
        .with_context(|| format!("Model {}", path.display()))?;

    log::debug!(
        "Loaded {}: {} unique vertices, {} material bucket(s)",
        path.display(),
        parser.vertices.len(),
        buckets.len()
    );
    Ok((parser.vertices, buckets))
}

/// Destroys every distinct texture referenced by `library`.
fn release_textures<T: TextureLoader + ?Sized>(textures: &mut T, library: &MaterialLibrary) {
    let handles: BTreeSet<_> = library.textures().collect();
    for handle in handles {
        textures.destroy_texture(handle);
    }
}

fn resolve_material(library: &MaterialLibrary, name: &str) -> Result<Material, ObjError> {
    if let Some(material) = library.get(name) {
        return Ok(material.clone());
    }
    match library.fallback() {
        Some(fallback) => {
            if !name.is_empty() {
                log::warn!("Material {} does not exist, using the fallback material", name);
            }
            Ok(fallback.clone())
        }
        None => Err(ObjError::UnknownMaterial(name.to_string())),
    }
}

impl ObjParser {
    fn parse_line<T: TextureLoader + ?Sized>(
        &mut self,
        line_no: usize,
        line: &str,
        assets: &dyn AssetSource,
        textures: &mut T,
        dir: &Path,
        library: &mut MaterialLibrary,
    ) -> anyhow::Result<()> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        let (directive, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match directive {
            "v" => {
                let v = parse_floats::<3>(rest, line_no, "v")?;
                self.positions.push(v);
            }
            "vt" => {
                let [u, v] = parse_floats::<2>(rest, line_no, "vt")?;
                // wgpu samples with the origin in the top left corner.
                self.tex_coords.push([u, 1.0 - v]);
            }
            "vn" => {
                let n = parse_floats::<3>(rest, line_no, "vn")?;
                self.normals.push(n);
            }
            "mtllib" => {
                mtl::load_mtl(assets, textures, &dir.join(rest), library)?;
            }
            "usemtl" => {
                self.active_material = rest.to_string();
                self.active_bucket = None;
            }
            "f" => self.parse_face(line_no, rest)?,
            _ => {}
        }
        Ok(())
    }

    /// Fan triangulation: `(c0, ci, ci+1)` for every `i` in `1..n-1`.
    fn parse_face(&mut self, line_no: usize, rest: &str) -> Result<(), ObjError> {
        let corners: Vec<&str> = rest.split_whitespace().collect();
        if corners.len() < 3 {
            log::warn!(
                "line {}: face with {} corner(s) is skipped",
                line_no,
                corners.len()
            );
            return Ok(());
        }
        let mut resolved = Vec::with_capacity(corners.len());
        for corner in &corners {
            resolved.push(self.corner_slot(line_no, corner)?);
        }
        let bucket = self.bucket();
        let indices = &mut self.buckets[bucket].1;
        for i in 1..resolved.len() - 1 {
            indices.extend_from_slice(&[resolved[0], resolved[i], resolved[i + 1]]);
        }
        Ok(())
    }

    /// Returns the vertex slot for `corner`, allocating it on first use.
    fn corner_slot(&mut self, line_no: usize, corner: &str) -> Result<u32, ObjError> {
        let mut parts = corner.split('/');
        let position = parts.next().unwrap_or("");
        let tex_coord = match parts.next() {
            Some(uv) if !uv.is_empty() => uv,
            _ => {
                return Err(ObjError::MissingTexCoord {
                    line: line_no,
                    corner: corner.to_string(),
                });
            }
        };
        let normal = parts.next().filter(|n| !n.is_empty());

        let key: CornerKey = (
            resolve_index(position, self.positions.len(), line_no, "position")?,
            resolve_index(tex_coord, self.tex_coords.len(), line_no, "texture coordinate")?,
            normal
                .map(|n| resolve_index(n, self.normals.len(), line_no, "normal"))
                .transpose()?,
        );
        if let Some(&slot) = self.slots.get(&key) {
            return Ok(slot);
        }
        let (p, t, n) = key;
        let slot = self.vertices.len() as u32;
        self.vertices.push(ModelVertex {
            position: self.positions[p],
            tex_coords: self.tex_coords[t],
            normal: n.map(|n| self.normals[n]).unwrap_or([0.0; 3]),
        });
        self.slots.insert(key, slot);
        Ok(slot)
    }

    fn bucket(&mut self) -> usize {
        if let Some(bucket) = self.active_bucket {
            return bucket;
        }
        let bucket = match self
            .buckets
            .iter()
            .position(|(name, _)| *name == self.active_material)
        {
            Some(existing) => existing,
            None => {
                self.buckets.push((self.active_material.clone(), Vec::new()));
                self.buckets.len() - 1
            }
        };
        self.active_bucket = Some(bucket);
        bucket
    }
}

/// One based OBJ index to zero based; negative indices count back from the newest element.
fn resolve_index(token: &str, count: usize, line: usize, kind: &'static str) -> Result<usize, ObjError> {
    let raw: i64 = token.parse().map_err(|_| ObjError::Parse {
        line,
        token: token.to_string(),
    })?;
    let index = if raw < 0 { raw + count as i64 + 1 } else { raw };
    if index < 1 || index > count as i64 {
        return Err(ObjError::IndexOutOfRange {
            line,
            kind,
            index: raw,
            count,
        });
    }
    Ok(index as usize - 1)
}

fn parse_floats<const N: usize>(rest: &str, line: usize, directive: &'static str) -> Result<[f32; N], ObjError> {
    let mut values = [0.0; N];
    let mut tokens = rest.split_whitespace();
    for value in values.iter_mut() {
        let token = tokens.next().ok_or(ObjError::MissingValues {
            line,
            directive,
            expected: N,
        })?;
        *value = token.parse().map_err(|_| ObjError::Parse {
            line,
            token: token.to_string(),
        })?;
    }
    Ok(values)
}

/// Creates the GPU buffers of `data` and wraps everything into a shareable asset.
///
/// On failure every buffer created so far and the library's textures are destroyed.
pub fn upload(name: &str, data: ObjData, api: &mut dyn RenderApi) -> anyhow::Result<MeshAsset> {
    let vertex_buffer = match api.create_vertex_buffer(
        &format!("{} Vertex Buffer", name),
        bytemuck::cast_slice(&data.vertices),
        &ModelVertex::desc(),
    ) {
        Ok(buffer) => buffer,
        Err(e) => {
            release_textures(api, &data.library);
            return Err(e);
        }
    };
    let mut submeshes: Vec<SubMesh> = Vec::with_capacity(data.buckets.len());
    for bucket in data.buckets {
        let label = format!("{} {} Index Buffer", name, bucket.name);
        match api.create_index_buffer(&label, &bucket.indices) {
            Ok(index_buffer) => submeshes.push(SubMesh {
                material_name: bucket.name,
                material: bucket.material,
                indices: bucket.indices,
                index_buffer,
            }),
            Err(e) => {
                api.destroy_buffer(vertex_buffer);
                for sub in &submeshes {
                    api.destroy_buffer(sub.index_buffer);
                }
                release_textures(api, &data.library);
                return Err(e);
            }
        }
    }
    Ok(MeshAsset {
        name: name.to_string(),
        vertices: data.vertices,
        vertex_buffer,
        submeshes,
        library: data.library,
    })
}
