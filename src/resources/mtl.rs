//! Material library (`.mtl`) parsing.
//!
//! Blocks are opened by `newmtl` and closed by `map_Kd`: a material is only
//! usable once it has a diffuse texture. Coefficient lines (`Ka`, `Kd`,
//! `Ks`, `Ns`, any case) in between fill its lighting coefficients.

use std::path::{Path, PathBuf};

use anyhow::Context;
use cgmath::Vector3;
use thiserror::Error;

use crate::{
    data_structures::material::{LightingCoefficients, Material, MaterialLibrary, ShadingVariant},
    pipelines::TextureLoader,
    resources::{AssetSource, texture},
};

#[derive(Debug, Error, PartialEq)]
pub enum MtlError {
    #[error("line {line}: could not parse `{token}` as a number")]
    Parse { line: usize, token: String },
    #[error("line {line}: `{directive}` expects {expected} value(s)")]
    MissingValues {
        line: usize,
        directive: String,
        expected: usize,
    },
    #[error("texture {texture} found neither in {dir:?}/textures nor in {dir:?}")]
    TextureNotFound { texture: String, dir: PathBuf },
}

struct OpenBlock {
    name: String,
    coefficients: LightingCoefficients,
}

/// Parses the material file at `path` into `library`.
pub fn load_mtl<T: TextureLoader + ?Sized>(
    assets: &dyn AssetSource,
    textures: &mut T,
    path: &Path,
    library: &mut MaterialLibrary,
) -> anyhow::Result<()> {
    let text = assets
        .load_string(path)
        .with_context(|| format!("Could not read material library {}", path.display()))?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));

    let mut open: Option<OpenBlock> = None;
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (directive, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match directive.to_ascii_lowercase().as_str() {
            "newmtl" => {
                if let Some(block) = open.take() {
                    close_without_texture(library, block);
                }
                open = Some(OpenBlock {
                    name: rest.to_string(),
                    coefficients: LightingCoefficients::default(),
                });
            }
            coefficient @ ("ka" | "kd" | "ks") => {
                let value = parse_vec3(rest, line_no, directive)?;
                match open.as_mut() {
                    Some(block) => match coefficient {
                        "ka" => block.coefficients.ka = value,
                        "kd" => block.coefficients.kd = value,
                        _ => block.coefficients.ks = value,
                    },
                    None => log::debug!("{}:{} {} outside of a material", path.display(), line_no, directive),
                }
            }
            "ns" => {
                let value = parse_floats(rest, line_no, directive, 1)?[0];
                match open.as_mut() {
                    Some(block) => block.coefficients.ns = value,
                    None => log::debug!("{}:{} Ns outside of a material", path.display(), line_no),
                }
            }
            "map_kd" => {
                let Some(block) = open.take() else {
                    log::warn!(
                        "{}:{} map_Kd outside of a material block is ignored",
                        path.display(),
                        line_no
                    );
                    continue;
                };
                let reference = texture_reference(rest);
                let handle = texture::load_texture(assets, textures, dir, reference)
                    .with_context(|| format!("Material {} in {}", block.name, path.display()))?;
                library.insert(
                    &block.name,
                    Some(Material {
                        name: block.name.clone(),
                        texture: handle,
                        coefficients: block.coefficients,
                        variant: ShadingVariant::Lit,
                    }),
                );
            }
            _ => {}
        }
    }
    if let Some(block) = open.take() {
        close_without_texture(library, block);
    }
    Ok(())
}

/// Number of arguments an `map_*` option takes. `None` means up to three numbers.
fn option_arity(option: &str) -> Option<usize> {
    match option {
        "-o" | "-s" | "-t" => None,
        "-mm" => Some(2),
        _ => Some(1),
    }
}

fn next_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    s.split_once(char::is_whitespace).unwrap_or((s, ""))
}

/**
 * Strips the leading options of a texture statement and returns the file
 * reference, which may contain spaces.
 *
 * `-s 1 1 1 moss stone.png` yields `moss stone.png`.
 */
pub(crate) fn texture_reference(rest: &str) -> &str {
    let mut remainder = rest.trim();
    while remainder.starts_with('-') {
        let (option, mut after) = next_token(remainder);
        match option_arity(option) {
            Some(count) => {
                for _ in 0..count {
                    after = next_token(after).1;
                }
            }
            None => {
                for _ in 0..3 {
                    let (token, next) = next_token(after);
                    if token.parse::<f32>().is_err() {
                        break;
                    }
                    after = next;
                }
            }
        }
        remainder = after.trim_start();
    }
    remainder.trim_end()
}

fn close_without_texture(library: &mut MaterialLibrary, block: OpenBlock) {
    log::warn!("Material {} has no texture", block.name);
    library.insert(&block.name, None);
}

fn parse_vec3(rest: &str, line: usize, directive: &str) -> Result<Vector3<f32>, MtlError> {
    let values = parse_floats(rest, line, directive, 3)?;
    Ok(Vector3::new(values[0], values[1], values[2]))
}

fn parse_floats(rest: &str, line: usize, directive: &str, expected: usize) -> Result<Vec<f32>, MtlError> {
    let values = rest
        .split_whitespace()
        .take(expected)
        .map(|token| {
            token.parse::<f32>().map_err(|_| MtlError::Parse {
                line,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() < expected {
        return Err(MtlError::MissingValues {
            line,
            directive: directive.to_string(),
            expected,
        });
    }
    Ok(values)
}
