use std::path::{Path, PathBuf};

use crate::{
    pipelines::{TextureHandle, TextureLoader},
    resources::{AssetSource, mtl::MtlError},
};

/// Sub folder next to a model that is searched for textures first.
pub const TEXTURE_SUB_FOLDER: &str = "textures";

/**
 * Finds a texture referenced from a model or material file.
 *
 * Only the file name of `reference` is used, since exporters tend to write
 * absolute paths of the artist's machine. `<dir>/textures/<name>` is tried
 * before `<dir>/<name>`.
 */
pub fn resolve_texture(assets: &dyn AssetSource, dir: &Path, reference: &str) -> Option<PathBuf> {
    let name = Path::new(reference.trim()).file_name()?;
    [dir.join(TEXTURE_SUB_FOLDER).join(name), dir.join(name)]
        .into_iter()
        .find(|candidate| assets.exists(candidate))
}

pub fn load_texture<T: TextureLoader + ?Sized>(
    assets: &dyn AssetSource,
    textures: &mut T,
    dir: &Path,
    reference: &str,
) -> anyhow::Result<TextureHandle> {
    let path = resolve_texture(assets, dir, reference).ok_or_else(|| MtlError::TextureNotFound {
        texture: reference.to_string(),
        dir: dir.to_path_buf(),
    })?;
    log::debug!("Loading texture {}", path.display());
    textures.load_texture(&path)
}
