pub mod ldtk;
pub mod map;

use std::path::Path;

use bevy::asset::LoadContext;
use normalize_path::NormalizePath;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Invalid path: {0}")]
pub struct InvalidPathError(pub String);

/// Resolve a path found inside a level file to a Bevy asset path.
///
/// Paths coming back from the `tiled` crate are already joined with the map
/// location and start with `assets/`; those only lose the prefix. Anything
/// else is taken relative to the directory of the asset being loaded.
pub(crate) fn resolve_relative_path(
    load_context: &LoadContext,
    relative_path: &Path,
) -> Result<String, InvalidPathError> {
    resolve_against(load_context.asset_path().path(), relative_path)
}

fn resolve_against(asset_path: &Path, relative_path: &Path) -> Result<String, InvalidPathError> {
    let resolved = if relative_path.starts_with("assets") {
        relative_path
            .normalize()
            .strip_prefix("assets")
            .map(Path::to_path_buf)
            .map_err(|_| InvalidPathError(format!("Path escapes the asset root: {relative_path:?}")))?
    } else {
        let parent = asset_path.parent().ok_or_else(|| {
            InvalidPathError(format!("No parent directory for asset: {asset_path:?}"))
        })?;
        // Path::join does not resolve `..`
        parent.join(relative_path).normalize()
    };

    let asset_path = resolved
        .to_str()
        .ok_or_else(|| InvalidPathError(format!("Invalid UTF-8 in path: {resolved:?}")))?
        .replace('\\', "/");

    Ok(asset_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiled_paths_lose_assets_prefix() {
        let resolved = resolve_against(
            Path::new("platformer/tiledMap.tmx"),
            Path::new("assets/platformer/../shared/tiles.png"),
        )
        .expect("resolves");
        assert_eq!(resolved, "shared/tiles.png");
    }

    #[test]
    fn test_relative_paths_join_asset_directory() {
        let resolved = resolve_against(
            Path::new("fortloop/world.ldtk"),
            Path::new("tileset.png"),
        )
        .expect("resolves");
        assert_eq!(resolved, "fortloop/tileset.png");

        let resolved = resolve_against(
            Path::new("fortloop/world.ldtk"),
            Path::new("../atlas/tiles.png"),
        )
        .expect("resolves");
        assert_eq!(resolved, "atlas/tiles.png");
    }
}
