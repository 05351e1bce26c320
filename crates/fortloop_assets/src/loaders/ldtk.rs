use std::path::Path;

use bevy::{
    asset::{AssetLoader, LoadContext, ReadAssetBytesError, io::Reader},
    platform::collections::HashMap,
    prelude::*,
    tasks::ConditionalSendFuture,
};
use thiserror::Error;

use crate::assets::ldtk::LdtkProjectAsset;
use crate::ldtk::{Level, Project};
use crate::loaders::{InvalidPathError, resolve_relative_path};

/// Asset loader for LDtk projects (.ldtk files)
///
/// Merges external level files (`.ldtkl`) into the project and loads every
/// tileset image as a dependency.
#[derive(Default)]
pub struct LdtkProjectAssetLoader;

#[derive(Debug, Error)]
pub enum LdtkLoaderError {
    #[error("Failed to parse project: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read external level: {0}")]
    ExternalLevel(#[from] ReadAssetBytesError),

    #[error(transparent)]
    InvalidPath(#[from] InvalidPathError),
}

impl AssetLoader for LdtkProjectAssetLoader {
    type Asset = LdtkProjectAsset;
    type Settings = ();
    type Error = LdtkLoaderError;

    fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        load_context: &mut LoadContext,
    ) -> impl ConditionalSendFuture<Output = Result<Self::Asset, Self::Error>> {
        async move {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).await?;
            let mut project = Project::from_slice(&bytes)?;

            for level in project
                .worlds
                .iter_mut()
                .flat_map(|world| world.levels.iter_mut())
            {
                if level.layer_instances.is_some() {
                    continue;
                }
                let Some(rel_path) = level.external_rel_path.clone() else {
                    warn!("Level '{}' has no layers and no external file", level.identifier);
                    continue;
                };
                let path = resolve_relative_path(load_context, Path::new(&rel_path))?;
                let level_bytes = load_context.read_asset_bytes(path).await?;
                let external: Level = serde_json::from_slice(&level_bytes)?;
                *level = external;
            }

            let mut tilesets = HashMap::default();
            for tileset in &project.defs.tilesets {
                let Some(rel_path) = &tileset.rel_path else {
                    // Embedded editor icons have no image on disk
                    continue;
                };
                let path = resolve_relative_path(load_context, Path::new(rel_path))?;
                let handle: Handle<Image> = load_context.load(path);
                tilesets.insert(tileset.uid, handle);
            }

            debug!(
                "Loaded LDtk project {} ({} worlds, {} tilesets)",
                load_context.asset_path(),
                project.worlds.len(),
                tilesets.len()
            );

            Ok(LdtkProjectAsset { project, tilesets })
        }
    }

    fn extensions(&self) -> &[&str] {
        &["ldtk"]
    }
}
