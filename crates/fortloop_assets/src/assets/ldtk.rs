use bevy::{platform::collections::HashMap, prelude::*};

use crate::ldtk::{Project, TilesetDef};

/// A loaded LDtk project with its tileset images.
#[derive(TypePath, Asset, Debug)]
pub struct LdtkProjectAsset {
    /// Parsed and normalized project
    pub project: Project,

    /// Tileset images
    /// Key: tileset definition uid
    pub tilesets: HashMap<i64, Handle<Image>>,
}

impl LdtkProjectAsset {
    /// Tileset definition and its image handle.
    pub fn tileset(&self, uid: i64) -> Option<(&TilesetDef, &Handle<Image>)> {
        let def = self.project.tileset(uid)?;
        let image = self.tilesets.get(&uid)?;
        Some((def, image))
    }
}
