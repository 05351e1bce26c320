//! Data model for LDtk project files (`.ldtk`).
//!
//! The model mirrors the JSON layout LDtk writes, trimmed to what the game
//! reads: worlds, levels, layer instances, entity instances, custom field
//! instances and tileset definitions. Query helpers live next to the types
//! they query.
//!
//! All coordinates are LDtk pixel coordinates: origin top-left, Y down.

mod fields;

pub use fields::{EntityRef, FieldError, TileRect};

use bevy::math::{IVec2, Rect, Vec2};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Identifier LDtk gives the implicit world of a single-world project.
pub const DEFAULT_WORLD_IDENTIFIER: &str = "World";

/// Root of an LDtk project file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub iid: String,
    #[serde(default)]
    pub json_version: String,
    /// Project background colour as `#RRGGBB`.
    #[serde(default)]
    pub bg_color: String,
    /// Levels live in separate `.ldtkl` files when set.
    #[serde(default)]
    pub external_levels: bool,
    #[serde(default)]
    pub defs: Definitions,
    /// Levels of a single-world project. Moved into [`Project::worlds`] by
    /// [`Project::normalize`].
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub worlds: Vec<WorldDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definitions {
    #[serde(default)]
    pub tilesets: Vec<TilesetDef>,
}

/// A tileset definition. `rel_path` is relative to the project file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilesetDef {
    pub uid: i64,
    pub identifier: String,
    pub rel_path: Option<String>,
    pub px_wid: u32,
    pub px_hei: u32,
    pub tile_grid_size: u32,
    #[serde(default)]
    pub spacing: u32,
    #[serde(default)]
    pub padding: u32,
}

impl TilesetDef {
    /// Grid size in tiles (columns, rows), honouring padding and spacing.
    pub fn grid_size(&self) -> (u32, u32) {
        let cell = self.tile_grid_size + self.spacing;
        if cell == 0 {
            return (0, 0);
        }
        let usable = |px: u32| (px.saturating_sub(2 * self.padding) + self.spacing) / cell;
        (usable(self.px_wid), usable(self.px_hei))
    }

    /// Atlas index of the tile whose top-left pixel is `src`.
    pub fn tile_index(&self, src: IVec2) -> Option<usize> {
        let (columns, rows) = self.grid_size();
        let cell = (self.tile_grid_size + self.spacing) as i32;
        if cell == 0 {
            return None;
        }
        let local = src - IVec2::splat(self.padding as i32);
        if local.x < 0 || local.y < 0 {
            return None;
        }
        let (col, row) = ((local.x / cell) as u32, (local.y / cell) as u32);
        (col < columns && row < rows).then_some((row * columns + col) as usize)
    }
}

/// One world of a multi-world project.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldDef {
    pub iid: String,
    pub identifier: String,
    #[serde(default)]
    pub levels: Vec<Level>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub identifier: String,
    pub iid: String,
    #[serde(default)]
    pub uid: i64,
    #[serde(default)]
    pub world_x: i32,
    #[serde(default)]
    pub world_y: i32,
    pub px_wid: u32,
    pub px_hei: u32,
    #[serde(rename = "__bgColor", default)]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub field_instances: Vec<FieldInstance>,
    /// `None` until an external level file has been merged in.
    #[serde(default)]
    pub layer_instances: Option<Vec<LayerInstance>>,
    #[serde(default)]
    pub external_rel_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LayerType {
    IntGrid,
    Entities,
    Tiles,
    AutoLayer,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerInstance {
    #[serde(rename = "__identifier")]
    pub identifier: String,
    #[serde(rename = "__type")]
    pub layer_type: LayerType,
    #[serde(rename = "__cWid")]
    pub c_wid: u32,
    #[serde(rename = "__cHei")]
    pub c_hei: u32,
    #[serde(rename = "__gridSize")]
    pub grid_size: u32,
    #[serde(rename = "__tilesetDefUid", default)]
    pub tileset_def_uid: Option<i64>,
    #[serde(rename = "__tilesetRelPath", default)]
    pub tileset_rel_path: Option<String>,
    #[serde(rename = "__pxTotalOffsetX", default)]
    pub px_total_offset_x: i32,
    #[serde(rename = "__pxTotalOffsetY", default)]
    pub px_total_offset_y: i32,
    #[serde(default)]
    pub iid: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub int_grid_csv: Vec<i32>,
    #[serde(default)]
    pub grid_tiles: Vec<TileInstance>,
    #[serde(default)]
    pub auto_layer_tiles: Vec<TileInstance>,
    #[serde(default)]
    pub entity_instances: Vec<EntityInstance>,
}

fn default_visible() -> bool {
    true
}

impl LayerInstance {
    /// IntGrid value at cell `(x, y)`; zero for empty or out-of-range cells.
    pub fn int_grid_value(&self, x: i32, y: i32) -> i32 {
        if x < 0 || y < 0 || x as u32 >= self.c_wid || y as u32 >= self.c_hei {
            return 0;
        }
        let index = y as usize * self.c_wid as usize + x as usize;
        self.int_grid_csv.get(index).copied().unwrap_or(0)
    }

    /// Tiles to draw for this layer: hand-placed tiles for `Tiles` layers,
    /// generated tiles for auto-layers and IntGrid layers with rules.
    pub fn tiles(&self) -> &[TileInstance] {
        match self.layer_type {
            LayerType::Tiles => &self.grid_tiles,
            _ => &self.auto_layer_tiles,
        }
    }

    /// Total layer offset in pixels.
    pub fn offset(&self) -> IVec2 {
        IVec2::new(self.px_total_offset_x, self.px_total_offset_y)
    }
}

/// A single placed tile in a tile or auto layer.
#[derive(Debug, Clone, Deserialize)]
pub struct TileInstance {
    /// Position in layer pixels.
    pub px: [i32; 2],
    /// Top-left pixel of the tile in the tileset image.
    pub src: [i32; 2],
    /// Flip bits: 1 = X, 2 = Y.
    #[serde(default)]
    pub f: u8,
    #[serde(default)]
    pub t: i64,
    #[serde(default = "default_alpha")]
    pub a: f32,
}

fn default_alpha() -> f32 {
    1.0
}

impl TileInstance {
    pub fn flip_x(&self) -> bool {
        self.f & 1 != 0
    }

    pub fn flip_y(&self) -> bool {
        self.f & 2 != 0
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityInstance {
    #[serde(rename = "__identifier")]
    pub identifier: String,
    pub iid: String,
    /// Pivot position in layer pixels.
    pub px: [i32; 2],
    #[serde(rename = "__pivot", default)]
    pub pivot: [f32; 2],
    #[serde(rename = "__worldX", default)]
    pub world_x: Option<i32>,
    #[serde(rename = "__worldY", default)]
    pub world_y: Option<i32>,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "__tile", default)]
    pub tile: Option<TileRect>,
    #[serde(default)]
    pub field_instances: Vec<FieldInstance>,
}

impl EntityInstance {
    /// Pivot position in world pixels. Falls back to `level` origin + `px`
    /// for projects saved without the `__worldX`/`__worldY` fields.
    pub fn world_position(&self, level: &Level) -> Vec2 {
        let x = self.world_x.unwrap_or(level.world_x + self.px[0]);
        let y = self.world_y.unwrap_or(level.world_y + self.px[1]);
        Vec2::new(x as f32, y as f32)
    }

    /// Entity size in pixels.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Raw JSON value of a custom field.
    pub fn field(&self, identifier: &str) -> Option<&serde_json::Value> {
        fields::find(&self.field_instances, identifier)
    }

    /// Custom fields deserialized into `T`, keyed by field identifier.
    pub fn fields<T: DeserializeOwned>(&self) -> Result<T, FieldError> {
        fields::collect(&self.field_instances)
    }
}

/// A custom field value as written by LDtk.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldInstance {
    #[serde(rename = "__identifier")]
    pub identifier: String,
    #[serde(rename = "__type")]
    pub field_type: String,
    #[serde(rename = "__value", default)]
    pub value: serde_json::Value,
}

impl Project {
    /// Parse a project from JSON and [`normalize`](Self::normalize) it.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let mut project: Project = serde_json::from_slice(bytes)?;
        project.normalize();
        Ok(project)
    }

    /// Expose single-world projects as one world.
    ///
    /// LDtk stores levels at the root until the multi-world option is
    /// enabled. Afterwards every project has at least one [`WorldDef`].
    pub fn normalize(&mut self) {
        if self.worlds.is_empty() {
            self.worlds.push(WorldDef {
                iid: self.iid.clone(),
                identifier: DEFAULT_WORLD_IDENTIFIER.to_string(),
                levels: std::mem::take(&mut self.levels),
            });
        }
    }

    /// Look up a world by iid or identifier.
    pub fn world(&self, key: &str) -> Option<&WorldDef> {
        self.worlds
            .iter()
            .find(|world| world.iid == key || world.identifier == key)
    }

    pub fn tileset(&self, uid: i64) -> Option<&TilesetDef> {
        self.defs.tilesets.iter().find(|tileset| tileset.uid == uid)
    }

    /// Resolve an entity reference anywhere in the project.
    pub fn entity_ref(&self, reference: &EntityRef) -> Option<&EntityInstance> {
        self.worlds
            .iter()
            .filter(|world| reference.world_iid.is_empty() || world.iid == reference.world_iid)
            .flat_map(|world| world.levels.iter())
            .find_map(|level| level.entity_ref(reference))
    }

    /// Background colour as sRGB bytes.
    pub fn background_color(&self) -> Option<[u8; 3]> {
        parse_hex_color(&self.bg_color)
    }
}

impl WorldDef {
    /// Look up a level by identifier or iid.
    pub fn level(&self, key: &str) -> Option<&Level> {
        self.levels
            .iter()
            .find(|level| level.identifier == key || level.iid == key)
    }

    /// First entity with `identifier` across all levels, in level order.
    pub fn entity<'a>(&'a self, identifier: &'a str) -> Option<&'a EntityInstance> {
        self.entities(identifier).next().map(|(_, entity)| entity)
    }

    /// Every entity with `identifier` across all levels, with its level.
    pub fn entities<'a>(
        &'a self,
        identifier: &'a str,
    ) -> impl Iterator<Item = (&'a Level, &'a EntityInstance)> + 'a {
        self.levels.iter().flat_map(move |level| {
            level
                .entities(identifier)
                .map(move |entity| (level, entity))
        })
    }

    /// First level whose bounds contain `point` (world pixels).
    pub fn level_at(&self, point: Vec2) -> Option<&Level> {
        self.levels.iter().find(|level| level.contains(point))
    }
}

impl Level {
    /// Level bounds in world pixels.
    pub fn bounds(&self) -> Rect {
        let min = Vec2::new(self.world_x as f32, self.world_y as f32);
        Rect::from_corners(min, min + Vec2::new(self.px_wid as f32, self.px_hei as f32))
    }

    /// Whether `point` (world pixels) lies inside the level. The right and
    /// bottom edges are exclusive.
    pub fn contains(&self, point: Vec2) -> bool {
        let bounds = self.bounds();
        point.x >= bounds.min.x
            && point.y >= bounds.min.y
            && point.x < bounds.max.x
            && point.y < bounds.max.y
    }

    pub fn layers(&self) -> &[LayerInstance] {
        self.layer_instances.as_deref().unwrap_or_default()
    }

    pub fn layer(&self, identifier: &str) -> Option<&LayerInstance> {
        self.layers()
            .iter()
            .find(|layer| layer.identifier == identifier)
    }

    /// Entities with `identifier` from every entity layer of this level.
    pub fn entities<'a>(
        &'a self,
        identifier: &'a str,
    ) -> impl Iterator<Item = &'a EntityInstance> + 'a {
        self.layers()
            .iter()
            .flat_map(|layer| layer.entity_instances.iter())
            .filter(move |entity| entity.identifier == identifier)
    }

    /// Resolve an entity reference against this level.
    pub fn entity_ref(&self, reference: &EntityRef) -> Option<&EntityInstance> {
        if !reference.level_iid.is_empty() && reference.level_iid != self.iid {
            return None;
        }
        self.layers()
            .iter()
            .flat_map(|layer| layer.entity_instances.iter())
            .find(|entity| entity.iid == reference.entity_iid)
    }

    pub fn field(&self, identifier: &str) -> Option<&serde_json::Value> {
        fields::find(&self.field_instances, identifier)
    }

    /// Level custom fields deserialized into `T`, keyed by field identifier.
    pub fn fields<T: DeserializeOwned>(&self) -> Result<T, FieldError> {
        fields::collect(&self.field_instances)
    }
}

/// Parse `#RRGGBB` (leading `#` optional).
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) const PROJECT: &str = r##"{
        "iid": "proj-1",
        "jsonVersion": "1.5.3",
        "bgColor": "#40465B",
        "defs": {
            "tilesets": [{
                "uid": 1, "identifier": "Tiles", "relPath": "tileset.png",
                "pxWid": 64, "pxHei": 32, "tileGridSize": 16, "spacing": 0, "padding": 0
            }]
        },
        "levels": [
            {
                "identifier": "Level_0", "iid": "lvl-0", "uid": 0,
                "worldX": 0, "worldY": 0, "pxWid": 256, "pxHei": 128,
                "fieldInstances": [
                    { "__identifier": "Float", "__type": "Float", "__value": 1.5 },
                    { "__identifier": "Multilines", "__type": "String", "__value": "a\nb" }
                ],
                "layerInstances": [
                    {
                        "__identifier": "Entities", "__type": "Entities",
                        "__cWid": 16, "__cHei": 8, "__gridSize": 16,
                        "entityInstances": [
                            {
                                "__identifier": "Player", "iid": "ent-player",
                                "px": [32, 64], "__pivot": [0.5, 1.0],
                                "width": 16, "height": 32, "fieldInstances": []
                            },
                            {
                                "__identifier": "RefTest", "iid": "ent-ref",
                                "px": [48, 64], "width": 16, "height": 16,
                                "fieldInstances": [{
                                    "__identifier": "Test", "__type": "EntityRef",
                                    "__value": {
                                        "entityIid": "ent-enemy", "layerIid": "layer-1",
                                        "levelIid": "lvl-1", "worldIid": "proj-1"
                                    }
                                }]
                            }
                        ]
                    },
                    {
                        "__identifier": "Collisions", "__type": "IntGrid",
                        "__cWid": 4, "__cHei": 2, "__gridSize": 16,
                        "intGridCsv": [0, 0, 0, 0, 1, 1, 0, 2]
                    }
                ]
            },
            {
                "identifier": "Level_1", "iid": "lvl-1", "uid": 1,
                "worldX": 256, "worldY": 0, "pxWid": 256, "pxHei": 128,
                "layerInstances": [
                    {
                        "__identifier": "Entities", "__type": "Entities",
                        "__cWid": 16, "__cHei": 8, "__gridSize": 16, "iid": "layer-1",
                        "entityInstances": [
                            {
                                "__identifier": "Enemy", "iid": "ent-enemy",
                                "px": [16, 16], "width": 16, "height": 16,
                                "fieldInstances": []
                            },
                            {
                                "__identifier": "Enemy", "iid": "ent-enemy-2",
                                "px": [64, 16], "width": 16, "height": 16,
                                "fieldInstances": []
                            }
                        ]
                    }
                ]
            }
        ]
    }"##;

    fn project() -> Project {
        Project::from_slice(PROJECT.as_bytes()).expect("test project parses")
    }

    #[test]
    fn test_single_world_project_is_exposed_as_one_world() {
        let project = project();
        assert!(project.levels.is_empty());
        assert_eq!(project.worlds.len(), 1);

        let by_iid = project.world("proj-1").expect("world by iid");
        let by_name = project
            .world(DEFAULT_WORLD_IDENTIFIER)
            .expect("world by identifier");
        assert_eq!(by_iid.levels.len(), 2);
        assert_eq!(by_name.iid, by_iid.iid);
        assert!(project.world("missing").is_none());
    }

    #[test]
    fn test_level_lookup_by_identifier_and_iid() {
        let project = project();
        let world = &project.worlds[0];
        assert_eq!(world.level("Level_1").map(|l| l.iid.as_str()), Some("lvl-1"));
        assert_eq!(world.level("lvl-0").map(|l| l.identifier.as_str()), Some("Level_0"));
        assert!(world.level("Level_9").is_none());
    }

    #[test]
    fn test_entities_across_levels() {
        let project = project();
        let world = &project.worlds[0];

        let player = world.entity("Player").expect("player");
        assert_eq!(player.iid, "ent-player");

        let enemies: Vec<_> = world.entities("Enemy").collect();
        assert_eq!(enemies.len(), 2);
        assert!(enemies.iter().all(|(level, _)| level.identifier == "Level_1"));

        // Enemy pivot falls back to level origin + px.
        let (level, enemy) = enemies[0];
        assert_eq!(enemy.world_position(level), Vec2::new(272.0, 16.0));
    }

    #[test]
    fn test_level_contains_excludes_far_edges() {
        let project = project();
        let level = &project.worlds[0].levels[1];
        assert!(level.contains(Vec2::new(256.0, 0.0)));
        assert!(level.contains(Vec2::new(511.9, 127.9)));
        assert!(!level.contains(Vec2::new(512.0, 10.0)));
        assert!(!level.contains(Vec2::new(300.0, 128.0)));
        assert!(!level.contains(Vec2::new(255.0, 10.0)));

        let world = &project.worlds[0];
        assert_eq!(
            world.level_at(Vec2::new(10.0, 10.0)).map(|l| l.iid.as_str()),
            Some("lvl-0")
        );
        assert!(world.level_at(Vec2::new(-1.0, 0.0)).is_none());
    }

    #[test]
    fn test_entity_ref_resolution() {
        let project = project();
        let level0 = &project.worlds[0].levels[0];
        let holder = level0.entities("RefTest").next().expect("ref holder");
        let reference: EntityRef = serde_json::from_value(
            holder.field("Test").cloned().expect("Test field"),
        )
        .expect("entity ref");

        // The reference points into another level.
        assert!(level0.entity_ref(&reference).is_none());
        let target = project.entity_ref(&reference).expect("resolved");
        assert_eq!(target.identifier, "Enemy");
        assert_eq!(target.iid, "ent-enemy");
    }

    #[test]
    fn test_int_grid_lookup() {
        let project = project();
        let collisions = project.worlds[0].levels[0]
            .layer("Collisions")
            .expect("collision layer");
        assert_eq!(collisions.layer_type, LayerType::IntGrid);
        assert_eq!(collisions.int_grid_value(0, 1), 1);
        assert_eq!(collisions.int_grid_value(2, 1), 0);
        assert_eq!(collisions.int_grid_value(3, 1), 2);
        assert_eq!(collisions.int_grid_value(4, 1), 0);
        assert_eq!(collisions.int_grid_value(-1, 0), 0);
    }

    #[test]
    fn test_tileset_grid_and_tile_index() {
        let project = project();
        let tileset = project.tileset(1).expect("tileset");
        assert_eq!(tileset.grid_size(), (4, 2));
        assert_eq!(tileset.tile_index(IVec2::new(0, 0)), Some(0));
        assert_eq!(tileset.tile_index(IVec2::new(48, 16)), Some(7));
        assert_eq!(tileset.tile_index(IVec2::new(64, 0)), None);

        let spaced = TilesetDef {
            uid: 2,
            identifier: "Spaced".into(),
            rel_path: None,
            px_wid: 2 + 16 * 3 + 2 * 2 + 2,
            px_hei: 2 + 16 + 2,
            tile_grid_size: 16,
            spacing: 2,
            padding: 2,
        };
        assert_eq!(spaced.grid_size(), (3, 1));
        assert_eq!(spaced.tile_index(IVec2::new(2 + 18, 2)), Some(1));
    }

    #[test]
    fn test_background_color() {
        assert_eq!(project().background_color(), Some([0x40, 0x46, 0x5B]));
        assert_eq!(parse_hex_color("ff0080"), Some([255, 0, 128]));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }
}
