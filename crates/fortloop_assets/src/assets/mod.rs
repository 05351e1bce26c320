pub mod ldtk;
pub mod map;
