//! Reactive spawning systems.

mod context;
mod spawn;

pub use context::SpawnContext;
pub use spawn::{process_loaded_ldtk_worlds, process_loaded_maps};
