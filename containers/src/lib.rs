pub mod erased_storage;
pub mod idle_map;
pub mod prelude;

pub use dashmap;
