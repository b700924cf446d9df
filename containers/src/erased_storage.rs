mod dash_map;

pub use dash_map::ErasedStorageDashMap;
