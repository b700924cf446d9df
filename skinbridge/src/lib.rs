//! Appearance layer of a Bedrock to Java bridge
//!
//! Resolves which skin, cape and geometry every player is shown with, caching the resources in
//! a typed [`resource::ResourceManager`], and keeps each Bedrock viewer's player list in sync.

pub mod assets;
pub mod config;
pub mod error;
pub mod fetch;
pub mod game_profile;
pub mod janitor;
pub mod loaders;
pub mod player;
pub mod player_list;
pub mod prelude;
pub mod provider;
pub mod resolver;
pub mod resource;
pub mod service;
pub mod session;
pub mod texture;

#[cfg(test)]
pub(crate) mod testing;
