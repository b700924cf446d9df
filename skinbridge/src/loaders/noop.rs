use crate::game_profile::GameProfile;
use crate::resource::{Cape, Ears, GameProfileData, ResourceDescriptor, ResourceLoader, ResourceManager};
use anyhow::Result;
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use std::sync::Arc;
use uuid::Uuid;

/// Produces the empty stand-ins behind `cape:none`, `ears:none`, `ears:deadmau5` and
/// `gameProfile:none`
#[derive(Debug, Default)]
pub struct NoopLoader;

impl ResourceLoader<Cape> for NoopLoader {
    fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<Cape>) -> BoxFuture<'static, Result<Cape>> {
        future::ok(Cape::none(descriptor.uri())).boxed()
    }
}

impl ResourceLoader<Ears> for NoopLoader {
    fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<Ears>) -> BoxFuture<'static, Result<Ears>> {
        future::ok(Ears {
            resource_uri: descriptor.uri().to_string(),
            ..Default::default()
        })
        .boxed()
    }
}

impl ResourceLoader<GameProfileData> for NoopLoader {
    fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<GameProfileData>) -> BoxFuture<'static, Result<GameProfileData>> {
        future::ok(GameProfileData {
            resource_uri: descriptor.uri().to_string(),
            profile: Arc::new(GameProfile::new(Uuid::nil(), "")),
        })
        .boxed()
    }
}
