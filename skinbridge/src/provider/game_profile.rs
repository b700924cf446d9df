use super::{IdentityRule, Provider, ProviderType};
use crate::loaders::LoaderSet;
use crate::resource::{GameProfileData, ResourceDescriptor, ResourceLoader, UriPattern};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GameProfileDataType {
    None,
    Minecraft,
}

impl ProviderType for GameProfileDataType {
    type Resource = GameProfileData;

    const PROVIDERS: &'static [Provider<Self>] = &[
        Provider {
            kind: GameProfileDataType::None,
            template: "gameProfile:none",
            pattern: UriPattern::Exact("gameProfile:none"),
            identity: IdentityRule::None,
        },
        Provider {
            kind: GameProfileDataType::Minecraft,
            template: "gameProfile:{id}",
            pattern: UriPattern::PrefixExcept {
                prefix: "gameProfile:",
                excluded: &["none"],
            },
            identity: IdentityRule::Uuid,
        },
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn loader(self, loaders: &LoaderSet) -> Arc<dyn ResourceLoader<GameProfileData>> {
        match self {
            GameProfileDataType::None => loaders.noop.clone(),
            GameProfileDataType::Minecraft => loaders.mojang.clone(),
        }
    }
}

impl GameProfileDataType {
    /// Session server profile of a player known only by uuid
    pub fn minecraft_descriptor(player_id: &Uuid) -> ResourceDescriptor<GameProfileData> {
        ResourceDescriptor::new(
            GameProfileDataType::Minecraft
                .template()
                .replace("{id}", &player_id.simple().to_string()),
        )
    }
}
