use super::{IdentityRule, Provider, ProviderType};
use crate::loaders::LoaderSet;
use crate::player::PlayerEntity;
use crate::resource::{Ears, ResourceDescriptor, ResourceLoader, UriPattern};
use std::sync::Arc;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EarsType {
    None,
    MinecraftCapes,
    /// Ears are part of this one player's skin already
    Deadmau5,
}

impl ProviderType for EarsType {
    type Resource = Ears;

    const PROVIDERS: &'static [Provider<Self>] = &[
        Provider {
            kind: EarsType::None,
            template: "ears:none",
            pattern: UriPattern::Exact("ears:none"),
            identity: IdentityRule::None,
        },
        Provider {
            kind: EarsType::MinecraftCapes,
            template: "https://minecraftcapes.net/profile/{id}/ears",
            pattern: UriPattern::Wrapped {
                prefix: "https://minecraftcapes.net/profile/",
                suffix: "/ears",
            },
            identity: IdentityRule::Uuid,
        },
        Provider {
            kind: EarsType::Deadmau5,
            template: "ears:deadmau5",
            pattern: UriPattern::Exact("ears:deadmau5"),
            identity: IdentityRule::None,
        },
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn loader(self, loaders: &LoaderSet) -> Arc<dyn ResourceLoader<Ears>> {
        match self {
            EarsType::None | EarsType::Deadmau5 => loaders.noop.clone(),
            EarsType::MinecraftCapes => loaders.url.clone(),
        }
    }
}

impl EarsType {
    pub fn default_for(player: &PlayerEntity) -> ResourceDescriptor<Ears> {
        EarsType::None.descriptor_for(player)
    }
}
