use super::{IdentityRule, Provider, ProviderType};
use crate::loaders::LoaderSet;
use crate::player::PlayerEntity;
use crate::resource::{Cape, ResourceDescriptor, ResourceLoader, UriPattern};
use std::sync::Arc;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CapeType {
    None,
    BedrockClientData,
    JavaGameProfile,
    JavaServerGameProfile,
    Optifine,
    Labymod,
    FiveZig,
    MinecraftCapes,
}

impl ProviderType for CapeType {
    type Resource = Cape;

    const PROVIDERS: &'static [Provider<Self>] = &[
        Provider {
            kind: CapeType::None,
            template: "cape:none",
            pattern: UriPattern::Exact("cape:none"),
            identity: IdentityRule::None,
        },
        Provider {
            kind: CapeType::BedrockClientData,
            template: "bedrockClientCape:{id}",
            pattern: UriPattern::Prefix("bedrockClientCape:"),
            identity: IdentityRule::UuidAndCapeId,
        },
        Provider {
            kind: CapeType::JavaGameProfile,
            template: "javaClientCape:{id}",
            pattern: UriPattern::Prefix("javaClientCape:"),
            identity: IdentityRule::Uuid,
        },
        Provider {
            kind: CapeType::JavaServerGameProfile,
            template: "https://textures.minecraft.net/texture/{id}",
            pattern: UriPattern::Prefix("https://textures.minecraft.net/texture/"),
            identity: IdentityRule::CapeTextureId,
        },
        Provider {
            kind: CapeType::Optifine,
            template: "https://optifine.net/capes/{id}.png",
            pattern: UriPattern::Wrapped {
                prefix: "https://optifine.net/capes/",
                suffix: ".png",
            },
            identity: IdentityRule::Username,
        },
        Provider {
            kind: CapeType::Labymod,
            template: "https://dl.labymod.net/capes/{id}",
            pattern: UriPattern::Prefix("https://dl.labymod.net/capes/"),
            identity: IdentityRule::UuidDashed,
        },
        Provider {
            kind: CapeType::FiveZig,
            template: "https://textures.5zigreborn.eu/profile/{id}",
            pattern: UriPattern::Prefix("https://textures.5zigreborn.eu/profile/"),
            identity: IdentityRule::UuidDashed,
        },
        Provider {
            kind: CapeType::MinecraftCapes,
            template: "https://minecraftcapes.net/profile/{id}/cape",
            pattern: UriPattern::Wrapped {
                prefix: "https://minecraftcapes.net/profile/",
                suffix: "/cape",
            },
            identity: IdentityRule::Uuid,
        },
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn loader(self, loaders: &LoaderSet) -> Arc<dyn ResourceLoader<Cape>> {
        match self {
            CapeType::None => loaders.noop.clone(),
            CapeType::BedrockClientData => loaders.bedrock.clone(),
            CapeType::JavaGameProfile => loaders.java_profile.clone(),
            CapeType::FiveZig => loaders.fivezig.clone(),
            CapeType::JavaServerGameProfile
            | CapeType::Optifine
            | CapeType::Labymod
            | CapeType::MinecraftCapes => loaders.url.clone(),
        }
    }
}

impl CapeType {
    pub fn default_for(player: &PlayerEntity) -> ResourceDescriptor<Cape> {
        CapeType::None.descriptor_for(player)
    }

    /// Cape id reported to clients for a cape URL
    pub fn cape_id_for(self, uri: &str) -> String {
        let mut segments = uri.trim_end_matches('/').rsplit('/');
        let last = segments.next().unwrap_or_default();
        match self {
            // .../profile/<uuid>/cape
            CapeType::MinecraftCapes => segments.next().unwrap_or(last).to_string(),
            _ => last.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cape_id_for() {
        assert_eq!(
            CapeType::MinecraftCapes.cape_id_for("https://minecraftcapes.net/profile/abc123/cape"),
            "abc123"
        );
        assert_eq!(
            CapeType::Labymod.cape_id_for("https://dl.labymod.net/capes/1e18d5ff-643d-45c8-b509-43b8461d8614"),
            "1e18d5ff-643d-45c8-b509-43b8461d8614"
        );
        assert_eq!(CapeType::Optifine.cape_id_for("https://optifine.net/capes/Notch.png"), "Notch.png");
    }
}
