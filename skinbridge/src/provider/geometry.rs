use super::{IdentityRule, Provider, ProviderType};
use crate::loaders::LoaderSet;
use crate::player::PlayerEntity;
use crate::resource::{ResourceDescriptor, ResourceLoader, SkinGeometry, UriPattern};
use std::sync::Arc;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SkinGeometryType {
    BedrockClientData,
    JavaGameProfile,
    Legacy,
    LegacySlim,
    Ears,
    EarsSlim,
    CustomSkull,
}

impl ProviderType for SkinGeometryType {
    type Resource = SkinGeometry;

    const PROVIDERS: &'static [Provider<Self>] = &[
        Provider {
            kind: SkinGeometryType::BedrockClientData,
            template: "bedrockClientGeom:{id}",
            pattern: UriPattern::Prefix("bedrockClientGeom:"),
            identity: IdentityRule::UuidAndSkinId,
        },
        Provider {
            kind: SkinGeometryType::JavaGameProfile,
            template: "javaClientGeom:{id}",
            pattern: UriPattern::Prefix("javaClientGeom:"),
            identity: IdentityRule::Uuid,
        },
        Provider {
            kind: SkinGeometryType::Legacy,
            template: "geom:geometry.humanoid.custom",
            pattern: UriPattern::Exact("geom:geometry.humanoid.custom"),
            identity: IdentityRule::None,
        },
        Provider {
            kind: SkinGeometryType::LegacySlim,
            template: "geom:geometry.humanoid.customSlim",
            pattern: UriPattern::Exact("geom:geometry.humanoid.customSlim"),
            identity: IdentityRule::None,
        },
        Provider {
            kind: SkinGeometryType::Ears,
            template: "geom:geometry.humanoid.ears",
            pattern: UriPattern::Exact("geom:geometry.humanoid.ears"),
            identity: IdentityRule::None,
        },
        Provider {
            kind: SkinGeometryType::EarsSlim,
            template: "geom:geometry.humanoid.earsSlim",
            pattern: UriPattern::Exact("geom:geometry.humanoid.earsSlim"),
            identity: IdentityRule::None,
        },
        Provider {
            kind: SkinGeometryType::CustomSkull,
            template: "geom:geometry.humanoid.customskull",
            pattern: UriPattern::Exact("geom:geometry.humanoid.customskull"),
            identity: IdentityRule::None,
        },
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn loader(self, loaders: &LoaderSet) -> Arc<dyn ResourceLoader<SkinGeometry>> {
        match self {
            SkinGeometryType::BedrockClientData => loaders.bedrock.clone(),
            SkinGeometryType::JavaGameProfile => loaders.java_profile.clone(),
            SkinGeometryType::Legacy
            | SkinGeometryType::LegacySlim
            | SkinGeometryType::Ears
            | SkinGeometryType::EarsSlim
            | SkinGeometryType::CustomSkull => loaders.internal.clone(),
        }
    }
}

impl SkinGeometryType {
    pub fn default_for(player: &PlayerEntity) -> ResourceDescriptor<SkinGeometry> {
        match player.slim {
            true => SkinGeometryType::LegacySlim.descriptor_for(player),
            false => SkinGeometryType::Legacy.descriptor_for(player),
        }
    }

    /// Geometry name of the bundled geometries, e.g. `geometry.humanoid.customSlim`
    pub fn geometry_name(self) -> Option<&'static str> {
        self.template().strip_prefix("geom:")
    }
}
