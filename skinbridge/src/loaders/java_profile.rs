use crate::fetch::Fetcher;
use crate::game_profile::{GameProfile, TextureModel, TextureType};
use crate::provider::{CapeType, GameProfileDataType, PlayerSkinType, ProviderType, SkinGeometryType, SkullType};
use crate::resource::{
    Cape, PlayerSkin, Resource, ResourceDescriptor, ResourceLoader, ResourceManager, SkinGeometry, Skull,
    UriPattern,
};
use crate::texture::{TextureData, scale_to_width};
use anyhow::{Context, Result};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use uuid::Uuid;

/// Resolves textures from a Java game profile's `textures` property
///
/// The profile is taken from the descriptor's params. Without one, it is looked up through the
/// manager by the uuid in the URI.
pub struct JavaProfileLoader {
    fetcher: Arc<dyn Fetcher>,
}

impl JavaProfileLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

async fn profile_for<T: Resource>(
    manager: &ResourceManager,
    pattern: UriPattern,
    descriptor: &ResourceDescriptor<T>,
) -> Result<Arc<GameProfile>> {
    if let Some(profile) = descriptor.game_profile() {
        return Ok(profile.clone());
    }
    let identity = pattern
        .identity(descriptor.uri())
        .with_context(|| format!("Malformed Java profile uri {}", descriptor.uri()))?;
    let player_id = Uuid::parse_str(identity)?;
    let data = manager
        .get_or_load(&GameProfileDataType::minecraft_descriptor(&player_id))
        .await?;
    Ok(data.profile.clone())
}

fn skin_url(profile: &GameProfile) -> Result<String> {
    profile
        .textures()?
        .get(&TextureType::Skin)
        .map(|texture| texture.secure_url())
        .context("Game profile is missing skin uri")
}

impl ResourceLoader<PlayerSkin> for JavaProfileLoader {
    fn load(&self, manager: &ResourceManager, descriptor: ResourceDescriptor<PlayerSkin>) -> BoxFuture<'static, Result<PlayerSkin>> {
        let (manager, fetcher) = (manager.clone(), self.fetcher.clone());
        async move {
            let profile = profile_for(&manager, PlayerSkinType::JavaGameProfile.pattern(), &descriptor).await?;
            let url = skin_url(&profile)?;
            let skin_data = fetcher.fetch_image(&url).await?;
            Ok(PlayerSkin::new(descriptor.uri(), url, skin_data))
        }
        .boxed()
    }
}

impl ResourceLoader<Cape> for JavaProfileLoader {
    fn load(&self, manager: &ResourceManager, descriptor: ResourceDescriptor<Cape>) -> BoxFuture<'static, Result<Cape>> {
        let (manager, fetcher) = (manager.clone(), self.fetcher.clone());
        async move {
            let profile = profile_for(&manager, CapeType::JavaGameProfile.pattern(), &descriptor).await?;
            let url = profile
                .textures()?
                .get(&TextureType::Cape)
                .map(|texture| texture.secure_url())
                .context("Game profile is missing cape uri")?;
            let image = fetcher.fetch_image(&url).await?.to_image()?;
            Ok(Cape {
                resource_uri: descriptor.uri().to_string(),
                cape_id: url,
                cape_data: TextureData::from_image(scale_to_width(image, 64, 32)),
            })
        }
        .boxed()
    }
}

impl ResourceLoader<SkinGeometry> for JavaProfileLoader {
    fn load(&self, manager: &ResourceManager, descriptor: ResourceDescriptor<SkinGeometry>) -> BoxFuture<'static, Result<SkinGeometry>> {
        let manager = manager.clone();
        async move {
            let profile = profile_for(&manager, SkinGeometryType::JavaGameProfile.pattern(), &descriptor).await?;
            let texture = profile
                .textures()?
                .remove(&TextureType::Skin)
                .context("Game profile is missing skin uri")?;
            let kind = match texture.model() {
                TextureModel::Slim => SkinGeometryType::LegacySlim,
                TextureModel::Wide => SkinGeometryType::Legacy,
            };
            let name = kind
                .geometry_name()
                .with_context(|| format!("{kind:?} has no geometry name"))?;
            Ok(SkinGeometry::named(descriptor.uri(), name, ""))
        }
        .boxed()
    }
}

impl ResourceLoader<Skull> for JavaProfileLoader {
    fn load(&self, manager: &ResourceManager, descriptor: ResourceDescriptor<Skull>) -> BoxFuture<'static, Result<Skull>> {
        let (manager, fetcher) = (manager.clone(), self.fetcher.clone());
        async move {
            let profile = profile_for(&manager, SkullType::JavaGameProfile.pattern(), &descriptor).await?;
            let url = skin_url(&profile)?;
            let skull_data = fetcher.fetch_image(&url).await?;
            Ok(Skull {
                resource_uri: descriptor.uri().to_string(),
                skull_id: format!("{url}_skull"),
                skull_data,
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_profile::{TEXTURES_PROPERTY, encode_textures};
    use crate::player::PlayerEntity;
    use crate::resource::{GameProfileData, LoadParams};
    use crate::testing::{StaticFetcher, png};
    use std::time::Duration;

    const SKIN_URL: &str = "http://textures.minecraft.net/texture/5fe1";
    const CAPE_URL: &str = "http://textures.minecraft.net/texture/c4fe";

    fn manager() -> ResourceManager {
        ResourceManager::new(tokio::runtime::Handle::current(), Duration::from_secs(60))
    }

    fn fetcher() -> Arc<StaticFetcher> {
        Arc::new(
            StaticFetcher::new()
                .with("https://textures.minecraft.net/texture/5fe1", png(64, 64))
                .with("https://textures.minecraft.net/texture/c4fe", png(128, 64)),
        )
    }

    fn profile(model: TextureModel) -> Arc<GameProfile> {
        Arc::new(GameProfile::new(Uuid::new_v4(), "Notch").with_property(
            TEXTURES_PROPERTY,
            encode_textures(Some((SKIN_URL, model)), Some(CAPE_URL)),
        ))
    }

    #[tokio::test]
    async fn test_textures_from_profile_param() {
        let loader = JavaProfileLoader::new(fetcher());
        let manager = manager();
        let profile = profile(TextureModel::Slim);
        let player = PlayerEntity::new((*profile).clone(), 1);
        let params = LoadParams::GameProfile(profile);

        let skin = ResourceLoader::<PlayerSkin>::load(
            &loader,
            &manager,
            PlayerSkinType::JavaGameProfile.descriptor_with(&player, params.clone()),
        )
        .await
        .unwrap();
        assert_eq!(skin.skin_id, "https://textures.minecraft.net/texture/5fe1");

        let cape = ResourceLoader::<Cape>::load(
            &loader,
            &manager,
            CapeType::JavaGameProfile.descriptor_with(&player, params.clone()),
        )
        .await
        .unwrap();
        // 128 wide cape is halved into the 64x32 canvas
        assert_eq!((cape.cape_data.width, cape.cape_data.height), (64, 32));

        let geometry = ResourceLoader::<SkinGeometry>::load(
            &loader,
            &manager,
            SkinGeometryType::JavaGameProfile.descriptor_with(&player, params.clone()),
        )
        .await
        .unwrap();
        assert_eq!(geometry.name, "geometry.humanoid.customSlim");

        let skull = ResourceLoader::<Skull>::load(
            &loader,
            &manager,
            SkullType::JavaGameProfile.descriptor_with(&player, params),
        )
        .await
        .unwrap();
        assert_eq!(skull.skull_id, "https://textures.minecraft.net/texture/5fe1_skull");
    }

    #[tokio::test]
    async fn test_missing_skin() {
        let loader = JavaProfileLoader::new(fetcher());
        let profile = Arc::new(GameProfile::new(Uuid::new_v4(), "Bare"));
        let player = PlayerEntity::new((*profile).clone(), 1);
        let error = ResourceLoader::<PlayerSkin>::load(
            &loader,
            &manager(),
            PlayerSkinType::JavaGameProfile.descriptor_with(&player, LoadParams::GameProfile(profile)),
        )
        .await
        .unwrap_err();
        assert_eq!(error.to_string(), "Game profile is missing skin uri");
    }

    #[tokio::test]
    async fn test_profile_looked_up_without_params() {
        let loader = JavaProfileLoader::new(fetcher());
        let manager = manager();
        let profile = profile(TextureModel::Wide);
        manager.add(
            &GameProfileDataType::minecraft_descriptor(&profile.id),
            Ok(GameProfileData {
                resource_uri: GameProfileDataType::minecraft_descriptor(&profile.id).uri().to_string(),
                profile: profile.clone(),
            }),
        );
        let player = PlayerEntity::new((*profile).clone(), 1);

        let geometry = ResourceLoader::<SkinGeometry>::load(
            &loader,
            &manager,
            SkinGeometryType::JavaGameProfile.descriptor_for(&player),
        )
        .await
        .unwrap();
        assert_eq!(geometry.name, "geometry.humanoid.custom");
    }
}
