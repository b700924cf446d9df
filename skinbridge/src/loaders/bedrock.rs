use crate::provider::{CapeType, PlayerSkinType, ProviderType, SkinGeometryType};
use crate::resource::{
    Cape, PlayerSkin, ResourceDescriptor, ResourceLoader, ResourceManager, SkinGeometry, UriPattern,
};
use crate::session::{ClientAppearance, SessionDirectory};
use anyhow::{Context, Result, bail};
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use std::sync::Arc;
use uuid::Uuid;

/// Largest skin accepted while character creator skins are disabled
const MAX_CLASSIC_SKIN_BYTES: usize = 128 * 128 * 4;

/// Reads skins, capes and geometry out of a Bedrock session's client data
///
/// URIs have the form `<scheme>:<uuid>/<client id>`. A client id which no longer matches the
/// session's client data is stale and fails to load.
pub struct BedrockClientLoader {
    directory: Arc<dyn SessionDirectory>,
    allow_character_creator_skins: bool,
}

struct ClientRequest {
    player_id: Uuid,
    client_id: String,
    client_data: Arc<ClientAppearance>,
}

impl BedrockClientLoader {
    pub fn new(directory: Arc<dyn SessionDirectory>, allow_character_creator_skins: bool) -> Self {
        Self {
            directory,
            allow_character_creator_skins,
        }
    }

    fn request(&self, pattern: UriPattern, uri: &str) -> Result<ClientRequest> {
        let identity = pattern
            .identity(uri)
            .with_context(|| format!("Malformed Bedrock client uri {uri}"))?;
        let (player, client_id) = identity.split_once('/').unwrap_or((identity, ""));
        let player_id = Uuid::parse_str(player)?;
        let session = self
            .directory
            .find_by_player_id(&player_id)
            .with_context(|| format!("No Bedrock session for {player_id}"))?;
        let client_data = session
            .client_data()
            .with_context(|| format!("Bedrock session of {player_id} has no client data"))?;
        Ok(ClientRequest {
            player_id,
            client_id: client_id.to_string(),
            client_data,
        })
    }

    fn check_character_creator(&self, request: &ClientRequest) -> Result<()> {
        let client_data = &request.client_data;
        if !self.allow_character_creator_skins
            && (client_data.skin.data.len() > MAX_CLASSIC_SKIN_BYTES || client_data.persona)
        {
            bail!(
                "Bedrock skin of {} is a character creator skin, which is not allowed",
                request.player_id
            );
        }
        Ok(())
    }
}

fn ensure_current(request: &ClientRequest, current: &str) -> Result<()> {
    if request.client_id != current {
        bail!(
            "Client id {} of {} is stale, client now reports {current}",
            request.client_id,
            request.player_id
        );
    }
    Ok(())
}

impl ResourceLoader<PlayerSkin> for BedrockClientLoader {
    fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<PlayerSkin>) -> BoxFuture<'static, Result<PlayerSkin>> {
        let skin = (|| -> Result<PlayerSkin> {
            let request = self.request(PlayerSkinType::BedrockClientData.pattern(), descriptor.uri())?;
            let client_data = &request.client_data;
            ensure_current(&request, &client_data.skin_id)?;
            self.check_character_creator(&request)?;
            if client_data.skin.is_empty() {
                bail!("Bedrock client {} sent no skin", request.player_id);
            }
            Ok(PlayerSkin {
                resource_uri: descriptor.uri().to_string(),
                skin_id: client_data.skin_id.clone(),
                skin_data: client_data.skin.clone(),
                animations: client_data.animations.clone(),
                animation_data: client_data.animation_data.clone(),
                premium: client_data.premium,
                persona: client_data.persona,
                cape_on_classic: client_data.cape_on_classic,
                arm_size: client_data.arm_size.clone(),
                skin_color: client_data.skin_color.clone(),
                persona_pieces: client_data.persona_pieces.clone(),
                persona_tint_colors: client_data.persona_tint_colors.clone(),
            })
        })();
        future::ready(skin).boxed()
    }
}

impl ResourceLoader<Cape> for BedrockClientLoader {
    fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<Cape>) -> BoxFuture<'static, Result<Cape>> {
        let cape = (|| -> Result<Cape> {
            let request = self.request(CapeType::BedrockClientData.pattern(), descriptor.uri())?;
            ensure_current(&request, &request.client_data.cape_id)?;
            Ok(Cape {
                resource_uri: descriptor.uri().to_string(),
                cape_id: request.client_data.cape_id.clone(),
                cape_data: request.client_data.cape.clone(),
            })
        })();
        future::ready(cape).boxed()
    }
}

impl ResourceLoader<SkinGeometry> for BedrockClientLoader {
    fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<SkinGeometry>) -> BoxFuture<'static, Result<SkinGeometry>> {
        let geometry = (|| -> Result<SkinGeometry> {
            let request = self.request(SkinGeometryType::BedrockClientData.pattern(), descriptor.uri())?;
            ensure_current(&request, &request.client_data.skin_id)?;
            self.check_character_creator(&request)?;
            SkinGeometry::from_patch(
                descriptor.uri(),
                request.client_data.decoded_resource_patch()?,
                request.client_data.decoded_geometry_data()?,
            )
        })();
        future::ready(geometry).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerEntity;
    use crate::testing::{StaticDirectory, bedrock_player, client_appearance};
    use crate::texture::TextureData;
    use std::time::Duration;

    fn manager() -> ResourceManager {
        ResourceManager::new(tokio::runtime::Handle::current(), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_loads_current_client_data() {
        let directory = StaticDirectory::new();
        let (player, _session) = bedrock_player(&directory, "Bedrocker", client_appearance("custom-skin", 64));
        let loader = BedrockClientLoader::new(Arc::new(directory), false);
        let manager = manager();

        let skin = ResourceLoader::<PlayerSkin>::load(
            &loader,
            &manager,
            PlayerSkinType::BedrockClientData.descriptor_for(&player),
        )
        .await
        .unwrap();
        assert_eq!(skin.skin_id, "custom-skin");

        let geometry = ResourceLoader::<SkinGeometry>::load(
            &loader,
            &manager,
            SkinGeometryType::BedrockClientData.descriptor_for(&player),
        )
        .await
        .unwrap();
        assert_eq!(geometry.name, "geometry.humanoid.custom");
    }

    #[tokio::test]
    async fn test_stale_skin_id_fails() {
        let directory = StaticDirectory::new();
        let (player, _session) = bedrock_player(&directory, "Bedrocker", client_appearance("old-skin", 64));
        let stale = PlayerEntity {
            bedrock_skin_id: Some("older-skin".to_string()),
            ..player
        };
        let loader = BedrockClientLoader::new(Arc::new(directory), false);

        let result = ResourceLoader::<PlayerSkin>::load(
            &loader,
            &manager(),
            PlayerSkinType::BedrockClientData.descriptor_for(&stale),
        )
        .await;
        assert!(result.unwrap_err().to_string().contains("stale"));
    }

    #[tokio::test]
    async fn test_character_creator_skins() {
        let directory = Arc::new(StaticDirectory::new());
        let mut appearance = client_appearance("persona-skin", 64);
        appearance.skin = TextureData::new(vec![0u8; 256 * 256 * 4], 256, 256);
        let (player, _session) = bedrock_player(&directory, "Persona", appearance);
        let manager = manager();

        let strict = BedrockClientLoader::new(directory.clone(), false);
        let descriptor = SkinGeometryType::BedrockClientData.descriptor_for(&player);
        assert!(ResourceLoader::<SkinGeometry>::load(&strict, &manager, descriptor.clone()).await.is_err());
        assert!(
            ResourceLoader::<PlayerSkin>::load(&strict, &manager, PlayerSkinType::BedrockClientData.descriptor_for(&player))
                .await
                .is_err()
        );

        let lenient = BedrockClientLoader::new(directory, true);
        assert!(ResourceLoader::<SkinGeometry>::load(&lenient, &manager, descriptor).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let loader = BedrockClientLoader::new(Arc::new(StaticDirectory::new()), false);
        let descriptor = ResourceDescriptor::<Cape>::new(format!("bedrockClientCape:{}/", Uuid::new_v4()));
        let error = ResourceLoader::<Cape>::load(&loader, &manager(), descriptor).await.unwrap_err();
        assert!(error.to_string().contains("No Bedrock session"));
    }
}
