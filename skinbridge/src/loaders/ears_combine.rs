use crate::provider::{EarsType, PlayerSkinType, ProviderType};
use crate::resource::{PlayerSkin, ResourceDescriptor, ResourceLoader, ResourceManager};
use crate::texture::composite;
use anyhow::{Context, Result, bail, ensure};
use futures::FutureExt;
use futures::future::BoxFuture;

/// Draws third-party ears onto a Java profile skin
///
/// Needs [`crate::resource::LoadParams::EarsSkin`] naming the skin and the ears to merge.
#[derive(Debug, Default)]
pub struct EarsCombiningLoader;

impl ResourceLoader<PlayerSkin> for EarsCombiningLoader {
    fn load(&self, manager: &ResourceManager, descriptor: ResourceDescriptor<PlayerSkin>) -> BoxFuture<'static, Result<PlayerSkin>> {
        let manager = manager.clone();
        async move {
            let params = descriptor
                .ears_skin()
                .with_context(|| format!("{} needs a skin and ears to merge", descriptor.uri()))?
                .clone();
            if PlayerSkinType::from_uri(params.skin.uri()) != Some(PlayerSkinType::JavaGameProfile) {
                bail!("Ears can only be merged onto a Java profile skin, got {}", params.skin.uri());
            }
            if let Some(EarsType::None | EarsType::Deadmau5) = EarsType::from_uri(params.ears.uri()) {
                bail!("{} has no texture to merge", params.ears.uri());
            }

            let skin = manager.get_or_load(&params.skin).await?;
            let ears = manager.get_or_load(&params.ears).await?;
            ensure!(
                skin.skin_data.width == 64,
                "Ears need a 64 pixel wide skin, {} is {}",
                params.skin.uri(),
                skin.skin_data.width
            );
            Ok(PlayerSkin {
                resource_uri: descriptor.uri().to_string(),
                skin_data: composite(&skin.skin_data, &ears.ears_data, 24, 0)?,
                ..(*skin).clone()
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Ears, EarsSkinParams, LoadParams};
    use crate::texture::TextureData;
    use std::sync::Arc;
    use std::time::Duration;

    const SKIN: &str = "javaClientSkin:0f2e";
    const EARS: &str = "https://minecraftcapes.net/profile/0f2e/ears";

    fn manager() -> ResourceManager {
        ResourceManager::new(tokio::runtime::Handle::current(), Duration::from_secs(60))
    }

    fn merge_descriptor(skin: &str, ears: &str) -> ResourceDescriptor<PlayerSkin> {
        ResourceDescriptor::with_params(
            "javaClientSkinEars:0f2e",
            LoadParams::EarsSkin(Arc::new(EarsSkinParams {
                skin: ResourceDescriptor::new(skin),
                ears: ResourceDescriptor::new(ears),
            })),
        )
    }

    fn solid(width: u32, height: u32, pixel: [u8; 4]) -> TextureData {
        TextureData::new(pixel.repeat((width * height) as usize), width, height)
    }

    #[tokio::test]
    async fn test_ears_drawn_onto_skin() {
        let manager = manager();
        manager.add(
            &ResourceDescriptor::<PlayerSkin>::new(SKIN),
            Ok(PlayerSkin::new(SKIN, "java-skin", solid(64, 64, [0, 0, 255, 255]))),
        );
        manager.add(
            &ResourceDescriptor::<Ears>::new(EARS),
            Ok(Ears {
                resource_uri: EARS.to_string(),
                ears_data: solid(14, 7, [255, 0, 0, 255]),
            }),
        );

        let merged = EarsCombiningLoader
            .load(&manager, merge_descriptor(SKIN, EARS))
            .await
            .unwrap();
        assert_eq!(merged.skin_id, "java-skin");
        assert_eq!(merged.resource_uri, "javaClientSkinEars:0f2e");
        let image = merged.skin_data.to_image().unwrap();
        assert_eq!(image.get_pixel(24, 0).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 255, 255]);
    }

    #[tokio::test]
    async fn test_rejected_inputs() {
        let manager = manager();
        let deadmau5 = EarsCombiningLoader
            .load(&manager, merge_descriptor(SKIN, "ears:deadmau5"))
            .await;
        assert!(deadmau5.is_err());

        let bundled = EarsCombiningLoader
            .load(&manager, merge_descriptor("skin:bedrock/skin/skin_steve.png", EARS))
            .await;
        assert!(bundled.is_err());

        let no_params = EarsCombiningLoader
            .load(&manager, ResourceDescriptor::new("javaClientSkinEars:0f2e"))
            .await;
        assert!(no_params.is_err());

        manager.add(
            &ResourceDescriptor::<PlayerSkin>::new(SKIN),
            Ok(PlayerSkin::new(SKIN, "wide", solid(128, 128, [0, 0, 0, 255]))),
        );
        manager.add(
            &ResourceDescriptor::<Ears>::new(EARS),
            Ok(Ears {
                resource_uri: EARS.to_string(),
                ears_data: solid(14, 7, [255, 0, 0, 255]),
            }),
        );
        let too_wide = EarsCombiningLoader.load(&manager, merge_descriptor(SKIN, EARS)).await;
        assert!(too_wide.unwrap_err().to_string().contains("64 pixel wide"));
    }
}
