use crate::fetch::Fetcher;
use crate::provider::{CapeType, ProviderType};
use crate::resource::{Cape, Ears, PlayerSkin, ResourceDescriptor, ResourceLoader, ResourceManager, Skull};
use crate::texture::{TextureData, scale_to_width};
use anyhow::Result;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Downloads textures straight from the descriptor's URI
pub struct UrlLoader {
    fetcher: Arc<dyn Fetcher>,
}

impl UrlLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

impl ResourceLoader<PlayerSkin> for UrlLoader {
    fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<PlayerSkin>) -> BoxFuture<'static, Result<PlayerSkin>> {
        let fetcher = self.fetcher.clone();
        async move {
            let uri = descriptor.uri();
            let skin_data = fetcher.fetch_image(uri).await?;
            Ok(PlayerSkin::new(uri, uri, skin_data))
        }
        .boxed()
    }
}

impl ResourceLoader<Cape> for UrlLoader {
    fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<Cape>) -> BoxFuture<'static, Result<Cape>> {
        let fetcher = self.fetcher.clone();
        async move {
            let uri = descriptor.uri();
            let image = fetcher.fetch_image(uri).await?.to_image()?;
            let cape_id = match CapeType::from_uri(uri) {
                Some(kind) => kind.cape_id_for(uri),
                None => uri.to_string(),
            };
            Ok(Cape {
                resource_uri: uri.to_string(),
                cape_id,
                cape_data: TextureData::from_image(scale_to_width(image, 64, 32)),
            })
        }
        .boxed()
    }
}

impl ResourceLoader<Ears> for UrlLoader {
    fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<Ears>) -> BoxFuture<'static, Result<Ears>> {
        let fetcher = self.fetcher.clone();
        async move {
            let ears_data = fetcher.fetch_image(descriptor.uri()).await?;
            Ok(Ears {
                resource_uri: descriptor.uri().to_string(),
                ears_data,
            })
        }
        .boxed()
    }
}

impl ResourceLoader<Skull> for UrlLoader {
    fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<Skull>) -> BoxFuture<'static, Result<Skull>> {
        let fetcher = self.fetcher.clone();
        async move {
            let uri = descriptor.uri();
            let skull_data = fetcher.fetch_image(uri).await?;
            Ok(Skull {
                resource_uri: uri.to_string(),
                skull_id: format!("{uri}_skull"),
                skull_data,
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StaticFetcher, png};
    use std::time::Duration;

    fn manager() -> ResourceManager {
        ResourceManager::new(tokio::runtime::Handle::current(), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_cape_is_scaled_and_named() {
        let uri = "https://minecraftcapes.net/profile/0f2e/cape";
        let loader = UrlLoader::new(Arc::new(StaticFetcher::new().with(uri, png(256, 128))));
        let cape = ResourceLoader::<Cape>::load(&loader, &manager(), ResourceDescriptor::new(uri))
            .await
            .unwrap();
        assert_eq!(cape.cape_id, "0f2e");
        assert_eq!((cape.cape_data.width, cape.cape_data.height), (64, 32));
    }

    #[tokio::test]
    async fn test_skull_id() {
        let uri = "https://textures.minecraft.net/texture/ab12";
        let loader = UrlLoader::new(Arc::new(StaticFetcher::new().with(uri, png(64, 64))));
        let skull = ResourceLoader::<Skull>::load(&loader, &manager(), ResourceDescriptor::new(uri))
            .await
            .unwrap();
        assert_eq!(skull.skull_id, "https://textures.minecraft.net/texture/ab12_skull");
    }

    #[tokio::test]
    async fn test_missing_image_fails() {
        let loader = UrlLoader::new(Arc::new(StaticFetcher::new()));
        let ears = ResourceLoader::<Ears>::load(
            &loader,
            &manager(),
            ResourceDescriptor::new("https://minecraftcapes.net/profile/0f2e/ears"),
        )
        .await;
        assert!(ears.is_err());
    }
}
