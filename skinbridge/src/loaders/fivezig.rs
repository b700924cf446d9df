use crate::fetch::Fetcher;
use crate::provider::{CapeType, ProviderType};
use crate::resource::{Cape, ResourceDescriptor, ResourceLoader, ResourceManager};
use crate::texture::{TextureData, scale_to_width};
use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;
use std::sync::Arc;

/// 5zig profile response, `d` holds the cape as a base64 PNG
#[derive(Debug, Deserialize)]
struct FiveZigProfile {
    d: Option<String>,
}

pub struct FiveZigCapeLoader {
    fetcher: Arc<dyn Fetcher>,
}

impl FiveZigCapeLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

impl ResourceLoader<Cape> for FiveZigCapeLoader {
    fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<Cape>) -> BoxFuture<'static, Result<Cape>> {
        let fetcher = self.fetcher.clone();
        async move {
            let uri = descriptor.uri();
            let profile: FiveZigProfile = fetcher.fetch_json(uri).await?;
            let encoded = profile
                .d
                .filter(|d| !d.is_empty())
                .with_context(|| format!("5zig profile {uri} has no cape"))?;
            let png = STANDARD.decode(encoded.trim())?;
            let image = fetcher.decode_image(&png)?.to_image()?;
            Ok(Cape {
                resource_uri: uri.to_string(),
                cape_id: CapeType::FiveZig.cape_id_for(uri),
                cape_data: TextureData::from_image(scale_to_width(image, 64, 32)),
            })
        }
        .boxed()
    }
}
