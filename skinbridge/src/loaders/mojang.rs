use crate::fetch::Fetcher;
use crate::game_profile::GameProfile;
use crate::provider::{GameProfileDataType, ProviderType};
use crate::resource::{GameProfileData, ResourceDescriptor, ResourceLoader, ResourceManager};
use anyhow::{Context, Result, ensure};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Fetches signed game profiles from the session server
pub struct MojangProfileLoader {
    fetcher: Arc<dyn Fetcher>,
    session_server: String,
}

impl MojangProfileLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>, session_server: impl Into<String>) -> Self {
        Self {
            fetcher,
            session_server: session_server.into(),
        }
    }

    fn profile_url(&self, player_id: &str) -> String {
        format!(
            "{}/session/minecraft/profile/{player_id}",
            self.session_server.trim_end_matches('/')
        )
    }
}

impl ResourceLoader<GameProfileData> for MojangProfileLoader {
    fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<GameProfileData>) -> BoxFuture<'static, Result<GameProfileData>> {
        let fetcher = self.fetcher.clone();
        let url = GameProfileDataType::Minecraft
            .pattern()
            .identity(descriptor.uri())
            .map(|player_id| self.profile_url(player_id))
            .with_context(|| format!("Malformed game profile uri {}", descriptor.uri()));
        async move {
            let url = url?;
            let body: serde_json::Value = fetcher.fetch_json(&url).await?;
            ensure!(
                body.get("properties").and_then(|p| p.as_array()).is_some_and(|p| !p.is_empty()),
                "Game profile from {url} has no properties"
            );
            let profile: GameProfile = serde_json::from_value(body)
                .with_context(|| format!("Unexpected game profile from {url}"))?;
            tracing::debug!("Fetched game profile of {} ({})", profile.name, profile.id);
            Ok(GameProfileData {
                resource_uri: descriptor.uri().to_string(),
                profile: Arc::new(profile),
            })
        }
        .boxed()
    }
}
