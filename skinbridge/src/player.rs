use crate::game_profile::{GameProfile, TextureModel};
use crate::session::ClientAppearance;
use std::sync::Arc;
use uuid::Uuid;

/// Snapshot of a player as seen by the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEntity {
    pub uuid: Uuid,
    pub username: String,
    /// Bedrock-side runtime entity id
    pub entity_id: i64,
    pub profile: Arc<GameProfile>,
    pub in_player_list: bool,
    pub slim: bool,
    /// Client reported ids of a Bedrock player, used for composite cache identities
    pub bedrock_skin_id: Option<String>,
    pub bedrock_cape_id: Option<String>,
}

impl PlayerEntity {
    pub fn new(profile: GameProfile, entity_id: i64) -> Self {
        let slim = match profile.skin_model() {
            Some(model) => model == TextureModel::Slim,
            None => slim_by_default(&profile.id),
        };
        Self {
            uuid: profile.id,
            username: profile.name.clone(),
            entity_id,
            profile: Arc::new(profile),
            in_player_list: true,
            slim,
            bedrock_skin_id: None,
            bedrock_cape_id: None,
        }
    }

    pub fn with_player_list(mut self, in_player_list: bool) -> Self {
        self.in_player_list = in_player_list;
        self
    }

    pub fn with_slim(mut self, slim: bool) -> Self {
        self.slim = slim;
        self
    }

    /// Copies the skin and cape ids out of Bedrock client data
    pub fn with_client_data(mut self, client_data: &ClientAppearance) -> Self {
        self.bedrock_skin_id = Some(client_data.skin_id.clone());
        self.bedrock_cape_id = Some(client_data.cape_id.clone());
        self
    }

    pub fn with_profile(mut self, profile: GameProfile) -> Self {
        self.profile = Arc::new(profile);
        self
    }
}

/// Default model for players without a skin, matching the Java client's choice from the uuid
/// hash. An odd hash selects the slim model.
pub fn slim_by_default(uuid: &Uuid) -> bool {
    let (most, least) = uuid.as_u64_pair();
    let hilo = most ^ least;
    let hash = ((hilo >> 32) as i32) ^ (hilo as i32);
    hash & 1 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_profile::{TEXTURES_PROPERTY, encode_textures};

    #[test]
    fn test_slim_by_default_uses_hash_parity() {
        assert!(slim_by_default(&Uuid::from_u64_pair(0, 1)));
        assert!(!slim_by_default(&Uuid::from_u64_pair(0, 2)));
        // bits from both halves fold together
        assert!(!slim_by_default(&Uuid::from_u64_pair(1, 1)));
        assert!(slim_by_default(&Uuid::from_u64_pair(1 << 32, 0)));
    }

    #[test]
    fn test_profile_model_wins_over_hash() {
        let id = Uuid::from_u64_pair(0, 2);
        let profile = GameProfile::new(id, "slimjim").with_property(
            TEXTURES_PROPERTY,
            encode_textures(
                Some(("http://textures.minecraft.net/texture/abc", TextureModel::Slim)),
                None,
            ),
        );
        assert!(PlayerEntity::new(profile, 1).slim);
        assert!(!PlayerEntity::new(GameProfile::new(id, "plain"), 1).slim);
    }
}
