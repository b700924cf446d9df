use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub const TEXTURES_PROPERTY: &str = "textures";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileProperty {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// A Java edition game profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProfile {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub properties: Vec<ProfileProperty>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TextureType {
    Skin,
    Cape,
    Elytra,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TextureModel {
    #[default]
    Wide,
    Slim,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Texture {
    pub url: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl Texture {
    pub fn model(&self) -> TextureModel {
        match self.metadata.get("model").map(String::as_str) {
            Some("slim") => TextureModel::Slim,
            _ => TextureModel::Wide,
        }
    }

    /// Texture URL with plain http upgraded to https
    pub fn secure_url(&self) -> String {
        match self.url.strip_prefix("http://") {
            Some(rest) => format!("https://{rest}"),
            None => self.url.clone(),
        }
    }

    /// Last path segment of the URL, ignoring trailing slashes
    pub fn texture_id(&self) -> Option<&str> {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct TexturesPayload {
    #[serde(default)]
    textures: HashMap<TextureType, Texture>,
}

impl GameProfile {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(ProfileProperty {
            name: name.into(),
            value: value.into(),
            signature: None,
        });
        self
    }

    pub fn property(&self, name: &str) -> Option<&ProfileProperty> {
        self.properties.iter().find(|property| property.name == name)
    }

    /// Decodes the base64 `textures` property. A profile without one has no textures.
    pub fn textures(&self) -> Result<HashMap<TextureType, Texture>> {
        let Some(property) = self.property(TEXTURES_PROPERTY) else {
            return Ok(HashMap::new());
        };
        let decoded = STANDARD
            .decode(property.value.trim())
            .context("Textures property is not valid base64")?;
        let payload: TexturesPayload =
            serde_json::from_slice(&decoded).context("Textures property is not valid JSON")?;
        Ok(payload.textures)
    }

    pub fn texture(&self, texture_type: TextureType) -> Option<Texture> {
        self.textures().ok()?.remove(&texture_type)
    }

    pub fn texture_id(&self, texture_type: TextureType) -> Option<String> {
        self.texture(texture_type)
            .and_then(|texture| texture.texture_id().map(str::to_string))
    }

    pub fn skin_model(&self) -> Option<TextureModel> {
        self.texture(TextureType::Skin).map(|texture| texture.model())
    }
}

/// Builds a `textures` property value the way the session server encodes it
pub fn encode_textures(skin: Option<(&str, TextureModel)>, cape: Option<&str>) -> String {
    let mut textures = serde_json::Map::new();
    if let Some((url, model)) = skin {
        let mut skin = serde_json::json!({ "url": url });
        if model == TextureModel::Slim {
            skin["metadata"] = serde_json::json!({ "model": "slim" });
        }
        textures.insert("SKIN".to_string(), skin);
    }
    if let Some(url) = cape {
        textures.insert("CAPE".to_string(), serde_json::json!({ "url": url }));
    }
    STANDARD.encode(serde_json::json!({ "textures": textures }).to_string())
}
