use crate::assets;
use crate::provider::{PlayerSkinType, ProviderType, SkinGeometryType, SkullType};
use crate::resource::{
    PlayerSkin, ResourceDescriptor, ResourceLoader, ResourceManager, SkinGeometry, Skull,
};
use crate::texture::TextureData;
use anyhow::{Context, Result, bail};
use futures::FutureExt;
use futures::future::{self, BoxFuture};

/// Serves the bundled default skins, skulls and geometries
#[derive(Debug, Default)]
pub struct InternalLoader;

fn bundled_texture(uri: &str) -> Result<TextureData> {
    let path = uri
        .strip_prefix("skin:")
        .with_context(|| format!("Not a bundled skin: {uri}"))?;
    TextureData::decode(assets::bundled(path)?)
}

impl ResourceLoader<PlayerSkin> for InternalLoader {
    fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<PlayerSkin>) -> BoxFuture<'static, Result<PlayerSkin>> {
        let skin = (|| -> Result<PlayerSkin> {
            let uri = descriptor.uri();
            let (skin_id, arm_size) = match PlayerSkinType::from_uri(uri) {
                Some(PlayerSkinType::DefaultSteve) => ("steve", "wide"),
                Some(PlayerSkinType::DefaultAlex) => ("alex", "slim"),
                other => bail!("{uri} is not a bundled skin ({other:?})"),
            };
            Ok(PlayerSkin {
                arm_size: arm_size.to_string(),
                ..PlayerSkin::new(uri, skin_id, bundled_texture(uri)?)
            })
        })();
        future::ready(skin).boxed()
    }
}

impl ResourceLoader<Skull> for InternalLoader {
    fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<Skull>) -> BoxFuture<'static, Result<Skull>> {
        let skull = (|| -> Result<Skull> {
            let uri = descriptor.uri();
            let skull_id = match SkullType::from_uri(uri) {
                Some(SkullType::DefaultSteve) => "steve",
                Some(SkullType::DefaultAlex) => "alex",
                other => bail!("{uri} is not a bundled skull ({other:?})"),
            };
            Ok(Skull {
                resource_uri: uri.to_string(),
                skull_id: skull_id.to_string(),
                skull_data: bundled_texture(uri)?,
            })
        })();
        future::ready(skull).boxed()
    }
}

impl ResourceLoader<SkinGeometry> for InternalLoader {
    fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<SkinGeometry>) -> BoxFuture<'static, Result<SkinGeometry>> {
        let geometry = (|| -> Result<SkinGeometry> {
            let uri = descriptor.uri();
            let Some(kind) = SkinGeometryType::from_uri(uri) else {
                bail!("Unknown skin geometry uri {uri}");
            };
            let name = kind
                .geometry_name()
                .with_context(|| format!("{kind:?} is not a bundled geometry"))?;
            match kind {
                // built into the client, only the name is needed
                SkinGeometryType::Legacy | SkinGeometryType::LegacySlim => Ok(SkinGeometry::named(uri, name, "")),
                SkinGeometryType::Ears | SkinGeometryType::EarsSlim | SkinGeometryType::CustomSkull => {
                    let data = assets::bundled(&format!("bedrock/skin/{name}.json"))?;
                    Ok(SkinGeometry::named(uri, name, std::str::from_utf8(data)?))
                }
                other => bail!("{other:?} is not a bundled geometry"),
            }
        })();
        future::ready(geometry).boxed()
    }
}
