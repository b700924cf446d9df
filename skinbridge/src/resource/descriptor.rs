use super::Resource;
use super::types::{Ears, PlayerSkin};
use crate::game_profile::GameProfile;
use derivative::Derivative;
use std::any::TypeId;
use std::marker::PhantomData;
use std::sync::Arc;

/// Extra input a loader may need beyond the URI
#[derive(Debug, Clone, Default)]
pub enum LoadParams {
    #[default]
    None,
    GameProfile(Arc<GameProfile>),
    EarsSkin(Arc<EarsSkinParams>),
}

/// Skin and ears to merge into one texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarsSkinParams {
    pub skin: ResourceDescriptor<PlayerSkin>,
    pub ears: ResourceDescriptor<Ears>,
}

/// Key of a resource: its URI and the type it loads as
///
/// Params are carried along for the loader but never take part in equality or hashing.
#[derive(Derivative)]
#[derivative(
    Debug(bound = ""),
    Clone(bound = ""),
    PartialEq(bound = ""),
    Eq(bound = ""),
    Hash(bound = "")
)]
pub struct ResourceDescriptor<T> {
    uri: String,
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    params: LoadParams,
    #[derivative(Debug = "ignore")]
    _marker: PhantomData<fn() -> T>,
}

/// Type erased [`ResourceDescriptor`] identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorKey {
    pub type_id: TypeId,
    pub uri: String,
}

impl<T: Resource> ResourceDescriptor<T> {
    pub fn new(uri: impl Into<String>) -> Self {
        Self::with_params(uri, LoadParams::None)
    }

    pub fn with_params(uri: impl Into<String>, params: LoadParams) -> Self {
        Self {
            uri: uri.into(),
            params,
            _marker: PhantomData,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn params(&self) -> &LoadParams {
        &self.params
    }

    /// A blank URI never resolves to anything
    pub fn is_null(&self) -> bool {
        self.uri.trim().is_empty()
    }

    pub fn game_profile(&self) -> Option<&Arc<GameProfile>> {
        match &self.params {
            LoadParams::GameProfile(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn ears_skin(&self) -> Option<&EarsSkinParams> {
        match &self.params {
            LoadParams::EarsSkin(params) => Some(params),
            _ => None,
        }
    }

    pub fn key(&self) -> DescriptorKey {
        DescriptorKey {
            type_id: TypeId::of::<T>(),
            uri: self.uri.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::types::Cape;
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn test_params_do_not_affect_identity() {
        let profile = Arc::new(GameProfile::new(Uuid::new_v4(), "steve"));
        let plain = ResourceDescriptor::<PlayerSkin>::new("javaClientSkin:abc");
        let with_profile = ResourceDescriptor::<PlayerSkin>::with_params(
            "javaClientSkin:abc",
            LoadParams::GameProfile(profile),
        );
        assert_eq!(plain, with_profile);

        let mut set = HashSet::new();
        set.insert(plain);
        assert!(!set.insert(with_profile));
    }

    #[test]
    fn test_type_is_part_of_key() {
        let skin = ResourceDescriptor::<PlayerSkin>::new("https://textures.minecraft.net/texture/a");
        let cape = ResourceDescriptor::<Cape>::new("https://textures.minecraft.net/texture/a");
        assert_ne!(skin.key(), cape.key());
    }

    #[test]
    fn test_is_null() {
        assert!(ResourceDescriptor::<Cape>::new("  ").is_null());
        assert!(!ResourceDescriptor::<Cape>::new("cape:none").is_null());
    }
}
