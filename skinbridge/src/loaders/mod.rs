//! Loaders bound to the provider catalogue
//!
//! One instance of each loader is built at startup and shared by every provider it serves.

mod bedrock;
mod ears_combine;
mod fivezig;
mod internal;
mod java_profile;
mod mojang;
mod noop;
mod url;

pub use bedrock::BedrockClientLoader;
pub use ears_combine::EarsCombiningLoader;
pub use fivezig::FiveZigCapeLoader;
pub use internal::InternalLoader;
pub use java_profile::JavaProfileLoader;
pub use mojang::MojangProfileLoader;
pub use noop::NoopLoader;
pub use url::UrlLoader;

use crate::config::SkinConfig;
use crate::fetch::Fetcher;
use crate::session::SessionDirectory;
use std::sync::Arc;

/// Loader instances shared by the provider tables
#[derive(Clone)]
pub struct LoaderSet {
    pub internal: Arc<InternalLoader>,
    pub bedrock: Arc<BedrockClientLoader>,
    pub java_profile: Arc<JavaProfileLoader>,
    pub url: Arc<UrlLoader>,
    pub fivezig: Arc<FiveZigCapeLoader>,
    pub ears_combine: Arc<EarsCombiningLoader>,
    pub noop: Arc<NoopLoader>,
    pub mojang: Arc<MojangProfileLoader>,
}

impl LoaderSet {
    pub fn new(config: &SkinConfig, fetcher: Arc<dyn Fetcher>, directory: Arc<dyn SessionDirectory>) -> Self {
        Self {
            internal: Arc::new(InternalLoader),
            bedrock: Arc::new(BedrockClientLoader::new(
                directory,
                config.allow_bedrock_character_creator_skins,
            )),
            java_profile: Arc::new(JavaProfileLoader::new(fetcher.clone())),
            url: Arc::new(UrlLoader::new(fetcher.clone())),
            fivezig: Arc::new(FiveZigCapeLoader::new(fetcher.clone())),
            ears_combine: Arc::new(EarsCombiningLoader),
            noop: Arc::new(NoopLoader),
            mojang: Arc::new(MojangProfileLoader::new(fetcher, config.session_server.clone())),
        }
    }
}
