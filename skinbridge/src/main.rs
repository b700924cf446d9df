use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dashmap::DashMap;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use skinbridge::player_list::PlayerListPacket;
use skinbridge::prelude::*;

#[derive(Parser)]
#[command(name = "skinbridge")]
#[command(about = "Resolves the appearance of a Java player as a Bedrock viewer would see it", long_about = None)]
struct Cli {
    /// TOML config, defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Player to resolve
    #[arg(short, long, default_value = "Steve")]
    name: String,

    /// Fetch the player's profile from the session server instead of using an offline one
    #[arg(short, long)]
    uuid: Option<Uuid>,
}

/// Viewer which logs everything it is sent
struct LoggingViewer {
    player_id: Uuid,
}

impl Session for LoggingViewer {
    fn player_id(&self) -> Uuid {
        self.player_id
    }

    fn auth_uuid(&self) -> Uuid {
        self.player_id
    }

    fn xuid(&self) -> String {
        String::new()
    }

    fn entity_id(&self) -> i64 {
        1
    }

    fn client_data(&self) -> Option<Arc<ClientAppearance>> {
        None
    }

    fn update_client_data(&self, _: ClientAppearance) {}

    fn is_initialized(&self) -> bool {
        true
    }

    fn send_packet(&self, packet: OutboundPacket) {
        match packet {
            OutboundPacket::PlayerList(PlayerListPacket::Add(entries)) => {
                for entry in entries {
                    tracing::info!(
                        "Add {} ({}): skin {} {}x{}, cape {:?}, geometry {}",
                        entry.name,
                        entry.uuid,
                        entry.skin.skin_id,
                        entry.skin.skin.width,
                        entry.skin.skin.height,
                        entry.skin.cape_id,
                        entry.skin.resource_patch
                    );
                }
            }
            OutboundPacket::PlayerList(PlayerListPacket::Remove(uuids)) => tracing::info!("Remove {uuids:?}"),
            OutboundPacket::Settings(settings) => tracing::info!("Settings {settings:?}"),
        }
    }

    fn adventure_settings(&self, _: i64) -> Option<SettingsPacket> {
        None
    }
}

#[derive(Default)]
struct LocalDirectory {
    sessions: DashMap<Uuid, Arc<dyn Session>>,
}

impl SessionDirectory for LocalDirectory {
    fn find_by_player_id(&self, player_id: &Uuid) -> Option<Arc<dyn Session>> {
        self.sessions.get(player_id).map(|session| session.clone())
    }
}

async fn run(cli: Cli, runtime: tokio::runtime::Handle) -> Result<()> {
    let config = match &cli.config {
        Some(path) => SkinConfig::from_path(path)?,
        None => SkinConfig::default(),
    };
    let directory = Arc::new(LocalDirectory::default());
    let service = AppearanceService::start(config, runtime, directory.clone()).await?;

    let viewer: Arc<dyn Session> = Arc::new(LoggingViewer {
        player_id: Uuid::new_v4(),
    });
    directory.sessions.insert(viewer.player_id(), viewer.clone());
    service.connect_viewer(viewer);

    let profile = match cli.uuid {
        Some(uuid) => (*service.resolver().refresh_game_profile(&uuid).await?).clone(),
        None => GameProfile::new(Uuid::new_v4(), cli.name),
    };
    let player = PlayerEntity::new(profile, 2);
    tracing::info!("{} joins the player list", player.username);
    service.on_player_joined_list(&player);

    let profile = service.resolver().refresh_player_skins(&player).await;
    tracing::info!(
        "Settled on skin {}, cape {}, geometry {}",
        profile.skin.uri(),
        profile.cape.uri(),
        profile.geometry.uri()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let handle = runtime.handle().clone();
    runtime.block_on(run(cli, handle))
}
