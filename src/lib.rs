#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::database::DbPool;
use crate::adapters::database::match_repo::MatchRepository;
use crate::adapters::database::message_repo::MessageRepository;
use crate::adapters::database::swipe_repo::SwipeRepository;
use crate::adapters::database::user_repo::UserRepository;
use crate::api::ServiceContainer;
use crate::config::Config;
use crate::services::block_service::BlockService;
use crate::services::conversation_service::ConversationService;
use crate::services::gateway::GatewayService;
use crate::services::health_service::HealthService;
use crate::services::hub::RealtimeHub;
use crate::services::identity_service::IdentityService;
use crate::services::match_service::MatchService;
use crate::services::message_service::MessageService;
use crate::services::presence::{LocalPresence, PresenceService};
use crate::services::swipe_service::SwipeService;
use std::sync::Arc;
use tokio::sync::watch;

/// The wired application: request-facing services plus the health service for the
/// management listener.
#[derive(Debug)]
pub struct App {
    pub services: ServiceContainer,
    pub health_service: HealthService,
}

/// Assembles services from their infrastructure dependencies.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    pool: Option<DbPool>,
    presence: Option<Arc<dyn PresenceService>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, pool: None, presence: None }
    }

    #[must_use]
    pub fn with_database(mut self, pool: DbPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Overrides the presence registry. Defaults to [`LocalPresence`].
    #[must_use]
    pub fn with_presence(mut self, presence: Arc<dyn PresenceService>) -> Self {
        self.presence = Some(presence);
        self
    }

    /// Wires every service.
    ///
    /// # Errors
    /// Returns an error if no database pool was provided.
    pub fn build(self) -> anyhow::Result<App> {
        let pool = self.pool.ok_or_else(|| anyhow::anyhow!("Database pool is required"))?;
        let presence = self.presence.unwrap_or_else(|| Arc::new(LocalPresence::new()));
        let config = self.config;

        let user_repo = UserRepository::new();
        let swipe_repo = SwipeRepository::new();
        let match_repo = MatchRepository::new();
        let message_repo = MessageRepository::new();

        let hub = RealtimeHub::new(presence, config.websocket.outbound_buffer_size);

        let identity_service = IdentityService::new(pool.clone(), user_repo.clone(), config.auth.clone());
        let match_service =
            MatchService::new(pool.clone(), match_repo.clone(), swipe_repo.clone(), user_repo.clone());
        let swipe_service = SwipeService::new(
            pool.clone(),
            swipe_repo,
            user_repo.clone(),
            match_service.clone(),
            config.swipes.clone(),
        );
        let message_service = MessageService::new(
            pool.clone(),
            message_repo,
            match_repo.clone(),
            user_repo.clone(),
            hub.clone(),
            config.chat.clone(),
        );
        let conversation_service = ConversationService::new(pool.clone(), match_repo);
        let block_service = BlockService::new(pool.clone(), user_repo, match_service.clone());
        let gateway_service = GatewayService::new(
            identity_service.clone(),
            match_service.clone(),
            message_service.clone(),
            hub,
            config.websocket.clone(),
        );
        let health_service = HealthService::new(pool, config.health.clone());

        Ok(App {
            services: ServiceContainer {
                identity_service,
                swipe_service,
                match_service,
                message_service,
                conversation_service,
                block_service,
                gateway_service,
                health_service: health_service.clone(),
            },
            health_service,
        })
    }
}

/// Applies pending schema migrations.
///
/// # Errors
/// Returns an error if a migration fails.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Flips `shutdown_tx` on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received, draining connections");
        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through `tracing` before the default hook prints them.
pub fn setup_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info.location().map(ToString::to_string).unwrap_or_default();
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_default();
        tracing::error!(panic.location = %location, panic.payload = %payload, "Thread panicked");
        default_hook(info);
    }));
}
