//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST
//! API. Services are generic over repository/provider traits, but AppState
//! pins them to the concrete infra implementations. Configuration and
//! secrets are resolved exactly once here and passed in explicitly.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use makementors_core::billing::service::BillingService;
use makementors_core::chat::service::ChatService;
use makementors_core::mentor::resolver::PersonaResolver;
use makementors_core::mentor::service::MentorService;
use makementors_core::relay::{RelayEngine, RelayOptions};
use makementors_infra::billing::stripe::StripeBillingProvider;
use makementors_infra::config::{load_config, resolve_data_dir, Secrets};
use makementors_infra::llm::openai_compat::config::OpenAiCompatConfig;
use makementors_infra::llm::openai_compat::OpenAiCompatibleProvider;
use makementors_infra::sqlite::chat::SqliteChatRepository;
use makementors_infra::sqlite::mentor::SqliteMentorRepository;
use makementors_infra::sqlite::pool::DatabasePool;
use makementors_infra::sqlite::subscriber::SqliteSubscriberRepository;
use makementors_infra::sqlite::template::SqliteTemplateCatalog;
use makementors_types::config::AppConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteMentorService = MentorService<SqliteTemplateCatalog, SqliteMentorRepository>;

pub type ConcreteChatService = ChatService<SqliteChatRepository>;

pub type ConcreteRelayEngine = RelayEngine<
    SqliteChatRepository,
    SqliteTemplateCatalog,
    SqliteMentorRepository,
    OpenAiCompatibleProvider,
>;

pub type ConcreteBillingService = BillingService<StripeBillingProvider, SqliteSubscriberRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub mentor_service: Arc<ConcreteMentorService>,
    pub chat_service: Arc<ConcreteChatService>,
    pub relay: Arc<ConcreteRelayEngine>,
    /// Present only when `STRIPE_SECRET_KEY` is configured.
    pub billing: Option<Arc<ConcreteBillingService>>,
    pub webhook_secret: Option<SecretString>,
    /// In-flight generation per session; a new send cancels and replaces
    /// the previous token (at most one generation per conversation).
    pub streams: Arc<DashMap<Uuid, CancellationToken>>,
    pub template_catalog: Arc<SqliteTemplateCatalog>,
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to DB, load config,
    /// resolve secrets, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        // Initialize database
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("makementors.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;

        let config = load_config(&data_dir).await;
        let secrets = Secrets::from_env();

        // Wire mentor service
        let mentor_service = MentorService::new(
            SqliteTemplateCatalog::new(db_pool.clone()),
            SqliteMentorRepository::new(db_pool.clone()),
        );

        // Wire chat service (handlers use it for reads; the relay owns its own)
        let chat_service = ChatService::new(SqliteChatRepository::new(db_pool.clone()));

        // Wire the relay engine. A missing API key still produces a working
        // engine: provider calls fail and surface as the fallback reply.
        let llm_api_key = match secrets.llm_api_key {
            Some(key) => key,
            None => {
                tracing::warn!(
                    "OPENAI_API_KEY not set; chat will answer with the fallback error reply"
                );
                SecretString::from("")
            }
        };
        let provider = OpenAiCompatibleProvider::new(OpenAiCompatConfig {
            provider_name: "openai".to_string(),
            base_url: config.llm.base_url.clone(),
            api_key: llm_api_key,
            model: config.llm.model.clone(),
        });
        let relay = RelayEngine::new(
            ChatService::new(SqliteChatRepository::new(db_pool.clone())),
            PersonaResolver::new(
                SqliteTemplateCatalog::new(db_pool.clone()),
                SqliteMentorRepository::new(db_pool.clone()),
            ),
            provider,
            RelayOptions {
                model: config.llm.model.clone(),
                max_tokens: config.llm.max_tokens,
                temperature: config.llm.temperature,
            },
        );

        // Wire billing only when the provider key is configured.
        let billing = secrets.stripe_secret_key.map(|key| {
            Arc::new(BillingService::new(
                StripeBillingProvider::new(key),
                SqliteSubscriberRepository::new(db_pool.clone()),
                config.billing.clone(),
            ))
        });

        Ok(Self {
            mentor_service: Arc::new(mentor_service),
            chat_service: Arc::new(chat_service),
            relay: Arc::new(relay),
            billing,
            webhook_secret: secrets.stripe_webhook_secret,
            streams: Arc::new(DashMap::new()),
            template_catalog: Arc::new(SqliteTemplateCatalog::new(db_pool.clone())),
            config,
            data_dir,
            db_pool,
        })
    }
}
