use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::db::DbService;
use crate::db::repository::{BookRepository, UserRepository};
use crate::orders::{OrderService, PaymentGateways};
use crate::services::bootstrap;
use crate::services::{BlobStore, ChatService, LocalBlobStore, ReviewService, StatsService};

/// Server state - shared handles to every service
///
/// Cloning is cheap: the database handle and services are reference
/// counted internally.
///
/// | Field | Type | Notes |
/// |-------|------|-------|
/// | config | Config | immutable |
/// | db | Surreal<Db> | embedded database |
/// | jwt_service | Arc<JwtService> | token issue / validation |
/// | orders | OrderService | checkout and status changes |
/// | reviews | ReviewService | reviews and rating aggregates |
/// | chats | ChatService | buyer-seller threads |
/// | stats | StatsService | admin rollups |
/// | blobs | Arc<dyn BlobStore> | uploaded images |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    pub orders: OrderService,
    pub reviews: ReviewService,
    pub chats: ChatService,
    pub stats: StatsService,
    pub blobs: Arc<dyn BlobStore>,
}

impl ServerState {
    /// Open the database under `work_dir` and build every service
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_service = DbService::new(&config.database_dir()).await?;
        let gateways = PaymentGateways::from_config(&config.khalti);

        Self::build(config.clone(), db_service.db, gateways).await
    }

    /// Build services over an open database
    ///
    /// Creates the bootstrap admin if needed and resolves the chat seller.
    pub async fn build(config: Config, db: Surreal<Db>, gateways: PaymentGateways) -> Result<Self> {
        let users = UserRepository::new(db.clone());
        bootstrap::ensure_admin(&users, &config).await?;
        let seller_id = bootstrap::resolve_seller(&users, &config).await?;

        let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(
            config.images_dir(),
            &config.public_base_url,
            config.max_upload_bytes,
        ));
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self {
            jwt_service,
            orders: OrderService::new(db.clone(), gateways),
            reviews: ReviewService::new(db.clone()),
            chats: ChatService::new(db.clone(), seller_id),
            stats: StatsService::new(db.clone()),
            blobs,
            db,
            config,
        })
    }

    pub fn books(&self) -> BookRepository {
        BookRepository::new(self.db.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.clone())
    }
}
