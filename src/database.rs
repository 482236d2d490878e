//! # MongoDB
//!
//! Connection lifecycle for the document store.
//!
//! One client handle is shared by every request. It is opened lazily on
//! first use, checked with a `ping` before reuse and reopened when the
//! check fails. A failed attempt surfaces as `StoreUnavailable` so the
//! request answers 503 instead of tearing the process down; the next
//! request retries. There is no background reconnect loop.
//!
//! Timeouts and pool size below are defaults; parameters given in the
//! connection string win.

use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{config::Config, error::AppError};

const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_POOL_SIZE: u32 = 10;

pub struct Store {
    uri: String,
    db_name: String,
    client: RwLock<Option<Client>>,
}

impl Store {
    /// Records the connection target. No I/O happens until
    /// [`Store::ensure_connected`] is called.
    pub fn new(config: &Config) -> Self {
        Self {
            uri: config.mongodb_uri.clone(),
            db_name: config.mongodb_db.clone(),
            client: RwLock::new(None),
        }
    }

    /// Returns a database handle backed by a live connection.
    ///
    /// Reuses the open client when its ping succeeds, otherwise opens a
    /// fresh one. Callers must not touch the store when this fails.
    pub async fn ensure_connected(&self) -> Result<Database, AppError> {
        if let Some(client) = self.client.read().await.as_ref() {
            let db = client.database(&self.db_name);
            if ping(&db).await.is_ok() {
                return Ok(db);
            }
            warn!("Document store connection lost, reopening");
        }

        self.reconnect().await
    }

    /// Connectivity snapshot for the health endpoint. Never opens a new
    /// connection and never fails.
    pub async fn is_connected(&self) -> bool {
        match self.client.read().await.as_ref() {
            Some(client) => ping(&client.database(&self.db_name)).await.is_ok(),
            None => false,
        }
    }

    async fn reconnect(&self) -> Result<Database, AppError> {
        let mut guard = self.client.write().await;

        // Another request may have reconnected while we waited on the lock.
        if let Some(client) = guard.as_ref() {
            let db = client.database(&self.db_name);
            if ping(&db).await.is_ok() {
                return Ok(db);
            }
        }

        info!("Connecting to document store at {}", self.uri);

        let mut options = ClientOptions::parse(&self.uri).await.map_err(unavailable)?;
        options
            .server_selection_timeout
            .get_or_insert(SERVER_SELECTION_TIMEOUT);
        options.connect_timeout.get_or_insert(CONNECT_TIMEOUT);
        options.max_pool_size.get_or_insert(MAX_POOL_SIZE);

        let client = Client::with_options(options).map_err(unavailable)?;
        let db = client.database(&self.db_name);
        ping(&db).await.map_err(unavailable)?;

        info!("Connected to document store");
        *guard = Some(client);

        Ok(db)
    }
}

async fn ping(db: &Database) -> mongodb::error::Result<()> {
    db.run_command(doc! { "ping": 1 }).await.map(|_| ())
}

fn unavailable(error: mongodb::error::Error) -> AppError {
    AppError::StoreUnavailable(error.to_string())
}
