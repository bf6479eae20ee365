//! Alias-keyed, coalescing connection facade over the MongoDB driver.
//!
//! A [`GetDb`] context maps logical aliases to connection configurations and
//! hands out one shared handle per alias: concurrent requests during an
//! in-flight connect coalesce into a single connect call, and the settled
//! outcome (failure included) is cached until the alias is registered again.

#[macro_use]
extern crate serde;

#[macro_use]
extern crate log;

#[macro_use]
extern crate getdb_result;

#[cfg(feature = "mongodb")]
pub use mongodb;

macro_rules! database_derived {
    ( $( $item:item )+ ) => {
        $(
            #[derive(Clone)]
            $item
        )+
    };
}

macro_rules! auto_derived {
    ( $( $item:item )+ ) => {
        $(
            #[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
            $item
        )+
    };
}

mod drivers;
mod lookup;
pub mod parser;

#[cfg(feature = "rocket")]
pub mod rocket;

pub use drivers::*;
pub use getdb_result::{Error, ErrorType, Result};
pub use parser::is_connection_string;

use std::collections::HashMap;
use std::sync::Arc;

use getdb_coalesced::MemoizeService;
use tokio::sync::RwLock;

/// Alias used when none is given
pub const DEFAULT_ALIAS: &str = "default";

/// Alias-keyed connection registry and cache.
///
/// Cheap to clone; all clones share the same registry and connections.
#[derive(Clone, Default)]
pub struct GetDb {
    configs: Arc<RwLock<HashMap<String, DatabaseInfo>>>,
    connections: MemoizeService<String, Database, Error>,
}

impl GetDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure `alias`. Any cached connection or failure for it is
    /// discarded, so the next request connects with the new configuration;
    /// handles already held by callers stay valid.
    pub async fn register(&self, alias: impl Into<String>, info: DatabaseInfo) {
        let alias = alias.into();
        // store first, invalidate last: a request racing this call either
        // already resolves the new configuration or settles into an entry
        // the invalidation below discards, so pre-registration arguments
        // can never be pinned into the new epoch
        self.configs.write().await.insert(alias.clone(), info);
        self.connections.invalidate(&alias).await;
    }

    /// Configure the default alias
    pub async fn register_default(&self, info: DatabaseInfo) {
        self.register(DEFAULT_ALIAS, info).await;
    }

    /// Configure the default alias from the `DB` environment variable
    pub async fn register_from_env(&self) -> Result<()> {
        let uri = std::env::var("DB").map_err(|_| create_error!(MissingConnectionString))?;
        self.register_default(DatabaseInfo::MongoDb { uri }).await;

        Ok(())
    }

    /// Resolve `alias` to its shared connection handle, connecting at most
    /// once per registration. The returned future settles with the shared
    /// handle, or with the underlying error for the caller to handle.
    pub async fn get(&self, alias: &str) -> Result<Arc<Database>> {
        self.connections
            .execute(alias.to_string(), || async move {
                let info = lookup::resolve(&*self.configs.read().await, alias)?;
                info.connect().await
            })
            .await
            .map_err(|err| match err {
                getdb_coalesced::Error::Recv => create_error!(InternalError),
                getdb_coalesced::Error::Failed(err) => err,
            })
    }

    /// [`GetDb::get`] for the default alias
    pub async fn get_default(&self) -> Result<Arc<Database>> {
        self.get(DEFAULT_ALIAS).await
    }

    /// Resolve `alias` or terminate the process, for callers that treat a
    /// database outage as fatal to the host application: exit code 2 for
    /// authentication failures, 1 for anything else.
    pub async fn get_or_exit(&self, alias: &str) -> Arc<Database> {
        match self.get(alias).await {
            Ok(db) => db,
            Err(err) => {
                error!("Error connecting to the db, exiting: {err}");
                std::process::exit(exit_code(&err));
            }
        }
    }

    /// [`GetDb::get_or_exit`] for the default alias
    pub async fn get_default_or_exit(&self) -> Arc<Database> {
        self.get_or_exit(DEFAULT_ALIAS).await
    }
}

/// Process exit code used by the `*_or_exit` entry points
pub fn exit_code(error: &Error) -> i32 {
    match error.error_type {
        ErrorType::AuthenticationFailed { .. } => 2,
        _ => 1,
    }
}
