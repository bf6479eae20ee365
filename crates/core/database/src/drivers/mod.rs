#[cfg(feature = "mongodb")]
mod mongodb;
mod reference;

#[cfg(feature = "mongodb")]
pub use self::mongodb::*;
pub use self::reference::*;

use getdb_result::Result;

#[cfg(feature = "mongodb")]
use ::mongodb::options::{ClientOptions, Credential, ServerAddress};

#[cfg(feature = "mongodb")]
use crate::parser::{self, ConnectionInfo, Hosts};

/// Database name assumed when neither the connection string nor the caller
/// names one (the server's own default)
#[cfg(feature = "mongodb")]
const DEFAULT_DATABASE: &str = "test";

/// Database information to use to create a client
#[derive(Clone, Debug)]
pub enum DatabaseInfo {
    /// Connect to MongoDB with a connection string
    MongoDb { uri: String },
    /// Connect to MongoDB with explicit driver options
    #[cfg(feature = "mongodb")]
    MongoDbWithOptions {
        options: ClientOptions,
        database_name: Option<String>,
    },
    /// Use an existing MongoDB connection
    #[cfg(feature = "mongodb")]
    MongoDbFromClient(::mongodb::Client, Option<String>),
    /// Use the mock database
    Reference(ReferenceDb),
}

database_derived!(
    /// Database
    #[derive(Debug)]
    pub enum Database {
        /// Mock database
        Reference(ReferenceDb),
        /// MongoDB database
        #[cfg(feature = "mongodb")]
        MongoDb(MongoDb),
    }
);

impl DatabaseInfo {
    /// Create a database client from the given database information
    pub async fn connect(self) -> Result<Database> {
        match self {
            DatabaseInfo::MongoDb { uri } => connect_uri(uri).await,
            #[cfg(feature = "mongodb")]
            DatabaseInfo::MongoDbWithOptions {
                options,
                database_name,
            } => {
                let database_name = database_name
                    .or_else(|| options.default_database.clone())
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

                connect_mongodb(options, database_name).await
            }
            #[cfg(feature = "mongodb")]
            DatabaseInfo::MongoDbFromClient(client, database_name) => {
                // an already-established connection is adopted as-is
                let database_name = database_name
                    .or_else(|| client.default_database().map(|db| db.name().to_string()))
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

                Ok(Database::MongoDb(MongoDb(client, database_name)))
            }
            DatabaseInfo::Reference(db) => Ok(Database::Reference(db.establish().await?)),
        }
    }
}

impl Database {
    /// Name of the working database
    pub fn name(&self) -> &str {
        match self {
            Database::Reference(db) => db.name(),
            #[cfg(feature = "mongodb")]
            Database::MongoDb(db) => &db.1,
        }
    }

    /// Status query: round-trip to the server where one exists
    pub async fn ping(&self) -> Result<()> {
        match self {
            Database::Reference(_) => Ok(()),
            #[cfg(feature = "mongodb")]
            Database::MongoDb(db) => db.ping().await,
        }
    }
}

#[cfg(feature = "mongodb")]
async fn connect_uri(uri: String) -> Result<Database> {
    let info = parser::parse(&uri)?;
    let options = client_options(&uri, &info).await?;
    let database_name = info.name.unwrap_or_else(|| DEFAULT_DATABASE.to_string());

    connect_mongodb(options, database_name).await
}

#[cfg(not(feature = "mongodb"))]
async fn connect_uri(uri: String) -> Result<Database> {
    crate::parser::parse(&uri)?;

    Err(create_error!(ConnectionFailed {
        message: "MongoDB support is not enabled".to_string()
    }))
}

/// Build driver options from a parsed connection string. The bracketed
/// replica-set form is not a valid URI for the driver, so it is assembled by
/// hand; anything else goes through the driver's own parser.
#[cfg(feature = "mongodb")]
async fn client_options(uri: &str, info: &ConnectionInfo) -> Result<ClientOptions> {
    match &info.hosts {
        Hosts::ReplicaSet {
            rs_name,
            replicants,
        } => {
            let hosts: Vec<_> = replicants
                .iter()
                .map(|addr| ServerAddress::Tcp {
                    host: addr.host.clone(),
                    port: Some(addr.port),
                })
                .collect();

            let mut options = ClientOptions::builder().hosts(hosts).build();
            options.repl_set_name = Some(rs_name.clone());

            if info.user.is_some() {
                let mut credential = Credential::default();
                credential.username = info.user.clone();
                credential.password = info.password.clone();
                options.credential = Some(credential);
            }

            Ok(options)
        }
        Hosts::Single { .. } => ClientOptions::parse(uri).await.map_err(|err| {
            create_error!(MalformedConnectionString {
                reason: err.to_string()
            })
        }),
    }
}

#[cfg(feature = "mongodb")]
async fn connect_mongodb(options: ClientOptions, database_name: String) -> Result<Database> {
    let client = ::mongodb::Client::with_options(options).map_err(into_connect_error)?;
    let db = MongoDb(client, database_name);

    // the driver connects lazily; ping so connect and authentication
    // failures surface here instead of on first use
    db.ping().await?;

    info!("Connected to MongoDB database \"{}\"", db.1);

    Ok(Database::MongoDb(db))
}

/// Map a driver error, keeping its message text intact so callers can match
/// on it (e.g. "ECONNREFUSED")
#[cfg(feature = "mongodb")]
pub(crate) fn into_connect_error(err: ::mongodb::error::Error) -> getdb_result::Error {
    let message = err.to_string();

    match *err.kind {
        ::mongodb::error::ErrorKind::Authentication { .. } => {
            create_error!(AuthenticationFailed { message })
        }
        _ => create_error!(ConnectionFailed { message }),
    }
}
