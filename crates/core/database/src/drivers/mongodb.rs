use std::ops::Deref;

use getdb_result::Result;
use mongodb::bson::doc;

database_derived!(
    /// MongoDB implementation: the working database name selected off the
    /// owning client, which stays reachable through [`Deref`]
    #[derive(Debug)]
    pub struct MongoDb(pub ::mongodb::Client, pub String);
);

impl Deref for MongoDb {
    type Target = mongodb::Client;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl MongoDb {
    /// Get the working database
    pub fn db(&self) -> mongodb::Database {
        self.database(&self.1)
    }

    /// Get a collection by its name
    pub fn col<T: Send + Sync>(&self, collection: &str) -> mongodb::Collection<T> {
        self.db().collection(collection)
    }

    /// Round-trip to the server, verifying the connection is usable
    pub async fn ping(&self) -> Result<()> {
        self.db()
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(super::into_connect_error)
    }
}
