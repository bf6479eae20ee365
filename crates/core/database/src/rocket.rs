//! Rocket integration: exposes the facade and the connected default handle
//! as managed state.

use std::sync::Arc;

use rocket::fairing::AdHoc;
use rocket::{Build, Rocket, State};

use crate::{Database, GetDb, DEFAULT_ALIAS};

/// Request-guard-friendly alias for the managed default handle
pub type Db = State<Arc<Database>>;

/// Fairing that manages the [`GetDb`] facade itself (so routes can resolve
/// further aliases) and the connected default handle. A connect failure for
/// the default alias aborts ignition.
pub fn fairing(getdb: GetDb) -> AdHoc {
    AdHoc::try_on_ignite(
        concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")),
        |rocket| async move { attach(rocket, getdb).await },
    )
}

async fn attach(rocket: Rocket<Build>, getdb: GetDb) -> Result<Rocket<Build>, Rocket<Build>> {
    match getdb.get(DEFAULT_ALIAS).await {
        Ok(db) => Ok(rocket.manage(db).manage(getdb)),
        Err(err) => {
            error!("Failed to connect the default database: {err}");
            Err(rocket)
        }
    }
}
