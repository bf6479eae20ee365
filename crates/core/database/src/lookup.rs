//! Alias resolution.
//!
//! Maps a logical alias to connection information without touching the
//! registry: an explicit registration wins, a connection-string-shaped alias
//! registers itself, and the default alias may fall back to the environment.

use std::collections::HashMap;
use std::env;

use getdb_result::Result;

use crate::drivers::DatabaseInfo;
use crate::parser::is_connection_string;
use crate::DEFAULT_ALIAS;

/// Environment variables consulted for the default alias, in priority order
const ENV_KEYS: [&str; 2] = ["DB", "MONGOLAB_URI"];

/// Resolve an alias against the process environment
pub(crate) fn resolve(
    configs: &HashMap<String, DatabaseInfo>,
    alias: &str,
) -> Result<DatabaseInfo> {
    resolve_with_env(configs, alias, env::vars())
}

/// Resolution order: explicit registration, the alias itself being a
/// connection string, then (default alias only) `DB`, `MONGOLAB_URI` and
/// finally the first environment value that looks like a connection string.
pub(crate) fn resolve_with_env(
    configs: &HashMap<String, DatabaseInfo>,
    alias: &str,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<DatabaseInfo> {
    if let Some(info) = configs.get(alias) {
        return Ok(info.clone());
    }

    if is_connection_string(alias) {
        // directly using a connection string as alias
        return Ok(DatabaseInfo::MongoDb {
            uri: alias.to_string(),
        });
    }

    if alias != DEFAULT_ALIAS {
        return Err(create_error!(UnknownAlias {
            alias: alias.to_string()
        }));
    }

    let vars: Vec<(String, String)> = vars.into_iter().collect();

    for key in ENV_KEYS {
        if let Some((_, uri)) = vars.iter().find(|(name, _)| name == key) {
            return Ok(DatabaseInfo::MongoDb { uri: uri.clone() });
        }
    }

    if let Some((name, uri)) = vars.iter().find(|(_, value)| is_connection_string(value)) {
        info!("Using connection string from environment variable \"{name}\"");
        return Ok(DatabaseInfo::MongoDb { uri: uri.clone() });
    }

    Err(create_error!(MissingConnectionString))
}

#[cfg(test)]
mod tests {
    use getdb_result::ErrorType;

    use crate::parser::{self, Hosts};

    use super::*;

    fn no_env() -> Vec<(String, String)> {
        Vec::new()
    }

    fn uri_of(info: DatabaseInfo) -> String {
        match info {
            DatabaseInfo::MongoDb { uri } => uri,
            other => panic!("expected a connection string, got {other:?}"),
        }
    }

    #[test]
    fn fails_without_any_configuration() {
        let error = resolve_with_env(&HashMap::new(), DEFAULT_ALIAS, no_env()).unwrap_err();
        assert!(matches!(
            error.error_type,
            ErrorType::MissingConnectionString
        ));
    }

    #[test]
    fn returns_registered_configuration() {
        let mut configs = HashMap::new();
        configs.insert(
            "foo".to_string(),
            DatabaseInfo::MongoDb {
                uri: "mongodb://localhost/foo".to_string(),
            },
        );

        let uri = uri_of(resolve_with_env(&configs, "foo", no_env()).unwrap());
        assert_eq!(uri, "mongodb://localhost/foo");
    }

    #[test]
    fn registry_takes_priority_over_environment() {
        let mut configs = HashMap::new();
        configs.insert(
            DEFAULT_ALIAS.to_string(),
            DatabaseInfo::MongoDb {
                uri: "mongodb://registered/app".to_string(),
            },
        );

        let env = vec![("DB".to_string(), "mongodb://fromenv/app".to_string())];
        let uri = uri_of(resolve_with_env(&configs, DEFAULT_ALIAS, env).unwrap());
        assert_eq!(uri, "mongodb://registered/app");
    }

    #[test]
    fn resolves_default_from_db_variable() {
        let env = vec![("DB".to_string(), "mongodb://host/db".to_string())];
        let info = resolve_with_env(&HashMap::new(), DEFAULT_ALIAS, env).unwrap();

        let parsed = parser::parse(&uri_of(info)).unwrap();
        assert_eq!(parsed.name.as_deref(), Some("db"));
        assert!(matches!(parsed.hosts, Hosts::Single { host, .. } if host == "host"));
    }

    #[test]
    fn db_takes_priority_over_mongolab_uri() {
        let env = vec![
            ("MONGOLAB_URI".to_string(), "mongodb://lab/app".to_string()),
            ("DB".to_string(), "mongodb://primary/app".to_string()),
        ];

        let uri = uri_of(resolve_with_env(&HashMap::new(), DEFAULT_ALIAS, env).unwrap());
        assert_eq!(uri, "mongodb://primary/app");
    }

    #[test]
    fn resolves_default_from_mongolab_uri() {
        let env = vec![("MONGOLAB_URI".to_string(), "mongodb://myhost/baba".to_string())];

        let uri = uri_of(resolve_with_env(&HashMap::new(), DEFAULT_ALIAS, env).unwrap());
        assert_eq!(uri, "mongodb://myhost/baba");
    }

    #[test]
    fn guesses_first_connection_string_shaped_value() {
        let env = vec![
            ("PATH".to_string(), "/usr/bin".to_string()),
            ("dasdsDSAdsadsa".to_string(), "mongodb://fufafe/baba".to_string()),
        ];

        let uri = uri_of(resolve_with_env(&HashMap::new(), DEFAULT_ALIAS, env).unwrap());
        assert_eq!(uri, "mongodb://fufafe/baba");
    }

    #[test]
    fn alias_may_be_a_connection_string_itself() {
        let uri = uri_of(
            resolve_with_env(&HashMap::new(), "mongodb://mama.com/foo", no_env()).unwrap(),
        );
        assert_eq!(uri, "mongodb://mama.com/foo");
    }

    #[test]
    fn unknown_alias_is_a_configuration_error() {
        let env = vec![("DB".to_string(), "mongodb://host/db".to_string())];
        let error = resolve_with_env(&HashMap::new(), "wrong alias", env).unwrap_err();

        assert!(matches!(
            error.error_type,
            ErrorType::UnknownAlias { alias } if alias == "wrong alias"
        ));
    }
}
