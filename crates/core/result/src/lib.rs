#[macro_use]
extern crate serde;

use std::fmt;

/// Result type with custom Error
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error information
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Error {
    /// Type of error and additional information
    #[serde(flatten)]
    pub error_type: ErrorType,

    /// Where this error occurred
    pub location: String,
}

/// Possible error types
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ErrorType {
    /// This error was not labeled :(
    LabelMe,

    // ? Configuration errors
    UnknownAlias {
        alias: String,
    },
    MissingConnectionString,

    // ? Connection string errors
    MalformedConnectionString {
        reason: String,
    },

    // ? Connection errors
    ConnectionFailed {
        message: String,
    },
    AuthenticationFailed {
        message: String,
    },

    // ? General errors
    InternalError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_type {
            ErrorType::LabelMe => write!(f, "Unlabeled error"),
            ErrorType::UnknownAlias { alias } => {
                write!(f, "There is no mongodb url for the alias \"{alias}\"")
            }
            ErrorType::MissingConnectionString => write!(
                f,
                "Missing connection url, environment variable or register call"
            ),
            ErrorType::MalformedConnectionString { reason } => {
                write!(f, "Malformed connection string: {reason}")
            }
            ErrorType::ConnectionFailed { message } => {
                write!(f, "Failed to connect to the database: {message}")
            }
            ErrorType::AuthenticationFailed { message } => {
                write!(f, "Failed to authenticate against the database: {message}")
            }
            ErrorType::InternalError => write!(f, "Internal error"),
        }
    }
}

impl std::error::Error for Error {}

#[macro_export]
macro_rules! create_error {
    ( $error: ident $( $tt:tt )? ) => {
        $crate::Error {
            error_type: $crate::ErrorType::$error $( $tt )?,
            location: format!("{}:{}:{}", file!(), line!(), column!()),
        }
    };
}
