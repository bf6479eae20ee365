mod error;
mod service;

pub use error::Error;
pub use service::MemoizeService;
