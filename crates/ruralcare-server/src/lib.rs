pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod storage;

pub use config::{
    AppConfig, LoggingConfig, PostgresStorageConfig, ServerConfig, StorageBackend, StorageConfig,
};
pub use error::{ApiError, ErrorBody};
pub use extractors::AdminAuth;
pub use observability::init_tracing;
pub use server::{AppState, RuralcareServer, ServerBuilder, build_app};
