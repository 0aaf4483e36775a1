pub mod configs;
pub mod defaults;
pub mod envconfig;
pub mod validate;

pub use configs::{
    AppConfig, AuthConfig, CacheConfig, DatabaseConfig, GeneralConfig, LoggingConfig,
    PaginationConfig, StorageConfig,
};
pub use envconfig::EnvConfig;
