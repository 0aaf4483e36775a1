pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: i64 = 3000;
pub const DEFAULT_RUST_LOG: &str = "info,tower_http=info";
pub const DEFAULT_DB_MAX_CONNECTIONS: i64 = 10;
pub const DEFAULT_DB_MIN_IDLE: i64 = 2;
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 36000;
pub const DEFAULT_CACHE_TTL_MS: i64 = 60000;
pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const DEFAULT_UPLOAD_LIMIT_BYTES: i64 = 5_000_000;
