mod context;
pub mod error;
pub mod user_dao;

pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use user_dao::{InfoPatch, NewAccount, UserDao, UserRecord, UserSearchFilter};
