use std::sync::Arc;

use crate::{
    auth::{Authenticator, JwtKeys},
    config::defaults,
    db::dao::DaoContext,
    state::AppState,
};

use super::UserService;

/// Per-request assembly point for services. Cheap to build; everything it
/// hands out clones the shared connection handle.
#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
    keys: JwtKeys,
    token_ttl_secs: usize,
    default_limit: u64,
}

impl ServiceContext {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            daos: DaoContext::new(Arc::clone(&state.db)),
            keys: state.jwt.clone(),
            token_ttl_secs: state
                .config
                .auth
                .as_ref()
                .map(|auth| auth.token_ttl_secs as usize)
                .unwrap_or(defaults::DEFAULT_TOKEN_TTL_SECS as usize),
            default_limit: state.config.pagination.default_limit,
        }
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(self.daos.user(), self.keys.clone())
    }

    pub fn user(&self) -> UserService {
        UserService::new(
            self.daos.user(),
            self.authenticator(),
            self.token_ttl_secs,
            self.default_limit,
        )
    }
}
