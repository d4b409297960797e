use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::Config;
use crate::store::Store;

/// Shared application state registered as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            store,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn from_config(store: Arc<dyn Store>, config: &Config) -> Self {
        Self::new(
            store,
            TokenService::new(&config.jwt_secret, config.token_ttl_minutes),
            config.bcrypt_cost,
        )
    }
}
