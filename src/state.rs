use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{
    auth::{
        repo::{MemoryUserStore, PgUserStore, UserStore},
        services::AuthService,
        JwtKeys,
    },
    config::AppConfig,
    places::repo_types::{Place, PlaceCategory},
    products::repo_types::Product,
    resources::{MemoryOwnedStore, OwnedStore, PgOwnedRepo, ResourceService},
};

/// Read-only after startup; cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub auth: AuthService,
    pub places: ResourceService<Place>,
    pub categories: ResourceService<PlaceCategory>,
    pub products: ResourceService<Product>,
}

impl AppState {
    pub fn postgres(config: AppConfig, db: PgPool) -> Self {
        Self::from_stores(
            config,
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgOwnedRepo::<Place>::new(db.clone())),
            Arc::new(PgOwnedRepo::<PlaceCategory>::new(db.clone())),
            Arc::new(PgOwnedRepo::<Product>::new(db)),
        )
    }

    /// Everything kept in process memory; nothing survives a restart.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_stores(
            config,
            Arc::new(MemoryUserStore::default()),
            Arc::new(MemoryOwnedStore::<Place>::default()),
            Arc::new(MemoryOwnedStore::<PlaceCategory>::default()),
            Arc::new(MemoryOwnedStore::<Product>::default()),
        )
    }

    fn from_stores(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        places: Arc<dyn OwnedStore<Place>>,
        categories: Arc<dyn OwnedStore<PlaceCategory>>,
        products: Arc<dyn OwnedStore<Product>>,
    ) -> Self {
        let deadline = config.request_timeout();
        let jwt = JwtKeys::from_config(&config.jwt);
        Self {
            auth: AuthService::new(users, jwt.clone(), deadline),
            places: ResourceService::new(places, deadline),
            categories: ResourceService::new(categories, deadline),
            products: ResourceService::new(products, deadline),
            jwt,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for ResourceService<Place> {
    fn from_ref(state: &AppState) -> Self {
        state.places.clone()
    }
}

impl FromRef<AppState> for ResourceService<PlaceCategory> {
    fn from_ref(state: &AppState) -> Self {
        state.categories.clone()
    }
}

impl FromRef<AppState> for ResourceService<Product> {
    fn from_ref(state: &AppState) -> Self {
        state.products.clone()
    }
}
