use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, create_orm_conn},
    storage::ObjectStore,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub images: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig, images: Arc<dyn ObjectStore>) -> Self {
        let orm = create_orm_conn(&pool);
        Self {
            pool,
            orm,
            config: Arc::new(config),
            images,
        }
    }
}
