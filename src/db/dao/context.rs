use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::UserDao;

#[derive(Clone)]
pub struct DaoContext {
    db: Arc<DatabaseConnection>,
}

impl DaoContext {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub fn user(&self) -> UserDao {
        UserDao::new(Arc::clone(&self.db))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::db::entities::user;

    use super::DaoContext;

    #[tokio::test]
    async fn daos_share_one_connection() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let daos = DaoContext::new(Arc::new(db));

        let first = daos
            .user()
            .find_by_username("alice")
            .await
            .expect("query should succeed");
        let second = daos
            .user()
            .find_by_username("bob")
            .await
            .expect("query should succeed");

        assert!(first.is_none());
        assert!(second.is_none());
    }
}
