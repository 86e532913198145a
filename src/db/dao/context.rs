use sea_orm::DatabaseConnection;

use super::{CarDao, DaoBase, UserDao};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        DaoBase::new(&self.db)
    }

    pub fn car(&self) -> CarDao {
        DaoBase::new(&self.db)
    }
}
