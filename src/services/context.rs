use sea_orm::DatabaseConnection;

use crate::{
    db::dao::DaoContext,
    services::{
        account_service::AccountService, car_service::CarService, user_service::UserService,
    },
    state::AppState,
};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            daos: DaoContext::new(db),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db)
    }

    pub fn daos(&self) -> &DaoContext {
        &self.daos
    }

    pub fn user(&self) -> UserService {
        UserService::new(self.daos.user())
    }

    pub fn cars(&self, state: &AppState) -> CarService {
        CarService::new(self.daos.car(), &state.config.cars)
    }

    pub fn account<'a>(&self, state: &'a AppState) -> AccountService<'a> {
        AccountService::new(state, self.daos.user())
    }
}
