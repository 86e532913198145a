pub mod base;
pub mod base_traits;
pub mod car_dao;
mod context;
pub mod error;
pub mod user_dao;

pub use base::{DaoBase, PaginatedResponse, page_count};
pub use base_traits::{HasCreatedAtColumn, HasIdActiveModel, HasIdColumn, TimestampedActiveModel};
pub use car_dao::{CarDao, CarFields, CarFilter};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use user_dao::{NewUser, UserDao};
