pub mod account_service;
pub mod car_filter;
pub mod car_service;
pub mod context;
pub mod forms;
pub mod user_service;

pub use context::ServiceContext;
