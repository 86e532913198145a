#[allow(unused_imports)]
pub mod prelude {
    pub use super::car::Entity as Car;
    pub use super::session::Entity as Session;
    pub use super::user::Entity as User;
}

pub mod car;
pub mod session;
pub mod user;
