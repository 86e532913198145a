pub mod auth;
pub mod cars;
mod router;

pub use router::router;
