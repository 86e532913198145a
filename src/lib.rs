pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod mail;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod services;
pub mod sessions;
pub mod state;
pub mod validation;

#[cfg(test)]
mod test_helpers;
