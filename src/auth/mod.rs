pub mod bootstrap;
pub mod crypto;
pub mod password;
pub mod policy;
pub mod token;
mod types;

pub use policy::PasswordPolicy;
pub use token::{TokenError, TokenGenerator, decode_uid, encode_uid};
pub use types::{AdminRole, RequiredRole, Role};
