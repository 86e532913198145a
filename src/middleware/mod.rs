mod cookies;
mod csrf;
mod guards;
mod json_error;
mod panic;
mod session;

pub use cookies::{clear_session_cookie, csrf_cookie, parse_cookie, session_cookie};
pub use csrf::{CSRF_FAILED, csrf_guard};
pub use guards::{AuthRoleGuard, CurrentUser, NOT_AUTHENTICATED, PERMISSION_DENIED};
pub use json_error::json_error_middleware;
pub use panic::catch_panic_layer;
pub use session::{AuthSession, resolve_session};
