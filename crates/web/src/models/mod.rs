//! Domain models specific to the web layer.

pub mod session;

pub use session::CurrentUser;
pub use session::keys as session_keys;
