//! The login-gated download page

pub mod auth;
pub mod handlers;
pub mod page;
pub mod server;

pub use auth::{IdentityProvider, MemorySessions, UserContext};
pub use server::{router, serve, AppState, ServerConfig};
