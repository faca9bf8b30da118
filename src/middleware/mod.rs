// src/middleware/mod.rs
// DOCUMENTATION: Request guards and request-level middleware

pub mod auth;
pub mod client;
pub mod throttle;

pub use auth::{AdminUser, AuthUser, OptionalAuthUser};
pub use client::ClientInfo;
pub use throttle::IpThrottle;
