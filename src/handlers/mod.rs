// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export route configuration for every API surface

pub mod admin;
pub mod analytics;
pub mod audit;
pub mod auth;
pub mod claims;
pub mod enterprises;
pub mod favorites;
pub mod health;
pub mod media;
pub mod rbac;
pub mod reviews;
pub mod search;
pub mod subscriptions;
pub mod taxonomy;
pub mod users;

pub use admin::config as admin_config;
pub use analytics::config as analytics_config;
pub use audit::config as audit_config;
pub use auth::config as auth_config;
pub use claims::config as claims_config;
pub use enterprises::config as enterprises_config;
pub use favorites::config as favorites_config;
pub use health::config as health_config;
pub use health::ServerStart;
pub use media::config as media_config;
pub use rbac::config as rbac_config;
pub use reviews::config as reviews_config;
pub use search::config as search_config;
pub use subscriptions::config as subscriptions_config;
pub use taxonomy::config as taxonomy_config;
pub use users::config as users_config;
