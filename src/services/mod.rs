// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod analytics_service;
pub mod audit_service;
pub mod auth_service;
pub mod claim_service;
pub mod email;
pub mod enterprise_service;
pub mod favorite_service;
pub mod geo;
pub mod health_service;
pub mod jwt;
pub mod kv_store;
pub mod media_service;
pub mod object_storage;
pub mod opening_hours;
pub mod password;
pub mod rate_limit;
pub mod rbac_service;
pub mod review_service;
pub mod search_index;
pub mod search_service;
pub mod subscription_service;
pub mod taxonomy_service;
pub mod token_blacklist;
pub mod user_service;

pub use analytics_service::AnalyticsService;
pub use audit_service::AuditService;
pub use auth_service::AuthService;
pub use claim_service::ClaimService;
pub use email::Mailer;
pub use enterprise_service::EnterpriseService;
pub use favorite_service::FavoriteService;
pub use health_service::HealthService;
pub use jwt::JwtService;
pub use kv_store::*;
pub use media_service::MediaService;
pub use object_storage::ObjectStorage;
pub use rate_limit::*;
pub use rbac_service::RbacService;
pub use review_service::ReviewService;
pub use search_index::SearchIndex;
pub use search_service::SearchService;
pub use subscription_service::SubscriptionService;
pub use taxonomy_service::TaxonomyService;
pub use token_blacklist::{sha256_hex, TokenBlacklist};
pub use user_service::UserService;
