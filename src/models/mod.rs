// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod analytics;
pub mod audit;
pub mod claim;
pub mod common;
pub mod enterprise;
pub mod favorite;
pub mod media;
pub mod rbac;
pub mod review;
pub mod search;
pub mod subscription;
pub mod taxonomy;
pub mod user;

pub use analytics::*;
pub use audit::{AuditLog, ClearAuditLogsQuery, DeletedCount, ListAuditLogsQuery};
pub use claim::*;
pub use common::*;
pub use enterprise::*;
pub use favorite::*;
pub use media::*;
pub use rbac::{MyPermissionsResponse, Permission, PermissionWithRoles, RolePermissionRequest};
pub use review::*;
pub use search::*;
pub use subscription::*;
pub use taxonomy::*;
pub use user::*;
