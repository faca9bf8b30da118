// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod analytics_repository;
pub mod audit_repository;
pub mod claim_repository;
pub mod enterprise_repository;
pub mod favorite_repository;
pub mod media_repository;
pub mod rbac_repository;
pub mod review_repository;
pub mod subscription_repository;
pub mod taxonomy_repository;
pub mod user_repository;

pub use analytics_repository::*;
pub use audit_repository::*;
pub use claim_repository::*;
pub use enterprise_repository::*;
pub use favorite_repository::*;
pub use media_repository::*;
pub use rbac_repository::*;
pub use review_repository::*;
pub use subscription_repository::*;
pub use taxonomy_repository::*;
pub use user_repository::*;

/// Build an ILIKE pattern matching `term` anywhere, with wildcards escaped
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" kimchi "), "%kimchi%");
        assert_eq!(like_pattern("100%_real"), "%100\\%\\_real%");
    }
}
