//! Bearer-token identity extraction.
//!
//! The identity layer in front of this service authenticates callers and
//! hands us a bearer token whose claims carry the subject and realm
//! roles. Signature verification happens upstream and is out of scope
//! here; this module only does typed claim extraction, and it fails
//! closed: anything malformed yields no identity (401) or an empty role
//! set (403 downstream), never a guessed role.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use common::UserId;

use crate::error::ApiError;

/// The fixed set of roles this service recognizes. Unknown role strings
/// in a token are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// May place orders and read their own data.
    Client,
    /// Full catalog management and read access to all orders.
    Admin,
}

impl Role {
    fn from_claim(claim: &str) -> Option<Role> {
        match claim.to_ascii_lowercase().as_str() {
            "client" => Some(Role::Client),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Client => write!(f, "CLIENT"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

/// The authenticated requester: token subject plus extracted roles.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    roles: Vec<Role>,
}

impl AuthenticatedUser {
    /// Builds an identity directly, for tests and internal callers.
    pub fn new(user_id: UserId, roles: Vec<Role>) -> Self {
        Self { user_id, roles }
    }

    /// Returns true if the requester carries the given role.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Rejects with 403 unless the requester carries the given role.
    pub fn require(&self, role: Role) -> Result<(), ApiError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!("requires role {role}")))
        }
    }

    /// Rejects with 403 unless the requester carries any of the roles.
    pub fn require_any(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.iter().any(|r| self.has_role(*r)) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("insufficient role".to_string()))
        }
    }
}

/// Extracts the role set from a token's claims.
///
/// Reads `realm_access.roles`; any missing piece or wrong shape yields
/// an empty set.
pub fn roles_from_claims(claims: &serde_json::Value) -> Vec<Role> {
    claims
        .get("realm_access")
        .and_then(|ra| ra.get("roles"))
        .and_then(|roles| roles.as_array())
        .map(|roles| {
            roles
                .iter()
                .filter_map(|r| r.as_str())
                .filter_map(Role::from_claim)
                .collect()
        })
        .unwrap_or_default()
}

fn decode_claims(token: &str) -> Option<serde_json::Value> {
    let mut segments = token.split('.');
    let _header = segments.next()?;
    let payload = segments.next()?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("expected bearer authorization".to_string()))?;

        let claims = decode_claims(token)
            .ok_or_else(|| ApiError::Unauthorized("malformed token".to_string()))?;

        let subject = claims
            .get("sub")
            .and_then(|s| s.as_str())
            .and_then(|s| uuid::Uuid::parse_str(s).ok())
            .ok_or_else(|| ApiError::Unauthorized("token has no valid subject".to_string()))?;

        Ok(AuthenticatedUser {
            user_id: UserId::from_uuid(subject),
            roles: roles_from_claims(&claims),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_extracted_from_realm_access() {
        let claims = serde_json::json!({
            "sub": "8b5f8e1e-0000-0000-0000-000000000001",
            "realm_access": { "roles": ["CLIENT", "offline_access", "ADMIN"] }
        });
        let roles = roles_from_claims(&claims);
        assert_eq!(roles, vec![Role::Client, Role::Admin]);
    }

    #[test]
    fn missing_realm_access_fails_closed() {
        let claims = serde_json::json!({ "sub": "x" });
        assert!(roles_from_claims(&claims).is_empty());
    }

    #[test]
    fn wrong_shape_fails_closed() {
        let claims = serde_json::json!({ "realm_access": { "roles": "ADMIN" } });
        assert!(roles_from_claims(&claims).is_empty());

        let claims = serde_json::json!({ "realm_access": { "roles": [42, true] } });
        assert!(roles_from_claims(&claims).is_empty());
    }

    #[test]
    fn unknown_role_strings_are_ignored() {
        let claims = serde_json::json!({
            "realm_access": { "roles": ["superuser", "CLIENT"] }
        });
        assert_eq!(roles_from_claims(&claims), vec![Role::Client]);
    }

    #[test]
    fn decode_claims_rejects_garbage() {
        assert!(decode_claims("not a token").is_none());
        assert!(decode_claims("a.!!!.c").is_none());
    }

    #[test]
    fn decode_claims_reads_payload_segment() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"abc"}"#);
        let token = format!("eyJhbGciOiJub25lIn0.{payload}.sig");
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims["sub"], "abc");
    }

    #[test]
    fn require_rejects_missing_role() {
        let user = AuthenticatedUser::new(UserId::new(), vec![Role::Client]);
        assert!(user.require(Role::Client).is_ok());
        assert!(user.require(Role::Admin).is_err());
        assert!(user.require_any(&[Role::Client, Role::Admin]).is_ok());

        let nobody = AuthenticatedUser::new(UserId::new(), vec![]);
        assert!(nobody.require_any(&[Role::Client, Role::Admin]).is_err());
    }
}
