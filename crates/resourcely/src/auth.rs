//! Auth token introspection
//!
//! The token is a JWT. Only the tenant claim is read and the signature is
//! not verified; that is the API server's job. Use the result to catch
//! configuration mistakes, never as an authorization decision.

use crate::error::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

/// Claim carrying the tenant name.
pub const TENANT_CLAIM: &str = "@resourcely/tenant";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Claims {
    #[serde(rename = "@resourcely/tenant")]
    tenant: String,
}

/// Read the tenant claim from an auth token without verifying it.
///
/// A well-formed token without the claim yields an empty tenant.
pub fn tenant_from_token(token: &str) -> Result<String> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    let [header, payload, _signature] = segments.as_slice() else {
        return Err(Error::InvalidToken(format!(
            "token contains an invalid number of segments ({})",
            segments.len()
        )));
    };

    decode_segment::<serde_json::Map<String, serde_json::Value>>(header, "header")?;
    let claims: Claims = decode_segment(payload, "claims")?;
    Ok(claims.tenant)
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str, what: &str) -> Result<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| Error::InvalidToken(format!("could not base64 decode {what}: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::InvalidToken(format!("could not JSON decode {what}: {e}")))
}

/// Check `tenant` against an allow-list, ignoring ASCII case.
pub fn ensure_tenant_allowed(tenant: &str, allowed: &[impl AsRef<str>]) -> Result<()> {
    if allowed
        .iter()
        .any(|candidate| candidate.as_ref().eq_ignore_ascii_case(tenant))
    {
        return Ok(());
    }
    Err(Error::TenantNotAllowed {
        tenant: tenant.to_string(),
        allowed: allowed.iter().map(|a| a.as_ref().to_string()).collect(),
    })
}

#[cfg(test)]
pub(crate) fn unsigned_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_reads_tenant_claim() {
        let token = unsigned_token(&json!({"@resourcely/tenant": "acme", "sub": "u1", "exp": 1}));
        assert_eq!(tenant_from_token(&token).unwrap(), "acme");
    }

    #[test]
    fn test_missing_claim_is_empty() {
        let token = unsigned_token(&json!({"sub": "u1"}));
        assert_eq!(tenant_from_token(&token).unwrap(), "");
    }

    #[test]
    fn test_padded_payload_accepted() {
        let token = unsigned_token(&json!({"@resourcely/tenant": "ab"}));
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        while parts[1].len() % 4 != 0 {
            parts[1].push('=');
        }
        assert_eq!(tenant_from_token(&parts.join(".")).unwrap(), "ab");
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        assert_matches!(tenant_from_token("not-a-token"), Err(Error::InvalidToken(_)));
        assert_matches!(tenant_from_token("a.b"), Err(Error::InvalidToken(_)));
        assert_matches!(tenant_from_token("e30.!!!.sig"), Err(Error::InvalidToken(_)));

        let not_json = format!("e30.{}.sig", URL_SAFE_NO_PAD.encode("plain text"));
        assert_matches!(tenant_from_token(&not_json), Err(Error::InvalidToken(_)));
    }

    #[test]
    fn test_tenant_allow_list() {
        assert!(ensure_tenant_allowed("acme", &["other", "ACME"]).is_ok());

        let err = ensure_tenant_allowed("acme", &["other"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Resourcely tenant not allowed: acme. Allowed tenants are ["other"]"#
        );
    }
}
