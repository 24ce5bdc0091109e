use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::middleware::ClientIp;
use crate::server::AppState;

/// Principal that passed the basic auth check, injected for downstream use
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
}

/// Username to secret-digest table. Secrets are compared as SHA-256 digests
/// so the comparison cost does not depend on how much of the secret matches.
#[derive(Clone)]
pub struct BasicCredentials {
    realm: String,
    digests: HashMap<String, [u8; 32]>,
}

impl BasicCredentials {
    pub fn from_config(security: &SecurityConfig) -> Self {
        let digests = security
            .credentials
            .iter()
            .map(|(user, secret)| (user.clone(), digest(secret)))
            .collect();
        Self {
            realm: security.realm.clone(),
            digests,
        }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn verify(&self, username: &str, secret: &str) -> bool {
        let offered = digest(secret);
        match self.digests.get(username) {
            Some(expected) => *expected == offered,
            None => false,
        }
    }

    fn reject(&self, message: &str) -> ApiError {
        ApiError::unauthorized(message, self.realm())
    }
}

fn digest(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}

/// Basic auth gate for the protected subtree. Every request re-authenticates;
/// nothing is remembered between requests.
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = &state.credentials;

    let (username, secret) = extract_basic_credentials(request.headers())
        .map_err(|msg| credentials.reject(msg))?;

    if !credentials.verify(&username, &secret) {
        let client = request.extensions().get::<ClientIp>().map(|ClientIp(ip)| *ip);
        tracing::warn!("Basic auth rejected for user '{}' from {:?}", username, client);
        return Err(credentials.reject("invalid credentials"));
    }

    tracing::debug!("Basic auth accepted for user '{}'", username);
    request.extensions_mut().insert(AuthUser { username });

    Ok(next.run(request).await)
}

/// Extract `(username, secret)` from an `Authorization: Basic ...` header
fn extract_basic_credentials(headers: &HeaderMap) -> Result<(String, String), &'static str> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or("missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "invalid Authorization header format")?;

    let encoded = match auth_str.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("basic") => rest.trim(),
        _ => return Err("Authorization header must use Basic scheme"),
    };

    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| "invalid Basic credentials encoding")?;
    let decoded = String::from_utf8(decoded).map_err(|_| "invalid Basic credentials encoding")?;

    let (username, secret) = decoded
        .split_once(':')
        .ok_or("Basic credentials must be user:secret")?;

    Ok((username.to_string(), secret.to_string()))
}
