// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Authorization-code flow with PKCE against the sync backend's OAuth server.

use crate::error::SyncError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

pub const AUTHORIZE_PATH: &str = "/api/authorize";
pub const REFRESH_PATH: &str = "/api/refresh";
pub const CODE_PARAM: &str = "authorizationCode";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeVerifier {
    pub code_challenge: String,
    pub code_verifier: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginReq {
    pub client_id: String,
    pub redirect: String,
    pub code_challenge: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeReq {
    pub code_verifier: String,
    pub authorization_code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReq {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommonResp {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub msg: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeResp {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResp {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub access_token: String,
}

pub fn base64_url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// S256 challenge for a verifier.
pub fn challenge_for(verifier: &str) -> String {
    base64_url(&Sha256::digest(verifier.as_bytes()))
}

/// `len` random bytes, base64url-encoded, as the verifier.
pub fn generate_challenge_verifier(len: usize) -> ChallengeVerifier {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    let code_verifier = base64_url(&bytes);
    ChallengeVerifier {
        code_challenge: challenge_for(&code_verifier),
        code_verifier,
    }
}

/// Where the user is sent to log in.
pub fn login_url(oauth_endpoint: &str, req: &LoginReq) -> Result<String, SyncError> {
    let base = format!("{}/login", oauth_endpoint.trim_end_matches('/'));
    let url = Url::parse_with_params(
        &base,
        &[
            ("clientId", req.client_id.as_str()),
            ("codeChallenge", req.code_challenge.as_str()),
            ("redirect", req.redirect.as_str()),
        ],
    )
    .map_err(|e| SyncError::BadUrl(format!("{}: {}", base, e)))?;
    Ok(url.to_string())
}

/// Accepts either the bare code or the full redirect URL carrying it.
pub fn extract_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    match Url::parse(input) {
        Ok(url) => url
            .query_pairs()
            .find(|(k, _)| k == CODE_PARAM)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty()),
        Err(_) => Some(input.to_string()),
    }
}

pub struct OAuthClient {
    oauth_endpoint: String,
    api_base: String,
    http: reqwest::blocking::Client,
}

impl OAuthClient {
    pub fn new(oauth_endpoint: &str, api_base: &str) -> Result<Self, SyncError> {
        Ok(OAuthClient {
            oauth_endpoint: oauth_endpoint.trim_end_matches('/').to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            http: crate::utils::http_client()?,
        })
    }

    pub fn authorize(&self, code_verifier: &str, code: &str) -> Result<AuthorizeResp, SyncError> {
        let req = AuthorizeReq {
            code_verifier: code_verifier.to_string(),
            authorization_code: code.to_string(),
        };
        debug!("exchanging authorization code");
        let resp: AuthorizeResp = self
            .http
            .post(format!("{}{}", self.api_base, AUTHORIZE_PATH))
            .json(&req)
            .send()?
            .error_for_status()?
            .json()?;
        if !resp.ok {
            return Err(SyncError::Rejected(resp.msg));
        }
        Ok(resp)
    }

    pub fn refresh(&self, refresh_token: &str) -> Result<RefreshResp, SyncError> {
        let req = RefreshReq {
            refresh_token: refresh_token.to_string(),
        };
        let resp: RefreshResp = self
            .http
            .post(format!("{}{}", self.api_base, REFRESH_PATH))
            .json(&req)
            .send()?
            .error_for_status()?
            .json()?;
        if !resp.ok {
            return Err(SyncError::Rejected(resp.msg));
        }
        Ok(resp)
    }

    pub fn verify(&self, access_token: &str) -> Result<CommonResp, SyncError> {
        let resp: CommonResp = self
            .http
            .post(format!("{}/api/auth/verify", self.oauth_endpoint))
            .json(&serde_json::json!({ "accessToken": access_token }))
            .send()?
            .error_for_status()?
            .json()?;
        Ok(resp)
    }
}
