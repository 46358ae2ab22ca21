use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::oauth1::{oauth1_header, OAuthNonce, SignatureMethod};
use crate::models::{is_set, CredentialBundle};

/// Candidate NetSuite authentication schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthSchemeKind {
    #[serde(rename = "basic")]
    Basic,
    #[serde(rename = "oauth1")]
    OAuth1,
    /// NetSuite login authentication (`NLAuth ...`)
    #[serde(rename = "nlauth")]
    LoginAuth,
}

impl AuthSchemeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthSchemeKind::Basic => "basic",
            AuthSchemeKind::OAuth1 => "oauth1",
            AuthSchemeKind::LoginAuth => "nlauth",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(AuthSchemeKind::Basic),
            "oauth1" | "oauth" => Some(AuthSchemeKind::OAuth1),
            "nlauth" | "loginauth" => Some(AuthSchemeKind::LoginAuth),
            _ => None,
        }
    }

    /// Compute this scheme's header value. Only OAuth1 looks at url/method/nonce.
    pub fn header(
        &self,
        bundle: &CredentialBundle,
        url: &str,
        method: &str,
        signature_method: SignatureMethod,
        nonce: &OAuthNonce,
    ) -> Result<String, String> {
        match self {
            AuthSchemeKind::Basic => basic_header(bundle),
            AuthSchemeKind::OAuth1 => oauth1_header(bundle, url, method, signature_method, nonce),
            AuthSchemeKind::LoginAuth => login_auth_header(bundle),
        }
    }
}

impl fmt::Display for AuthSchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Basic base64(username:password)`
pub fn basic_header(bundle: &CredentialBundle) -> Result<String, String> {
    if !is_set(&bundle.username) {
        return Err("username is empty".to_string());
    }
    if !is_set(&bundle.password) {
        return Err("password is empty".to_string());
    }
    let credentials = format!("{}:{}", bundle.username, bundle.password);
    Ok(format!("Basic {}", general_purpose::STANDARD.encode(credentials)))
}

/// `NLAuth nlauth_account=..., nlauth_email=..., nlauth_signature=..., nlauth_role=...`
pub fn login_auth_header(bundle: &CredentialBundle) -> Result<String, String> {
    let required = [
        ("account id", &bundle.account_id),
        ("username", &bundle.username),
        ("password", &bundle.password),
        ("role", &bundle.role),
    ];
    if let Some((name, _)) = required.iter().find(|(_, v)| !is_set(v)) {
        return Err(format!("{} is empty", name));
    }
    Ok(format!(
        "NLAuth nlauth_account={}, nlauth_email={}, nlauth_signature={}, nlauth_role={}",
        bundle.account_id, bundle.username, bundle.password, bundle.role
    ))
}
