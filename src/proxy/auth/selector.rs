use serde::Serialize;

use super::oauth1::{OAuthNonce, SignatureMethod};
use super::schemes::AuthSchemeKind;
use crate::error::ProxyError;
use crate::models::CredentialBundle;

/// Header chosen for one downstream call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAuth {
    pub header: String,
    pub scheme: AuthSchemeKind,
}

/// Why a scheme in the chain was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemeFailure {
    pub scheme: AuthSchemeKind,
    pub error: String,
}

/// Ordered fallback chain of authentication schemes
#[derive(Debug, Clone)]
pub struct AuthSelector {
    chain: Vec<AuthSchemeKind>,
    signature_method: SignatureMethod,
}

impl AuthSelector {
    pub fn new(chain: Vec<AuthSchemeKind>, signature_method: SignatureMethod) -> Self {
        Self {
            chain,
            signature_method,
        }
    }

    pub fn chain(&self) -> &[AuthSchemeKind] {
        &self.chain
    }

    /// Pick the first scheme that can produce a header, with a fresh nonce/timestamp
    pub fn select(
        &self,
        bundle: &CredentialBundle,
        url: &str,
        method: &str,
    ) -> Result<SelectedAuth, ProxyError> {
        self.select_with(bundle, url, method, &OAuthNonce::generate())
    }

    /// Same as `select` with an injected nonce, so the result is a pure function of its inputs
    pub fn select_with(
        &self,
        bundle: &CredentialBundle,
        url: &str,
        method: &str,
        nonce: &OAuthNonce,
    ) -> Result<SelectedAuth, ProxyError> {
        let mut failures = Vec::with_capacity(self.chain.len());

        for &scheme in &self.chain {
            match scheme.header(bundle, url, method, self.signature_method, nonce) {
                Ok(header) => {
                    if !failures.is_empty() {
                        tracing::debug!(
                            "Auth scheme {} selected after {} fallback(s)",
                            scheme,
                            failures.len()
                        );
                    }
                    return Ok(SelectedAuth { header, scheme });
                }
                Err(error) => {
                    tracing::debug!("Auth scheme {} unavailable: {}", scheme, error);
                    failures.push(SchemeFailure { scheme, error });
                }
            }
        }

        Err(ProxyError::AuthSetup { failures })
    }
}

impl Default for AuthSelector {
    fn default() -> Self {
        Self::new(
            vec![AuthSchemeKind::Basic, AuthSchemeKind::OAuth1],
            SignatureMethod::HmacSha1,
        )
    }
}
