//! Two-legged OAuth 1.0 signing.
//!
//! Only the consumer key/secret pair is used: no request or access token, so the
//! signing key is `enc(consumer_secret) + "&"`. Percent-encoding follows RFC 3986
//! (everything except `A-Z a-z 0-9 - _ . ~` is encoded).

use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::Sha256;

use crate::models::{is_set, CredentialBundle};
use crate::proxy::common::utils::generate_nonce;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

pub const OAUTH_VERSION: &str = "1.0";

/// HMAC digest used for `oauth_signature`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignatureMethod {
    #[default]
    #[serde(rename = "HMAC-SHA1", alias = "hmac-sha1")]
    HmacSha1,
    #[serde(rename = "HMAC-SHA256", alias = "hmac-sha256")]
    HmacSha256,
}

impl SignatureMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureMethod::HmacSha1 => "HMAC-SHA1",
            SignatureMethod::HmacSha256 => "HMAC-SHA256",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "HMAC-SHA1" => Some(SignatureMethod::HmacSha1),
            "HMAC-SHA256" => Some(SignatureMethod::HmacSha256),
            _ => None,
        }
    }

    /// base64(HMAC(key, message))
    pub fn sign(&self, key: &str, message: &str) -> Result<String, String> {
        let digest = match self {
            SignatureMethod::HmacSha1 => {
                let mut mac = HmacSha1::new_from_slice(key.as_bytes())
                    .map_err(|e| format!("Invalid signing key: {}", e))?;
                mac.update(message.as_bytes());
                mac.finalize().into_bytes().to_vec()
            }
            SignatureMethod::HmacSha256 => {
                let mut mac = HmacSha256::new_from_slice(key.as_bytes())
                    .map_err(|e| format!("Invalid signing key: {}", e))?;
                mac.update(message.as_bytes());
                mac.finalize().into_bytes().to_vec()
            }
        };
        Ok(general_purpose::STANDARD.encode(digest))
    }
}

/// Per-request nonce and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthNonce {
    pub nonce: String,
    /// Unix seconds
    pub timestamp: i64,
}

impl OAuthNonce {
    pub fn generate() -> Self {
        Self {
            nonce: generate_nonce(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// `METHOD&enc(url)&enc(sorted params)`
pub fn signature_base_string(method: &str, url: &str, params: &[(&str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let param_string = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

/// Build the `OAuth ...` Authorization header.
///
/// Header parameters keep insertion order with `oauth_signature` last.
pub fn oauth1_header(
    bundle: &CredentialBundle,
    url: &str,
    method: &str,
    signature_method: SignatureMethod,
    nonce: &OAuthNonce,
) -> Result<String, String> {
    if !is_set(&bundle.consumer_secret) {
        return Err("consumer secret is empty".to_string());
    }

    let mut params: Vec<(&str, String)> = vec![
        ("oauth_consumer_key", bundle.consumer_key.clone()),
        ("oauth_nonce", nonce.nonce.clone()),
        ("oauth_signature_method", signature_method.as_str().to_string()),
        ("oauth_timestamp", nonce.timestamp.to_string()),
        ("oauth_version", OAUTH_VERSION.to_string()),
    ];

    let base_string = signature_base_string(method, url, &params);
    let signing_key = format!("{}&", percent_encode(&bundle.consumer_secret));
    let signature = signature_method.sign(&signing_key, &base_string)?;
    params.push(("oauth_signature", signature));

    let header = params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {}", header))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://123456.suitetalk.api.netsuite.com/services/rest/record/v1/customer/123";

    fn oauth_bundle() -> CredentialBundle {
        CredentialBundle {
            account_id: "123456".to_string(),
            consumer_key: "ck".to_string(),
            consumer_secret: "c&s".to_string(),
            ..Default::default()
        }
    }

    fn fixed_nonce() -> OAuthNonce {
        OAuthNonce {
            nonce: "00112233445566778899aabbccddeeff".to_string(),
            timestamp: 1_700_000_000,
        }
    }

    /// Pull `key="value"` out of the header and percent-decode the value
    fn header_param(header: &str, key: &str) -> String {
        let prefix = format!("{}=\"", key);
        let start = header.find(&prefix).unwrap() + prefix.len();
        let end = start + header[start..].find('"').unwrap();
        urlencoding::decode(&header[start..end]).unwrap().into_owned()
    }

    #[test]
    fn test_hmac_known_vectors() {
        let msg = "The quick brown fox jumps over the lazy dog";
        assert_eq!(
            SignatureMethod::HmacSha1.sign("key", msg).unwrap(),
            "3nybhbi3iqa8ino29wqQcBydtNk="
        );
        assert_eq!(
            SignatureMethod::HmacSha256.sign("key", msg).unwrap(),
            "97yD9DBThCSxMpjmqm+xQ+9NWaFJRhdZl0edvC0aPNg="
        );
    }

    #[test]
    fn test_base_string_sorts_and_encodes() {
        let params = vec![
            ("oauth_version", "1.0".to_string()),
            ("oauth_consumer_key", "ck".to_string()),
        ];
        assert_eq!(
            signature_base_string("get", "https://h/a b", &params),
            "GET&https%3A%2F%2Fh%2Fa%20b&oauth_consumer_key%3Dck%26oauth_version%3D1.0"
        );
    }

    #[test]
    fn test_header_is_deterministic_for_fixed_inputs() {
        let bundle = oauth_bundle();
        let a = oauth1_header(&bundle, URL, "GET", SignatureMethod::HmacSha1, &fixed_nonce()).unwrap();
        let b = oauth1_header(&bundle, URL, "GET", SignatureMethod::HmacSha1, &fixed_nonce()).unwrap();
        assert_eq!(a, b);
        assert_eq!(header_param(&a, "oauth_signature"), "o9v0Z1eDenW2JKQub91jK0fE0sc=");
    }

    #[test]
    fn test_signature_verifies_against_independent_hmac() {
        let bundle = oauth_bundle();
        let nonce = fixed_nonce();
        let header = oauth1_header(&bundle, URL, "post", SignatureMethod::HmacSha1, &nonce).unwrap();

        let param_string = format!(
            "oauth_consumer_key=ck&oauth_nonce={}&oauth_signature_method=HMAC-SHA1&oauth_timestamp={}&oauth_version=1.0",
            nonce.nonce, nonce.timestamp
        );
        let base_string = format!(
            "POST&{}&{}",
            urlencoding::encode(URL),
            urlencoding::encode(&param_string)
        );
        let mut mac = HmacSha1::new_from_slice(b"c%26s&").unwrap();
        mac.update(base_string.as_bytes());
        let expected = general_purpose::STANDARD.encode(mac.finalize().into_bytes());

        assert_eq!(header_param(&header, "oauth_signature"), expected);
    }

    #[test]
    fn test_header_keeps_insertion_order() {
        let header = oauth1_header(
            &oauth_bundle(),
            URL,
            "GET",
            SignatureMethod::HmacSha1,
            &fixed_nonce(),
        )
        .unwrap();

        assert!(header.starts_with("OAuth oauth_consumer_key=\"ck\", oauth_nonce=\""));
        let keys: Vec<&str> = header["OAuth ".len()..]
            .split(", ")
            .map(|pair| pair.split('=').next().unwrap())
            .collect();
        assert_eq!(
            keys,
            vec![
                "oauth_consumer_key",
                "oauth_nonce",
                "oauth_signature_method",
                "oauth_timestamp",
                "oauth_version",
                "oauth_signature",
            ]
        );
        // base64 padding and '+' / '/' must be encoded inside the quotes
        assert!(header.contains("oauth_signature=\"o9v0Z1eDenW2JKQub91jK0fE0sc%3D\""));
    }

    #[test]
    fn test_sha256_method_is_advertised() {
        let header = oauth1_header(
            &oauth_bundle(),
            URL,
            "GET",
            SignatureMethod::HmacSha256,
            &fixed_nonce(),
        )
        .unwrap();
        assert_eq!(header_param(&header, "oauth_signature_method"), "HMAC-SHA256");
        // 32-byte digest -> 44 base64 chars
        assert_eq!(header_param(&header, "oauth_signature").len(), 44);
    }

    #[test]
    fn test_signature_changes_with_method_and_url() {
        let bundle = oauth_bundle();
        let nonce = fixed_nonce();
        let get = oauth1_header(&bundle, URL, "GET", SignatureMethod::HmacSha1, &nonce).unwrap();
        let post = oauth1_header(&bundle, URL, "POST", SignatureMethod::HmacSha1, &nonce).unwrap();
        let other = oauth1_header(&bundle, "https://x/y", "GET", SignatureMethod::HmacSha1, &nonce).unwrap();
        assert_ne!(get, post);
        assert_ne!(get, other);
    }

    #[test]
    fn test_missing_consumer_secret_fails() {
        let mut bundle = oauth_bundle();
        bundle.consumer_secret.clear();
        let err = oauth1_header(&bundle, URL, "GET", SignatureMethod::HmacSha1, &fixed_nonce())
            .unwrap_err();
        assert_eq!(err, "consumer secret is empty");

        bundle.consumer_secret = " \t".to_string();
        let err = oauth1_header(&bundle, URL, "GET", SignatureMethod::HmacSha1, &fixed_nonce())
            .unwrap_err();
        assert_eq!(err, "consumer secret is empty");
    }

    #[test]
    fn test_empty_consumer_key_still_signs() {
        let mut bundle = oauth_bundle();
        bundle.consumer_key.clear();
        let header =
            oauth1_header(&bundle, URL, "GET", SignatureMethod::HmacSha1, &fixed_nonce()).unwrap();
        assert!(header.starts_with("OAuth oauth_consumer_key=\"\", oauth_nonce="));
        assert!(header.contains("oauth_signature="));
    }

    #[test]
    fn test_signature_method_parse() {
        assert_eq!(SignatureMethod::parse("hmac-sha256"), Some(SignatureMethod::HmacSha256));
        assert_eq!(SignatureMethod::parse(" HMAC-SHA1 "), Some(SignatureMethod::HmacSha1));
        assert_eq!(SignatureMethod::parse("PLAINTEXT"), None);
    }

    #[test]
    fn test_generated_nonce_is_fresh() {
        let a = OAuthNonce::generate();
        let b = OAuthNonce::generate();
        assert_ne!(a.nonce, b.nonce);
        assert!(a.timestamp > 1_600_000_000);
    }
}
