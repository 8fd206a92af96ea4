//! HS256 token issuance.
//!
//! A token is `base64url(header) "." base64url(claims) "." base64url(mac)` where
//! `mac` is HMAC-SHA256 over the first two encoded segments joined by a single dot.

use std::fmt;

use hmac::{Hmac, Mac};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::Sha256;

use crate::claims::{ChannelClaims, ConnectionClaims, Header};
use crate::encoding::{base64_decode, base64_encode};
use crate::error::TokenError;

type HmacSha256 = Hmac<Sha256>;

fn keyed_mac(key: &[u8]) -> HmacSha256 {
    let Ok(mac) = HmacSha256::new_from_slice(key) else {
        unreachable!("HMAC accepts keys of any length");
    };
    mac
}

/// HMAC-SHA256 of `message` under `key`, raw digest.
pub fn sign(message: &[u8], key: &[u8]) -> [u8; 32] {
    let mut mac = keyed_mac(key);
    mac.update(message);
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    digest
}

// --- Secret ---

/// Signing secret shared with the broker. `Debug` never prints the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(<{} bytes>)", self.0.len())
    }
}

// --- Token ---

/// The three raw segments of an issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub header: String,
    pub claims: String,
    pub signature: String,
}

impl Token {
    pub fn split(token: &str) -> Result<Self, TokenError> {
        let parts: Vec<&str> = token.split('.').collect();
        let [header, claims, signature] = parts.as_slice() else {
            return Err(TokenError::SegmentCount(parts.len()));
        };
        Ok(Self {
            header: header.to_string(),
            claims: claims.to_string(),
            signature: signature.to_string(),
        })
    }

    /// The bytes covered by the signature.
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.claims)
    }

    pub fn decode_header(&self) -> Result<Header, TokenError> {
        decode_segment(&self.header)
    }

    pub fn decode_claims<T: DeserializeOwned>(&self) -> Result<T, TokenError> {
        decode_segment(&self.claims)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.header, self.claims, self.signature)
    }
}

/// Decode one base64url JSON segment.
pub fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = base64_decode(segment)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn encode_segment<T: Serialize>(value: &T) -> String {
    // Header and claim structs only hold strings, integers and JSON values.
    let json = serde_json::to_vec(value).unwrap_or_default();
    base64_encode(&json)
}

// --- TokenSigner ---

/// Issues connection and channel tokens signed with one secret.
#[derive(Debug, Clone)]
pub struct TokenSigner {
    secret: Secret,
}

impl TokenSigner {
    pub fn new(secret: Secret) -> Self {
        Self { secret }
    }

    /// Build a signer straight from raw secret bytes.
    pub fn from_bytes(secret: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        Ok(Self::new(Secret::new(secret)?))
    }

    /// Token for opening a connection as `user`.
    ///
    /// `expiry` is a unix timestamp; `0` issues a non-expiring token.
    /// `info` is attached verbatim unless it is `null` or `""`.
    pub fn issue_connection_token(&self, user: &str, expiry: i64, info: &Value) -> String {
        self.issue(&ConnectionClaims::new(user, expiry, info))
    }

    /// Token for subscribing connection `client` to `channel`.
    pub fn issue_channel_token(&self, client: &str, channel: &str, info: &Value) -> String {
        self.issue(&ChannelClaims::new(client, channel, info))
    }

    fn issue<C: Serialize>(&self, claims: &C) -> String {
        let header = encode_segment(&Header::default());
        let claims = encode_segment(claims);
        let signing_input = format!("{header}.{claims}");
        let mac = sign(signing_input.as_bytes(), self.secret.as_bytes());
        let signature = base64_encode(&mac);
        format!("{signing_input}.{signature}")
    }

    /// Check that `token` was signed with this signer's secret.
    ///
    /// Only the signature is checked; claims such as `exp` are left to the caller.
    pub fn verify(&self, token: &Token) -> Result<(), TokenError> {
        let expected = base64_decode(&token.signature)?;
        let mut mac = keyed_mac(self.secret.as_bytes());
        mac.update(token.signing_input().as_bytes());
        mac.verify_slice(&expected)
            .map_err(|_| TokenError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signer() -> TokenSigner {
        TokenSigner::from_bytes("secret").unwrap()
    }

    #[test]
    fn hmac_matches_rfc4231_case_2() {
        let mac = sign(b"what do ya want for nothing?", b"Jefe");
        let hex: String = mac.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(
            hex,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn empty_secret_rejected() {
        assert!(matches!(
            TokenSigner::from_bytes(""),
            Err(TokenError::EmptySecret)
        ));
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = Secret::new("hunter2").unwrap();
        let debug = format!("{secret:?}");
        assert!(!debug.contains("hunter2"));
        assert_eq!(debug, "Secret(<7 bytes>)");
    }

    #[test]
    fn connection_token_has_three_segments() {
        let token = signer().issue_connection_token("123", 0, &json!(""));
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn connection_token_header_is_constant() {
        let token = signer().issue_connection_token("123", 0, &json!(""));
        let parsed = Token::split(&token).unwrap();
        assert_eq!(parsed.header, "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9");
        assert_eq!(parsed.decode_header().unwrap(), Header::default());
    }

    #[test]
    fn connection_token_claims_roundtrip() {
        let token = signer().issue_connection_token("123", 1_700_000_600, &json!("extra"));
        let claims: ConnectionClaims = Token::split(&token).unwrap().decode_claims().unwrap();
        assert_eq!(claims.sub, "123");
        assert_eq!(claims.exp, Some(1_700_000_600));
        assert_eq!(claims.info, Some(json!("extra")));
    }

    #[test]
    fn zero_expiry_and_empty_info_are_omitted() {
        let token = signer().issue_connection_token("7", 0, &json!(""));
        let claims: Value = Token::split(&token).unwrap().decode_claims().unwrap();
        assert_eq!(claims, json!({"sub": "7"}));
    }

    #[test]
    fn channel_token_claims_roundtrip() {
        let token = signer().issue_channel_token("client-1", "$room", &Value::Null);
        let claims: ChannelClaims = Token::split(&token).unwrap().decode_claims().unwrap();
        assert_eq!(claims.channel, "$room");
        assert_eq!(claims.client, "client-1");
        assert!(claims.info.is_none());
    }

    #[test]
    fn signature_covers_signing_input() {
        let token = signer().issue_channel_token("c", "ch", &Value::Null);
        let parsed = Token::split(&token).unwrap();
        let expected = base64_encode(&sign(parsed.signing_input().as_bytes(), b"secret"));
        assert_eq!(parsed.signature, expected);
    }

    #[test]
    fn issuance_is_deterministic() {
        let a = signer().issue_connection_token("1", 10, &json!({"a": 1}));
        let b = signer().issue_connection_token("1", 10, &json!({"a": 1}));
        assert_eq!(a, b);
    }

    #[test]
    fn verify_accepts_own_tokens() {
        let s = signer();
        let token = s.issue_connection_token("1", 0, &Value::Null);
        assert!(s.verify(&Token::split(&token).unwrap()).is_ok());
    }

    #[test]
    fn verify_rejects_other_secret() {
        let token = signer().issue_connection_token("1", 0, &Value::Null);
        let other = TokenSigner::from_bytes("other").unwrap();
        assert!(matches!(
            other.verify(&Token::split(&token).unwrap()),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn verify_rejects_tampered_claims() {
        let s = signer();
        let token = s.issue_connection_token("1", 0, &Value::Null);
        let mut parsed = Token::split(&token).unwrap();
        parsed.claims = base64_encode(br#"{"sub":"2"}"#);
        assert!(matches!(
            s.verify(&parsed),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn split_rejects_wrong_segment_count() {
        assert!(matches!(
            Token::split("a.b"),
            Err(TokenError::SegmentCount(2))
        ));
        assert!(matches!(
            Token::split("a.b.c.d"),
            Err(TokenError::SegmentCount(4))
        ));
    }

    #[test]
    fn display_reassembles_token() {
        let token = signer().issue_channel_token("c", "ch", &json!("i"));
        assert_eq!(Token::split(&token).unwrap().to_string(), token);
    }
}
