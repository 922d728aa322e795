//! Session Entity
//!
//! Opaque bearer sessions. The token doubles as the document ID so lookups
//! are a single keyed read.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use base64::Engine;
use rand::RngCore;

/// Random bytes per token before encoding
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque bearer token
    #[serde(rename = "_id")]
    pub token: String,

    pub user_id: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn open(user_id: impl Into<String>) -> Self {
        Self {
            token: generate_token(),
            user_id: user_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// URL-safe random token from the OS RNG
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_and_url_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        // 32 bytes base64url without padding
        assert_eq!(a.len(), 43);
    }
}
