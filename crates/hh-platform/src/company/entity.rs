//! Company Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// A device-manufacturing company owned by exactly one company-owner user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Company name (unique)
    pub name: String,

    /// Logo URL (unique)
    pub logo_url: String,

    /// RUT tax identifier (unique)
    pub rut: String,

    /// Owning user ID
    pub owner_id: String,

    /// Owner display name (denormalized for listing filters)
    pub owner_name: String,

    /// Audit fields
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn new(
        name: impl Into<String>,
        logo_url: impl Into<String>,
        rut: impl Into<String>,
        owner_id: impl Into<String>,
        owner_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            name: name.into(),
            logo_url: logo_url.into(),
            rut: rut.into(),
            owner_id: owner_id.into(),
            owner_name: owner_name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
