//! Catalog entities - mattress models and purchase sources

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mattress model catalog entry. Immutable after creation except for the
/// active flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MattressModel {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub warranty_months: u32,
    pub released_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl MattressModel {
    /// Check whether a purchase date is valid against the model's release date
    pub fn allows_purchase_on(&self, purchase_date: DateTime<Utc>) -> bool {
        match self.released_at {
            Some(released_at) => purchase_date >= released_at,
            None => true,
        }
    }
}

/// Where a product was bought
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Online,
    Store,
    Dealer,
}

impl SourceType {
    /// Database representation
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Store => "store",
            Self::Dealer => "dealer",
        }
    }

    /// Parse from the database representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "online" => Some(Self::Online),
            "store" => Some(Self::Store),
            "dealer" => Some(Self::Dealer),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Purchase source catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseSource {
    pub id: Uuid,
    pub name: String,
    pub source_type: SourceType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn model(released_at: Option<DateTime<Utc>>) -> MattressModel {
        MattressModel {
            id: Uuid::new_v4(),
            name: "Cloud Nine".to_string(),
            slug: "cloud-nine".to_string(),
            description: None,
            warranty_months: 120,
            released_at,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_purchase_before_release_is_rejected() {
        let released = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let m = model(Some(released));

        assert!(!m.allows_purchase_on(released - chrono::Duration::days(1)));
        assert!(m.allows_purchase_on(released));
        assert!(m.allows_purchase_on(released + chrono::Duration::days(30)));
    }

    #[test]
    fn test_model_without_release_date_allows_any_purchase() {
        let m = model(None);
        let long_ago = Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap();
        assert!(m.allows_purchase_on(long_ago));
    }

    #[test]
    fn test_source_type_round_trip() {
        assert_eq!(SourceType::parse("online"), Some(SourceType::Online));
        assert_eq!(SourceType::parse("store"), Some(SourceType::Store));
        assert_eq!(SourceType::parse("dealer"), Some(SourceType::Dealer));
        assert_eq!(SourceType::parse("mail"), None);
        assert_eq!(SourceType::Dealer.as_str(), "dealer");
    }
}
