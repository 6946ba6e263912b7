//! Category Module
//!
//! Closed classification of cached analysis data and the TTL bound to each class.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

const HOUR_SECS: u64 = 60 * 60;
const DAY_SECS: u64 = 24 * HOUR_SECS;

// == Category ==
/// Kind of data held by a cache entry. Governs which TTL applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Scraped product listing data
    Product,
    /// Seller reputation data
    Seller,
    /// Historical price series
    PriceHistory,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 3] = [Category::Product, Category::Seller, Category::PriceHistory];

    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Product => "PRODUCT",
            Category::Seller => "SELLER",
            Category::PriceHistory => "PRICE_HISTORY",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CacheError;

    /// Parses case-insensitively; `-` is accepted in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "PRODUCT" => Ok(Category::Product),
            "SELLER" => Ok(Category::Seller),
            "PRICE_HISTORY" => Ok(Category::PriceHistory),
            _ => Err(CacheError::InvalidCategory(s.to_string())),
        }
    }
}

// == Category TTL Table ==
/// Time-to-live per category. One field per variant so the table can never
/// be partially populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTtls {
    pub product: Duration,
    pub seller: Duration,
    pub price_history: Duration,
}

impl CategoryTtls {
    /// Returns the TTL configured for `category`.
    pub fn ttl_for(&self, category: Category) -> Duration {
        match category {
            Category::Product => self.product,
            Category::Seller => self.seller,
            Category::PriceHistory => self.price_history,
        }
    }

    /// TTL in milliseconds, saturating at `u64::MAX`.
    pub fn ttl_ms(&self, category: Category) -> u64 {
        u64::try_from(self.ttl_for(category).as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for CategoryTtls {
    fn default() -> Self {
        Self {
            product: Duration::from_secs(DAY_SECS),
            seller: Duration::from_secs(7 * DAY_SECS),
            price_history: Duration::from_secs(30 * DAY_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls() {
        let ttls = CategoryTtls::default();
        assert_eq!(ttls.ttl_for(Category::Product), Duration::from_secs(86_400));
        assert_eq!(ttls.ttl_for(Category::Seller), Duration::from_secs(604_800));
        assert_eq!(
            ttls.ttl_for(Category::PriceHistory),
            Duration::from_secs(2_592_000)
        );
        assert_eq!(ttls.ttl_ms(Category::Product), 86_400_000);
    }

    #[test]
    fn test_parse_category() {
        assert_eq!("product".parse::<Category>().unwrap(), Category::Product);
        assert_eq!("SELLER".parse::<Category>().unwrap(), Category::Seller);
        assert_eq!(
            "price-history".parse::<Category>().unwrap(),
            Category::PriceHistory
        );
        assert!(matches!(
            "shipping".parse::<Category>(),
            Err(CacheError::InvalidCategory(_))
        ));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Category::PriceHistory).unwrap();
        assert_eq!(json, "\"PRICE_HISTORY\"");
        let back: Category = serde_json::from_str("\"SELLER\"").unwrap();
        assert_eq!(back, Category::Seller);
    }

    #[test]
    fn test_display_matches_as_str() {
        for category in Category::ALL {
            assert_eq!(category.to_string(), category.as_str());
        }
    }
}
