//! Catalog facets: bag categories and brands.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a category or brand name is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {facet}: {value}")]
pub struct ParseFacetError {
    /// Which facet was being parsed (`category` or `brand`).
    pub facet: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Bag category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Tote,
    Crossbody,
    Backpack,
    Clutch,
    Satchel,
    Hobo,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 6] = [
        Self::Tote,
        Self::Crossbody,
        Self::Backpack,
        Self::Clutch,
        Self::Satchel,
        Self::Hobo,
    ];

    /// Display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tote => "Tote",
            Self::Crossbody => "Crossbody",
            Self::Backpack => "Backpack",
            Self::Clutch => "Clutch",
            Self::Satchel => "Satchel",
            Self::Hobo => "Hobo",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ParseFacetError;

    /// Case-insensitive match against the display names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseFacetError {
                facet: "category",
                value: s.to_owned(),
            })
    }
}

/// Bag brand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Brand {
    ChicVogue,
    LuxeCarry,
    UrbanTote,
    #[serde(rename = "Eleganté", alias = "Elegante")]
    Elegante,
}

impl Brand {
    /// Every brand, in display order.
    pub const ALL: [Self; 4] = [Self::ChicVogue, Self::LuxeCarry, Self::UrbanTote, Self::Elegante];

    /// Display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChicVogue => "ChicVogue",
            Self::LuxeCarry => "LuxeCarry",
            Self::UrbanTote => "UrbanTote",
            Self::Elegante => "Eleganté",
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Brand {
    type Err = ParseFacetError;

    /// Case-insensitive; `Elegante` is accepted for the accented brand.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("elegante") {
            return Ok(Self::Elegante);
        }
        Self::ALL
            .into_iter()
            .find(|brand| brand.as_str().to_lowercase() == s.to_lowercase())
            .ok_or_else(|| ParseFacetError {
                facet: "brand",
                value: s.to_owned(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str_ignores_case() {
        assert_eq!("tote".parse::<Category>().unwrap(), Category::Tote);
        assert_eq!(" CLUTCH ".parse::<Category>().unwrap(), Category::Clutch);
    }

    #[test]
    fn test_category_from_str_unknown() {
        let err = "Duffel".parse::<Category>().unwrap_err();
        assert_eq!(err.to_string(), "unknown category: Duffel");
    }

    #[test]
    fn test_brand_accented_name() {
        assert_eq!("Eleganté".parse::<Brand>().unwrap(), Brand::Elegante);
        assert_eq!("elegante".parse::<Brand>().unwrap(), Brand::Elegante);
        assert_eq!(Brand::Elegante.to_string(), "Eleganté");
    }

    #[test]
    fn test_brand_serde_uses_display_name() {
        let json = serde_json::to_string(&Brand::Elegante).unwrap();
        assert_eq!(json, "\"Eleganté\"");
        let parsed: Brand = serde_json::from_str("\"Elegante\"").unwrap();
        assert_eq!(parsed, Brand::Elegante);
    }

    #[test]
    fn test_brand_unknown() {
        assert!("Gucci".parse::<Brand>().is_err());
    }
}
