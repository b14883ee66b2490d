use std::str::FromStr;

use crate::error::ModelError;

/// Server-assigned listing identity. Immutable once the listing exists.
///
/// Photos have no identity of their own; they are addressed through the
/// listing they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ListingId(u64);

impl ListingId {
    pub const fn new(id: u64) -> Self {
        ListingId(id)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ListingId {
    fn from(id: u64) -> Self {
        ListingId(id)
    }
}

impl FromStr for ListingId {
    type Err = ModelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidListingId(raw.to_string()));
        }
        trimmed
            .parse::<u64>()
            .map(ListingId)
            .map_err(|_| ModelError::InvalidListingId(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_integer_ids() {
        assert_eq!(" 7 ".parse::<ListingId>(), Ok(ListingId::new(7)));
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!(matches!(
            "seven".parse::<ListingId>(),
            Err(ModelError::InvalidListingId(_))
        ));
        assert!("".parse::<ListingId>().is_err());
    }
}
