use crate::error::{ListingField, ModelError, ValidationError};
use crate::ids::ListingId;
use crate::price::Price;

/// Default word budget for listing descriptions.
pub const DEFAULT_MAX_DESCRIPTION_WORDS: usize = 150;

/// Identity of the caller that owns (or will own) a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct OwnerEmail(String);

impl OwnerEmail {
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, ModelError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidEmail(raw.as_ref().to_string()));
        }
        Ok(OwnerEmail(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-owned listing record as the client sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub price: Price,
    pub description: String,
    pub owner_email: OwnerEmail,
}

/// Bounds applied when validating a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimits {
    pub max_description_words: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            max_description_words: DEFAULT_MAX_DESCRIPTION_WORDS,
        }
    }
}

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingDraft {
    pub title: String,
    pub price: String,
    pub description: String,
}

impl ListingDraft {
    pub fn new(
        title: impl Into<String>,
        price: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            price: price.into(),
            description: description.into(),
        }
    }

    /// Prefill an edit form from an existing listing.
    pub fn from_listing(listing: &Listing) -> Self {
        Self {
            title: listing.title.clone(),
            price: listing.price.to_string(),
            description: listing.description.clone(),
        }
    }

    /// Check every field and report all problems together.
    pub fn validate(&self, limits: &FieldLimits) -> Result<ListingFields, ValidationError> {
        let mut errors = ValidationError::default();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push(ListingField::Title, "title is required");
        }

        let price = if self.price.trim().is_empty() {
            errors.push(ListingField::Price, "price is required");
            None
        } else {
            match self.price.parse::<Price>() {
                Ok(price) => Some(price),
                Err(_) => {
                    errors.push(
                        ListingField::Price,
                        "price must be a non-negative amount with at most two decimals",
                    );
                    None
                }
            }
        };

        let description = self.description.trim();
        let words = description.split_whitespace().count();
        if description.is_empty() {
            errors.push(ListingField::Description, "description is required");
        } else if words > limits.max_description_words {
            errors.push(
                ListingField::Description,
                format!(
                    "description cannot exceed {} words (got {words})",
                    limits.max_description_words
                ),
            );
        }

        match (errors.into_result(), price) {
            (Ok(()), Some(price)) => Ok(ListingFields {
                title: title.to_string(),
                price,
                description: description.to_string(),
            }),
            (Err(errors), _) => Err(errors),
            // Unreachable in practice: a missing price always records an issue.
            (Ok(()), None) => Err(ValidationError::single(
                ListingField::Price,
                "price is required",
            )),
        }
    }
}

/// Listing fields that passed local validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFields {
    title: String,
    price: Price,
    description: String,
}

impl ListingFields {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}
