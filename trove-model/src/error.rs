use std::fmt::{self, Display};

/// Errors produced by model constructors and parsing routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    InvalidPrice(String),
    InvalidListingId(String),
    InvalidEmail(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidPrice(raw) => write!(f, "invalid price: {raw:?}"),
            ModelError::InvalidListingId(raw) => {
                write!(f, "invalid listing id: {raw:?}")
            }
            ModelError::InvalidEmail(raw) => {
                write!(f, "invalid owner email: {raw:?}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;

/// Form field a validation issue refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingField {
    Title,
    Price,
    Description,
    OwnerEmail,
    Photo,
}

impl Display for ListingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListingField::Title => "title",
            ListingField::Price => "price",
            ListingField::Description => "description",
            ListingField::OwnerEmail => "owner email",
            ListingField::Photo => "photo",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: ListingField,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: ListingField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Local input rejected before any request leaves the client.
///
/// Collects every offending field so a form can highlight all of them at once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn single(field: ListingField, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue::new(field, message)],
        }
    }

    pub fn push(&mut self, field: ListingField, message: impl Into<String>) {
        self.issues.push(FieldIssue::new(field, message));
    }

    pub fn merge(&mut self, other: ValidationError) {
        self.issues.extend(other.issues);
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn mentions(&self, field: ListingField) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }

    /// `Ok(())` when nothing was collected, otherwise `Err(self)`.
    pub fn into_result(self) -> std::result::Result<(), ValidationError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return f.write_str("validation failed");
        }
        let mut first = true;
        for issue in &self.issues {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", issue.field, issue.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
