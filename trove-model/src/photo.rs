use bytes::Bytes;
use image::ImageFormat;

use crate::error::{ListingField, ValidationError};

/// Photo bytes chosen by the user, waiting to be attached to a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub bytes: Bytes,
    pub file_name: String,
    pub content_type: Option<String>,
}

impl PhotoUpload {
    pub fn new(bytes: impl Into<Bytes>, file_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Format sniffed from the leading bytes.
    pub fn detected_format(&self) -> Option<ImageFormat> {
        image::guess_format(&self.bytes).ok()
    }

    /// Declared content type, else the one implied by the sniffed format.
    pub fn mime_type(&self) -> Option<String> {
        self.content_type.clone().or_else(|| {
            self.detected_format()
                .map(|format| format.to_mime_type().to_string())
        })
    }

    /// Only images are accepted as listing photos.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::single(
                ListingField::Photo,
                "photo is empty",
            ));
        }

        match self.content_type.as_deref() {
            Some(declared) if !declared.trim().to_ascii_lowercase().starts_with("image/") => {
                Err(ValidationError::single(
                    ListingField::Photo,
                    format!("photo must be an image, got {declared}"),
                ))
            }
            Some(_) => Ok(()),
            None if self.detected_format().is_some() => Ok(()),
            None => Err(ValidationError::single(
                ListingField::Photo,
                "photo is not a recognised image format",
            )),
        }
    }
}
