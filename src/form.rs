//! "Add record" form validation.
//!
//! Submitting the form only produces a confirmation message. Nothing is
//! written back to the source and the loaded table is left untouched.

use serde::{Deserialize, Serialize};

/// Minimum length of an asset tag, after trimming.
pub const MIN_ASSET_TAG_LEN: usize = 3;

/// Values entered in the add-record form. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecordForm {
    pub asset_tag: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please fill in all fields before adding the record.")]
    MissingFields { missing: Vec<&'static str> },

    #[error("Asset tag must be at least {min} characters long.", min = MIN_ASSET_TAG_LEN)]
    AssetTagTooShort,
}

/// An accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub asset_tag: String,
    pub location: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub message: String,
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl NewRecordForm {
    /// Check that every field is filled and the asset tag is long enough.
    pub fn validate(&self) -> Result<Confirmation, FormError> {
        let entries = [
            ("asset_tag", filled(&self.asset_tag)),
            ("location", filled(&self.location)),
            ("description", filled(&self.description)),
            ("priority", filled(&self.priority)),
            ("status", filled(&self.status)),
        ];
        let missing: Vec<&'static str> = entries
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect();

        let [
            (_, Some(asset_tag)),
            (_, Some(location)),
            (_, Some(description)),
            (_, Some(priority)),
            (_, Some(status)),
        ] = entries
        else {
            return Err(FormError::MissingFields { missing });
        };

        if asset_tag.chars().count() < MIN_ASSET_TAG_LEN {
            return Err(FormError::AssetTagTooShort);
        }

        let message = format!(
            "Record added: {} at {} - {} ({} priority, {})",
            asset_tag, location, description, priority, status
        );
        tracing::info!(asset_tag, "record submission accepted (not persisted)");

        Ok(Confirmation {
            asset_tag: asset_tag.to_string(),
            location: location.to_string(),
            description: description.to_string(),
            priority: priority.to_string(),
            status: status.to_string(),
            message,
        })
    }
}
