//! Conditional Field Controller: the POID (point-of-delivery id) field is required only
//! for providers whose enrollment paperwork needs it.

use crate::errors::ValidationError;

/// Provider names must match the backend's provider sheet exactly.
pub const POID_REQUIRED_PROVIDERS: &[&str] = &["NYSEG", "RG&E"];

/// Offered when the backend cannot supply its provider list.
pub const DEFAULT_PROVIDERS: &[&str] = &["National Grid", "NYSEG", "RG&E"];

pub const REQUIRED_HINT: &str = "Point of Delivery ID (required for this utility)";
pub const OPTIONAL_HINT: &str = "Point of Delivery ID (optional)";
pub const REQUIRED_HINT_COLOR: &str = "#d9534f";
pub const OPTIONAL_HINT_COLOR: &str = "#666";

pub fn requires_poid(provider: &str) -> bool {
    POID_REQUIRED_PROVIDERS.contains(&provider)
}

/// Presentation state of the POID field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoidField {
    pub required: bool,
    pub marker_visible: bool,
    pub hint: &'static str,
    pub hint_color: &'static str,
}

impl Default for PoidField {
    fn default() -> Self {
        Self::for_requirement(false)
    }
}

impl PoidField {
    fn for_requirement(required: bool) -> Self {
        if required {
            Self {
                required: true,
                marker_visible: true,
                hint: REQUIRED_HINT,
                hint_color: REQUIRED_HINT_COLOR,
            }
        } else {
            Self {
                required: false,
                marker_visible: false,
                hint: OPTIONAL_HINT,
                hint_color: OPTIONAL_HINT_COLOR,
            }
        }
    }

    pub fn for_provider(provider: &str) -> Self {
        Self::for_requirement(requires_poid(provider))
    }

    /// Re-derives the whole field state from the newly selected provider.
    pub fn on_provider_change(&mut self, provider: &str) {
        *self = Self::for_provider(provider);
    }

    /// Blocks submission when the field is required and blank.
    pub fn check(&self, provider: &str, poid: &str) -> Result<(), ValidationError> {
        if self.required && poid.trim().is_empty() {
            return Err(ValidationError::MissingPoid {
                provider: provider.to_string(),
            });
        }
        Ok(())
    }
}
