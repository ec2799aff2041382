//! Immutable form state for the create-workgroup flow.
//!
//! Each edit returns a new [`WorkgroupForm`]; nothing is mutated in place,
//! so a host can keep the previous value for undo or compare states.

use crate::model::WorkgroupId;
use crate::model::field::{self, FieldError};
use crate::request::CreateWorkgroupRequest;

/// Editable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Description,
    /// Parent workgroup ID as typed; empty or `none` means a root.
    Parent,
}

/// Raw user input for a new workgroup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkgroupForm {
    name: String,
    description: String,
    parent: String,
}

impl WorkgroupForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with `field` set to `value`.
    #[must_use]
    pub fn with_field(&self, field: FormField, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut next = self.clone();
        match field {
            FormField::Name => next.name = value,
            FormField::Description => next.description = value,
            FormField::Parent => next.parent = value,
        }
        next
    }

    /// Return a copy targeting `parent` (`None` for a root).
    #[must_use]
    pub fn with_parent(&self, parent: Option<WorkgroupId>) -> Self {
        self.with_field(
            FormField::Parent,
            parent.map(|id| id.to_string()).unwrap_or_default(),
        )
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parsed parent ID.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] when the parent input is not an ID.
    pub fn parent(&self) -> Result<Option<WorkgroupId>, FieldError> {
        let raw = self.parent.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        raw.parse::<WorkgroupId>().map(Some).map_err(|_| {
            FieldError::new(
                "parent",
                format!("'{raw}' is not a workgroup ID"),
                "pick a parent from the list or leave it empty for a root",
            )
        })
    }

    /// Every field rule the current input breaks.
    #[must_use]
    pub fn errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Err(e) = field::validate_name(&self.name) {
            errors.push(e);
        }
        if let Err(e) = field::validate_description(&self.description) {
            errors.push(e);
        }
        if let Err(e) = self.parent() {
            errors.push(e);
        }
        errors
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    /// Build the create payload from valid input.
    ///
    /// # Errors
    ///
    /// Returns every [`FieldError`] when the input is invalid.
    pub fn to_create_request(&self) -> Result<CreateWorkgroupRequest, Vec<FieldError>> {
        let errors = self.errors();
        if !errors.is_empty() {
            return Err(errors);
        }
        let parent_id = self.parent().map_err(|e| vec![e])?;
        let description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        Ok(CreateWorkgroupRequest {
            name: self.name.clone(),
            description,
            parent_id,
        })
    }
}
