use serde::{Deserialize, Serialize};

use shopforge_core::{DomainError, DomainResult, ValueObject};

const MAX_NAME_LEN: usize = 100;
const MAX_VALUE_LEN: usize = 500;

/// A named attribute on a product or variant (e.g. `Color: Red`).
///
/// Value object: two attributes are equal when their names and values match
/// case-insensitively. `Color: Red` and `color: red` are the same attribute.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct ProductAttribute {
    name: String,
    value: String,
}

impl ProductAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        let value = value.into().trim().to_string();

        if name.is_empty() {
            return Err(DomainError::validation("attribute name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "attribute name cannot exceed {MAX_NAME_LEN} characters"
            )));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || c == '-' || c == '_')
        {
            return Err(DomainError::validation(
                "attribute name can only contain letters, numbers, spaces, hyphens, and underscores",
            ));
        }
        if value.is_empty() {
            return Err(DomainError::validation("attribute value cannot be empty"));
        }
        if value.chars().count() > MAX_VALUE_LEN {
            return Err(DomainError::validation(format!(
                "attribute value cannot exceed {MAX_VALUE_LEN} characters"
            )));
        }

        Ok(Self { name, value })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Lower-cased name, the key used for duplicate detection.
    pub fn normalized_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Replace the value, keeping the name.
    pub fn update_value(&mut self, value: impl Into<String>) -> DomainResult<()> {
        let replacement = Self::new(self.name.clone(), value)?;
        self.value = replacement.value;
        Ok(())
    }
}

impl PartialEq for ProductAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name) && self.value.eq_ignore_ascii_case(&other.value)
    }
}

impl core::hash::Hash for ProductAttribute {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.name.to_lowercase().hash(state);
        self.value.to_lowercase().hash(state);
    }
}

impl core::fmt::Display for ProductAttribute {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

impl ValueObject for ProductAttribute {}
