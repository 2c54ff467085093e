use chrono::Utc;
use serde::{Deserialize, Serialize};

use shopforge_core::{AggregateRoot, CategoryId, DomainError, DomainResult};

use crate::events::{CatalogEvent, CategoryCreated};

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 500;

/// Aggregate root: a catalog category.
///
/// Hierarchy is expressed through `parent_category_id` alone; children are
/// found by querying for categories pointing at a parent, never by embedding
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: String,
    parent_category_id: Option<CategoryId>,
    is_active: bool,
    revision: u64,
    #[serde(skip)]
    events: Vec<CatalogEvent>,
}

impl Category {
    /// Create a top-level category.
    pub fn create_root(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> DomainResult<Self> {
        Self::create(name, description, None)
    }

    /// Create a category under an existing parent. The caller is responsible
    /// for verifying the parent actually exists.
    pub fn create_sub(
        name: impl Into<String>,
        description: impl Into<String>,
        parent_category_id: CategoryId,
    ) -> DomainResult<Self> {
        Self::create(name, description, Some(parent_category_id))
    }

    fn create(
        name: impl Into<String>,
        description: impl Into<String>,
        parent_category_id: Option<CategoryId>,
    ) -> DomainResult<Self> {
        let name = validate_name(name.into())?;
        let description = validate_description(description.into())?;

        let mut category = Self {
            id: CategoryId::new(),
            name,
            description,
            parent_category_id,
            is_active: true,
            revision: 0,
            events: Vec::new(),
        };

        category
            .events
            .push(CatalogEvent::CategoryCreated(CategoryCreated {
                category_id: category.id,
                name: category.name.clone(),
                occurred_at: Utc::now(),
            }));

        Ok(category)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parent_category_id(&self) -> Option<&CategoryId> {
        self.parent_category_id.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_root(&self) -> bool {
        self.parent_category_id.is_none()
    }

    pub fn update_details(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> DomainResult<()> {
        self.name = validate_name(name.into())?;
        self.description = validate_description(description.into())?;
        Ok(())
    }

    pub fn change_parent(&mut self, parent_category_id: Option<CategoryId>) -> DomainResult<()> {
        if parent_category_id.as_ref() == Some(&self.id) {
            return Err(DomainError::invariant("category cannot be its own parent"));
        }
        self.parent_category_id = parent_category_id;
        Ok(())
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn pending_events(&self) -> &[CatalogEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<CatalogEvent> {
        std::mem::take(&mut self.events)
    }
}

impl AggregateRoot for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

fn validate_name(name: String) -> DomainResult<String> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::validation("category name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "category name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

fn validate_description(description: String) -> DomainResult<String> {
    let description = description.trim().to_string();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(DomainError::validation(format!(
            "category description cannot exceed {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(description)
}
