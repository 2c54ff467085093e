//! Category command handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::instrument;
use validator::Validate;

use shopforge_catalog::Category;
use shopforge_core::{AggregateRoot, CategoryId};
use shopforge_events::EventBus;
use shopforge_infra::{DocumentBackend, DocumentEntity, UnitOfWork};

use crate::announce::{CatalogEnvelope, announce_catalog_events};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Validate)]
pub struct CreateCategoryCommand {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: String,
    /// When set, the new category is attached under this parent.
    pub parent_category_id: Option<CategoryId>,
}

/// Creates a root or sub category. Sub categories require an existing parent.
pub struct CreateCategoryCommandHandler<B> {
    backend: Arc<dyn DocumentBackend>,
    bus: B,
}

impl<B> CreateCategoryCommandHandler<B>
where
    B: EventBus<CatalogEnvelope>,
{
    pub fn new(backend: Arc<dyn DocumentBackend>, bus: B) -> Self {
        Self { backend, bus }
    }

    #[instrument(skip(self, command, cancel), fields(category_name = %command.name), err)]
    pub async fn handle(
        &self,
        command: CreateCategoryCommand,
        cancel: &CancellationToken,
    ) -> AppResult<CategoryId> {
        command.validate()?;

        let uow = UnitOfWork::new(self.backend.clone());
        let categories = uow.repository::<Category>();

        let mut category = match command.parent_category_id {
            Some(parent_id) => {
                if !categories.exists_by_id(*parent_id.as_uuid(), cancel).await? {
                    return Err(AppError::not_found("category", *parent_id.as_uuid()));
                }
                Category::create_sub(command.name, command.description, parent_id)?
            }
            None => Category::create_root(command.name, command.description)?,
        };

        categories.add(&category)?;
        uow.save_changes(cancel).await?;

        let category_id = *category.id();
        announce_catalog_events(
            &self.bus,
            Category::DOC_TYPE,
            *category_id.as_uuid(),
            category.revision() + 1,
            category.take_events(),
        );

        Ok(category_id)
    }
}

#[derive(Debug, Clone, Validate)]
pub struct UpdateCategoryCommand {
    pub category_id: CategoryId,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: String,
}

pub struct UpdateCategoryCommandHandler {
    backend: Arc<dyn DocumentBackend>,
}

impl UpdateCategoryCommandHandler {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    #[instrument(skip(self, command, cancel), fields(category_id = %command.category_id.as_uuid()), err)]
    pub async fn handle(
        &self,
        command: UpdateCategoryCommand,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        command.validate()?;

        let uow = UnitOfWork::new(self.backend.clone());
        let categories = uow.repository::<Category>();
        let mut category = categories
            .get_by_id(*command.category_id.as_uuid(), cancel)
            .await?
            .ok_or_else(|| AppError::not_found("category", *command.category_id.as_uuid()))?;

        category.update_details(command.name, command.description)?;

        categories.update(&category)?;
        uow.save_changes(cancel).await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DeleteCategoryCommand {
    pub category_id: CategoryId,
}

/// Deletes a category without guarding references from products; associations
/// embedded in product documents keep their denormalized name. Deleting an id
/// that never existed is a no-op.
pub struct DeleteCategoryCommandHandler {
    backend: Arc<dyn DocumentBackend>,
}

impl DeleteCategoryCommandHandler {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    #[instrument(skip(self, command, cancel), fields(category_id = %command.category_id.as_uuid()), err)]
    pub async fn handle(
        &self,
        command: DeleteCategoryCommand,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        let uow = UnitOfWork::new(self.backend.clone());
        uow.repository::<Category>()
            .delete_by_id(*command.category_id.as_uuid())?;
        uow.save_changes(cancel).await?;
        Ok(())
    }
}
