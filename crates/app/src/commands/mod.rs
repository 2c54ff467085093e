//! Command side: one handler per state-changing use case.

mod category;
mod product;

pub use category::{
    CreateCategoryCommand, CreateCategoryCommandHandler, DeleteCategoryCommand,
    DeleteCategoryCommandHandler, UpdateCategoryCommand, UpdateCategoryCommandHandler,
};
pub use product::{
    AttributeInput, CreateProductCommand, CreateProductCommandHandler, DeleteProductCommand,
    DeleteProductCommandHandler, UpdateProductCommand, UpdateProductCommandHandler, VariantInput,
};
