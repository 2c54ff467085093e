//! Query side: read-only handlers returning DTOs.

mod category;
mod dto;
mod product;

pub use category::{
    GetCategoriesQuery, GetCategoriesQueryHandler, GetCategoryByIdQuery, GetCategoryByIdQueryHandler,
};
pub use dto::{
    AttributeDto, CategoryAssociationDto, CategoryDto, ProductDetailsDto, ProductSummaryDto,
    VariantDto,
};
pub use product::{
    GetProductByIdQuery, GetProductByIdQueryHandler, GetProductsQuery, GetProductsQueryHandler,
};
