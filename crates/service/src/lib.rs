//! Service layer providing transactional CRUD over the catalog models.
//! - `crud` holds the generic service; `catalog` binds it to each resource.
//! - `store` is the persistence port, implemented with SeaORM.
//! - Store failures are turned into `ServiceError` by `translate`.

pub mod catalog;
pub mod crud;
pub mod errors;
pub mod pagination;
pub mod store;
pub mod translate;
#[cfg(test)]
pub mod test_support;

pub use catalog::{CategoryService, ProductService, UserService};
pub use crud::CrudService;
pub use errors::ServiceError;
pub use pagination::{Page, PageRequest, SortOrder};
