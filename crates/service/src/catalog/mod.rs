//! Resource kinds exposed by the catalog: categories, products and users.

pub mod category;
pub mod password;
pub mod product;
pub mod user;

pub use category::{Categories, CategoryDto, CategoryService};
pub use product::{ProductDto, ProductService, Products};
pub use user::{RoleDto, UserDto, UserInsertDto, UserService, Users};
