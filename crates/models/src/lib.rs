pub mod errors;
pub mod db;
pub mod category;
pub mod product;
pub mod product_category;
pub mod role;
pub mod user;
pub mod user_role;
pub mod seed;

#[cfg(test)]
mod tests;
