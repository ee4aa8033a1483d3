use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use models::product;

use super::category::CategoryDto;
use crate::crud::{CrudService, Resource, Validate};
use crate::errors::ServiceError;
use crate::store::{ProductEntity, Reference, SeaOrmProductStore};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDto {
    pub id: Option<i32>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub img_url: String,
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,
    /// Only `id` is read on input; output carries the category names.
    #[serde(default)]
    pub categories: Vec<CategoryDto>,
}

impl Validate for ProductDto {
    fn validate(&self) -> Result<(), ServiceError> {
        product::validate_name(&self.name)?;
        product::validate_description(&self.description)?;
        product::validate_price(self.price)?;
        product::validate_date(&self.date.into())?;
        if self.categories.iter().any(|c| c.id.is_none()) {
            return Err(ServiceError::validation("categories", "every category needs an id"));
        }
        Ok(())
    }
}

pub struct Products;

impl Resource for Products {
    const NAME: &'static str = "product";

    type Entity = ProductEntity;
    type Store = SeaOrmProductStore;
    type Dto = ProductDto;
    type InsertDto = ProductDto;
    type UpdateDto = ProductDto;

    fn to_dto(entity: &ProductEntity) -> ProductDto {
        ProductDto {
            id: entity.id,
            name: entity.name.clone(),
            description: entity.description.clone(),
            price: entity.price,
            img_url: entity.img_url.clone(),
            date: entity.date,
            categories: entity
                .categories
                .iter()
                .map(|c| c.loaded().map_or_else(|| CategoryDto { id: Some(c.id()), name: String::new() }, CategoryDto::from))
                .collect(),
        }
    }

    fn dto_id(dto: &ProductDto) -> Option<i32> { dto.id }

    fn apply_insert(dto: &ProductDto, entity: &mut ProductEntity) -> Result<(), ServiceError> {
        entity.name = dto.name.clone();
        entity.description = dto.description.clone();
        entity.price = dto.price;
        entity.img_url = dto.img_url.clone();
        entity.date = dto.date;
        entity.categories = dto.categories.iter().filter_map(|c| c.id).map(Reference::Lazy).collect();
        Ok(())
    }

    fn apply_update(dto: &ProductDto, entity: &mut ProductEntity) -> Result<(), ServiceError> {
        Self::apply_insert(dto, entity)
    }
}

pub type ProductService = CrudService<Products>;
