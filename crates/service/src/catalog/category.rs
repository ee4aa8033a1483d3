use serde::{Deserialize, Serialize};

use models::category;

use crate::crud::{CrudService, Resource, Validate};
use crate::errors::ServiceError;
use crate::store::{CategoryEntity, SeaOrmCategoryStore};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: Option<i32>,
    #[serde(default)]
    pub name: String,
}

impl CategoryDto {
    pub fn named(name: impl Into<String>) -> Self { Self { id: None, name: name.into() } }
}

impl From<&category::Model> for CategoryDto {
    fn from(m: &category::Model) -> Self { Self { id: Some(m.id), name: m.name.clone() } }
}

impl Validate for CategoryDto {
    fn validate(&self) -> Result<(), ServiceError> {
        category::validate_name(&self.name)?;
        Ok(())
    }
}

pub struct Categories;

impl Resource for Categories {
    const NAME: &'static str = "category";

    type Entity = CategoryEntity;
    type Store = SeaOrmCategoryStore;
    type Dto = CategoryDto;
    type InsertDto = CategoryDto;
    type UpdateDto = CategoryDto;

    fn to_dto(entity: &CategoryEntity) -> CategoryDto {
        CategoryDto { id: entity.id, name: entity.name.clone() }
    }

    fn dto_id(dto: &CategoryDto) -> Option<i32> { dto.id }

    fn apply_insert(dto: &CategoryDto, entity: &mut CategoryEntity) -> Result<(), ServiceError> {
        entity.name = dto.name.clone();
        Ok(())
    }

    fn apply_update(dto: &CategoryDto, entity: &mut CategoryEntity) -> Result<(), ServiceError> {
        Self::apply_insert(dto, entity)
    }
}

pub type CategoryService = CrudService<Categories>;
