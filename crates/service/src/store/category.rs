use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::{NotSet, Set, Unchanged}, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter,
};

use models::category;

use super::{query::fetch_page, EntityStore, StoreError, StoreResult};
use crate::pagination::PageRequest;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryEntity {
    pub id: Option<i32>,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<category::Model> for CategoryEntity {
    fn from(m: category::Model) -> Self {
        Self {
            id: Some(m.id),
            name: m.name,
            created_at: Some(m.created_at.with_timezone(&Utc)),
            updated_at: m.updated_at.map(|t| t.with_timezone(&Utc)),
        }
    }
}

fn sort_column(field: &str) -> Option<category::Column> {
    match field {
        "id" => Some(category::Column::Id),
        "name" => Some(category::Column::Name),
        "created_at" | "createdAt" => Some(category::Column::CreatedAt),
        "updated_at" | "updatedAt" => Some(category::Column::UpdatedAt),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SeaOrmCategoryStore;

#[async_trait]
impl EntityStore for SeaOrmCategoryStore {
    type Entity = CategoryEntity;

    fn new_entity(&self) -> CategoryEntity { CategoryEntity::default() }

    fn get_reference(&self, id: i32) -> CategoryEntity {
        CategoryEntity { id: Some(id), ..CategoryEntity::default() }
    }

    async fn find_by_id(&self, tx: &DatabaseTransaction, id: i32) -> StoreResult<Option<CategoryEntity>> {
        Ok(category::Entity::find_by_id(id).one(tx).await?.map(CategoryEntity::from))
    }

    async fn save(&self, tx: &DatabaseTransaction, entity: CategoryEntity) -> StoreResult<CategoryEntity> {
        let now = Utc::now();
        let saved = match entity.id {
            None => {
                category::ActiveModel {
                    id: NotSet,
                    name: Set(entity.name),
                    created_at: Set(now.into()),
                    updated_at: Set(None),
                }
                .insert(tx)
                .await?
            }
            Some(id) => {
                category::ActiveModel {
                    id: Unchanged(id),
                    name: Set(entity.name),
                    created_at: NotSet,
                    updated_at: Set(Some(now.into())),
                }
                .update(tx)
                .await?
            }
        };
        Ok(saved.into())
    }

    async fn delete_by_id(&self, tx: &DatabaseTransaction, id: i32) -> StoreResult<()> {
        let res = category::Entity::delete_by_id(id).exec(tx).await?;
        if res.rows_affected == 0 {
            return Err(StoreError::RowAbsent(id));
        }
        Ok(())
    }

    async fn find_page(&self, tx: &DatabaseTransaction, request: &PageRequest) -> StoreResult<(Vec<CategoryEntity>, u64)> {
        let mut select = category::Entity::find();
        if let Some(filter) = &request.filter {
            select = select.filter(category::Column::Name.contains(filter.as_str()));
        }
        let (models, total) = fetch_page(tx, select, request, sort_column, category::Column::Id).await?;
        Ok((models.into_iter().map(CategoryEntity::from).collect(), total))
    }
}
