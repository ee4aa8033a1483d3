use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::{NotSet, Set, Unchanged}, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter,
};

use models::{category, product, product_category};

use super::reference::{load_grouped, resolve_all};
use super::{query::fetch_page, EntityStore, Reference, StoreError, StoreResult};
use crate::pagination::PageRequest;

#[derive(Clone, Debug, PartialEq)]
pub struct ProductEntity {
    pub id: Option<i32>,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub img_url: String,
    pub date: DateTime<Utc>,
    pub categories: Vec<Reference<category::Model>>,
}

impl ProductEntity {
    fn from_parts(m: product::Model, categories: Vec<Reference<category::Model>>) -> Self {
        Self {
            id: Some(m.id),
            name: m.name,
            description: m.description,
            price: m.price,
            img_url: m.img_url,
            date: m.date.with_timezone(&Utc),
            categories,
        }
    }

    fn blank(id: Option<i32>) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            price: 0.0,
            img_url: String::new(),
            date: Utc::now(),
            categories: Vec::new(),
        }
    }
}

fn sort_column(field: &str) -> Option<product::Column> {
    match field {
        "id" => Some(product::Column::Id),
        "name" => Some(product::Column::Name),
        "price" => Some(product::Column::Price),
        "date" => Some(product::Column::Date),
        "img_url" | "imgUrl" => Some(product::Column::ImgUrl),
        _ => None,
    }
}

async fn categories_of(
    tx: &DatabaseTransaction,
    product_ids: &[i32],
) -> StoreResult<HashMap<i32, Vec<Reference<category::Model>>>> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let links = product_category::Entity::find()
        .filter(product_category::Column::ProductId.is_in(product_ids.to_vec()))
        .all(tx)
        .await?
        .into_iter()
        .map(|l| (l.product_id, l.category_id))
        .collect();
    load_grouped::<category::Entity>(tx, links, category::Column::Id).await
}

async fn replace_categories(
    tx: &DatabaseTransaction,
    product_id: i32,
    categories: &[Reference<category::Model>],
) -> StoreResult<()> {
    product_category::Entity::delete_many()
        .filter(product_category::Column::ProductId.eq(product_id))
        .exec(tx)
        .await?;
    if categories.is_empty() {
        return Ok(());
    }
    let links = categories.iter().map(|c| product_category::ActiveModel {
        product_id: Set(product_id),
        category_id: Set(c.id()),
    });
    product_category::Entity::insert_many(links).exec_without_returning(tx).await?;
    Ok(())
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SeaOrmProductStore;

#[async_trait]
impl EntityStore for SeaOrmProductStore {
    type Entity = ProductEntity;

    fn new_entity(&self) -> ProductEntity { ProductEntity::blank(None) }

    fn get_reference(&self, id: i32) -> ProductEntity { ProductEntity::blank(Some(id)) }

    async fn find_by_id(&self, tx: &DatabaseTransaction, id: i32) -> StoreResult<Option<ProductEntity>> {
        let Some(model) = product::Entity::find_by_id(id).one(tx).await? else {
            return Ok(None);
        };
        let mut categories = categories_of(tx, &[id]).await?;
        Ok(Some(ProductEntity::from_parts(model, categories.remove(&id).unwrap_or_default())))
    }

    async fn save(&self, tx: &DatabaseTransaction, entity: ProductEntity) -> StoreResult<ProductEntity> {
        let ProductEntity { id, name, description, price, img_url, date, categories } = entity;
        let mut am = product::ActiveModel {
            id: NotSet,
            name: Set(name),
            description: Set(description),
            price: Set(price),
            img_url: Set(img_url),
            date: Set(date.into()),
        };
        let model = match id {
            None => am.insert(tx).await?,
            Some(id) => {
                am.id = Unchanged(id);
                am.update(tx).await?
            }
        };
        let categories = resolve_all::<category::Entity>(tx, categories, category::Column::Id, "category").await?;
        replace_categories(tx, model.id, &categories).await?;
        Ok(ProductEntity::from_parts(model, categories))
    }

    async fn delete_by_id(&self, tx: &DatabaseTransaction, id: i32) -> StoreResult<()> {
        // category links go with the product (ON DELETE CASCADE)
        let res = product::Entity::delete_by_id(id).exec(tx).await?;
        if res.rows_affected == 0 {
            return Err(StoreError::RowAbsent(id));
        }
        Ok(())
    }

    async fn find_page(&self, tx: &DatabaseTransaction, request: &PageRequest) -> StoreResult<(Vec<ProductEntity>, u64)> {
        let mut select = product::Entity::find();
        if let Some(filter) = &request.filter {
            select = select.filter(product::Column::Name.contains(filter.as_str()));
        }
        let (models, total) = fetch_page(tx, select, request, sort_column, product::Column::Id).await?;
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let mut categories = categories_of(tx, &ids).await?;
        let content = models
            .into_iter()
            .map(|m| {
                let cats = categories.remove(&m.id).unwrap_or_default();
                ProductEntity::from_parts(m, cats)
            })
            .collect();
        Ok((content, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seeded_db;
    use sea_orm::TransactionTrait;

    #[tokio::test]
    async fn find_by_id_loads_categories() -> anyhow::Result<()> {
        let db = seeded_db().await?;
        let tx = db.begin().await?;
        let found = SeaOrmProductStore.find_by_id(&tx, 1).await?.expect("seeded product");
        assert_eq!(found.name, "The Lord of the Rings");
        let names: Vec<_> = found.categories.iter().filter_map(|c| c.loaded()).map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["Books".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn save_rejects_dangling_category() -> anyhow::Result<()> {
        let db = seeded_db().await?;
        let tx = db.begin().await?;
        let mut entity = SeaOrmProductStore.new_entity();
        entity.name = "Dangling".into();
        entity.description = "desc".into();
        entity.price = 10.0;
        entity.categories = vec![Reference::Lazy(1), Reference::Lazy(404)];
        let err = SeaOrmProductStore.save(&tx, entity).await.unwrap_err();
        assert!(matches!(err, StoreError::DanglingReference { resource: "category", id: 404 }), "{err:?}");
        Ok(())
    }

    #[tokio::test]
    async fn update_of_missing_row_fails_on_save() -> anyhow::Result<()> {
        let db = seeded_db().await?;
        let tx = db.begin().await?;
        let mut entity = SeaOrmProductStore.get_reference(1000);
        entity.name = "Ghost product".into();
        let err = SeaOrmProductStore.save(&tx, entity).await.unwrap_err();
        assert!(
            matches!(err, StoreError::Db(sea_orm::DbErr::RecordNotUpdated | sea_orm::DbErr::RecordNotFound(_))),
            "{err:?}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn unknown_sort_key_is_reported() -> anyhow::Result<()> {
        let db = seeded_db().await?;
        let tx = db.begin().await?;
        let req = PageRequest::of(0, 5).sorted(crate::pagination::SortOrder::asc("colour"));
        let err = SeaOrmProductStore.find_page(&tx, &req).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownSortKey(ref k) if k == "colour"));
        Ok(())
    }
}
