use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::{NotSet, Set, Unchanged}, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter,
};

use models::{role, user, user_role};

use super::reference::{load_grouped, resolve_all};
use super::{query::fetch_page, EntityStore, Reference, StoreError, StoreResult};
use crate::pagination::PageRequest;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserEntity {
    pub id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// argon2 hash; `None` leaves the stored hash untouched on update
    pub password: Option<String>,
    pub roles: Vec<Reference<role::Model>>,
}

impl UserEntity {
    fn from_parts(m: user::Model, roles: Vec<Reference<role::Model>>) -> Self {
        Self {
            id: Some(m.id),
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            password: Some(m.password),
            roles,
        }
    }
}

fn sort_column(field: &str) -> Option<user::Column> {
    match field {
        "id" => Some(user::Column::Id),
        "first_name" | "firstName" => Some(user::Column::FirstName),
        "last_name" | "lastName" => Some(user::Column::LastName),
        "email" => Some(user::Column::Email),
        _ => None,
    }
}

async fn roles_of(tx: &DatabaseTransaction, user_ids: &[i32]) -> StoreResult<HashMap<i32, Vec<Reference<role::Model>>>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let links = user_role::Entity::find()
        .filter(user_role::Column::UserId.is_in(user_ids.to_vec()))
        .all(tx)
        .await?
        .into_iter()
        .map(|l| (l.user_id, l.role_id))
        .collect();
    load_grouped::<role::Entity>(tx, links, role::Column::Id).await
}

async fn replace_roles(tx: &DatabaseTransaction, user_id: i32, roles: &[Reference<role::Model>]) -> StoreResult<()> {
    user_role::Entity::delete_many()
        .filter(user_role::Column::UserId.eq(user_id))
        .exec(tx)
        .await?;
    if roles.is_empty() {
        return Ok(());
    }
    let links = roles.iter().map(|r| user_role::ActiveModel { user_id: Set(user_id), role_id: Set(r.id()) });
    user_role::Entity::insert_many(links).exec_without_returning(tx).await?;
    Ok(())
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SeaOrmUserStore;

#[async_trait]
impl EntityStore for SeaOrmUserStore {
    type Entity = UserEntity;

    fn new_entity(&self) -> UserEntity { UserEntity::default() }

    fn get_reference(&self, id: i32) -> UserEntity { UserEntity { id: Some(id), ..UserEntity::default() } }

    async fn find_by_id(&self, tx: &DatabaseTransaction, id: i32) -> StoreResult<Option<UserEntity>> {
        let Some(model) = user::Entity::find_by_id(id).one(tx).await? else {
            return Ok(None);
        };
        let mut roles = roles_of(tx, &[id]).await?;
        Ok(Some(UserEntity::from_parts(model, roles.remove(&id).unwrap_or_default())))
    }

    async fn save(&self, tx: &DatabaseTransaction, entity: UserEntity) -> StoreResult<UserEntity> {
        let UserEntity { id, first_name, last_name, email, password, roles } = entity;
        let mut am = user::ActiveModel {
            id: NotSet,
            first_name: Set(first_name),
            last_name: Set(last_name),
            email: Set(email),
            password: password.map_or(NotSet, Set),
        };
        let model = match id {
            None => am.insert(tx).await?,
            Some(id) => {
                am.id = Unchanged(id);
                am.update(tx).await?
            }
        };
        let roles = resolve_all::<role::Entity>(tx, roles, role::Column::Id, "role").await?;
        replace_roles(tx, model.id, &roles).await?;
        Ok(UserEntity::from_parts(model, roles))
    }

    async fn delete_by_id(&self, tx: &DatabaseTransaction, id: i32) -> StoreResult<()> {
        let res = user::Entity::delete_by_id(id).exec(tx).await?;
        if res.rows_affected == 0 {
            return Err(StoreError::RowAbsent(id));
        }
        Ok(())
    }

    async fn find_page(&self, tx: &DatabaseTransaction, request: &PageRequest) -> StoreResult<(Vec<UserEntity>, u64)> {
        let mut select = user::Entity::find();
        if let Some(filter) = &request.filter {
            select = select.filter(user::Column::Email.contains(filter.as_str()));
        }
        let (models, total) = fetch_page(tx, select, request, sort_column, user::Column::Id).await?;
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let mut roles = roles_of(tx, &ids).await?;
        let content = models
            .into_iter()
            .map(|m| {
                let r = roles.remove(&m.id).unwrap_or_default();
                UserEntity::from_parts(m, r)
            })
            .collect();
        Ok((content, total))
    }
}
