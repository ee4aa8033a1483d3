use serde::{Deserialize, Serialize};

use models::{role, user};

use super::password::hash_password;
use crate::crud::{CrudService, Resource, Validate};
use crate::errors::ServiceError;
use crate::store::{Reference, SeaOrmUserStore, UserEntity};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDto {
    pub id: Option<i32>,
    #[serde(default)]
    pub authority: String,
}

impl From<&role::Model> for RoleDto {
    fn from(m: &role::Model) -> Self { Self { id: Some(m.id), authority: m.authority.clone() } }
}

/// Public view of a user. The password hash never leaves the service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Option<i32>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<RoleDto>,
}

impl Validate for UserDto {
    fn validate(&self) -> Result<(), ServiceError> {
        user::validate_first_name(&self.first_name)?;
        user::validate_email(&self.email)?;
        if self.roles.iter().any(|r| r.id.is_none()) {
            return Err(ServiceError::validation("roles", "every role needs an id"));
        }
        Ok(())
    }
}

/// Registration payload: the user fields plus a clear-text password.
#[derive(Clone, Debug, Deserialize)]
pub struct UserInsertDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub password: String,
}

impl Validate for UserInsertDto {
    fn validate(&self) -> Result<(), ServiceError> {
        self.user.validate()?;
        user::validate_password(&self.password)?;
        Ok(())
    }
}

fn copy_user_fields(dto: &UserDto, entity: &mut UserEntity) {
    entity.first_name = dto.first_name.clone();
    entity.last_name = dto.last_name.clone();
    entity.email = dto.email.trim().to_string();
    entity.roles = dto.roles.iter().filter_map(|r| r.id).map(Reference::Lazy).collect();
}

pub struct Users;

impl Resource for Users {
    const NAME: &'static str = "user";

    type Entity = UserEntity;
    type Store = SeaOrmUserStore;
    type Dto = UserDto;
    type InsertDto = UserInsertDto;
    type UpdateDto = UserDto;

    fn to_dto(entity: &UserEntity) -> UserDto {
        UserDto {
            id: entity.id,
            first_name: entity.first_name.clone(),
            last_name: entity.last_name.clone(),
            email: entity.email.clone(),
            roles: entity
                .roles
                .iter()
                .map(|r| r.loaded().map_or_else(|| RoleDto { id: Some(r.id()), authority: String::new() }, RoleDto::from))
                .collect(),
        }
    }

    fn dto_id(dto: &UserDto) -> Option<i32> { dto.id }

    fn apply_insert(dto: &UserInsertDto, entity: &mut UserEntity) -> Result<(), ServiceError> {
        copy_user_fields(&dto.user, entity);
        entity.password = Some(hash_password(&dto.password)?);
        Ok(())
    }

    /// Keeps the stored password.
    fn apply_update(dto: &UserDto, entity: &mut UserEntity) -> Result<(), ServiceError> {
        copy_user_fields(dto, entity);
        entity.password = None;
        Ok(())
    }
}

pub type UserService = CrudService<Users>;
