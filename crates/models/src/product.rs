use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: f64,
    pub img_url: String,
    pub date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match *self {}
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    let len = name.trim().chars().count();
    if !(5..=60).contains(&len) {
        return Err(ModelError::invalid("name", "name must have between 5 and 60 characters"));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ModelError> {
    if description.trim().is_empty() {
        return Err(ModelError::invalid("description", "description required"));
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), ModelError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ModelError::invalid("price", "price must be positive"));
    }
    Ok(())
}

/// Release dates in the future are rejected.
pub fn validate_date(date: &DateTimeWithTimeZone) -> Result<(), ModelError> {
    if *date > chrono::Utc::now() {
        return Err(ModelError::invalid("date", "date cannot be in the future"));
    }
    Ok(())
}
