use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
pub enum DrinkCategory {
    #[sea_orm(string_value = "Beer")]
    Beer,
    #[sea_orm(string_value = "Wine")]
    Wine,
    #[sea_orm(string_value = "Cocktail")]
    Cocktail,
    #[sea_orm(string_value = "Soft Drink")]
    #[serde(rename = "Soft Drink")]
    SoftDrink,
    #[sea_orm(string_value = "Other")]
    Other,
}

impl std::fmt::Display for DrinkCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrinkCategory::Beer => write!(f, "Beer"),
            DrinkCategory::Wine => write!(f, "Wine"),
            DrinkCategory::Cocktail => write!(f, "Cocktail"),
            DrinkCategory::SoftDrink => write!(f, "Soft Drink"),
            DrinkCategory::Other => write!(f, "Other"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "drinks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category: DrinkCategory,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
