use crate::entities::{DrinkCategory, drink_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Drink {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Price in cents.
    pub price: i64,
    pub category: DrinkCategory,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<drink_entity::Model> for Drink {
    fn from(m: drink_entity::Model) -> Self {
        Self {
            id: m.id,
            owner_id: m.owner_id,
            name: m.name,
            description: m.description,
            price: m.price,
            category: m.category,
            active: m.active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewDrink {
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category: DrinkCategory,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateDrinkRequest {
    #[schema(example = "Pilsner")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 800)]
    pub price: i64,
    #[serde(default = "default_category")]
    pub category: DrinkCategory,
}

fn default_category() -> DrinkCategory {
    DrinkCategory::Other
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateDrinkRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category: Option<DrinkCategory>,
    pub active: Option<bool>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct DrinkQuery {
    pub category: Option<DrinkCategory>,
    pub active: Option<bool>,
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
}

/// Store-level drink filter.
#[derive(Debug, Default, Clone)]
pub struct DrinkFilter {
    pub owner_id: Option<i64>,
    pub category: Option<DrinkCategory>,
    pub active: Option<bool>,
    pub name_contains: Option<String>,
}

impl DrinkFilter {
    pub fn matches(&self, drink: &Drink) -> bool {
        self.owner_id.is_none_or(|o| drink.owner_id == o)
            && self.category.is_none_or(|c| drink.category == c)
            && self.active.is_none_or(|a| drink.active == a)
            && self.name_contains.as_deref().is_none_or(|needle| {
                drink
                    .name
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            })
    }
}
