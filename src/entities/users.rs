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
pub enum UserRole {
    #[sea_orm(string_value = "Administrator")]
    Administrator,
    #[sea_orm(string_value = "Manager")]
    Manager,
    #[sea_orm(string_value = "Staff")]
    Staff,
    #[sea_orm(string_value = "Customer")]
    Customer,
}

impl UserRole {
    pub fn is_admin(self) -> bool {
        self == UserRole::Administrator
    }

    /// Roles allowed to edit payment and customer details on existing orders.
    pub fn is_management(self) -> bool {
        matches!(self, UserRole::Administrator | UserRole::Manager)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Administrator => write!(f, "Administrator"),
            UserRole::Manager => write!(f, "Manager"),
            UserRole::Staff => write!(f, "Staff"),
            UserRole::Customer => write!(f, "Customer"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Administrator" => Ok(UserRole::Administrator),
            "Manager" => Ok(UserRole::Manager),
            "Staff" => Ok(UserRole::Staff),
            "Customer" => Ok(UserRole::Customer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
