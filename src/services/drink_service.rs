use crate::database::Store;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::Violations;
use std::sync::Arc;

const MAX_NAME_LEN: usize = 100;

fn check_fields(name: Option<&str>, price: Option<i64>) -> AppResult<()> {
    let mut violations = Violations::new();
    if let Some(name) = name {
        let len = name.chars().count();
        violations.check(
            (1..=MAX_NAME_LEN).contains(&len),
            "name",
            format!("must be between 1 and {MAX_NAME_LEN} characters"),
        );
    }
    if let Some(price) = price {
        violations.check(price >= 0, "price", "must not be negative");
    }
    violations.into_result()
}

/// Drink catalog. Each owner keeps an independent catalog; drinks are
/// deactivated, never deleted.
#[derive(Clone)]
pub struct DrinkService {
    store: Arc<dyn Store>,
}

impl DrinkService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn load(&self, id: i64) -> AppResult<Drink> {
        self.store
            .find_drink(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Drink {id} not found")))
    }

    async fn load_owned(&self, user: CurrentUser, id: i64) -> AppResult<Drink> {
        let drink = self.load(id).await?;
        if drink.owner_id != user.id {
            return Err(AppError::Forbidden(
                "Only the owner may change this drink".to_string(),
            ));
        }
        Ok(drink)
    }

    pub async fn list(&self, user: CurrentUser, query: &DrinkQuery) -> AppResult<Vec<Drink>> {
        let filter = DrinkFilter {
            owner_id: (!user.is_admin()).then_some(user.id),
            category: query.category,
            active: query.active,
            name_contains: query
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        };
        self.store.list_drinks(&filter).await
    }

    pub async fn get(&self, user: CurrentUser, id: i64) -> AppResult<Drink> {
        let drink = self.load(id).await?;
        if !user.can_access(drink.owner_id) {
            return Err(AppError::Forbidden(
                "You do not have access to this drink".to_string(),
            ));
        }
        Ok(drink)
    }

    pub async fn create(&self, user: CurrentUser, request: CreateDrinkRequest) -> AppResult<Drink> {
        let name = request.name.trim().to_string();
        check_fields(Some(&name), Some(request.price))?;
        let drink = self
            .store
            .insert_drink(NewDrink {
                owner_id: user.id,
                name,
                description: request.description,
                price: request.price,
                category: request.category,
            })
            .await?;
        log::info!("Drink created: {} ({}) by {}", drink.name, drink.id, user.id);
        Ok(drink)
    }

    pub async fn update(
        &self,
        user: CurrentUser,
        id: i64,
        request: UpdateDrinkRequest,
    ) -> AppResult<Drink> {
        let name = request.name.as_deref().map(str::trim);
        check_fields(name, request.price)?;

        let mut drink = self.load_owned(user, id).await?;
        if let Some(name) = name {
            drink.name = name.to_string();
        }
        if let Some(description) = request.description {
            drink.description = Some(description);
        }
        if let Some(price) = request.price {
            drink.price = price;
        }
        if let Some(category) = request.category {
            drink.category = category;
        }
        if let Some(active) = request.active {
            drink.active = active;
        }
        self.store.update_drink(&drink).await
    }

    /// Soft delete: the drink disappears from new orders but keeps backing
    /// historic order lines.
    pub async fn deactivate(&self, user: CurrentUser, id: i64) -> AppResult<Drink> {
        let mut drink = self.load_owned(user, id).await?;
        if !drink.active {
            return Ok(drink);
        }
        drink.active = false;
        let drink = self.store.update_drink(&drink).await?;
        log::info!("Drink {} deactivated by {}", drink.id, user.id);
        Ok(drink)
    }
}
