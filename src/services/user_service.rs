use crate::database::Store;
use crate::entities::UserRole;
use crate::error::{AppError, AppResult};
use crate::models::*;
use std::sync::Arc;

/// Account administration. Every operation requires an Administrator.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn require_admin(actor: CurrentUser) -> AppResult<()> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Administrator role required".to_string(),
            ))
        }
    }

    async fn load(&self, id: i64) -> AppResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
    }

    pub async fn set_role(
        &self,
        actor: CurrentUser,
        id: i64,
        role: UserRole,
    ) -> AppResult<UserResponse> {
        Self::require_admin(actor)?;
        if actor.id == id && role != UserRole::Administrator {
            return Err(AppError::invalid(
                "role",
                "administrators cannot demote themselves",
            ));
        }
        let mut user = self.load(id).await?;
        user.role = role;
        let user = self.store.update_user(&user).await?;
        log::info!("User {} role set to {} by {}", user.id, user.role, actor.id);
        Ok(user.into())
    }

    pub async fn set_active(
        &self,
        actor: CurrentUser,
        id: i64,
        active: bool,
    ) -> AppResult<UserResponse> {
        Self::require_admin(actor)?;
        if actor.id == id && !active {
            return Err(AppError::invalid(
                "active",
                "administrators cannot deactivate themselves",
            ));
        }
        let mut user = self.load(id).await?;
        user.active = active;
        let user = self.store.update_user(&user).await?;
        log::info!("User {} active={} set by {}", user.id, user.active, actor.id);
        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    async fn setup() -> (UserService, User) {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .insert_user(NewUser {
                username: "barkeep".into(),
                email: "barkeep@example.com".into(),
                password_hash: "x".into(),
                role: UserRole::Staff,
                active: true,
            })
            .await
            .unwrap();
        (UserService::new(store), user)
    }

    #[tokio::test]
    async fn admin_can_promote_and_deactivate() {
        let (svc, user) = setup().await;
        let admin = CurrentUser { id: 100, role: UserRole::Administrator };

        let updated = svc.set_role(admin, user.id, UserRole::Manager).await.unwrap();
        assert_eq!(updated.role, UserRole::Manager);

        let updated = svc.set_active(admin, user.id, false).await.unwrap();
        assert!(!updated.active);
    }

    #[tokio::test]
    async fn non_admins_are_forbidden() {
        let (svc, user) = setup().await;
        let manager = CurrentUser { id: 100, role: UserRole::Manager };
        assert!(matches!(
            svc.set_role(manager, user.id, UserRole::Administrator).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let (svc, _) = setup().await;
        let admin = CurrentUser { id: 100, role: UserRole::Administrator };
        assert!(matches!(
            svc.set_active(admin, 555, true).await,
            Err(AppError::NotFound(_))
        ));
    }
}
