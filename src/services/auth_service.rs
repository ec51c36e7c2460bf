use crate::config::AdminConfig;
use crate::database::Store;
use crate::entities::UserRole;
use crate::error::{AppError, AppResult};
use crate::external::{MailJob, MailKind, MailQueue};
use crate::models::*;
use crate::utils::*;
use serde_json::json;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    jwt_service: JwtService,
    mail_queue: MailQueue,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, jwt_service: JwtService, mail_queue: MailQueue) -> Self {
        Self {
            store,
            jwt_service,
            mail_queue,
        }
    }

    fn issue_tokens(&self, user: User) -> AppResult<AuthResponse> {
        let access_token =
            self.jwt_service
                .generate_access_token(user.id, &user.username, user.role)?;
        let refresh_token =
            self.jwt_service
                .generate_refresh_token(user.id, &user.username, user.role)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_lowercase();
        validate_username(&username)?;
        validate_email("email", &email)?;
        validate_password(&request.password)?;

        let password_hash = hash_password(&request.password)?;
        let user = self
            .store
            .insert_user(NewUser {
                username,
                email,
                password_hash,
                role: UserRole::Staff,
                active: true,
            })
            .await?;

        log::info!("User registered: {} ({})", user.username, user.id);
        self.mail_queue.submit(MailJob {
            to: user.email.clone(),
            kind: MailKind::Welcome,
            payload: json!({ "username": user.username }),
        });

        self.issue_tokens(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let login = request.login.trim();
        let user = self
            .store
            .find_user_by_login(login)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid credentials".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError("Invalid credentials".to_string()));
        }
        if !user.active {
            return Err(AppError::Forbidden("Account is deactivated".to_string()));
        }

        log::info!("User logged in: {}", user.id);
        self.issue_tokens(user)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let current = claims.current_user()?;

        // role and active flag come from the store, not the old token
        let user = self
            .store
            .find_user(current.id)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;
        if !user.active {
            return Err(AppError::Forbidden("Account is deactivated".to_string()));
        }

        self.issue_tokens(user)
    }

    pub async fn me(&self, user: CurrentUser) -> AppResult<UserResponse> {
        let user = self
            .store
            .find_user(user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(user.into())
    }

    /// Creates the configured Administrator account when it is missing, or
    /// promotes and reactivates it when it exists.
    pub async fn ensure_admin(&self, admin: &AdminConfig) -> AppResult<User> {
        if let Some(mut user) = self.store.find_user_by_login(&admin.username).await? {
            if user.role == UserRole::Administrator && user.active {
                return Ok(user);
            }
            user.role = UserRole::Administrator;
            user.active = true;
            log::warn!("Promoting bootstrap account {} to Administrator", user.username);
            return self.store.update_user(&user).await;
        }

        validate_username(&admin.username)?;
        validate_email("email", &admin.email)?;
        validate_password(&admin.password)?;
        let user = self
            .store
            .insert_user(NewUser {
                username: admin.username.clone(),
                email: admin.email.to_lowercase(),
                password_hash: hash_password(&admin.password)?,
                role: UserRole::Administrator,
                active: true,
            })
            .await?;
        log::info!("Bootstrap administrator created: {}", user.username);
        Ok(user)
    }
}
