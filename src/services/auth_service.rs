use crate::entities::user_entity as users;
use crate::entities::users::UserRole;
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::utils::{
    JwtService, hash_password, validate_mobile_number, validate_password, verify_password,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let phone = request.phone.trim();
        validate_mobile_number(phone)?;
        validate_password(&request.password)?;
        if request.username.len() < 2 || request.username.len() > 64 {
            return Err(AppError::ValidationError(
                "Username length must be between 2 and 64 characters".to_string(),
            ));
        }
        // admins are provisioned out-of-band, never self-registered
        let role = match request.role.unwrap_or(UserRole::Farmer) {
            UserRole::Admin => {
                return Err(AppError::ValidationError(
                    "Cannot self-register as admin".to_string(),
                ));
            }
            role => role,
        };

        let now = Utc::now();
        let insert = users::ActiveModel {
            phone: Set(phone.to_string()),
            username: Set(request.username.clone()),
            password_hash: Set(hash_password(&request.password)?),
            role: Set(role),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await;

        let user = match insert {
            Ok(user) => user,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(AppError::ValidationError(
                    "Phone number is already registered".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        self.issue_tokens(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = users::Entity::find()
            .filter(users::Column::Phone.eq(request.phone.trim()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid phone or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError("Invalid phone or password".to_string()));
        }

        self.issue_tokens(user)
    }

    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;

        // re-read the user so a role change invalidates stale claims
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;

        self.issue_tokens(user)
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self.jwt_service.generate_access_token(user.id, user.role)?;
        let refresh_token = self.jwt_service.generate_refresh_token(user.id, user.role)?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
            user: UserResponse::from(user),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> AuthService {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        AuthService::new(db, JwtService::new("test-secret", 3600, 86400))
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            phone: "+254712345678".to_string(),
            username: "wanjiku".to_string(),
            password: "Password123".to_string(),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let auth = setup().await;
        let registered = auth.register(register_request()).await.unwrap();
        assert_eq!(registered.user.role, UserRole::Farmer);
        assert!(!registered.access_token.is_empty());

        let logged_in = auth
            .login(LoginRequest {
                phone: "+254712345678".to_string(),
                password: "Password123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let auth = setup().await;
        auth.register(register_request()).await.unwrap();
        let duplicate = auth.register(register_request()).await;
        assert!(matches!(duplicate, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_admin_self_registration_rejected() {
        let auth = setup().await;
        let mut request = register_request();
        request.role = Some(UserRole::Admin);
        assert!(matches!(
            auth.register(request).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let auth = setup().await;
        auth.register(register_request()).await.unwrap();
        let result = auth
            .login(LoginRequest {
                phone: "+254712345678".to_string(),
                password: "WrongPassword1".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::AuthError(_))));
    }
}
