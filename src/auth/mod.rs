//! Authentication and identity.
//!
//! Issues HS256 bearer tokens carrying `{id, email, role}` and verifies
//! them via an axum extractor. Password storage uses argon2; the
//! forgot-password flow issues short-lived one-time codes with an
//! in-memory attempt limiter.

use crate::entities::{password_otp, user, PasswordOtp, User};
use crate::errors::ServiceError;
use crate::AppState;
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// OTP lifetime in minutes.
const OTP_TTL_MINUTES: i64 = 10;

/// Claims carried in access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated principal. Handlers trust this verbatim; it is the
/// contract between the identity layer and everything else.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiration: Duration,
}

/// Sliding-window attempt limiter for the OTP endpoints. In-memory only;
/// a restart clears it, which is acceptable for abuse throttling.
#[derive(Debug, Default)]
pub struct AttemptLimiter {
    attempts: DashMap<String, Vec<DateTime<Utc>>>,
}

impl AttemptLimiter {
    const MAX_ATTEMPTS: usize = 5;
    const WINDOW_MINUTES: i64 = 15;

    pub fn check(&self, key: &str) -> Result<(), ServiceError> {
        let now = Utc::now();
        let window = ChronoDuration::minutes(Self::WINDOW_MINUTES);
        let mut entry = self.attempts.entry(key.to_string()).or_default();
        entry.retain(|t| now - *t < window);
        if entry.len() >= Self::MAX_ATTEMPTS {
            return Err(ServiceError::RateLimitExceeded);
        }
        entry.push(now);
        Ok(())
    }
}

/// Issues and verifies bearer credentials, and owns the password and OTP
/// flows.
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DatabaseConnection>,
    otp_limiter: AttemptLimiter,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self {
            config,
            db,
            otp_limiter: AttemptLimiter::default(),
        }
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(user::Model, TokenResponse), ServiceError> {
        let email = email.trim().to_lowercase();
        let existing = User::find()
            .filter(user::Column::Email.eq(&email))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict("Email already registered".into()));
        }

        let created = user::ActiveModel {
            id: NotSet,
            name: Set(name.trim().to_string()),
            email: Set(email),
            password_hash: Set(hash_password(password)?),
            role: Set("user".to_string()),
            phone: Set(String::new()),
            avatar_url: Set(String::new()),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        let token = self.issue_token(&created)?;
        info!(user_id = created.id, "user registered");
        Ok((created, token))
    }

    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(user::Model, TokenResponse), ServiceError> {
        let email = email.trim().to_lowercase();
        let user = User::find()
            .filter(user::Column::Email.eq(&email))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid email or password".into()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(ServiceError::Unauthorized(
                "Invalid email or password".into(),
            ));
        }

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    pub async fn me(&self, user_id: i64) -> Result<user::Model, ServiceError> {
        User::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".into()))
    }

    /// Replaces the profile fields wholesale; absent optional fields clear
    /// their column rather than keeping the old value.
    #[instrument(skip(self, name, phone, avatar_url))]
    pub async fn update_profile(
        &self,
        user_id: i64,
        name: &str,
        phone: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<user::Model, ServiceError> {
        let name = name.trim();
        if name.len() < 2 {
            return Err(ServiceError::ValidationError(
                "name must be at least 2 characters".into(),
            ));
        }

        let user = self.me(user_id).await?;
        let updated = user::ActiveModel {
            id: Set(user.id),
            name: Set(name.to_string()),
            phone: Set(phone.unwrap_or("").trim().to_string()),
            avatar_url: Set(avatar_url.unwrap_or("").trim().to_string()),
            ..Default::default()
        }
        .update(&*self.db)
        .await?;

        Ok(updated)
    }

    pub fn issue_token(&self, user: &user::Model) -> Result<TokenResponse, ServiceError> {
        let now = Utc::now();
        let expires_in = self.config.token_expiration.as_secs() as i64;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + expires_in,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("token creation failed: {}", e)))?;

        Ok(TokenResponse {
            token,
            token_type: "Bearer",
            expires_in,
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<AuthUser, ServiceError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ServiceError::Unauthorized(format!("Invalid token: {}", e)))?;

        let id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| ServiceError::Unauthorized("Invalid token subject".into()))?;

        Ok(AuthUser {
            id,
            email: data.claims.email,
            role: data.claims.role,
        })
    }

    /// Issues a one-time reset code. Always reports success so callers
    /// cannot enumerate registered emails; the code itself is only stored
    /// (and logged, mail delivery being out of scope) for known users.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<(), ServiceError> {
        let email = email.trim().to_lowercase();
        self.otp_limiter.check(&email)?;

        let user = User::find()
            .filter(user::Column::Email.eq(&email))
            .one(&*self.db)
            .await?;
        if user.is_none() {
            return Ok(());
        }

        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        password_otp::ActiveModel {
            id: NotSet,
            email: Set(email.clone()),
            code: Set(code.clone()),
            expires_at: Set(Utc::now() + ChronoDuration::minutes(OTP_TTL_MINUTES)),
            used: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(%email, %code, "password reset OTP issued");
        Ok(())
    }

    #[instrument(skip(self, code))]
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<(), ServiceError> {
        let email = email.trim().to_lowercase();
        self.otp_limiter.check(&email)?;
        self.find_valid_otp(&email, code).await?;
        Ok(())
    }

    #[instrument(skip(self, code, new_password))]
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let email = email.trim().to_lowercase();
        self.otp_limiter.check(&email)?;

        let otp = self.find_valid_otp(&email, code).await?;
        let user = User::find()
            .filter(user::Column::Email.eq(&email))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".into()))?;

        user::ActiveModel {
            id: Set(user.id),
            password_hash: Set(hash_password(new_password)?),
            ..Default::default()
        }
        .update(&*self.db)
        .await?;

        password_otp::ActiveModel {
            id: Set(otp.id),
            used: Set(true),
            ..Default::default()
        }
        .update(&*self.db)
        .await?;

        info!(user_id = user.id, "password reset completed");
        Ok(())
    }

    async fn find_valid_otp(
        &self,
        email: &str,
        code: &str,
    ) -> Result<password_otp::Model, ServiceError> {
        let otp = PasswordOtp::find()
            .filter(password_otp::Column::Email.eq(email))
            .filter(password_otp::Column::Code.eq(code))
            .filter(password_otp::Column::Used.eq(false))
            .order_by_desc(password_otp::Column::Id)
            .one(&*self.db)
            .await?
            .filter(|row| row.expires_at > Utc::now())
            .ok_or_else(|| ServiceError::ValidationError("Invalid or expired code".into()))?;
        Ok(otp)
    }
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
    if password.len() < 8 {
        return Err(ServiceError::ValidationError(
            "Password must be at least 8 characters".into(),
        ));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ServiceError::InternalError(format!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ServiceError::InternalError(format!("stored hash invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServiceError::Unauthorized("Missing Authorization header".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ServiceError::Unauthorized("Expected Bearer token".into()))?
            .trim();

        state.services.auth.verify_token(token)
    }
}
