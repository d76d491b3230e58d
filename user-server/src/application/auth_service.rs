use std::sync::Arc;

use tracing::{info, warn};

use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, User};
use crate::infrastructure::jwt::{JwtError, JwtService, TokenPair};
use crate::infrastructure::password::PasswordService;

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) tokens: TokenPair,
}

pub(crate) struct AuthService {
    repo: Arc<dyn UserRepository>,
    passwords: Arc<PasswordService>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(
        repo: Arc<dyn UserRepository>,
        passwords: Arc<PasswordService>,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self {
            repo,
            passwords,
            jwt,
        }
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let Some(creds) = self.repo.find_credentials_by_email(&req.email).await? else {
            // same amount of work as a real verification
            self.verify_password(req.password, Self::DUMMY_PASSWORD_HASH.to_string())
                .await?;
            warn!("login failed: unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        if !self
            .verify_password(req.password, creds.password_hash)
            .await?
        {
            warn!(user_id = creds.user.id, "login failed: wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let tokens = self.issue_tokens(&creds.user)?;
        info!(user_id = creds.user.id, "user logged in");
        Ok(AuthResult {
            user: creds.user,
            tokens,
        })
    }

    /// Accepts only refresh tokens whose user is still active.
    pub(crate) async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        let claims = self
            .jwt
            .verify_token(refresh_token)
            .map_err(map_jwt_error)?;
        if !claims.is_refresh() {
            return Err(DomainError::InvalidToken);
        }

        let user = self
            .repo
            .find_by_id(claims.user_id)
            .await?
            .filter(|user| !user.is_deleted())
            .ok_or(DomainError::InvalidToken)?;

        self.issue_tokens(&user)
    }

    fn issue_tokens(&self, user: &User) -> Result<TokenPair, DomainError> {
        self.jwt
            .generate_token_pair(user.id, &user.username, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))
    }

    async fn verify_password(
        &self,
        raw_password: String,
        password_hash: String,
    ) -> Result<bool, DomainError> {
        let passwords = Arc::clone(&self.passwords);
        tokio::task::spawn_blocking(move || passwords.verify(&raw_password, &password_hash))
            .await
            .map_err(|err| DomainError::Unexpected(err.to_string()))
    }
}

pub(crate) fn map_jwt_error(err: JwtError) -> DomainError {
    match err {
        JwtError::Expired => DomainError::TokenExpired,
        JwtError::Invalid(_) => DomainError::InvalidToken,
        JwtError::Encode(err) => DomainError::Unexpected(err.to_string()),
    }
}
