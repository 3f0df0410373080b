use crate::adapters::database::DbPool;
use crate::adapters::database::user_repo::UserRepository;
use crate::config::AuthConfig;
use crate::domain::auth::Claims;
use crate::domain::user::Identity;
use crate::error::{AppError, Result};
use tracing::Instrument;
use uuid::Uuid;

/// Resolves access tokens to callers and keeps their activity timestamp fresh.
///
/// Tokens are issued elsewhere; this service only verifies them against the shared secret
/// and the user directory.
#[derive(Clone, Debug)]
pub struct IdentityService {
    pool: DbPool,
    repo: UserRepository,
    config: AuthConfig,
}

impl IdentityService {
    #[must_use]
    pub const fn new(pool: DbPool, repo: UserRepository, config: AuthConfig) -> Self {
        Self { pool, repo, config }
    }

    /// Verifies `token` and loads the caller.
    ///
    /// # Errors
    /// Returns `AppError::AuthError` if the token is invalid or the user does not exist.
    /// Returns `AppError::Forbidden` if the account is banned.
    #[tracing::instrument(err(level = "debug"), skip(self, token), fields(user_id = tracing::field::Empty))]
    pub async fn authenticate(&self, token: &str) -> Result<Identity> {
        let claims = Claims::decode(token, &self.config.jwt_secret)?;
        tracing::Span::current().record("user_id", tracing::field::display(claims.sub));

        let mut conn = self.pool.acquire().await?;
        let Some((identity, status)) = self.repo.find_account(&mut conn, claims.sub).await? else {
            tracing::warn!("Token subject does not exist");
            return Err(AppError::AuthError);
        };

        if status.is_banned {
            return Err(AppError::Forbidden("Account suspended".into()));
        }
        Ok(identity)
    }

    /// Like [`Self::authenticate`], but also requires a verified account.
    ///
    /// # Errors
    /// Same as [`Self::authenticate`], plus `AppError::Forbidden` for unverified accounts.
    pub async fn authenticate_verified(&self, token: &str) -> Result<Identity> {
        let identity = self.authenticate(token).await?;
        if !identity.is_verified {
            return Err(AppError::Forbidden("Please verify your account first".into()));
        }
        Ok(identity)
    }

    /// Updates `last_active` in the background. Failures are only logged.
    pub fn touch_last_active(&self, user_id: Uuid) {
        let pool = self.pool.clone();
        let repo = self.repo.clone();
        let span = tracing::debug_span!("touch_last_active", %user_id);

        tokio::spawn(
            async move {
                let result = match pool.acquire().await {
                    Ok(mut conn) => repo.touch_last_active(&mut conn, user_id).await,
                    Err(e) => Err(e.into()),
                };
                if let Err(e) = result {
                    tracing::warn!(error = %e, "Failed to update last active timestamp");
                }
            }
            .instrument(span),
        );
    }
}
