/// Authentication extractors
use crate::{
    api::middleware::extract_bearer_token,
    context::AppContext,
    error::VaultError,
    users::ValidatedSession,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Authenticated context - extracts and validates session from request
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub session: ValidatedSession,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = VaultError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| VaultError::Authentication("Missing authorization header".to_string()))?;

        let session = state.user_manager.validate_access_token(&token).await?;
        let user_id = session.user_id.clone();

        Ok(AuthContext { user_id, session })
    }
}

/// Admin authentication context - requires an admin user
#[derive(Debug, Clone)]
pub struct AdminAuthContext {
    pub user_id: String,
    pub session: ValidatedSession,
}

#[async_trait]
impl FromRequestParts<AppContext> for AdminAuthContext {
    type Rejection = VaultError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;

        if !auth.session.is_admin {
            tracing::warn!(user = %auth.session.username, "Admin access denied");
            return Err(VaultError::Authorization("Admin access required".to_string()));
        }

        Ok(AdminAuthContext {
            user_id: auth.user_id,
            session: auth.session,
        })
    }
}
