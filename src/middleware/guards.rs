use axum::{extract::FromRequestParts, http::header};

/// Bearer token lifted from the Authorization header, if any. Extraction
/// never rejects; strategy evaluation decides what a missing or bad
/// token means for the route.
pub struct BearerToken(pub Option<String>);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);

        Ok(Self(token))
    }
}

impl BearerToken {
    pub fn into_credentials(self) -> Option<crate::auth::Credentials> {
        self.0
            .map(|token| crate::auth::Credentials::Bearer { token })
    }
}
