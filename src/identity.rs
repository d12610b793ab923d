use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{ChatError, ChatResult};

/// Header carrying the caller's participant name.
pub const USER_HEADER: &str = "user";

/// The name a caller claims to be. The header is read as UTF-8, so names
/// outside ASCII work. Extraction never fails; whether the name resolves is up
/// to the handler, since endpoints answer a bad identity with different status
/// codes.
#[derive(Debug, Clone, Default)]
pub struct User(Option<String>);

impl User {
    pub fn name(&self) -> ChatResult<&str> {
        self.0
            .as_deref()
            .ok_or_else(|| ChatError::NotFound(String::new()))
    }
}

impl<S> FromRequestParts<S> for User
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let name = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
            .map(str::to_owned);
        Ok(User(name))
    }
}
