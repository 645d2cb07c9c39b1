//! Request body extraction

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header,
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Item body sent either as JSON or as an urlencoded form.
///
/// The form branch is taken only for `application/x-www-form-urlencoded`;
/// everything else goes through the JSON extractor and its content-type check.
#[derive(Debug)]
pub struct ItemBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ItemBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadBody(e.body_text()))?;
            return Ok(ItemBody(value));
        }

        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadBody(e.body_text()))?;
        Ok(ItemBody(value))
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
        .unwrap_or(false)
}
