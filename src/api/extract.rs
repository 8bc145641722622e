//! API Extractors
//!
//! Request extractors shared by the handlers.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::LabError;

// == Optional JSON Body ==
/// JSON body that may be left out entirely.
///
/// An empty body yields `None`. Anything else must deserialize into `T`,
/// otherwise the request is rejected with `InvalidRequest` (400).
#[derive(Debug, Clone)]
pub struct OptionalJson<T>(pub Option<T>);

#[async_trait]
impl<S, T> FromRequest<S> for OptionalJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = LabError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| LabError::InvalidRequest(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(OptionalJson(None));
        }

        serde_json::from_slice(&bytes)
            .map(|value| OptionalJson(Some(value)))
            .map_err(|e| LabError::InvalidRequest(format!("invalid JSON body: {}", e)))
    }
}
