use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::errors::ApiError;

/// Local version of [`axum::Json`] whose rejections are rendered as the
/// API's error envelope instead of axum's plain-text bodies.
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => {
                let message = match rejection {
                    JsonRejection::JsonDataError(e) => e.body_text(),
                    JsonRejection::JsonSyntaxError(e) => e.body_text(),
                    JsonRejection::MissingJsonContentType(_) => "Invalid content type".to_string(),
                    JsonRejection::BytesRejection(e) => e.body_text(),
                    other => {
                        warn!(rejection = ?other, "unhandled json rejection");
                        other.body_text()
                    }
                };
                warn!(%message, "rejected request body");
                Err(ApiError::BadRequest(message))
            }
        }
    }
}
