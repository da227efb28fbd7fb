//! Success envelope for handler results.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// `{"success": true, "data": ...}` with a status code.
///
/// # Example
///
/// ```ignore
/// async fn get_user(Path(id): Path<i32>) -> WebResult<ApiResponse<User>> {
///     let user = load(id).await?;
///     Ok(ApiResponse::ok(user))
/// }
/// ```
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    data: T,
}

#[derive(Serialize)]
struct Envelope<T> {
    success: bool,
    data: T,
}

impl<T> ApiResponse<T> {
    /// 200 OK carrying `data`
    pub const fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            data,
        }
    }

    /// 201 Created carrying `data`
    pub const fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            data,
        }
    }

    /// Payload of the response
    pub const fn data(&self) -> &T {
        &self.data
    }

    /// Status of the response
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(Envelope {
                success: true,
                data: self.data,
            }),
        )
            .into_response()
    }
}
