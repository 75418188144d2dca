//! Request extractors whose rejections render as the API's JSON error body.
//!
//! axum's own `Json`, `Path` and `Query` reject with plain-text bodies and a mix of 400, 415 and
//! 422. These wrappers run the same extraction and turn any rejection into
//! [`Error::BadRequest`](crate::errors::Error::BadRequest).

use axum::{
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::errors::Error;

/// JSON request body. Also usable as a response.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct Query<T>(pub T);
