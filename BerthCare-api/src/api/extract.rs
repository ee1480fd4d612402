//! Extractors whose rejections render as [`ErrorResponse`] bodies

use axum::extract::{FromRequest, FromRequestParts};

use super::error::ErrorResponse;

/// JSON request body; malformed input is a 400
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ErrorResponse))]
pub struct ApiJson<T>(pub T);

/// Query-string parameters; undecodable input is a 400
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ErrorResponse))]
pub struct ApiQuery<T>(pub T);

/// Path parameters; undecodable input is a 400
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ErrorResponse))]
pub struct ApiPath<T>(pub T);
