use std::error::Error;

use crate::model;
use axum::{
    extract::{rejection::FormRejection, FromRequest},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;

pub struct MyJson<T>(pub T);

impl<T: Serialize> IntoResponse for MyJson<T> {
    fn into_response(self) -> axum::response::Response {
        let Self(value) = self;
        axum::Json(value).into_response()
    }
}

impl IntoResponse for model::ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            model::ApiError::InvalidForm(_) | model::ApiError::InvalidUrl(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            model::ApiError::UrlEditingDisabled => StatusCode::FORBIDDEN,

            model::ApiError::Render(err) => {
                tracing::error!(error = %err, "page render failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            axum::Json(serde_json::json!({"err": self.to_string()})),
        )
            .into_response()
    }
}

#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(model::ApiError))]
pub struct MyForm<T>(pub T);

impl From<FormRejection> for model::ApiError {
    fn from(value: FormRejection) -> Self {
        let mut s = format!("{}", value);

        let mut source_ = value.source();
        while let Some(source) = source_ {
            s.push_str(&format!(": {}", source));
            source_ = source.source();
        }

        model::ApiError::InvalidForm(s)
    }
}
