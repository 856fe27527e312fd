//! Success half of the response envelope.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    /// Rows in this page, not the number of matching rows overall.
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T, F = ()> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<F>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            pagination: None,
            filters: None,
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload (deletes, password changes).
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: message.into(),
            pagination: None,
            filters: None,
        }
    }
}

impl<T, F> ApiResponse<T, F> {
    pub fn with_pagination(mut self, page: PageInfo) -> Self {
        self.pagination = Some(page);
        self
    }

    pub fn with_filters<G>(self, filters: G) -> ApiResponse<T, G> {
        ApiResponse {
            success: self.success,
            data: self.data,
            message: self.message,
            pagination: self.pagination,
            filters: Some(filters),
        }
    }
}

pub type ApiResult<T, F = ()> = Result<Json<ApiResponse<T, F>>, crate::error::ApiError>;
pub type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_success_omits_data() {
        let v = serde_json::to_value(ApiResponse::done("Usuario eliminado exitosamente")).unwrap();
        assert_eq!(v["success"], true);
        assert!(v.get("data").is_none());
        assert!(v.get("pagination").is_none());
    }

    #[test]
    fn pagination_and_filters_serialize() {
        #[derive(Serialize)]
        struct F {
            category: &'static str,
        }
        let v = serde_json::to_value(
            ApiResponse::ok(vec![1, 2], "ok")
                .with_pagination(PageInfo {
                    page: 2,
                    limit: 10,
                    total: 2,
                })
                .with_filters(F { category: "Audio" }),
        )
        .unwrap();
        assert_eq!(v["data"], serde_json::json!([1, 2]));
        assert_eq!(v["pagination"]["total"], 2);
        assert_eq!(v["filters"]["category"], "Audio");
    }
}
