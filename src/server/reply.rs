use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// A resolved response: status, content type and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn new(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    pub fn html(body: String) -> Self {
        Self::new("text/html; charset=utf-8", body)
    }

    pub fn css(body: String) -> Self {
        Self::new("text/css; charset=utf-8", body)
    }

    pub fn javascript(body: String) -> Self {
        Self::new("application/javascript; charset=utf-8", body)
    }

    pub fn text(body: Vec<u8>) -> Self {
        Self::new("text/plain; charset=utf-8", body)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}
