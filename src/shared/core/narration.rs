// Plain-text response body built line by line while a request is handled.
//
// Every outcome, failures included, ends up as a line in the body. The response
// is always rendered as 200 so callers have to read the text.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Narration {
    body: String,
}

impl Narration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        self.body.push_str(text.as_ref());
        self.body.push('\n');
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.body.lines()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.body.contains(needle)
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }
}

impl IntoResponse for Narration {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.body,
        )
            .into_response()
    }
}
