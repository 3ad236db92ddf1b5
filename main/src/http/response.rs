use http_protocol::header::{APPLICATION_JSON, CONTENT_TYPE, TEXT_PLAIN};
use http_protocol::status_code::{INTERNAL_SERVER_ERROR, NOT_FOUND, PAYLOAD_TOO_LARGE};
use serde::Serialize;
use warp::http::header::HeaderMap;
use warp::http::{HeaderValue, StatusCode};
use warp::reply::Response;
use warp::Reply;

#[derive(Default)]
pub struct ResponseBuilder {
    status_code: Option<StatusCode>,
    headers: HeaderMap<HeaderValue>,
}

impl ResponseBuilder {
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code: Some(status_code),
            ..Default::default()
        }
    }

    pub fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        self
    }

    pub fn build(self, body: Vec<u8>) -> Response {
        let mut res = Response::new(body.into());

        *res.headers_mut() = self.headers;

        *res.status_mut() = self.status_code.unwrap_or(INTERNAL_SERVER_ERROR);

        res
    }

    pub fn empty(self) -> Response {
        self.build(vec![])
    }

    pub fn json<T>(self, body: &T) -> Response
    where
        T: Serialize,
    {
        let body = serde_json::to_vec(body).map_err(|err| {
            trace::error!("response::json error: {}", err);
        });

        let builder = self.with_content_type(APPLICATION_JSON);

        match body {
            Ok(body) => builder.build(body),
            Err(()) => INTERNAL_SERVER_ERROR.into_response(),
        }
    }

    pub fn text(self, body: String) -> Response {
        self.with_content_type(TEXT_PLAIN).build(body.into_bytes())
    }
}

impl ResponseBuilder {
    pub fn not_found(body: String) -> Response {
        Self::new(NOT_FOUND).text(body)
    }

    pub fn internal_server_error() -> Response {
        INTERNAL_SERVER_ERROR.into_response()
    }

    pub fn payload_too_large() -> Response {
        PAYLOAD_TOO_LARGE.into_response()
    }
}

#[cfg(test)]
mod tests {
    use http_protocol::status_code::{ACCEPTED, OK};

    use super::*;

    #[test]
    fn test_simple_response() {
        assert_eq!(ResponseBuilder::new(OK).empty().status(), OK);
        assert_eq!(ResponseBuilder::new(ACCEPTED).empty().status(), ACCEPTED);
        assert_eq!(
            ResponseBuilder::internal_server_error().status(),
            INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ResponseBuilder::payload_too_large().status(),
            PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_json_sets_content_type() {
        let resp = ResponseBuilder::new(OK).json(&serde_json::json!({"status": "ok"}));
        assert_eq!(
            resp.headers().get(CONTENT_TYPE).unwrap(),
            HeaderValue::from_static(APPLICATION_JSON)
        );
    }

    #[test]
    fn test_not_found_keeps_body() {
        let resp = ResponseBuilder::not_found("GET /nonsense".to_string());
        assert_eq!(resp.status(), NOT_FOUND);
    }
}
