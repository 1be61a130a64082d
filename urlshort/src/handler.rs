use crate::errors::UrlshortError;
use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

pub type HandlerResult = Result<Response<Bytes>, UrlshortError>;

/// Anything able to turn a request into a response.
///
/// Redirect handlers implement it, and so does every fallback they wrap. Bodies
/// are fully buffered on both sides.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, request: Request<Bytes>) -> HandlerResult;
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Box<H> {
    async fn handle(&self, request: Request<Bytes>) -> HandlerResult {
        (**self).handle(request).await
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn handle(&self, request: Request<Bytes>) -> HandlerResult {
        (**self).handle(request).await
    }
}

/// Responds to every request with the same status and plain text body.
#[derive(Clone, Debug)]
pub struct TextHandler {
    status: StatusCode,
    body: Bytes,
}

impl TextHandler {
    pub fn new<B: Into<Bytes>>(status: StatusCode, body: B) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok<B: Into<Bytes>>(body: B) -> Self {
        Self::new(StatusCode::OK, body)
    }
}

#[async_trait]
impl Handler for TextHandler {
    async fn handle(&self, _request: Request<Bytes>) -> HandlerResult {
        let mut response = Response::new(self.body.clone());
        *response.status_mut() = self.status;
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Ok(response)
    }
}
