use crate::errors::UrlshortError;
use crate::handler::Handler;
use http_body_util::BodyExt;
use http_body_util::combinators::BoxBody;
use hyper::body::{Body, Bytes};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use shared::http::{into_boxed_response, make_error_response};
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Exposes a [`Handler`] as a hyper service.
///
/// Request bodies are buffered before the handler runs. Handler errors are
/// logged and answered with an error status instead of dropping the
/// connection.
pub struct RedirectService<H> {
    handler: Arc<H>,
}

impl<H: Handler + 'static> RedirectService<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl<H, B> Service<Request<B>> for RedirectService<H>
where
    H: Handler + 'static,
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Display + Send,
{
    type Response = Response<BoxBody<Bytes, UrlshortError>>;
    type Error = UrlshortError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let handler = self.handler.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read request body");
                    return Ok(into_boxed_response(make_error_response(
                        StatusCode::BAD_REQUEST,
                    )));
                }
            };

            let request = Request::from_parts(parts, body);
            let method = request.method().clone();
            let uri = request.uri().clone();

            let response = match handler.handle(request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(%method, %uri, error = %e, "Request failed");
                    make_error_response(e.status_code())
                }
            };

            Ok(into_boxed_response(response))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerResult, TextHandler};
    use crate::lookup::LookupHandler;
    use crate::record::RedirectTable;
    use crate::store::StoreError;
    use async_trait::async_trait;
    use http_body_util::Full;
    use hyper::header::LOCATION;
    use hyper_util::client::legacy::Client;
    use hyper_util::client::legacy::connect::HttpConnector;
    use hyper_util::rt::TokioExecutor;
    use shared::http::serve_listener;
    use tokio::net::TcpListener;

    struct UnavailableHandler;

    #[async_trait]
    impl Handler for UnavailableHandler {
        async fn handle(&self, _request: Request<Bytes>) -> HandlerResult {
            Err(StoreError::Unavailable("connection refused".into()).into())
        }
    }

    fn test_service() -> RedirectService<LookupHandler<TextHandler>> {
        let table = RedirectTable::from([
            ("/redirect".into(), "/netapp".into()),
            ("/broken".into(), "/bad\r\nheader".into()),
        ]);
        RedirectService::new(LookupHandler::new(table, TextHandler::ok("Hello, world")))
    }

    fn test_request(path: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    async fn body_bytes(response: Response<BoxBody<Bytes, UrlshortError>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_service_responses() {
        let service = test_service();

        let response = service.call(test_request("/redirect")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/netapp");

        let response = service.call(test_request("/unused-path")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await.as_ref(), b"Hello, world");
    }

    #[tokio::test]
    async fn test_handler_errors_become_responses() {
        let response = test_service()
            .call(test_request("/broken"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = RedirectService::new(UnavailableHandler)
            .call(test_request("/redirect"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_serve_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(serve_listener(listener, test_service()));

        let client: Client<HttpConnector, Full<Bytes>> =
            Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let request = Request::builder()
            .uri(format!("http://127.0.0.1:{port}/redirect"))
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = client.request(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/netapp");

        let request = Request::builder()
            .method("POST")
            .uri(format!("http://127.0.0.1:{port}/unused-path"))
            .body(Full::new(Bytes::from_static(b"ignored")))
            .unwrap();
        let response = client.request(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), b"Hello, world");
    }
}
