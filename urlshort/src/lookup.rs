use crate::errors::UrlshortError;
use crate::handler::{Handler, HandlerResult};
use crate::metrics_defs::{REDIRECT_HIT, REDIRECT_MISS};
use crate::record::RedirectTable;
use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, LOCATION};
use hyper::{Request, Response, StatusCode};
use percent_encoding::percent_decode_str;
use shared::counter;
use std::borrow::Cow;
use std::sync::Arc;

/// Redirects requests whose path is in the table and hands everything else to
/// the fallback.
///
/// The table is fixed for the lifetime of the handler.
pub struct LookupHandler<F> {
    table: Arc<RedirectTable>,
    fallback: F,
}

impl<F: Handler> LookupHandler<F> {
    pub fn new(table: RedirectTable, fallback: F) -> Self {
        Self {
            table: Arc::new(table),
            fallback,
        }
    }

    #[cfg(test)]
    pub(crate) fn table(&self) -> &RedirectTable {
        &self.table
    }
}

/// Builds a handler from an in-memory path to destination map.
pub fn map_handler<F: Handler>(paths_to_urls: RedirectTable, fallback: F) -> LookupHandler<F> {
    LookupHandler::new(paths_to_urls, fallback)
}

#[async_trait]
impl<F: Handler> Handler for LookupHandler<F> {
    async fn handle(&self, request: Request<Bytes>) -> HandlerResult {
        lookup_or_fallback(&self.table, &self.fallback, request).await
    }
}

/// Looks up the request path in `table`, answering with a redirect on a hit and
/// delegating to `fallback` untouched on a miss.
pub(crate) async fn lookup_or_fallback<F>(
    table: &RedirectTable,
    fallback: &F,
    request: Request<Bytes>,
) -> HandlerResult
where
    F: Handler + ?Sized,
{
    let path = lookup_key(request.uri().path());
    match table.get(path.as_ref()) {
        Some(destination) => {
            tracing::debug!(%path, %destination, "Redirecting");
            counter!(REDIRECT_HIT).increment(1);
            redirect_response(destination)
        }
        None => {
            tracing::debug!(%path, "No redirect, using fallback");
            counter!(REDIRECT_MISS).increment(1);
            fallback.handle(request).await
        }
    }
}

/// Percent-decodes the request path. Paths that do not decode to UTF-8 are
/// looked up as they arrived.
fn lookup_key(path: &str) -> Cow<'_, str> {
    percent_decode_str(path)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(path))
}

fn redirect_response(destination: &str) -> HandlerResult {
    let location = HeaderValue::from_str(destination)
        .map_err(|_| UrlshortError::InvalidDestination(destination.to_string()))?;

    Ok(Response::builder()
        .status(StatusCode::FOUND)
        .header(LOCATION, location)
        .body(Bytes::new())?)
}
