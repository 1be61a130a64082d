use crate::handler::{Handler, HandlerResult};
use crate::lookup::lookup_or_fallback;
use crate::metrics_defs::{STORE_QUERY_DURATION, STORE_QUERY_FAILURE};
use crate::record::build_table;
use crate::store::{Filter, RecordStore, StoreError};
use async_trait::async_trait;
use hyper::Request;
use hyper::body::Bytes;
use shared::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;

/// Serves redirects straight from a record store.
///
/// Every request reloads the full set of records and rebuilds the table, so
/// changes made to the store are visible on the next request. Nothing is
/// cached between requests: if the store cannot be queried the request fails
/// with [`crate::errors::UrlshortError::Store`].
pub struct StoreHandler<S: ?Sized, F> {
    store: Arc<S>,
    fallback: F,
}

impl<S, F> StoreHandler<S, F>
where
    S: RecordStore + ?Sized,
    F: Handler,
{
    pub fn new(store: Arc<S>, fallback: F) -> Self {
        Self { store, fallback }
    }

    /// Like [`StoreHandler::new`], but queries the store once so that an
    /// unreachable store is reported before any request is served.
    pub async fn connect(store: Arc<S>, fallback: F) -> Result<Self, StoreError> {
        let records = store.find(&Filter::all()).await?;
        tracing::info!(count = records.len(), "Connected to record store");
        Ok(Self::new(store, fallback))
    }
}

#[async_trait]
impl<S, F> Handler for StoreHandler<S, F>
where
    S: RecordStore + ?Sized,
    F: Handler,
{
    async fn handle(&self, request: Request<Bytes>) -> HandlerResult {
        let start = Instant::now();
        let records = self.store.find(&Filter::all()).await.inspect_err(|e| {
            counter!(STORE_QUERY_FAILURE).increment(1);
            tracing::error!(error = %e, "Failed to query record store");
        })?;
        histogram!(STORE_QUERY_DURATION).record(start.elapsed().as_secs_f64());

        let table = build_table(records);
        lookup_or_fallback(&table, &self.fallback, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UrlshortError;
    use crate::handler::TextHandler;
    use crate::handler::testutils::get_request;
    use crate::record::Redirect;
    use crate::store::MemoryRecordStore;
    use hyper::StatusCode;
    use hyper::header::LOCATION;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Wraps a memory store, counting queries and failing on demand.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryRecordStore,
        queries: AtomicUsize,
        down: AtomicBool,
    }

    #[async_trait]
    impl RecordStore for FlakyStore {
        async fn find(&self, filter: &Filter) -> Result<Vec<Redirect>, StoreError> {
            self.queries.fetch_add(1, Ordering::Relaxed);
            if self.down.load(Ordering::Relaxed) {
                return Err(StoreError::Unavailable("connection refused".into()));
            }
            self.inner.find(filter).await
        }

        async fn insert_many(&self, records: &[Redirect]) -> Result<(), StoreError> {
            self.inner.insert_many(records).await
        }

        async fn clear(&self) -> Result<(), StoreError> {
            self.inner.clear().await
        }
    }

    #[tokio::test]
    async fn test_redirect_and_fallback() {
        let store = Arc::new(MemoryRecordStore::with_records(vec![Redirect::new(
            "/redirect",
            "/netapp",
        )]));
        let handler = StoreHandler::new(store, TextHandler::ok("Hello, world"));

        let response = handler.handle(get_request("/redirect")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/netapp");

        let response = handler.handle(get_request("/unused-path")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"Hello, world");
    }

    #[tokio::test]
    async fn test_queries_store_on_every_request() {
        let store = Arc::new(FlakyStore::default());
        let handler = StoreHandler::new(store.clone(), TextHandler::ok("fallback"));

        let response = handler.handle(get_request("/new")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Added after the handler was built, visible on the next request
        store
            .insert_many(&[Redirect::new("/new", "/first"), Redirect::new("/new", "/second")])
            .await
            .unwrap();
        let response = handler.handle(get_request("/new")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/second");

        store.clear().await.unwrap();
        let response = handler.handle(get_request("/new")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(store.queries.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_store_failure_is_not_masked() {
        let store = Arc::new(FlakyStore::default());
        store
            .insert_many(&[Redirect::new("/redirect", "/netapp")])
            .await
            .unwrap();
        let handler = StoreHandler::new(store.clone(), TextHandler::ok("fallback"));

        assert!(handler.handle(get_request("/redirect")).await.is_ok());

        // No stale table is served and the fallback is not used
        store.down.store(true, Ordering::Relaxed);
        for path in ["/redirect", "/unused-path"] {
            let err = handler.handle(get_request(path)).await.unwrap_err();
            assert!(matches!(err, UrlshortError::Store(StoreError::Unavailable(_))));
            assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        }

        store.down.store(false, Ordering::Relaxed);
        let response = handler.handle(get_request("/redirect")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn test_connect() {
        let store = Arc::new(FlakyStore::default());
        assert!(
            StoreHandler::connect(store.clone(), TextHandler::ok(""))
                .await
                .is_ok()
        );

        store.down.store(true, Ordering::Relaxed);
        let result = StoreHandler::connect(store, TextHandler::ok("")).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_dyn_store() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        store
            .insert_many(&[Redirect::new("/a", "/b")])
            .await
            .unwrap();

        let handler = StoreHandler::new(store, TextHandler::ok(""));
        let response = handler.handle(get_request("/a")).await.unwrap();
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/b");
    }
}
