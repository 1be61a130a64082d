//! Redirects requests by path, falling back to another handler on a miss.
//!
//! Redirects can come from an in-memory map, from YAML or JSON text, or from a
//! [`store::RecordStore`] that is queried on every request. Handlers nest: each
//! one wraps the handler it falls back to, and the outermost handler is served
//! over HTTP by [`run`].
pub mod config;
pub mod decode;
pub mod errors;
pub mod factory;
pub mod handler;
pub mod lookup;
pub mod metrics_defs;
pub mod record;
pub mod service;
pub mod sources;
pub mod store;
pub mod store_handler;

pub use errors::UrlshortError;
pub use handler::Handler;
pub use record::{Redirect, RedirectTable};

use service::RedirectService;
use shared::http::run_http_service;

pub async fn run(config: config::Config) -> Result<(), UrlshortError> {
    config.validate()?;
    shared::metrics_defs::describe_all(metrics_defs::ALL_METRICS);

    let handler = sources::build_handler(&config).await?;
    run_http_service(
        &config.listener.host,
        config.listener.port,
        RedirectService::new(handler),
    )
    .await
}
