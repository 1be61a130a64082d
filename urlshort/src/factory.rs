//! Builds lookup handlers straight from serialized redirect lists.
use crate::decode::{DecodeError, Format};
use crate::handler::Handler;
use crate::lookup::LookupHandler;
use crate::record::build_table;

/// Decodes `raw` with `format` and wraps `fallback` in a handler serving the
/// decoded redirects.
///
/// Decoding is all or nothing: on error no handler is produced and the
/// decoder's error is returned as is.
pub fn decoded_handler<F: Handler>(
    raw: &[u8],
    format: Format,
    fallback: F,
) -> Result<LookupHandler<F>, DecodeError> {
    let redirects = format.decode(raw)?;
    tracing::debug!(
        format = format.as_str(),
        count = redirects.len(),
        "Decoded redirects"
    );
    Ok(LookupHandler::new(build_table(redirects), fallback))
}

/// YAML is expected to be in the format:
///
/// ```yaml
/// - path: /some-path
///   url: https://www.some-url.com/demo
/// ```
pub fn yaml_handler<F: Handler>(yml: &[u8], fallback: F) -> Result<LookupHandler<F>, DecodeError> {
    decoded_handler(yml, Format::Yaml, fallback)
}

/// JSON is expected to be an array of `{"path": ..., "url": ...}` objects.
pub fn json_handler<F: Handler>(json: &[u8], fallback: F) -> Result<LookupHandler<F>, DecodeError> {
    decoded_handler(json, Format::Json, fallback)
}
