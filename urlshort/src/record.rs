use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps a request path to the location it redirects to.
pub type RedirectTable = HashMap<String, String>;

/// A single path to destination mapping, as found in YAML, JSON and the record stores.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    #[serde(rename = "url")]
    pub destination: String,
}

impl Redirect {
    pub fn new<P, D>(path: P, destination: D) -> Self
    where
        P: Into<String>,
        D: Into<String>,
    {
        Redirect {
            path: path.into(),
            destination: destination.into(),
        }
    }
}

/// Folds records into a table in sequence order.
///
/// When several records share a path the last one wins.
pub fn build_table<I>(records: I) -> RedirectTable
where
    I: IntoIterator<Item = Redirect>,
{
    let mut table = RedirectTable::new();
    for redirect in records {
        table.insert(redirect.path, redirect.destination);
    }
    table
}
