use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use crate::{prelude::*, table::PriceTable};

const POSTPROCESSED_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Raw data response.
///
/// The platform normally answers with a paged object, but a bare list is accepted as well.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Paged { items: Vec<Value> },
    List(Vec<Value>),
    Other(Value),
}

impl Payload {
    /// Normalize into a table, or [`None`] if the payload is neither a page nor a non-empty list.
    ///
    /// An empty page is still a table, just an empty one.
    pub fn into_table(self, postprocess: bool) -> Option<PriceTable> {
        let records = match self {
            Self::Paged { items } => items,
            Self::List(items) if !items.is_empty() => items,
            Self::List(_) => {
                debug!("empty list");
                return None;
            }
            Self::Other(value) => {
                debug!(%value, "neither a page nor a list");
                return None;
            }
        };
        let mut table = PriceTable::from_records(records);
        if postprocess {
            table.map_column("date", normalize_timestamp);
            table.sort_by_column("date");
        }
        Some(table)
    }
}

fn normalize_timestamp(value: Value) -> Value {
    if let Value::String(text) = &value
        && let Ok(timestamp) = DateTime::parse_from_rfc3339(text)
    {
        return Value::String(timestamp.format(POSTPROCESSED_TIMESTAMP_FORMAT).to_string());
    }
    value
}
