use super::options::ReadOptions;
use super::types::{Query, SliceDescriptor};
use super::unit::ScanUnit;
use crate::error::ReadError;

use serde_json::{Value, json};

/// Sort applied when the caller does not choose one. `_doc` is the cheapest
/// stable order for a scroll.
pub const DEFAULT_SORT: &str = "_doc";

/// Keys of the scan parameters the builder owns.
const RESERVED_PARAMS: [&str; 2] = ["query", "slice"];

/// Splits `query` into `options.npartitions` deferred scan units.
///
/// A missing query matches every document. The caller's query is only read.
/// The returned units are ordered by slice id, and nothing touches the
/// network until a unit is executed.
///
/// # Errors
/// * `InvalidPartitionCount` if `npartitions` is zero.
/// * `SliceConflict` if the query already contains a `slice` key.
/// * `ReservedParam` if the scan parameters contain `query` or `slice`.
/// * `InvalidClientType` if the client type name is empty.
pub fn read_search(
    query: Option<&Query>,
    options: ReadOptions,
) -> Result<Vec<ScanUnit>, ReadError> {
    validate(query, &options)?;

    let ReadOptions {
        npartitions,
        client,
        params,
    } = options;

    let empty = Query::new();
    let base = with_default_sort(query.unwrap_or(&empty));

    let units: Vec<ScanUnit> = (0..npartitions)
        .map(|id| {
            let slice = SliceDescriptor {
                id,
                max: npartitions,
            };
            ScanUnit::new(
                slice,
                client.clone(),
                partition_query(&base, slice),
                params.clone(),
            )
        })
        .collect();

    tracing::debug!(
        "Built {} scan units (client: {}, {} scan parameters)",
        units.len(),
        client.client_type,
        params.len()
    );

    Ok(units)
}

fn validate(query: Option<&Query>, options: &ReadOptions) -> Result<(), ReadError> {
    if options.npartitions == 0 {
        return Err(ReadError::InvalidPartitionCount(options.npartitions));
    }

    if query.is_some_and(|q| q.contains_key("slice")) {
        return Err(ReadError::SliceConflict);
    }

    if let Some(key) = RESERVED_PARAMS
        .iter()
        .find(|key| options.params.contains_key(**key))
    {
        return Err(ReadError::ReservedParam(key.to_string()));
    }

    if options.client.client_type.trim().is_empty() {
        return Err(ReadError::InvalidClientType);
    }

    Ok(())
}

/// Copies the query and adds `sort: ["_doc"]` unless a `sort` key exists.
/// An existing key is kept as-is, whatever its value.
pub fn with_default_sort(query: &Query) -> Query {
    let mut copy = query.clone();
    copy.entry("sort")
        .or_insert_with(|| Value::Array(vec![Value::from(DEFAULT_SORT)]));
    copy
}

/// The body sent for one slice: the sorted base query plus its slice descriptor.
pub fn partition_query(base: &Query, slice: SliceDescriptor) -> Query {
    let mut copy = base.clone();
    copy.insert(
        "slice".to_string(),
        json!({ "id": slice.id, "max": slice.max }),
    );
    copy
}
