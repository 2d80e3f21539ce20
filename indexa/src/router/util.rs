use indexa_core::{Capability, Coverage, IndexaError, Series};

/// Collapse a set of provider errors into a uniform `IndexaError` outcome.
///
/// Rules:
/// - If `attempted_any` is false → `Unsupported(capability)`.
/// - If all errors are `ProviderTimeout` → `AllProvidersTimedOut(capability)`.
/// - If `not_found_what` is `Some` and all errors are `NotFound` → `NotFound(what)`.
/// - Else → `AllProvidersFailed(errors)`.
pub fn collapse_errors(
    capability: Capability,
    attempted_any: bool,
    errors: Vec<IndexaError>,
    not_found_what: Option<String>,
) -> IndexaError {
    if !attempted_any {
        return IndexaError::unsupported(capability.to_string());
    }
    if !errors.is_empty()
        && errors
            .iter()
            .all(|e| matches!(e, IndexaError::ProviderTimeout { .. }))
    {
        return IndexaError::AllProvidersTimedOut {
            capability: capability.to_string(),
        };
    }
    if let Some(what) = not_found_what
        && !errors.is_empty()
        && errors
            .iter()
            .all(|e| matches!(e, IndexaError::NotFound { .. }))
    {
        return IndexaError::not_found(what);
    }
    IndexaError::AllProvidersFailed(errors)
}

/// Date span and size of a fetched series, for attribution.
pub(crate) fn coverage(series: &Series) -> Option<Coverage> {
    Some(Coverage {
        start: series.first()?.date,
        end: series.last()?.date,
        points: series.len(),
    })
}
