use std::collections::TryReserveError;

/// Failure of a fallible growth path (`try_reserve`, `try_set`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("capacity overflow: record buffer would exceed isize::MAX bytes")]
    CapacityOverflow,
    #[error("allocation of {records} records failed")]
    AllocFailed {
        records: usize,
        #[source]
        source: TryReserveError,
    },
}
