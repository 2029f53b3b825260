use thiserror::Error;

/// Errors reported by the fallible table operations and by configuration
/// validation.
///
/// Lookup misses and fresh insertions are not errors; they are reported
/// through `Option` and `bool` return values instead.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The [`TableConfig`](crate::TableConfig) handed to the table was
    /// rejected.
    #[error("invalid table configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Growing the slot array would overflow `usize`.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The allocator could not provide the slot array.
    #[error("failed to allocate {slots} slots")]
    AllocFailed {
        /// Number of slots that were requested.
        slots: usize,
    },
}

/// The configuration field that failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A table needs at least one slot.
    #[error("initial capacity must be at least 1")]
    ZeroCapacity,

    /// The load factor must lie strictly between 0 and 1 so that at least one
    /// slot is always empty.
    #[error("max load factor must be in (0, 1), got {0}")]
    LoadFactorOutOfRange(f64),

    /// Growth must always enlarge the table.
    #[error("growth factor must be at least 2, got {0}")]
    GrowthFactorTooSmall(usize),
}

/// Result alias used by the fallible table operations.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn config_errors_convert_and_display() {
        let err: Error = ConfigError::LoadFactorOutOfRange(1.5).into();
        assert_eq!(
            err,
            Error::InvalidConfig(ConfigError::LoadFactorOutOfRange(1.5))
        );
        assert_eq!(
            err.to_string(),
            "invalid table configuration: max load factor must be in (0, 1), got 1.5"
        );
    }

    #[test]
    fn alloc_failure_names_slot_count() {
        let err = Error::AllocFailed { slots: 1024 };
        assert_eq!(err.to_string(), "failed to allocate 1024 slots");
        assert_eq!(Error::CapacityOverflow.to_string(), "capacity overflow");
    }
}
