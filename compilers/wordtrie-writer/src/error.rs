use thiserror::Error;

/// Failure of a byte-writing step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// The step would pass the capacity ceiling. Nothing was written by it.
    #[error("capacity exceeded: {needed} bytes at offset {offset} would pass the {capacity} byte ceiling")]
    CapacityExceeded {
        offset: usize,
        needed: usize,
        capacity: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("capacity {requested} exceeds the {max} byte dictionary ceiling")]
    CapacityTooLarge { requested: usize, max: usize },
}
