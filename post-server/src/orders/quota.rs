//! Per-sender storage quota

/// Quota value meaning "no limit"
pub const UNLIMITED: i64 = -1;

/// Maximum number of live orders a sender may have outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoragePolicy {
    max_storage: i64,
}

impl StoragePolicy {
    /// `max_storage` of [`UNLIMITED`] disables the check
    pub fn new(max_storage: i64) -> Self {
        Self { max_storage }
    }

    pub fn unlimited() -> Self {
        Self::new(UNLIMITED)
    }

    pub fn max_storage(&self) -> i64 {
        self.max_storage
    }

    /// Whether a sender holding `outstanding` live orders may not post again
    pub fn is_full(&self, outstanding: usize) -> bool {
        if self.max_storage == UNLIMITED {
            return false;
        }
        i64::try_from(outstanding).unwrap_or(i64::MAX) >= self.max_storage
    }
}

impl Default for StoragePolicy {
    fn default() -> Self {
        Self::new(5)
    }
}
