use thiserror::Error;

/// Reasons a [`RingBuf`](crate::RingBuf) refuses to bind to storage.
///
/// A failed bind never modifies the buffer it was called on.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    #[error("capacity {capacity} is below the minimum of 2")]
    CapacityTooSmall { capacity: usize },

    #[error("capacity {capacity} is not a power of two")]
    NotPowerOfTwo { capacity: usize },

    #[error("storage of {len} bytes cannot back a capacity of {capacity}")]
    StorageTooSmall { len: usize, capacity: usize },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearError {
    #[error("ring buffer is not bound to any storage")]
    Unbound,
}

/// Checks that `capacity` is a power of two, at least 2, and fits in `len` bytes of storage.
pub(crate) const fn validate(len: usize, capacity: usize) -> Result<(), InitError> {
    if capacity < 2 {
        return Err(InitError::CapacityTooSmall { capacity });
    }

    if !capacity.is_power_of_two() {
        return Err(InitError::NotPowerOfTwo { capacity });
    }

    if len < capacity {
        return Err(InitError::StorageTooSmall { len, capacity });
    }

    Ok(())
}
