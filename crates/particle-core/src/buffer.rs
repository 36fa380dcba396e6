use crate::error::ParticleError;

/// One dense per-particle attribute column.
///
/// Columns are either eager (always sized to the system capacity) or
/// deferred (left unallocated until first requested, then kept the same
/// length as the eager columns). Every new slot is produced by the `fill`
/// factory supplied at construction.
///
/// A caller may hand the column its own storage through
/// [`ParticleBuffer::set_user_buffer`]. The length of that storage then caps
/// the capacity the whole particle system can grow to.
pub struct ParticleBuffer<T> {
    data: Vec<T>,
    fill: fn() -> T,
    allocated: bool,
    user_supplied_capacity: usize,
}

impl<T> ParticleBuffer<T> {
    /// A column that is always allocated.
    pub fn eager(fill: fn() -> T) -> Self {
        Self {
            data: Vec::new(),
            fill,
            allocated: true,
            user_supplied_capacity: 0,
        }
    }

    /// A column allocated on first request.
    pub fn deferred(fill: fn() -> T) -> Self {
        Self {
            data: Vec::new(),
            fill,
            allocated: false,
            user_supplied_capacity: 0,
        }
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Capacity fixed by caller-supplied storage, `0` if none.
    #[inline]
    pub fn user_supplied_capacity(&self) -> usize {
        self.user_supplied_capacity
    }

    /// Whole column, including slots past the live count.
    /// Empty while a deferred column is unallocated.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Allocate a deferred column to `capacity` slots if it is not yet allocated.
    pub fn request(&mut self, capacity: usize) -> &mut [T] {
        if !self.allocated {
            let fill = self.fill;
            self.data = (0..capacity).map(|_| fill()).collect();
            self.allocated = true;
        }
        &mut self.data
    }

    /// Clamp a proposed capacity to caller-supplied storage.
    #[inline]
    pub fn limit_capacity(&self, capacity: usize) -> usize {
        limit_capacity(capacity, self.user_supplied_capacity)
    }

    /// Grow an allocated column to `capacity` slots.
    pub fn reallocate(&mut self, capacity: usize) {
        if self.allocated && self.data.len() < capacity {
            debug_assert!(
                self.user_supplied_capacity == 0 || capacity <= self.user_supplied_capacity,
                "capacity must be clamped to user storage before reallocation"
            );
            let fill = self.fill;
            self.data.resize_with(capacity, fill);
        }
    }

    /// Replace the backing storage with a caller-supplied buffer.
    ///
    /// The first `count` rows move into the new storage, so live particles
    /// keep their values.
    pub fn set_user_buffer(&mut self, mut buffer: Vec<T>, count: usize) -> Result<(), ParticleError> {
        if buffer.len() < count {
            return Err(ParticleError::BufferTooSmall {
                required: count,
                supplied: buffer.len(),
            });
        }
        if self.allocated {
            for (dst, src) in buffer.iter_mut().zip(self.data.drain(..count.min(self.data.len()))) {
                *dst = src;
            }
        }
        self.user_supplied_capacity = buffer.len();
        self.data = buffer;
        self.allocated = true;
        Ok(())
    }

    /// Move row `from` into slot `to`. The old contents of `to` end up in `from`.
    #[inline]
    pub fn move_row(&mut self, from: usize, to: usize) {
        if self.allocated && from != to {
            self.data.swap(from, to);
        }
    }

    /// Rotate `[start, end)` so that `mid` becomes the first element.
    pub fn rotate(&mut self, start: usize, mid: usize, end: usize) {
        if self.allocated {
            self.data[start..end].rotate_left(mid - start);
        }
    }
}

/// Reserve room for one more element, doubling from
/// [`settings::MIN_BUFFER_CAPACITY`](crate::config::settings::MIN_BUFFER_CAPACITY).
#[inline]
pub fn reserve_doubling<T>(v: &mut Vec<T>) {
    if v.len() == v.capacity() {
        let additional = v.len().max(crate::config::settings::MIN_BUFFER_CAPACITY);
        v.reserve_exact(additional);
    }
}

/// `0` means "no limit".
#[inline]
pub fn limit_capacity(capacity: usize, max_count: usize) -> usize {
    if max_count != 0 && capacity > max_count {
        max_count
    } else {
        capacity
    }
}
