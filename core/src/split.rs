use std::fmt;

/// Selects one shard out of `size` shards of an ordered work list.
///
/// The result only depends on `(size, index, list.len())`, so workers given the
/// same list and `size` but different `index` cover the list exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SplitState {
    size: usize,
    index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitStateError {
    #[error("Split size must be positive")]
    ZeroSize,

    #[error("Split index {index} is out of range (size={size})")]
    IndexOutOfRange { size: usize, index: usize },
}

impl SplitState {
    pub fn new(size: usize, index: usize) -> Result<Self, SplitStateError> {
        if size == 0 {
            return Err(SplitStateError::ZeroSize);
        }
        if index >= size {
            return Err(SplitStateError::IndexOutOfRange { size, index });
        }
        Ok(Self { size, index })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// ```
    /// use cverify_core::split::SplitState;
    ///
    /// let list = [0, 1, 2, 3, 4];
    /// assert_eq!(SplitState::new(3, 1).unwrap().split(&list), &[1, 2]);
    /// assert_eq!(SplitState::new(6, 5).unwrap().split(&list), &[] as &[i32]);
    /// ```
    pub fn split<'a, T>(&self, list: &'a [T]) -> &'a [T] {
        let len = list.len();
        if len <= self.size {
            return list.get(self.index..self.index + 1).unwrap_or(&[]);
        }
        let begin = len * self.index / self.size;
        let end = len * (self.index + 1) / self.size;
        &list[begin..end]
    }
}

impl fmt::Display for SplitState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.size)
    }
}
