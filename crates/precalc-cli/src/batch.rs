//! Fixed-size batching of a lazy sequence stream
//!
//! A batch is the unit of one lookup round-trip. Batches are pulled on demand,
//! so an arbitrarily long (or unbounded) input never holds more than one batch
//! in memory.

use crate::error::{CliError, Result};

/// Default number of sequences per lookup request
pub const DEFAULT_MAX_PER_QUERY: usize = 10;

/// Upfront reservation cap; larger batches grow as items arrive
const MAX_RESERVED: usize = 1024;

/// Splits a stream into groups of at most `size` items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batcher {
    size: usize,
}

impl Batcher {
    /// Create a batcher; a size of zero is rejected
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(CliError::invalid_argument(
                "batch size (--max-per-query) must be at least 1",
            ));
        }
        Ok(Self { size })
    }

    /// Maximum items per batch
    pub fn size(&self) -> usize {
        self.size
    }

    /// Batch an infallible source
    pub fn batches<I>(&self, source: I) -> Batches<I::IntoIter>
    where
        I: IntoIterator,
    {
        Batches {
            source: source.into_iter(),
            size: self.size,
            done: false,
        }
    }

    /// Batch a fallible source
    ///
    /// The first source error is yielded in place of the batch it interrupted,
    /// and iteration stops there.
    pub fn try_batches<I, T, E>(&self, source: I) -> TryBatches<I::IntoIter>
    where
        I: IntoIterator<Item = std::result::Result<T, E>>,
    {
        TryBatches {
            source: source.into_iter(),
            size: self.size,
            done: false,
        }
    }
}

/// Iterator returned by [`Batcher::batches`]
#[derive(Debug)]
pub struct Batches<I> {
    source: I,
    size: usize,
    done: bool,
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut batch = Vec::with_capacity(self.size.min(MAX_RESERVED));
        while batch.len() < self.size {
            match self.source.next() {
                Some(item) => batch.push(item),
                None => {
                    self.done = true;
                    break;
                },
            }
        }

        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}

impl<I: Iterator> std::iter::FusedIterator for Batches<I> {}

/// Iterator returned by [`Batcher::try_batches`]
#[derive(Debug)]
pub struct TryBatches<I> {
    source: I,
    size: usize,
    done: bool,
}

impl<I, T, E> Iterator for TryBatches<I>
where
    I: Iterator<Item = std::result::Result<T, E>>,
{
    type Item = std::result::Result<Vec<T>, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut batch = Vec::with_capacity(self.size.min(MAX_RESERVED));
        while batch.len() < self.size {
            match self.source.next() {
                Some(Ok(item)) => batch.push(item),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                },
                None => {
                    self.done = true;
                    break;
                },
            }
        }

        if batch.is_empty() {
            None
        } else {
            Some(Ok(batch))
        }
    }
}

impl<I, T, E> std::iter::FusedIterator for TryBatches<I> where
    I: Iterator<Item = std::result::Result<T, E>>
{
}
