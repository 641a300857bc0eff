use std::iter::{Fuse, FusedIterator};

/// Groups consecutive items sharing a derived key.
///
/// Items are pushed one at a time; whenever the key changes the batch built
/// so far is handed back and a new one starts with the pushed item. The last
/// batch is only released by [`flush`](SequenceBatcher::flush).
pub struct SequenceBatcher<T, K, F> {
    extract_key: F,
    items: Vec<T>,
    current_key: Option<K>,
}

impl<T, K, F> SequenceBatcher<T, K, F>
where
    K: PartialEq,
    F: FnMut(&T) -> K,
{
    pub fn new(extract_key: F) -> Self {
        Self {
            extract_key,
            items: Vec::new(),
            current_key: None,
        }
    }

    /// Adds an item; returns the finished batch when the item's key differs
    /// from the current one.
    pub fn push(&mut self, item: T) -> Option<Vec<T>> {
        let key = (self.extract_key)(&item);
        let finished = match &self.current_key {
            Some(current) if *current != key => Some(std::mem::take(&mut self.items)),
            _ => None,
        };
        self.current_key = Some(key);
        self.items.push(item);
        finished
    }

    /// Releases the pending batch, if any, and starts over.
    pub fn flush(&mut self) -> Option<Vec<T>> {
        self.current_key = None;
        if self.items.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.items))
        }
    }

    pub fn has_data(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Iterator adapter returned by [`BatchByKey::batch_by_key`].
pub struct Batches<I: Iterator, K, F> {
    source: Fuse<I>,
    batcher: SequenceBatcher<I::Item, K, F>,
}

impl<I, K, F> Iterator for Batches<I, K, F>
where
    I: Iterator,
    K: PartialEq,
    F: FnMut(&I::Item) -> K,
{
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        for item in self.source.by_ref() {
            if let Some(batch) = self.batcher.push(item) {
                return Some(batch);
            }
        }
        self.batcher.flush()
    }
}

impl<I, K, F> FusedIterator for Batches<I, K, F>
where
    I: Iterator,
    K: PartialEq,
    F: FnMut(&I::Item) -> K,
{
}

pub trait BatchByKey: Iterator + Sized {
    /// Groups consecutive items with equal keys into `Vec`s.
    ///
    /// ```
    /// use xsvlib::core::batch::BatchByKey;
    ///
    /// let days = vec![("mon", 1), ("mon", 2), ("tue", 3), ("mon", 4)];
    /// let batches: Vec<Vec<_>> = days.into_iter().batch_by_key(|(day, _)| *day).collect();
    ///
    /// assert_eq!(batches.len(), 3);
    /// assert_eq!(batches[0], vec![("mon", 1), ("mon", 2)]);
    /// assert_eq!(batches[2], vec![("mon", 4)]);
    /// ```
    fn batch_by_key<K, F>(self, extract_key: F) -> Batches<Self, K, F>
    where
        K: PartialEq,
        F: FnMut(&Self::Item) -> K,
    {
        Batches {
            source: self.fuse(),
            batcher: SequenceBatcher::new(extract_key),
        }
    }
}

impl<I: Iterator> BatchByKey for I {}
