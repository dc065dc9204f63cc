//! Ordered, fixed-length sequences with optionally unassigned slots.
//!
//! [`Seq`] is both the result buffer used by the aggregator and the
//! receiver of the iteration utilities (`map`, `filter`, `for_each`,
//! `find`, `reduce`). Callbacks receive the element, its index and the
//! whole sequence, and are only invoked for assigned slots.

pub mod summary;

pub use summary::summarize;

use crate::error::SeqError;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Ordered sequence of slots, each either assigned or unassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seq<T> {
    slots: Vec<Option<T>>,
}

impl<T> Default for Seq<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T> Seq<T> {
    /// Creates a sequence of `len` unassigned slots.
    pub fn with_len(len: usize) -> Self {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        Self { slots }
    }

    /// Creates a sequence from raw slots; `None` marks an unassigned slot.
    pub fn from_slots(slots: Vec<Option<T>>) -> Self {
        Self { slots }
    }

    /// Number of slots, assigned or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of assigned slots.
    pub fn assigned(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True when every slot holds a value.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Writes `value` into slot `index`, returning the previous value.
    ///
    /// The length never changes: writing past the end is an error rather
    /// than a silent extension.
    pub fn set(&mut self, index: usize, value: T) -> Result<Option<T>, SeqError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(SeqError::OutOfRange { index, len })?;
        Ok(slot.replace(value))
    }

    /// Iterates over assigned slots as `(index, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|value| (index, value)))
    }

    /// Converts into a plain vector, failing on the first unassigned slot.
    pub fn into_dense(self) -> Result<Vec<T>, SeqError> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or(SeqError::Unassigned { index }))
            .collect()
    }

    /// Consumes the sequence and returns the raw slots.
    pub fn into_slots(self) -> Vec<Option<T>> {
        self.slots
    }

    /// Applies `f` to every assigned element, keeping length and holes.
    pub fn map<U, F>(&self, mut f: F) -> Seq<U>
    where
        F: FnMut(&T, usize, &Self) -> U,
    {
        let slots = self
            .slots
            .iter()
            .enumerate()
            .map(|(index, slot)| slot.as_ref().map(|value| f(value, index, self)))
            .collect();
        Seq { slots }
    }

    /// Returns a dense sequence of the assigned elements matching `predicate`.
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        T: Clone,
        F: FnMut(&T, usize, &Self) -> bool,
    {
        let slots = self
            .iter()
            .filter(|&(index, value)| predicate(value, index, self))
            .map(|(_, value)| Some(value.clone()))
            .collect();
        Self { slots }
    }

    /// Calls `f` once for every assigned element, in order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T, usize, &Self),
    {
        for (index, value) in self.iter() {
            f(value, index, self);
        }
    }

    /// First assigned element satisfying `predicate`.
    pub fn find<F>(&self, mut predicate: F) -> Option<&T>
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        self.iter()
            .find(|&(index, value)| predicate(value, index, self))
            .map(|(_, value)| value)
    }

    /// Left fold over the assigned elements.
    ///
    /// Without `initial`, the first assigned element seeds the accumulator
    /// and the fold starts at the next one. An empty sequence with no
    /// initial value is an error.
    pub fn reduce<F>(&self, mut f: F, initial: Option<T>) -> Result<T, SeqError>
    where
        T: Clone,
        F: FnMut(T, &T, usize, &Self) -> T,
    {
        let mut elements = self.iter();
        let mut acc = match initial {
            Some(initial) => initial,
            None => {
                let (_, first) = elements.next().ok_or(SeqError::EmptyReduce)?;
                first.clone()
            }
        };

        for (index, value) in elements {
            acc = f(acc, value, index, self);
        }

        trace!("reduced {} assigned slots", self.assigned());
        Ok(acc)
    }

    /// Left fold into an accumulator of a different type.
    pub fn fold<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(A, &T, usize, &Self) -> A,
    {
        self.iter()
            .fold(init, |acc, (index, value)| f(acc, value, index, self))
    }
}

impl<T> From<Vec<T>> for Seq<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T> FromIterator<T> for Seq<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().map(Some).collect(),
        }
    }
}
