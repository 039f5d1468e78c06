use std::collections::BTreeSet;
use std::vec::Vec;

use super::{Expr, ParamStore, Shared};
use crate::{
    dtypes::Dtype,
    tensor::{Error, Tensor, UniqueId},
};

/// A target in a [ParamStore], and the expression for its next value.
#[derive(Debug, Clone)]
pub struct UpdatePair<E> {
    pub target: Shared,
    pub value: Expr<E>,
}

impl<E> UpdatePair<E> {
    pub fn new(target: &Shared, value: impl Into<Expr<E>>) -> Self {
        Self {
            target: target.clone(),
            value: value.into(),
        }
    }
}

/// An ordered batch of [UpdatePair]s, committed together with [ParamStore::apply].
#[derive(Debug, Clone)]
pub struct Updates<E> {
    pairs: Vec<UpdatePair<E>>,
}

impl<E> Default for Updates<E> {
    fn default() -> Self {
        Self {
            pairs: Default::default(),
        }
    }
}

impl<E> Updates<E> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, target: &Shared, value: impl Into<Expr<E>>) {
        self.pairs.push(UpdatePair::new(target, value));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UpdatePair<E>> {
        self.pairs.iter()
    }

    /// The targets, in order.
    pub fn targets(&self) -> impl Iterator<Item = &Shared> {
        self.pairs.iter().map(|pair| &pair.target)
    }
}

impl<E> Extend<UpdatePair<E>> for Updates<E> {
    fn extend<I: IntoIterator<Item = UpdatePair<E>>>(&mut self, iter: I) {
        self.pairs.extend(iter)
    }
}

impl<E> FromIterator<UpdatePair<E>> for Updates<E> {
    fn from_iter<I: IntoIterator<Item = UpdatePair<E>>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl<E> IntoIterator for Updates<E> {
    type Item = UpdatePair<E>;
    type IntoIter = std::vec::IntoIter<UpdatePair<E>>;
    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a Updates<E> {
    type Item = &'a UpdatePair<E>;
    type IntoIter = std::slice::Iter<'a, UpdatePair<E>>;
    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

impl<E: Dtype> ParamStore<E> {
    /// Commits every pair in `updates` at once.
    ///
    /// All right hand sides are evaluated against the values the store
    /// holds before this call, and targets are only replaced after every
    /// evaluation has succeeded. On error nothing is changed.
    ///
    /// Errors:
    /// - [Error::UnknownState] if a target or a value read is not in this store
    /// - [Error::ConflictingUpdates] if a target appears more than once
    /// - [Error::ShapeMismatch] if a value's shape differs from its target's
    pub fn apply(&mut self, updates: Updates<E>) -> Result<(), Error> {
        let mut seen: BTreeSet<UniqueId> = BTreeSet::new();
        let mut staged: Vec<(UniqueId, Tensor<E>)> = Vec::with_capacity(updates.len());
        for UpdatePair { target, value } in updates {
            let current = self.get(&target)?;
            if !seen.insert(target.id) {
                return Err(Error::ConflictingUpdates(target.name));
            }
            let next = value.try_eval(self)?;
            if next.shape != current.shape {
                return Err(Error::ShapeMismatch {
                    expected: current.shape.clone(),
                    found: next.shape,
                });
            }
            staged.push((target.id, next));
        }

        for (id, next) in staged {
            let entry = self
                .entries
                .get_mut(&id)
                .ok_or_else(|| Error::UnknownState(std::format!("{id}")))?;
            log::trace!("commit {} {}", entry.name, entry.value.shape);
            entry.value.data = next.data;
        }
        Ok(())
    }
}
