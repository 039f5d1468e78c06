//! Persistent named tensors, and batches of updates to them.
//!
//! A [ParamStore] owns named tensors (weights and any auxiliary optimizer
//! state). Each one is referred to by a [Shared] handle. Updates to the
//! store are expressed as [UpdatePair]s, pairing a handle with an [Expr] for
//! its next value, and committed all at once with [ParamStore::apply]:
//!
//! ```rust
//! # use stepwise_core::prelude::*;
//! let dev: Cpu = Default::default();
//! let mut store = ParamStore::new();
//! let a = store.insert("a", dev.tensor([1.0f32, 2.0])).unwrap();
//! let b = store.insert("b", dev.tensor([10.0f32, 20.0])).unwrap();
//!
//! // swap `a` and `b`. Both right hand sides see the values from before the commit.
//! let mut updates = Updates::<f32>::new();
//! updates.push(&a, Expr::from(&b));
//! updates.push(&b, Expr::from(&a));
//! store.apply(updates).unwrap();
//!
//! assert_eq!(store.get(&a).unwrap().as_vec(), [10.0, 20.0]);
//! assert_eq!(store.get(&b).unwrap().as_vec(), [1.0, 2.0]);
//! ```

mod checkpoint;
mod expr;
mod gradient_source;
mod updates;

pub use expr::Expr;
pub use gradient_source::{FnGradient, GradientSource};
pub use updates::{UpdatePair, Updates};

use std::collections::BTreeMap;
use std::string::String;

use crate::{
    dtypes::Dtype,
    shapes::{HasShape, Shape},
    tensor::{unique_id, Error, HasUniqueId, OwnedTape, Tensor, UniqueId},
};

/// A handle to a tensor living in a [ParamStore].
///
/// The handle's id is also the id of the stored tensor, so gradients
/// computed from [ParamStore::trace] are keyed by it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Shared {
    id: UniqueId,
    name: String,
    shape: Shape,
}

impl Shared {
    pub fn id(&self) -> UniqueId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl HasShape for Shared {
    fn shape(&self) -> &Shape {
        &self.shape
    }
}

impl HasUniqueId for Shared {
    fn id(&self) -> &UniqueId {
        &self.id
    }
}

impl std::fmt::Display for Shared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.name, self.shape)
    }
}

#[derive(Debug, Clone)]
struct Entry<E> {
    name: String,
    value: Tensor<E>,
}

/// Named, mutable tensors. Values only change through [ParamStore::apply]
/// or [ParamStore::load_safetensors].
#[derive(Debug, Clone)]
pub struct ParamStore<E> {
    entries: BTreeMap<UniqueId, Entry<E>>,
    names: BTreeMap<String, UniqueId>,
}

impl<E> Default for ParamStore<E> {
    fn default() -> Self {
        Self {
            entries: Default::default(),
            names: Default::default(),
        }
    }
}

impl<E: Dtype> ParamStore<E> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds `value` under `name`. The stored tensor is given a fresh id,
    /// which the returned handle carries.
    pub fn insert(&mut self, name: impl Into<String>, mut value: Tensor<E>) -> Result<Shared, Error> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(Error::DuplicateName(name));
        }
        value.id = unique_id();
        let handle = Shared {
            id: value.id,
            name: name.clone(),
            shape: value.shape.clone(),
        };
        self.names.insert(name.clone(), handle.id);
        self.entries.insert(handle.id, Entry { name, value });
        Ok(handle)
    }

    /// Adds a zero filled tensor with the same shape as `like`.
    pub fn zeros_like(&mut self, name: impl Into<String>, like: &Shared) -> Result<Shared, Error> {
        let zeros = self.get(like)?.device().zeros(like.shape.clone());
        self.insert(name, zeros)
    }

    /// The current value of `handle`.
    pub fn get(&self, handle: &Shared) -> Result<&Tensor<E>, Error> {
        self.entries
            .get(&handle.id)
            .map(|entry| &entry.value)
            .ok_or_else(|| Error::UnknownState(handle.name.clone()))
    }

    /// The current value of `handle`, tracing gradients. Gradients computed
    /// from the result can be looked up with `handle`.
    pub fn trace(&self, handle: &Shared) -> Result<Tensor<E, OwnedTape<E>>, Error> {
        Ok(self.get(handle)?.leaky_trace())
    }

    pub fn find(&self, name: &str) -> Option<Shared> {
        let id = self.names.get(name)?;
        let entry = &self.entries[id];
        Some(Shared {
            id: *id,
            name: entry.name.clone(),
            shape: entry.value.shape.clone(),
        })
    }

    /// Names of every stored tensor, in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(|name| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
