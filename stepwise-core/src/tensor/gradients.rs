//! Implementations of [OwnedTape], [NoneTape], and generic Nd array containers via [Gradients].
#![allow(clippy::type_complexity)]

use std::collections::BTreeMap;
use std::{boxed::Box, vec::Vec};

use crate::dtypes::Dtype;

use super::{unique_id, Cpu, Error, GhostTensor, Tensor, UniqueId};

/// A generic container for keeping gradients of tensors keyed by the
/// tensor's [UniqueId].
///
/// You can:
/// 1. Insert array values into it
/// 2. Remove entries
/// 3. Access references to arrays
/// 4. Access mutable references to arrays
#[derive(Clone, Debug)]
pub struct Gradients<E> {
    gradient_by_id: BTreeMap<UniqueId, Vec<E>>,
    /// The device of the loss these gradients came from.
    pub(crate) device: Option<Cpu>,
}

impl<E> Gradients<E> {
    /// Creates an empty [Gradients] object.
    /// **This never drops gradients for temporary tensors**.
    ///
    /// This is why this method is called `leaky`, because
    /// it will keep gradients from previous passes if it is
    /// used consecutively.
    pub fn leaky() -> Self {
        Self {
            gradient_by_id: Default::default(),
            device: None,
        }
    }

    pub fn len(&self) -> usize {
        self.gradient_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gradient_by_id.is_empty()
    }

    /// Returns the gradient associated with `id`, if the loss depended on it.
    pub fn get_by_id(&self, id: &UniqueId) -> Option<&[E]> {
        self.gradient_by_id.get(id).map(Vec::as_slice)
    }
}

impl<E: Dtype> Gradients<E> {
    /// Retrieves mutable gradient for `t`, allocating one if it isn't present.
    pub fn get_or_alloc_mut(&mut self, t: &GhostTensor<E>) -> &mut Vec<E> {
        self.gradient_by_id
            .entry(t.id)
            .or_insert_with(|| vec![E::ZERO; t.len()])
    }

    /// Returns a reference to the underlying gradient if found.
    pub fn get_ref_checked<T>(&self, t: &Tensor<E, T>) -> Option<&[E]> {
        self.get_by_id(&t.id)
    }

    /// Clones the gradient of `t` into a new tensor with `t`'s shape.
    pub fn get<T>(&self, t: &Tensor<E, T>) -> Option<Tensor<E>> {
        let buf = self.gradient_by_id.get(&t.id)?.clone();
        Some(t.device.wrap(buf, t.shape.clone()))
    }

    /// Accumulates into the gradient of `inp` using the gradient of `out`.
    ///
    /// `f` receives `(grad_inp, grad_out)`. Both are allocated (as zeros) if
    /// they are not present yet. `inp` and `out` may not be the same tensor.
    pub(crate) fn backprop<F>(
        &mut self,
        inp: &GhostTensor<E>,
        out: &GhostTensor<E>,
        f: F,
    ) -> Result<(), Error>
    where
        F: FnOnce(&mut [E], &[E]),
    {
        assert_ne!(inp.id, out.id);
        let grad_out = self
            .gradient_by_id
            .remove(&out.id)
            .unwrap_or_else(|| vec![E::ZERO; out.len()]);
        let grad_inp = self.get_or_alloc_mut(inp);
        let result = if grad_inp.len() == inp.len() {
            f(grad_inp, &grad_out);
            Ok(())
        } else {
            Err(Error::WrongNumElements {
                expected: inp.len(),
                found: grad_inp.len(),
            })
        };
        self.gradient_by_id.insert(out.id, grad_out);
        result
    }
}

/// Contains a [Gradients] and list of backward operations.
pub struct OwnedTape<E> {
    /// A list of (Time, BackwardOp) pairs. The Time is used to ensure operations
    /// from merged tapes are executed in the correct order.
    pub(crate) operations: Vec<(UniqueId, BackwardOp<E>)>,
    pub(crate) gradients: Gradients<E>,
}

impl<E> Default for OwnedTape<E> {
    fn default() -> Self {
        Self {
            operations: Default::default(),
            gradients: Gradients::leaky(),
        }
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for OwnedTape<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnedTape")
            .field("num_operations", &self.operations.len())
            .field("gradients", &self.gradients)
            .finish()
    }
}

impl<E> From<Gradients<E>> for OwnedTape<E> {
    fn from(gradients: Gradients<E>) -> Self {
        Self {
            operations: Default::default(),
            gradients,
        }
    }
}

impl<E> OwnedTape<E> {
    /// Compute the [Gradients]! This just runs all the operations on a new [Gradients] struct.
    pub(crate) fn execute(&mut self) -> Result<Gradients<E>, Error> {
        // Operations from merged tapes must still run in reverse creation order.
        self.operations.sort_by_key(|(k, _)| *k);
        self.operations.dedup_by_key(|(k, _)| *k);
        for (_, operation) in self.operations.drain(..).rev() {
            (operation)(&mut self.gradients)?;
        }
        Ok(std::mem::replace(&mut self.gradients, Gradients::leaky()))
    }
}

type BackwardOp<E> = Box<dyn FnOnce(&mut Gradients<E>) -> Result<(), Error>>;

/// Contains nothing. When [Tape::add_backward_op] is called, this struct does nothing.
#[derive(Default, Debug, Clone, Copy)]
pub struct NoneTape;

/// Something that can track backward operations.
pub trait Tape<E>: Default + Merge<Self> + Merge<NoneTape> {
    /// Whether this object is currently tracking gradients. This is known at compile time.
    const OWNS_TAPE: bool;
    fn add_backward_op<F>(&mut self, operation: F)
    where
        F: 'static + FnOnce(&mut Gradients<E>) -> Result<(), Error>;
}

impl<E> Tape<E> for OwnedTape<E> {
    const OWNS_TAPE: bool = true;
    fn add_backward_op<F>(&mut self, operation: F)
    where
        F: 'static + FnOnce(&mut Gradients<E>) -> Result<(), Error>,
    {
        self.operations.push((unique_id(), Box::new(operation)));
    }
}

impl<E> Tape<E> for NoneTape {
    const OWNS_TAPE: bool = false;
    fn add_backward_op<F>(&mut self, _: F)
    where
        F: 'static + FnOnce(&mut Gradients<E>) -> Result<(), Error>,
    {
    }
}

/// Combine two things
pub trait Merge<T: ?Sized> {
    /// Merges `T` into `self`
    fn merge(self, other: T) -> Self;
}

impl Merge<NoneTape> for NoneTape {
    fn merge(self, _: NoneTape) -> Self {
        self
    }
}

impl<E> Merge<NoneTape> for OwnedTape<E> {
    fn merge(self, _: NoneTape) -> Self {
        self
    }
}

impl<E> Merge<OwnedTape<E>> for OwnedTape<E> {
    fn merge(mut self, mut other: Self) -> Self {
        self.gradients
            .gradient_by_id
            .extend(other.gradients.gradient_by_id);
        self.operations.append(&mut other.operations);
        self
    }
}
