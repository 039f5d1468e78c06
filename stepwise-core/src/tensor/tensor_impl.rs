use std::sync::Arc;
use std::vec::Vec;

use crate::{
    dtypes::Dtype,
    shapes::{HasShape, Shape},
};

use super::{Cpu, Gradients, HasUniqueId, NoneTape, OwnedTape, UniqueId};

/// The single tensor struct that stores nd arrays and tapes.
///
/// See module level documentation on how to create and use tensors.
///
/// Generics:
/// 1. [Dtype] - the type of the underlying elements.
/// 2. [Tape] - either [NoneTape] or [OwnedTape]. A tensor carrying an
///    [OwnedTape] records every operation applied to it, so gradients can
///    be computed with [crate::tensor_ops::Backward].
///
/// Data is stored row-major in an [Arc], so cloning a tensor is cheap and
/// mutation is copy on write.
#[derive(Clone)]
pub struct Tensor<E, T = NoneTape> {
    pub(crate) id: UniqueId,
    pub(crate) data: Arc<Vec<E>>,
    pub(crate) shape: Shape,
    pub(crate) device: Cpu,
    pub(crate) tape: T,
}

impl<E: std::fmt::Debug, T> std::fmt::Debug for Tensor<E, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("data", &self.data)
            .finish()
    }
}

impl<E, T> HasShape for Tensor<E, T> {
    fn shape(&self) -> &Shape {
        &self.shape
    }
}

impl<E, T> HasUniqueId for Tensor<E, T> {
    fn id(&self) -> &UniqueId {
        &self.id
    }
}

impl<E, T> Tensor<E, T> {
    pub fn id(&self) -> UniqueId {
        self.id
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn device(&self) -> &Cpu {
        &self.device
    }

    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    /// Borrows the row-major data.
    pub fn as_slice(&self) -> &[E] {
        &self.data
    }
}

impl<E: Clone, T> Tensor<E, T> {
    /// Copies the row-major data into a new [Vec].
    pub fn as_vec(&self) -> Vec<E> {
        self.data.as_ref().clone()
    }
}

impl<E: Dtype, T> Tensor<E, T> {
    /// The single value of a tensor with one element.
    pub fn item(&self) -> Option<E> {
        match self.data.as_slice() {
            [x] => Some(*x),
            _ => None,
        }
    }

    /// Overwrites the data, keeping the id. `data` must have
    /// [Tensor::num_elements] elements.
    pub(crate) fn copy_from(&mut self, data: &[E]) {
        debug_assert_eq!(data.len(), self.data.len());
        Arc::make_mut(&mut self.data).copy_from_slice(data);
    }
}

impl<E, T> Tensor<E, T> {
    /// Removes whatever tape this tensor has, and returns itself without a tape.
    pub fn split_tape(self) -> (Tensor<E, NoneTape>, T) {
        (
            Tensor {
                id: self.id,
                data: self.data,
                shape: self.shape,
                device: self.device,
                tape: NoneTape,
            },
            self.tape,
        )
    }

    /// Puts the given tape into the tensor, replacing the old one.
    pub fn put_tape<New>(self, tape: New) -> Tensor<E, New> {
        Tensor {
            id: self.id,
            data: self.data,
            shape: self.shape,
            device: self.device,
            tape,
        }
    }

    /// Clones the tensor (same id, same data) with a new, empty tape.
    ///
    /// Tapes can't be cloned, so this is how a traced tensor is used in
    /// more than one place:
    /// ```rust
    /// # use stepwise_core::prelude::*;
    /// # let dev: Cpu = Default::default();
    /// let w: Tensor<f32> = dev.tensor([1.0, 2.0]);
    /// let x = w.leaky_trace();
    /// let loss = (x.retaped::<OwnedTape<f32>>() * x).sum();
    /// let grads = loss.backward();
    /// assert_eq!(grads.get(&w).unwrap().as_vec(), [2.0, 4.0]);
    /// ```
    pub fn retaped<New: Default>(&self) -> Tensor<E, New> {
        Tensor {
            id: self.id,
            data: self.data.clone(),
            shape: self.shape.clone(),
            device: self.device.clone(),
            tape: Default::default(),
        }
    }
}

impl<E: Clone> Tensor<E, NoneTape> {
    /// Starts tracking gradients with a fresh [Gradients]. The returned tensor
    /// has the same id as `self`, so gradients computed with it can be looked
    /// up with `self`.
    pub fn leaky_trace(&self) -> Tensor<E, OwnedTape<E>> {
        self.retaped()
    }

    /// Starts tracking gradients, accumulating into an existing allocation.
    pub fn traced(&self, gradients: Gradients<E>) -> Tensor<E, OwnedTape<E>> {
        self.clone().put_tape(OwnedTape::from(gradients))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn test_trace_keeps_id_and_data() {
        let dev: Cpu = Default::default();
        let t: Tensor<TestDtype> = dev.tensor([1.0, 2.0, 3.0]);
        let traced = t.leaky_trace();
        assert_eq!(traced.id(), t.id());
        assert_eq!(traced.as_vec(), t.as_vec());
        let (untaped, _tape) = traced.split_tape();
        assert_eq!(untaped.id(), t.id());
    }

    #[test]
    fn test_copy_from_is_copy_on_write() {
        let dev: Cpu = Default::default();
        let a: Tensor<TestDtype> = dev.tensor([1.0, 2.0]);
        let mut b = a.clone();
        b.copy_from(&[3.0, 4.0]);
        assert_eq!(a.as_vec(), [1.0, 2.0]);
        assert_eq!(b.as_vec(), [3.0, 4.0]);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_item() {
        let dev: Cpu = Default::default();
        assert_eq!(dev.scalar::<TestDtype>(2.5).item(), Some(2.5));
        assert_eq!(dev.tensor::<TestDtype, 2>([1.0, 2.0]).item(), None);
    }
}
