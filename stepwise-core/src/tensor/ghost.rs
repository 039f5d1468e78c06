use crate::shapes::{HasShape, Shape};

use super::{HasUniqueId, Tensor, UniqueId};

/// Holds all the information a [Tensor] does, except without
/// holding a reference to the data storage.
///
/// Backward operations capture ghosts of their outputs so the output's
/// buffer can be dropped as soon as the forward pass is done with it.
#[derive(Clone, Debug)]
pub struct GhostTensor<E> {
    pub(crate) id: UniqueId,
    pub(crate) shape: Shape,
    marker: std::marker::PhantomData<E>,
}

impl<E, T> Tensor<E, T> {
    /// Creates a ghost tensor that doesn't hold a reference
    /// to the tensor's data.
    pub fn ghost(&self) -> GhostTensor<E> {
        GhostTensor {
            id: self.id,
            shape: self.shape.clone(),
            marker: std::marker::PhantomData,
        }
    }
}

impl<E> GhostTensor<E> {
    pub fn len(&self) -> usize {
        self.shape.num_elements()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> HasShape for GhostTensor<E> {
    fn shape(&self) -> &Shape {
        &self.shape
    }
}

impl<E> HasUniqueId for GhostTensor<E> {
    fn id(&self) -> &UniqueId {
        &self.id
    }
}
