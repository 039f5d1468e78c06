use super::utilities::{try_binary_op, try_unary_op};
use crate::{
    dtypes::Dtype,
    tensor::{Error, Merge, Tape, Tensor},
};

/// Element wise and scalar addition.
///
/// Example:
/// ```rust
/// # use stepwise_core::prelude::*;
/// # let dev: Cpu = Default::default();
/// let a: Tensor<f32> = dev.tensor([1.0, 2.0, 3.0]);
/// let b = a.clone() + a;
/// assert_eq!(b.as_vec(), [2.0, 4.0, 6.0]);
/// let c = b + 1.0;
/// assert_eq!(c.as_vec(), [3.0, 5.0, 7.0]);
/// ```
pub trait TryAdd<Rhs = Self> {
    type Output;
    fn try_add(self, rhs: Rhs) -> Result<Self::Output, Error>;
}

impl<E: Dtype, L: Tape<E> + Merge<R>, R: Tape<E>> TryAdd<Tensor<E, R>> for Tensor<E, L> {
    type Output = Self;
    fn try_add(self, rhs: Tensor<E, R>) -> Result<Self, Error> {
        try_binary_op(self, rhs, |x, y| x + y, |_, _| E::ONE, |_, _| E::ONE)
    }
}

impl<E: Dtype, T: Tape<E>> TryAdd<E> for Tensor<E, T> {
    type Output = Self;
    fn try_add(self, rhs: E) -> Result<Self, Error> {
        try_unary_op(self, move |x| x + rhs, |_| E::ONE)
    }
}

impl<E: Dtype, L: Tape<E> + Merge<R>, R: Tape<E>> std::ops::Add<Tensor<E, R>> for Tensor<E, L> {
    type Output = Self;
    fn add(self, rhs: Tensor<E, R>) -> Self {
        self.try_add(rhs).unwrap()
    }
}

impl<E: Dtype, T: Tape<E>> std::ops::Add<E> for Tensor<E, T> {
    type Output = Self;
    fn add(self, rhs: E) -> Self {
        self.try_add(rhs).unwrap()
    }
}
