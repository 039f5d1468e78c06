use super::utilities::{try_binary_op, try_unary_op};
use crate::{
    dtypes::Dtype,
    tensor::{Error, Merge, Tape, Tensor},
};

/// Element wise and scalar multiplication.
///
/// Example:
/// ```rust
/// # use stepwise_core::prelude::*;
/// # let dev: Cpu = Default::default();
/// let a: Tensor<f32> = dev.tensor([1.0, 2.0, 3.0]);
/// let r = a.clone() * a;
/// assert_eq!(r.as_vec(), [1.0, 4.0, 9.0]);
/// let r = r * 0.5;
/// assert_eq!(r.as_vec(), [0.5, 2.0, 4.5]);
/// ```
pub trait TryMul<Rhs = Self> {
    type Output;
    fn try_mul(self, rhs: Rhs) -> Result<Self::Output, Error>;
}

impl<E: Dtype, L: Tape<E> + Merge<R>, R: Tape<E>> TryMul<Tensor<E, R>> for Tensor<E, L> {
    type Output = Self;
    fn try_mul(self, rhs: Tensor<E, R>) -> Result<Self, Error> {
        try_binary_op(self, rhs, |x, y| x * y, |_, y| y, |x, _| x)
    }
}

impl<E: Dtype, T: Tape<E>> TryMul<E> for Tensor<E, T> {
    type Output = Self;
    fn try_mul(self, rhs: E) -> Result<Self, Error> {
        try_unary_op(self, move |x| x * rhs, move |_| rhs)
    }
}

impl<E: Dtype, L: Tape<E> + Merge<R>, R: Tape<E>> std::ops::Mul<Tensor<E, R>> for Tensor<E, L> {
    type Output = Self;
    fn mul(self, rhs: Tensor<E, R>) -> Self {
        self.try_mul(rhs).unwrap()
    }
}

impl<E: Dtype, T: Tape<E>> std::ops::Mul<E> for Tensor<E, T> {
    type Output = Self;
    fn mul(self, rhs: E) -> Self {
        self.try_mul(rhs).unwrap()
    }
}
