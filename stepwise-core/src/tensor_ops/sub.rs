use super::utilities::{try_binary_op, try_unary_op};
use crate::{
    dtypes::Dtype,
    tensor::{Error, Merge, Tape, Tensor},
};

/// Element wise and scalar subtraction.
///
/// Example:
/// ```rust
/// # use stepwise_core::prelude::*;
/// # let dev: Cpu = Default::default();
/// let a: Tensor<f32> = dev.tensor([1.0, 2.0, 3.0]);
/// let b: Tensor<f32> = dev.ones([3]);
/// let r = a - b;
/// assert_eq!(r.as_vec(), [0.0, 1.0, 2.0]);
/// ```
pub trait TrySub<Rhs = Self> {
    type Output;
    fn try_sub(self, rhs: Rhs) -> Result<Self::Output, Error>;
}

impl<E: Dtype, L: Tape<E> + Merge<R>, R: Tape<E>> TrySub<Tensor<E, R>> for Tensor<E, L> {
    type Output = Self;
    fn try_sub(self, rhs: Tensor<E, R>) -> Result<Self, Error> {
        try_binary_op(self, rhs, |x, y| x - y, |_, _| E::ONE, |_, _| -E::ONE)
    }
}

impl<E: Dtype, T: Tape<E>> TrySub<E> for Tensor<E, T> {
    type Output = Self;
    fn try_sub(self, rhs: E) -> Result<Self, Error> {
        try_unary_op(self, move |x| x - rhs, |_| E::ONE)
    }
}

impl<E: Dtype, L: Tape<E> + Merge<R>, R: Tape<E>> std::ops::Sub<Tensor<E, R>> for Tensor<E, L> {
    type Output = Self;
    fn sub(self, rhs: Tensor<E, R>) -> Self {
        self.try_sub(rhs).unwrap()
    }
}

impl<E: Dtype, T: Tape<E>> std::ops::Sub<E> for Tensor<E, T> {
    type Output = Self;
    fn sub(self, rhs: E) -> Self {
        self.try_sub(rhs).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use crate::{tensor::*, tensor_ops::*, tests::*};

    #[test]
    fn test_sub_gradients() {
        let dev: Cpu = Default::default();
        let a: Tensor<TestDtype> = dev.tensor([1.0, 2.0, 3.0]);
        let b: Tensor<TestDtype> = dev.tensor([0.5, 0.5, 0.5]);

        let r = a.leaky_trace() - b.leaky_trace();
        assert_close!(r.as_vec(), vec![0.5, 1.5, 2.5]);
        let g = r.sum().backward();
        assert_eq!(g.get(&a).unwrap().as_vec(), [1.0; 3]);
        assert_eq!(g.get(&b).unwrap().as_vec(), [-1.0; 3]);
    }

    #[test]
    fn test_scalar_sub() {
        let dev: Cpu = Default::default();
        let a: Tensor<TestDtype> = dev.tensor([1.0, 2.0]);
        let r = a.leaky_trace() - 1.0;
        assert_eq!(r.as_vec(), [0.0, 1.0]);
        let g = r.sum().backward();
        assert_eq!(g.get(&a).unwrap().as_vec(), [1.0; 2]);
    }
}
