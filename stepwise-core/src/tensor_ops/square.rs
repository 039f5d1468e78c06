use super::utilities::try_unary_op;
use crate::{
    dtypes::Dtype,
    tensor::{Error, Tape, Tensor},
};

impl<E: Dtype, T: Tape<E>> Tensor<E, T> {
    /// `x^2`, with derivative `2x`.
    ///
    /// ```rust
    /// # use stepwise_core::prelude::*;
    /// # let dev: Cpu = Default::default();
    /// let t: Tensor<f32> = dev.tensor([-1.0, 0.0, 1.0, 2.0]);
    /// let r = t.square();
    /// assert_eq!(r.as_vec(), [1.0, 0.0, 1.0, 4.0]);
    /// ```
    pub fn square(self) -> Self {
        self.try_square().unwrap()
    }

    /// See [Tensor::square]
    pub fn try_square(self) -> Result<Self, Error> {
        let two = E::ONE + E::ONE;
        try_unary_op(self, |x| x * x, move |x| two * x)
    }
}
