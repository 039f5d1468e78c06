use super::utilities::try_unary_op;
use crate::{
    dtypes::Dtype,
    tensor::{Error, Tape, Tensor},
};

impl<E: Dtype, T: Tape<E>> Tensor<E, T> {
    /// Replaces every element `x` with `-x`.
    pub fn negate(self) -> Self {
        self.try_negate().unwrap()
    }

    /// See [Tensor::negate]
    pub fn try_negate(self) -> Result<Self, Error> {
        try_unary_op(self, |x| -x, |_| -E::ONE)
    }
}

impl<E: Dtype, T: Tape<E>> std::ops::Neg for Tensor<E, T> {
    type Output = Self;
    fn neg(self) -> Self {
        self.negate()
    }
}
