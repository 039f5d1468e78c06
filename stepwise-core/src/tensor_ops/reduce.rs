
use super::utilities::try_reduce_all;
use crate::{
    dtypes::Dtype,
    tensor::{Error, Tape, Tensor},
};

impl<E: Dtype, T: Tape<E>> Tensor<E, T> {
    /// Sums all elements into a rank 0 tensor.
    pub fn sum(self) -> Self {
        self.try_sum().unwrap()
    }

    /// See [Tensor::sum]
    pub fn try_sum(self) -> Result<Self, Error> {
        try_reduce_all(self, |xs| xs.iter().fold(E::ZERO, |acc, x| acc + *x), E::ONE)
    }

    /// Average of all elements as a rank 0 tensor.
    ///
    /// ```rust
    /// # use stepwise_core::prelude::*;
    /// # let dev: Cpu = Default::default();
    /// let t: Tensor<f32> = dev.tensor([1.0, 2.0, 3.0, 4.0]);
    /// assert_eq!(t.mean().item(), Some(2.5));
    /// ```
    pub fn mean(self) -> Self {
        self.try_mean().unwrap()
    }

    /// See [Tensor::mean]
    pub fn try_mean(self) -> Result<Self, Error> {
        let n = E::from_usize(self.num_elements()).ok_or(Error::WrongNumElements {
            expected: 1,
            found: self.num_elements(),
        })?;
        try_reduce_all(
            self,
            move |xs| xs.iter().fold(E::ZERO, |acc, x| acc + *x) / n,
            E::ONE / n,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::{tensor::*, tensor_ops::*, tests::*};

    #[test]
    fn test_sum() {
        let dev: Cpu = Default::default();
        let t: Tensor<TestDtype> = dev.tensor_from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], [2, 3]);
        let r = t.leaky_trace().sum();
        assert!(r.shape().is_scalar());
        assert_eq!(r.item(), Some(21.0));
        let g = r.backward();
        assert_eq!(g.get(&t).unwrap().as_vec(), [1.0; 6]);
    }

    #[test]
    fn test_mean() {
        let dev: Cpu = Default::default();
        let t: Tensor<TestDtype> = dev.tensor([1.0, 2.0, 3.0, 4.0]);
        let r = t.leaky_trace().mean();
        assert_eq!(r.item(), Some(2.5));
        let g = r.backward();
        assert_eq!(g.get(&t).unwrap().as_vec(), [0.25; 4]);
    }

    #[test]
    fn test_chained_reductions() {
        let dev: Cpu = Default::default();
        let t: Tensor<TestDtype> = dev.tensor([1.0, 2.0]);
        let r = (t.leaky_trace().sum() * 2.0).square();
        assert_eq!(r.item(), Some(36.0));
        // d/dt (2 * sum(t))^2 = 8 * sum(t)
        let g = r.backward();
        assert_eq!(g.get(&t).unwrap().as_vec(), [24.0; 2]);
    }
}
