use crate::{
    dtypes::Dtype,
    tensor::{Error, Gradients, OwnedTape, Tensor},
};

/// Runs backprop algorithm with all operations contained in the tape that `t` has.
///
/// This function takes ownership of `self` and returns [Gradients].
pub trait Backward<E>: Sized {
    /// Runs backprop
    fn backward(self) -> Gradients<E> {
        self.try_backward().unwrap()
    }

    /// Fallible version of [Backward::backward]. Errors with
    /// [Error::NonScalarLoss] if `self` has more than one element.
    fn try_backward(self) -> Result<Gradients<E>, Error>;
}

impl<E: Dtype> Backward<E> for Tensor<E, OwnedTape<E>> {
    fn try_backward(self) -> Result<Gradients<E>, Error> {
        if !self.shape.is_scalar() {
            return Err(Error::NonScalarLoss(self.shape));
        }
        let (t, mut tape) = self.split_tape();
        tape.gradients.get_or_alloc_mut(&t.ghost()).fill(E::ONE);
        let mut grads = tape.execute()?;
        grads.device = Some(t.device);
        Ok(grads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tensor::*, tests::*};

    #[test]
    fn test_backward_requires_scalar() {
        let dev: Cpu = Default::default();
        let t: Tensor<TestDtype> = dev.ones([3]);
        let err = (t.leaky_trace() * 2.0).try_backward().unwrap_err();
        assert!(matches!(err, Error::NonScalarLoss(_)));
    }

    #[test]
    fn test_unused_tensor_has_no_gradient() {
        let dev: Cpu = Default::default();
        let used: Tensor<TestDtype> = dev.ones([2]);
        let unused: Tensor<TestDtype> = dev.ones([2]);
        let g = (used.leaky_trace() + unused.clone()).sum().backward();
        assert!(g.get(&used).is_some());
        assert!(g.get(&unused).is_none());
    }

    #[test]
    fn test_traced_reuses_gradients() {
        let dev: Cpu = Default::default();
        let t: Tensor<TestDtype> = dev.ones([2]);
        let g = t.leaky_trace().sum().backward();
        let g = t.traced(g).sum().backward();
        assert_eq!(g.get(&t).unwrap().as_vec(), [2.0; 2]);
    }
}
