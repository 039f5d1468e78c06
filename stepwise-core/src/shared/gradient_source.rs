use super::Shared;
use crate::{
    dtypes::Dtype,
    shapes::Shape,
    tensor::{Error, Gradients, Tensor},
};

/// Something that can produce the gradient of a loss with respect to a
/// tensor in a [super::ParamStore].
///
/// Implemented for the [Gradients] returned by
/// [crate::tensor_ops::Backward::backward], and for [FnGradient] to plug in
/// gradients computed some other way.
pub trait GradientSource<E> {
    /// `∂loss/∂wrt`. Errors with [Error::NoGradientPath] if the loss does not
    /// depend on `wrt`.
    fn gradient(&self, wrt: &Shared) -> Result<Tensor<E>, Error>;
}

impl<E: Dtype> GradientSource<E> for Gradients<E> {
    fn gradient(&self, wrt: &Shared) -> Result<Tensor<E>, Error> {
        let grad = self
            .get_by_id(&wrt.id)
            .ok_or_else(|| Error::NoGradientPath(wrt.name.clone()))?;
        if grad.len() != wrt.shape.num_elements() {
            return Err(Error::ShapeMismatch {
                expected: wrt.shape.clone(),
                found: Shape::from([grad.len()]),
            });
        }
        let device = self.device.clone().unwrap_or_default();
        Ok(device.wrap(grad.to_vec(), wrt.shape.clone()))
    }
}

/// Wraps a closure as a [GradientSource].
///
/// ```rust
/// # use stepwise_core::prelude::*;
/// # let dev: Cpu = Default::default();
/// # let mut store = ParamStore::new();
/// let w = store.insert("w", dev.tensor([1.0f32, -1.0])).unwrap();
/// // gradient of sum(w^2)
/// let source = FnGradient(|wrt: &Shared| -> Result<Tensor<f32>, Error> {
///     Ok(store.get(wrt)?.clone() * 2.0)
/// });
/// assert_eq!(source.gradient(&w).unwrap().as_vec(), [2.0, -2.0]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnGradient<F>(pub F);

impl<E, F: Fn(&Shared) -> Result<Tensor<E>, Error>> GradientSource<E> for FnGradient<F> {
    fn gradient(&self, wrt: &Shared) -> Result<Tensor<E>, Error> {
        (self.0)(wrt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{shapes::HasShape, shared::ParamStore, tensor::Cpu, tensor_ops::*, tests::*};

    #[test]
    fn test_gradients_source() {
        let dev: Cpu = Default::default();
        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.tensor([1.0, 2.0, 3.0])).unwrap();
        let grads = (store.trace(&w).unwrap() * 3.0).sum().backward();
        let g = grads.gradient(&w).unwrap();
        assert_eq!(g.shape(), w.shape());
        assert_eq!(g.as_vec(), [3.0; 3]);
    }

    #[test]
    fn test_gradient_shares_loss_device() {
        let dev: Cpu = Cpu::seed_from_u64(5);
        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.ones([2])).unwrap();
        let grads = store.trace(&w).unwrap().sum().backward();
        let a = grads.gradient(&w).unwrap();
        let b = grads.gradient(&w).unwrap();
        assert!(std::sync::Arc::ptr_eq(&a.device().rng, &dev.rng));
        assert!(std::sync::Arc::ptr_eq(&a.device().rng, &b.device().rng));
    }

    #[test]
    fn test_no_gradient_path() {
        let dev: Cpu = Default::default();
        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.tensor([1.0, 2.0])).unwrap();
        let b = store.insert("b", dev.tensor([1.0])).unwrap();
        let grads = store.trace(&b).unwrap().square().sum().backward();
        assert!(matches!(
            grads.gradient(&w),
            Err(Error::NoGradientPath(name)) if name == "w"
        ));
    }

    #[test]
    fn test_fn_gradient_errors_propagate() {
        let dev: Cpu = Default::default();
        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.zeros([2])).unwrap();
        let source = FnGradient(|wrt: &Shared| -> Result<Tensor<TestDtype>, Error> {
            Err(Error::NoGradientPath(wrt.name().into()))
        });
        assert!(matches!(source.gradient(&w), Err(Error::NoGradientPath(_))));
    }
}
