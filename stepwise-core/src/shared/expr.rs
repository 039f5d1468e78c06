use std::boxed::Box;

use super::{ParamStore, Shared};
use crate::{
    dtypes::Dtype,
    tensor::{Error, Tensor},
    tensor_ops::{TryAdd, TryMul, TrySub},
};

/// The right hand side of an [super::UpdatePair]: an element wise expression
/// over values stored in a [ParamStore] and constant tensors.
///
/// Shared values are read when the expression is evaluated, which
/// [ParamStore::apply] does against the values from before the commit.
///
/// ```rust
/// # use stepwise_core::prelude::*;
/// # let dev: Cpu = Default::default();
/// # let mut store = ParamStore::new();
/// let w = store.insert("w", dev.tensor([1.0f32, 2.0])).unwrap();
/// let grad: Tensor<f32> = dev.tensor([0.5, -0.5]);
/// let next = Expr::from(&w) - Expr::constant(grad) * 0.5;
/// assert_eq!(next.eval(&store).as_vec(), [0.75, 2.25]);
/// ```
#[derive(Debug, Clone)]
pub enum Expr<E> {
    Shared(Shared),
    Constant(Tensor<E>),
    Add(Box<Expr<E>>, Box<Expr<E>>),
    Sub(Box<Expr<E>>, Box<Expr<E>>),
    Scale(Box<Expr<E>>, E),
    Neg(Box<Expr<E>>),
}

impl<E> Expr<E> {
    pub fn constant(value: Tensor<E>) -> Self {
        Self::Constant(value)
    }
}

impl<E: Dtype> Expr<E> {
    pub fn eval(&self, store: &ParamStore<E>) -> Tensor<E> {
        self.try_eval(store).unwrap()
    }

    /// Evaluates the expression with the current values in `store`.
    pub fn try_eval(&self, store: &ParamStore<E>) -> Result<Tensor<E>, Error> {
        match self {
            Self::Shared(handle) => Ok(store.get(handle)?.clone()),
            Self::Constant(value) => Ok(value.clone()),
            Self::Add(a, b) => a.try_eval(store)?.try_add(b.try_eval(store)?),
            Self::Sub(a, b) => a.try_eval(store)?.try_sub(b.try_eval(store)?),
            Self::Scale(a, k) => a.try_eval(store)?.try_mul(*k),
            Self::Neg(a) => a.try_eval(store)?.try_negate(),
        }
    }
}

impl<E> From<&Shared> for Expr<E> {
    fn from(handle: &Shared) -> Self {
        Self::Shared(handle.clone())
    }
}

impl<E> From<Shared> for Expr<E> {
    fn from(handle: Shared) -> Self {
        Self::Shared(handle)
    }
}

impl<E> From<Tensor<E>> for Expr<E> {
    fn from(value: Tensor<E>) -> Self {
        Self::Constant(value)
    }
}

impl<E> std::ops::Add for Expr<E> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::Add(Box::new(self), Box::new(rhs))
    }
}

impl<E> std::ops::Sub for Expr<E> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::Sub(Box::new(self), Box::new(rhs))
    }
}

impl<E: Dtype> std::ops::Mul<E> for Expr<E> {
    type Output = Self;
    fn mul(self, rhs: E) -> Self {
        Self::Scale(Box::new(self), rhs)
    }
}

impl<E> std::ops::Neg for Expr<E> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::Neg(Box::new(self))
    }
}
