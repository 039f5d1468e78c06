//! Tensors with a gradient tape, and a store of persistent named tensors
//! that is updated with batches of update pairs.
//!
//! This crate is the numeric backend the `stepwise` optimizers are written
//! against. It has three parts:
//!
//! 1. [tensor] and [tensor_ops]: a CPU [tensor::Tensor], tracing with
//!    [tensor::OwnedTape], and [tensor_ops::Backward] to compute
//!    [tensor::Gradients].
//! 2. [shared]: the [shared::ParamStore] of named tensors, [shared::Shared]
//!    handles into it, [shared::Expr]essions over its values, and
//!    [shared::ParamStore::apply] to commit a batch of [shared::Updates].
//! 3. [shared::GradientSource]: anything that can produce the gradient of
//!    a loss with respect to a [shared::Shared] tensor.
//!
//! ```rust
//! use stepwise_core::prelude::*;
//!
//! let dev: Cpu = Default::default();
//! let mut store = ParamStore::new();
//! let w = store.insert("w", dev.tensor([1.0f32, -2.0])).unwrap();
//!
//! let loss = store.trace(&w).unwrap().square().sum();
//! let grads = loss.backward();
//! let g = grads.gradient(&w).unwrap();
//! assert_eq!(g.as_vec(), [2.0, -4.0]);
//!
//! let mut updates = Updates::<f32>::new();
//! updates.push(&w, Expr::from(&w) - Expr::constant(g) * 0.25);
//! store.apply(updates).unwrap();
//! assert_eq!(store.get(&w).unwrap().as_vec(), [0.5, -1.0]);
//! ```

pub mod dtypes;
pub mod losses;
pub mod shapes;
pub mod shared;
pub mod tensor;
pub mod tensor_ops;

/// Contains all public exports.
pub mod prelude {
    pub use crate::dtypes::{Dtype, Unit};
    pub use crate::losses::*;
    pub use crate::shapes::{HasShape, Shape};
    pub use crate::shared::*;
    pub use crate::tensor::*;
    pub use crate::tensor_ops::*;
}

/// Helpers shared by the tests of this crate and of `stepwise`.
#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod tests {
    #[cfg(not(feature = "test-f64"))]
    pub type TestDtype = f32;

    #[cfg(feature = "test-f64")]
    pub type TestDtype = f64;

    pub trait AssertClose {
        type Elem: std::fmt::Display + std::fmt::Debug + Copy;
        const DEFAULT_TOLERANCE: Self::Elem;
        fn get_default_tol(&self) -> Self::Elem {
            Self::DEFAULT_TOLERANCE
        }
        fn get_far_pair(
            &self,
            rhs: &Self,
            tolerance: Self::Elem,
        ) -> Option<(Self::Elem, Self::Elem)>;
    }

    impl AssertClose for f32 {
        type Elem = f32;
        const DEFAULT_TOLERANCE: Self::Elem = 1e-6;
        fn get_far_pair(&self, rhs: &Self, tolerance: f32) -> Option<(f32, f32)> {
            if (self - rhs).abs() > tolerance {
                Some((*self, *rhs))
            } else {
                None
            }
        }
    }

    impl AssertClose for f64 {
        type Elem = f64;
        const DEFAULT_TOLERANCE: Self::Elem = 1e-6;
        fn get_far_pair(&self, rhs: &Self, tolerance: f64) -> Option<(f64, f64)> {
            if (self - rhs).abs() > tolerance {
                Some((*self, *rhs))
            } else {
                None
            }
        }
    }

    impl<T: AssertClose> AssertClose for std::vec::Vec<T> {
        type Elem = T::Elem;
        const DEFAULT_TOLERANCE: Self::Elem = T::DEFAULT_TOLERANCE;
        fn get_far_pair(
            &self,
            rhs: &Self,
            tolerance: Self::Elem,
        ) -> Option<(Self::Elem, Self::Elem)> {
            assert_eq!(self.len(), rhs.len(), "lengths differ");
            for (l, r) in self.iter().zip(rhs.iter()) {
                if let Some(pair) = l.get_far_pair(r, tolerance) {
                    return Some(pair);
                }
            }
            None
        }
    }

    #[macro_export]
    macro_rules! assert_close {
        ($Lhs:expr, $Rhs:expr) => {
            let lhs = $Lhs;
            let tol = $crate::tests::AssertClose::get_default_tol(&lhs);
            let far_pair = $crate::tests::AssertClose::get_far_pair(&lhs, &$Rhs, tol);
            if let Some((l, r)) = far_pair {
                panic!("lhs != rhs | {l} != {r}");
            }
        };
        ($Lhs:expr, $Rhs:expr, $Tolerance:expr) => {{
            let lhs = $Lhs;
            let far_pair = $crate::tests::AssertClose::get_far_pair(
                &lhs,
                &$Rhs,
                $crate::tests::tolerance($Tolerance),
            );
            if let Some((l, r)) = far_pair {
                panic!("lhs != rhs | {l} != {r}");
            }
        }};
    }

    pub use crate::assert_close;

    /// Converts an `f64` tolerance to the element type being compared.
    pub fn tolerance<T: num_traits::FromPrimitive>(tol: f64) -> T {
        T::from_f64(tol).unwrap()
    }
}
