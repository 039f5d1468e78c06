//! Module for data type related traits. Contains things like [Unit] and [Dtype].
//!
//! Only floating point element types are differentiable, so [Dtype] is
//! implemented for [f32] and [f64].

mod safetensors_dtype;

pub use safetensors_dtype::SafeTensorsDtype;

/// Represents a unit type, but no arithmetic.
pub trait Unit:
    'static
    + Copy
    + Clone
    + Default
    + std::fmt::Debug
    + std::fmt::Display
    + PartialEq
    + PartialOrd
    + Send
    + Sync
    + std::marker::Unpin
{
    const ONE: Self;
    const ZERO: Self;
}

macro_rules! unit {
    ($type:ty, $zero:expr, $one:expr) => {
        impl Unit for $type {
            const ONE: Self = $one;
            const ZERO: Self = $zero;
        }
    };
}

unit!(f32, 0.0, 1.0);
unit!(f64, 0.0, 1.0);

/// Represents a data type or element of an array that can have
/// arithmatic operations applied to it, be differentiated, and be
/// written to a `.safetensors` file.
pub trait Dtype:
    Unit
    + std::ops::Add<Self, Output = Self>
    + std::ops::Sub<Self, Output = Self>
    + std::ops::Mul<Self, Output = Self>
    + std::ops::Div<Self, Output = Self>
    + std::ops::Neg<Output = Self>
    + std::ops::AddAssign
    + std::ops::SubAssign
    + std::ops::MulAssign
    + std::ops::DivAssign
    + num_traits::Float
    + num_traits::FromPrimitive
    + num_traits::ToPrimitive
    + SafeTensorsDtype
{
}
impl Dtype for f32 {}
impl Dtype for f64 {}
