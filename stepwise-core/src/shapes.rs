//! Runtime shapes of tensors.
//!
//! A [Shape] is a list of dimension sizes. The empty shape `()` is a scalar,
//! and has exactly one element.
//!
//! ```rust
//! # use stepwise_core::shapes::Shape;
//! let s: Shape = [2, 3].into();
//! assert_eq!(s.num_elements(), 6);
//! assert_eq!(Shape::scalar().num_elements(), 1);
//! ```

/// The dimensions of a tensor, outermost first. Data is stored row-major.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Shape {
    dims: std::vec::Vec<usize>,
}

impl Shape {
    pub fn new(dims: std::vec::Vec<usize>) -> Self {
        Self { dims }
    }

    /// The rank 0 shape.
    pub fn scalar() -> Self {
        Self::default()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn num_dims(&self) -> usize {
        self.dims.len()
    }

    /// Product of all dimensions. The scalar shape has one element.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn is_scalar(&self) -> bool {
        self.num_elements() == 1
    }
}

impl From<()> for Shape {
    fn from(_: ()) -> Self {
        Self::scalar()
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims.to_vec())
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

impl From<std::vec::Vec<usize>> for Shape {
    fn from(dims: std::vec::Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl From<&Shape> for Shape {
    fn from(shape: &Shape) -> Self {
        shape.clone()
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        if self.dims.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

/// Something that has a [Shape].
pub trait HasShape {
    fn shape(&self) -> &Shape;
}

impl HasShape for Shape {
    fn shape(&self) -> &Shape {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_elements() {
        assert_eq!(Shape::from(()).num_elements(), 1);
        assert_eq!(Shape::from([5]).num_elements(), 5);
        assert_eq!(Shape::from([2, 3, 4]).num_elements(), 24);
        assert_eq!(Shape::from([2, 0]).num_elements(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::scalar().to_string(), "()");
        assert_eq!(Shape::from([3]).to_string(), "(3,)");
        assert_eq!(Shape::from([2, 3]).to_string(), "(2, 3)");
    }

    #[test]
    fn test_scalar_like_shapes() {
        assert!(Shape::scalar().is_scalar());
        assert!(Shape::from([1, 1]).is_scalar());
        assert!(!Shape::from([2]).is_scalar());
    }
}
