use crate::shapes::Shape;

/// Represents the different errors that can occur when creating tensors,
/// running tensor operations, computing gradients or committing update
/// batches to a [crate::shared::ParamStore].
#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// Not enough (or too many) elements were provided when creating a tensor.
    WrongNumElements { expected: usize, found: usize },
    /// Two tensors that must agree on shape do not.
    ShapeMismatch { expected: Shape, found: Shape },
    /// The loss does not depend on the named tensor, so no gradient was recorded for it.
    NoGradientPath(std::string::String),
    /// A hyperparameter is outside of its valid range.
    InvalidCoefficient { name: &'static str, value: f64 },
    /// `backward` was called on a tensor with more than one element.
    NonScalarLoss(Shape),
    /// A named tensor with this name is already present in the store.
    DuplicateName(std::string::String),
    /// The handle does not refer to a tensor in this store.
    UnknownState(std::string::String),
    /// The same target was assigned more than once in a single update batch.
    ConflictingUpdates(std::string::String),
    /// A stored tensor has a different dtype than the one being loaded into.
    DtypeMismatch {
        name: std::string::String,
        expected: safetensors::tensor::Dtype,
        found: safetensors::tensor::Dtype,
    },
    SafeTensors(safetensors::SafeTensorError),
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::WrongNumElements { expected, found } => {
                write!(f, "expected {expected} elements, found {found}")
            }
            Self::ShapeMismatch { expected, found } => {
                write!(f, "shape mismatch: expected {expected}, found {found}")
            }
            Self::NoGradientPath(name) => write!(f, "loss has no gradient path to `{name}`"),
            Self::InvalidCoefficient { name, value } => {
                write!(f, "invalid value for `{name}`: {value}")
            }
            Self::NonScalarLoss(shape) => {
                write!(f, "backward requires a scalar, found shape {shape}")
            }
            Self::DuplicateName(name) => write!(f, "a tensor named `{name}` already exists"),
            Self::UnknownState(name) => write!(f, "no tensor `{name}` in this store"),
            Self::ConflictingUpdates(name) => {
                write!(f, "`{name}` is assigned more than once in one update batch")
            }
            Self::DtypeMismatch {
                name,
                expected,
                found,
            } => write!(f, "`{name}` has dtype {found:?}, expected {expected:?}"),
            Self::SafeTensors(err) => write!(f, "{err:?}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<safetensors::SafeTensorError> for Error {
    fn from(err: safetensors::SafeTensorError) -> Self {
        Self::SafeTensors(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
