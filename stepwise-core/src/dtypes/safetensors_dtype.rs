/// Conversion trait between an element type and the raw little endian
/// bytes stored in a `.safetensors` file.
pub trait SafeTensorsDtype: Sized {
    const DTYPE: safetensors::tensor::Dtype;
    type Array: IntoIterator<Item = u8>;

    fn to_le_bytes(self) -> Self::Array;

    /// `bytes` must be exactly `size_of::<Self>()` long.
    fn from_le_bytes(bytes: &[u8]) -> Self;
}

macro_rules! dtype {
    ($type:ty, $dtype:expr, $n:expr) => {
        impl SafeTensorsDtype for $type {
            const DTYPE: safetensors::tensor::Dtype = $dtype;
            type Array = [u8; $n];

            fn to_le_bytes(self) -> Self::Array {
                self.to_le_bytes()
            }

            fn from_le_bytes(bytes: &[u8]) -> Self {
                let mut buf = [0u8; $n];
                buf.copy_from_slice(bytes);
                <$type>::from_le_bytes(buf)
            }
        }
    };
}

dtype!(f32, safetensors::tensor::Dtype::F32, 4);
dtype!(f64, safetensors::tensor::Dtype::F64, 8);
