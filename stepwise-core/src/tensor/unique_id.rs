//! A simple implementation of a UID used as a unique key for tensors.

/// An id used to associate gradients, and committed values, with tensors.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct UniqueId(pub(crate) usize);

/// Generate a [UniqueId]. Ids are strictly increasing, which the gradient
/// tape relies on to order backward operations.
pub(crate) fn unique_id() -> UniqueId {
    static COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);
    UniqueId(COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
}

impl std::fmt::Display for UniqueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something that has a [UniqueId]
pub trait HasUniqueId {
    fn id(&self) -> &UniqueId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase() {
        let a = unique_id();
        let b = unique_id();
        assert!(a < b);
        assert_ne!(a, b);
    }
}
