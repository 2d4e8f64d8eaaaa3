use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A type-erased, reference-counted state value.
///
/// Cloning only bumps the `Arc`; every reader of `auth/state` shares the
/// same identity snapshot.
#[derive(Clone)]
pub struct StateValue {
    inner: Arc<dyn Any + Send + Sync>,
}

impl StateValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Borrow the value as `T`, or `None` if another type is stored.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Clone the value out as `T`.
    pub fn cloned<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn type_id(&self) -> TypeId {
        (*self.inner).type_id()
    }

    /// Number of live handles to the underlying value.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl fmt::Debug for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateValue")
            .field("type_id", &(*self.inner).type_id())
            .finish()
    }
}

/// Handle returned by `StateStore::subscribe()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Relation {
        active: bool,
        count: u32,
    }

    #[test]
    fn downcast_matching_type() {
        let v = StateValue::new(Relation { active: true, count: 4 });
        let got = v.downcast_ref::<Relation>().unwrap();
        assert!(got.active);
        assert_eq!(got.count, 4);
    }

    #[test]
    fn downcast_other_type_is_none() {
        let v = StateValue::new("/feed".to_string());
        assert!(v.downcast_ref::<Relation>().is_none());
        assert!(v.downcast_ref::<&str>().is_none());
    }

    #[test]
    fn cloned_copies_out() {
        let v = StateValue::new(Relation { active: false, count: 3 });
        assert_eq!(
            v.cloned::<Relation>(),
            Some(Relation { active: false, count: 3 })
        );
        assert_eq!(v.cloned::<u32>(), None);
    }

    #[test]
    fn is_and_type_id() {
        let v = StateValue::new(7u32);
        assert!(v.is::<u32>());
        assert!(!v.is::<u64>());
        assert_eq!(v.type_id(), TypeId::of::<u32>());
    }

    #[test]
    fn clone_shares_the_allocation() {
        let a = StateValue::new(vec![0u8; 1024]);
        let b = a.clone();
        assert_eq!(a.ref_count(), 2);

        let pa = a.downcast_ref::<Vec<u8>>().unwrap().as_ptr();
        let pb = b.downcast_ref::<Vec<u8>>().unwrap().as_ptr();
        assert_eq!(pa, pb);

        drop(b);
        assert_eq!(a.ref_count(), 1);
    }

    #[test]
    fn debug_mentions_type_id() {
        let debug = format!("{:?}", StateValue::new(()));
        assert!(debug.contains("StateValue"));
        assert!(debug.contains("type_id"));
    }

    fn _assert_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StateValue>();
    }
}
