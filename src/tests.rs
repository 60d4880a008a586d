use core::{
    any::TypeId,
    sync::atomic::{AtomicUsize, Ordering::Relaxed},
};

use alloc::{format, rc::Rc, string::String};

use crate::{cast, compat, AnyError, AnyValue};

/// Does not implement `Clone`.
#[derive(Debug, PartialEq)]
struct NoClone(u32);

/// Too large for the inline buffer.
type Large = [u64; 4];

#[repr(align(32))]
#[derive(Clone, Copy, Debug, PartialEq)]
struct OverAligned(u8);

/// Counts drops of a stored value.
struct Tally(&'static AtomicUsize);

impl Drop for Tally {
    fn drop(&mut self) {
        self.0.fetch_add(1, Relaxed);
    }
}

/// Distinguishes copy-construction from in-place copy-assignment.
struct Probe {
    clones: &'static AtomicUsize,
    assigns: &'static AtomicUsize,
}

impl Clone for Probe {
    fn clone(&self) -> Self {
        self.clones.fetch_add(1, Relaxed);
        Probe {
            clones: self.clones,
            assigns: self.assigns,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.assigns.fetch_add(1, Relaxed);
        self.clones = source.clones;
        self.assigns = source.assigns;
    }
}

const _: () = {
    assert!(AnyValue::fits::<u32>());
    assert!(AnyValue::fits::<(u64, u64)>());
    assert!(!AnyValue::fits::<Large>());
    assert!(!AnyValue::fits::<OverAligned>());
};

#[test]
fn test_empty() {
    let mut a = AnyValue::new();
    assert!(a.is_empty());
    assert_eq!(a.type_id(), TypeId::of::<()>());
    assert_eq!(a.type_name(), "()");
    assert!(!a.is::<()>());
    assert!(!a.is::<u32>());
    assert!(!a.is_inline());
    assert_eq!(a.downcast_ref::<u32>(), None);

    // Clearing an empty container is a no-op.
    a.clear();
    assert!(a.is_empty());
}

#[test]
fn test_small_primitive() {
    let mut a = AnyValue::from_value(42u32);
    assert!(!a.is_empty());
    assert!(a.is_inline());
    assert_eq!(a.is::<u32>(), true);
    assert_eq!(a.is::<u64>(), false);
    assert_eq!(a.downcast_ref::<u32>(), Some(&42));
    assert_eq!(a.downcast_ref::<u64>(), None);
    assert_eq!(a.downcast_mut::<u32>(), Some(&mut 42));
    assert_eq!(a.downcast_mut::<u64>(), None);

    drop(a);
}

#[test]
fn test_large_value_is_boxed() {
    let mut large: Large = [1, 2, 3, 4];

    let mut a = AnyValue::from_value(large);
    assert!(!a.is_inline());
    assert_eq!(a.is::<Large>(), true);
    assert_eq!(a.downcast_ref::<Large>(), Some(&large));
    assert_eq!(a.downcast_mut::<Large>(), Some(&mut large));
}

#[test]
fn test_over_aligned_is_boxed() {
    let a = AnyValue::from_value(OverAligned(7));
    assert!(!a.is_inline());
    assert_eq!(a.downcast_ref::<OverAligned>(), Some(&OverAligned(7)));
}

#[test]
fn test_emplace() {
    let mut a = AnyValue::new();

    let r = a.emplace(7u32);
    *r += 1;

    assert_eq!(a.type_id(), TypeId::of::<u32>());
    assert_eq!(a.downcast_ref::<u32>(), Some(&8));
    assert_eq!(a.downcast_ref::<i32>(), None);

    // Emplacing over existing content replaces it, type included.
    a.emplace(String::from("hello"));
    assert_eq!(a.type_id(), TypeId::of::<String>());
    assert_eq!(a.downcast_ref::<u32>(), None);
}

#[test]
fn test_emplace_drops_previous_value() {
    static DROPS: AtomicUsize = AtomicUsize::new(0);

    let mut a = AnyValue::from_value(Tally(&DROPS));
    assert_eq!(DROPS.load(Relaxed), 0);

    a.emplace(1u32);
    assert_eq!(DROPS.load(Relaxed), 1);
}

#[test]
fn test_emplace_clear_round_trip() {
    let mut a = AnyValue::new();
    a.emplace(5u8);
    assert!(!a.is_empty());

    a.clear();
    assert!(a.is_empty());
    assert_eq!(a.type_id(), TypeId::of::<()>());

    // Second clear is a no-op.
    a.clear();
    assert!(a.is_empty());
}

#[test]
fn test_drop_exactly_once() {
    static DROPS: AtomicUsize = AtomicUsize::new(0);

    let a = AnyValue::from_value(Tally(&DROPS));
    drop(a);
    assert_eq!(DROPS.load(Relaxed), 1);

    static CLEARED: AtomicUsize = AtomicUsize::new(0);

    let mut b = AnyValue::from_value(Tally(&CLEARED));
    b.clear();
    assert_eq!(CLEARED.load(Relaxed), 1);
    drop(b);
    assert_eq!(CLEARED.load(Relaxed), 1);
}

#[test]
fn test_clone_round_trip() {
    let a = AnyValue::from_cloneable(String::from("hello"));
    let b = a.try_clone().unwrap();

    assert_eq!(a.downcast_ref::<String>().map(String::as_str), Some("hello"));
    assert_eq!(b.downcast_ref::<String>().map(String::as_str), Some("hello"));
}

#[test]
fn test_clone_inline_round_trip() {
    let a = AnyValue::from_cloneable(42u32);
    let b = a.try_clone().unwrap();

    assert!(b.is_inline());
    assert_eq!(b.downcast_ref::<u32>(), Some(&42));
}

#[test]
fn test_clone_empty() {
    let a = AnyValue::new();
    let b = a.try_clone().unwrap();
    assert!(b.is_empty());
}

#[test]
fn test_clone_not_supported() {
    let a = AnyValue::from_value(NoClone(5));

    match a.try_clone() {
        Err(AnyError::NotCloneable { .. }) => {}
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected clone to fail"),
    }

    // The original container is untouched by the failed copy.
    assert_eq!(a.downcast_ref::<NoClone>(), Some(&NoClone(5)));
}

#[test]
fn test_clone_from_same_type_assigns_in_place() {
    static CLONES: AtomicUsize = AtomicUsize::new(0);
    static ASSIGNS: AtomicUsize = AtomicUsize::new(0);

    let src = AnyValue::from_cloneable(Probe {
        clones: &CLONES,
        assigns: &ASSIGNS,
    });
    let mut dst = AnyValue::from_cloneable(Probe {
        clones: &CLONES,
        assigns: &ASSIGNS,
    });

    dst.try_clone_from(&src).unwrap();
    assert_eq!(CLONES.load(Relaxed), 0);
    assert_eq!(ASSIGNS.load(Relaxed), 1);
}

#[test]
fn test_clone_from_different_type_reconstructs() {
    static CLONES: AtomicUsize = AtomicUsize::new(0);
    static ASSIGNS: AtomicUsize = AtomicUsize::new(0);

    let src = AnyValue::from_cloneable(Probe {
        clones: &CLONES,
        assigns: &ASSIGNS,
    });
    let mut dst = AnyValue::from_cloneable(1u32);

    dst.try_clone_from(&src).unwrap();
    assert_eq!(CLONES.load(Relaxed), 1);
    assert_eq!(ASSIGNS.load(Relaxed), 0);
    assert!(dst.is::<Probe>());
}

#[test]
fn test_clone_from_empty_clears() {
    let mut dst = AnyValue::from_cloneable(1u32);
    dst.try_clone_from(&AnyValue::new()).unwrap();
    assert!(dst.is_empty());
}

#[test]
fn test_failed_clone_from_keeps_destination() {
    let src = AnyValue::from_value(NoClone(2));

    // Different type held: the copy must be rejected before the current
    // value is discarded.
    let mut dst = AnyValue::from_cloneable(1u32);
    assert!(dst.try_clone_from(&src).is_err());
    assert_eq!(dst.downcast_ref::<u32>(), Some(&1));

    // Same type held: the in-place path fails the same way.
    let mut dst = AnyValue::from_value(NoClone(1));
    assert!(dst.try_clone_from(&src).is_err());
    assert_eq!(dst.downcast_ref::<NoClone>(), Some(&NoClone(1)));
}

#[test]
fn test_boxed_clone_from_keeps_allocation() {
    let src = AnyValue::from_cloneable([1u64, 2, 3, 4]);
    let mut dst = AnyValue::from_cloneable([5u64, 6, 7, 8]);

    let before = dst.downcast_ref::<Large>().unwrap() as *const Large;
    dst.try_clone_from(&src).unwrap();
    let after = dst.downcast_ref::<Large>().unwrap() as *const Large;

    assert_eq!(before, after);
    assert_eq!(dst.downcast_ref::<Large>(), Some(&[1, 2, 3, 4]));
}

#[test]
fn test_take_leaves_source_empty() {
    let mut a = AnyValue::from_value(42u32);
    let b = a.take();

    assert!(a.is_empty());
    assert_eq!(a.type_id(), TypeId::of::<()>());
    assert_eq!(b.downcast_ref::<u32>(), Some(&42));

    // Taking from the now-empty source yields an empty container.
    let c = a.take();
    assert!(c.is_empty());
}

#[test]
fn test_take_does_not_drop() {
    static DROPS: AtomicUsize = AtomicUsize::new(0);

    let mut a = AnyValue::from_value(Tally(&DROPS));
    let b = a.take();

    drop(a);
    assert_eq!(DROPS.load(Relaxed), 0);

    drop(b);
    assert_eq!(DROPS.load(Relaxed), 1);
}

#[test]
fn test_take_boxed() {
    let mut a = AnyValue::from_value([1u64, 2, 3, 4]);
    let b = a.take();

    assert!(a.is_empty());
    assert_eq!(b.downcast_ref::<Large>(), Some(&[1, 2, 3, 4]));
}

#[test]
fn test_move_from() {
    let mut src = AnyValue::from_value(String::from("hello"));
    let mut dst = AnyValue::from_value(1u32);

    dst.move_from(&mut src);
    assert!(src.is_empty());
    assert_eq!(dst.downcast_ref::<String>().map(String::as_str), Some("hello"));

    // Moving from an empty source clears the destination.
    dst.move_from(&mut src);
    assert!(dst.is_empty());
}

#[test]
fn test_move_from_drops_replaced_value() {
    static DROPS: AtomicUsize = AtomicUsize::new(0);

    let mut src = AnyValue::from_value(7u32);
    let mut dst = AnyValue::from_value(Tally(&DROPS));

    dst.move_from(&mut src);
    assert_eq!(DROPS.load(Relaxed), 1);
    assert_eq!(dst.downcast_ref::<u32>(), Some(&7));
}

#[test]
fn test_boxed_move_from_keeps_allocation() {
    let mut src = AnyValue::from_value([1u64, 2, 3, 4]);
    let mut dst = AnyValue::from_value([5u64, 6, 7, 8]);

    let before = dst.downcast_ref::<Large>().unwrap() as *const Large;
    dst.move_from(&mut src);
    let after = dst.downcast_ref::<Large>().unwrap() as *const Large;

    assert_eq!(before, after);
    assert!(src.is_empty());
    assert_eq!(dst.downcast_ref::<Large>(), Some(&[1, 2, 3, 4]));
}

#[test]
fn test_cast_ref_mismatch() {
    let a = AnyValue::from_value(42u32);

    let err = a.cast_ref::<u64>().unwrap_err();
    assert!(matches!(err, AnyError::CastMismatch { .. }));

    assert_eq!(a.cast_ref::<u32>(), Ok(&42));
}

#[test]
fn test_cast_on_empty() {
    let mut a = AnyValue::new();

    match a.cast_ref::<u32>() {
        Err(AnyError::CastMismatch { found, .. }) => assert_eq!(found, "()"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(a.cast_mut::<u32>().is_err());
    assert!(a.cast_take::<u32>().is_err());
}

#[test]
fn test_cast_take() {
    let mut a = AnyValue::from_value(String::from("hello"));

    // A failed take leaves the container untouched.
    assert!(a.cast_take::<u32>().is_err());
    assert!(!a.is_empty());

    let s: String = a.cast_take().unwrap();
    assert_eq!(s, "hello");
    assert!(a.is_empty());
}

#[test]
fn test_cast_take_does_not_double_drop() {
    static DROPS: AtomicUsize = AtomicUsize::new(0);

    let mut a = AnyValue::from_value(Tally(&DROPS));
    let taken: Tally = a.cast_take().unwrap();
    assert_eq!(DROPS.load(Relaxed), 0);

    drop(taken);
    drop(a);
    assert_eq!(DROPS.load(Relaxed), 1);
}

#[test]
fn test_downcast_consuming() {
    let mut a = AnyValue::from_value(42u32);

    a = match a.downcast::<u64>() {
        Ok(_) => panic!("expected downcast to fail"),
        Err(a) => a,
    };

    match a.downcast::<u32>() {
        Ok(v) => assert_eq!(v, 42),
        Err(_) => panic!("expected downcast to succeed"),
    }
}

#[test]
fn test_downcast_unboxes_large_value() {
    let a = AnyValue::from_value([1u64, 2, 3, 4]);

    match a.downcast::<Large>() {
        Ok(v) => assert_eq!(v, [1, 2, 3, 4]),
        Err(_) => panic!("expected downcast to succeed"),
    }
}

#[test]
fn test_not_send_sync_value() {
    let rc = Rc::new(42u32);
    let a = AnyValue::from_cloneable(Rc::clone(&rc));

    let b = a.try_clone().unwrap();
    assert_eq!(Rc::strong_count(&rc), 3);

    drop((a, b));
    assert_eq!(Rc::strong_count(&rc), 1);
}

#[test]
fn test_debug() {
    let a = AnyValue::from_value(42u32);
    assert_eq!(format!("{a:?}"), "AnyValue(u32)");

    let empty = AnyValue::new();
    assert_eq!(format!("{empty:?}"), "AnyValue(empty)");
}

#[test]
fn test_error_display() {
    let a = AnyValue::from_value(NoClone(0));
    let err = a.try_clone().unwrap_err();
    assert!(format!("{err}").contains("without clone support"));

    let err = a.cast_ref::<u32>().unwrap_err();
    assert!(format!("{err}").contains("u32"));
}

#[test]
fn test_free_functions() {
    let mut a = AnyValue::from_value(42u32);

    assert_eq!(cast::downcast_ref::<u32>(&a), Some(&42));
    assert_eq!(cast::downcast_mut::<u64>(&mut a), None);
    assert_eq!(cast::cast_ref::<u32>(&a), Ok(&42));
    assert!(cast::cast_mut::<u64>(&mut a).is_err());
    assert_eq!(cast::cast_take::<u32>(&mut a), Ok(42));
    assert!(a.is_empty());
}

#[test]
fn test_compat_aliases() {
    let mut a = compat::Any::from_cloneable(42u32);

    assert_eq!(compat::any_cast_ptr::<u32>(&a), Some(&42));
    assert_eq!(compat::any_cast_mut_ptr::<u64>(&mut a), None);
    assert_eq!(compat::any_cast_ref::<u32>(&a), Ok(&42));
    assert!(compat::any_cast_mut::<u64>(&mut a).is_err());
    assert_eq!(compat::any_cast::<u32>(&mut a), Ok(42));
}
