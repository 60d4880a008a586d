//! Type-erased value container with fixed inline storage.
//!
//! [`AnyValue`] holds at most one value of any `'static` type behind a
//! uniform, type-independent handle. Values that fit a 16-byte buffer are
//! embedded directly, larger or over-aligned values are kept behind an owned
//! heap allocation. Either way, all lifecycle operations are dispatched
//! through a per-type operations table.
//!
//! Unlike `Box<dyn Any>`, the container supports emptiness, in-place
//! re-assignment and runtime-checked copying. Non-cloneable types are
//! storable; copying one reports [`AnyError::NotCloneable`] at the moment
//! the copy is attempted instead of rejecting the type up front.
//!
//! ## Usage
//!
//! ```
//! use anyvalue::{AnyError, AnyValue};
//!
//! // u32 fits inline storage, so no allocation is performed.
//! let mut a = AnyValue::from_cloneable(42u32);
//!
//! // Get a reference to the value.
//! let r: &u32 = a.downcast_ref::<u32>().unwrap();
//! assert_eq!(*r, 42);
//!
//! // Copy the container.
//! let b = a.try_clone().unwrap();
//! assert_eq!(b.downcast_ref::<u32>(), Some(&42));
//!
//! // Typed access with an error on mismatch.
//! let err = a.cast_ref::<bool>().unwrap_err();
//! assert!(matches!(err, AnyError::CastMismatch { .. }));
//!
//! // Move the value out, leaving the container empty.
//! let v: u32 = a.cast_take().unwrap();
//! assert_eq!(v, 42);
//! assert!(a.is_empty());
//! ```
//!
//! Non-cloneable values stay storable:
//!
//! ```
//! use anyvalue::{AnyError, AnyValue};
//!
//! struct Token(#[allow(dead_code)] u64);
//!
//! let a = AnyValue::from_value(Token(7));
//! assert!(matches!(a.try_clone(), Err(AnyError::NotCloneable { .. })));
//! assert!(a.is::<Token>());
//! ```

#![no_std]

extern crate alloc;

pub mod cast;
pub mod compat;
mod error;
mod storage;
mod value;
mod vtable;

pub use self::{error::AnyError, value::AnyValue};

#[cfg(test)]
mod tests;
