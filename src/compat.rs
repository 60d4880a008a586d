//! Aliases under the naming of the predecessor library.
//!
//! Code written against the previous implementation can switch to this crate
//! by importing from here instead. Purely re-exports, no additional behavior.

pub use crate::cast::{
    cast_mut as any_cast_mut, cast_ref as any_cast_ref, cast_take as any_cast,
    downcast_mut as any_cast_mut_ptr, downcast_ref as any_cast_ptr,
};
pub use crate::error::AnyError;
pub use crate::value::AnyValue as Any;
