//! Free-function forms of the typed-access API.
//!
//! These delegate to the [`AnyValue`] methods of the same name and exist for
//! callers that prefer the function-call style over method syntax.

use crate::{error::AnyError, value::AnyValue};

/// See [`AnyValue::downcast_ref`].
#[inline]
pub fn downcast_ref<T: 'static>(value: &AnyValue) -> Option<&T> {
    value.downcast_ref()
}

/// See [`AnyValue::downcast_mut`].
#[inline]
pub fn downcast_mut<T: 'static>(value: &mut AnyValue) -> Option<&mut T> {
    value.downcast_mut()
}

/// See [`AnyValue::cast_ref`].
#[inline]
pub fn cast_ref<T: 'static>(value: &AnyValue) -> Result<&T, AnyError> {
    value.cast_ref()
}

/// See [`AnyValue::cast_mut`].
#[inline]
pub fn cast_mut<T: 'static>(value: &mut AnyValue) -> Result<&mut T, AnyError> {
    value.cast_mut()
}

/// See [`AnyValue::cast_take`].
#[inline]
pub fn cast_take<T: 'static>(value: &mut AnyValue) -> Result<T, AnyError> {
    value.cast_take()
}
