use core::fmt;

/// Failures surfaced by the checked container operations.
///
/// Everything else the container does (moving, clearing, dropping, emptiness
/// and type queries) cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyError {
    /// A typed access requested a type the container does not currently hold.
    ///
    /// Raised both on a genuine mismatch and on an empty container, where
    /// `found` is the `"()"` sentinel. When failure is an ordinary outcome,
    /// prefer the non-failing [`downcast_ref`](crate::AnyValue::downcast_ref)
    /// family instead.
    CastMismatch {
        /// Name of the requested type.
        expected: &'static str,
        /// Name of the held type, or `"()"` for an empty container.
        found: &'static str,
    },
    /// A copy was attempted on a value stored without clone support.
    ///
    /// Values stored via [`from_value`](crate::AnyValue::from_value) or
    /// [`emplace`](crate::AnyValue::emplace) carry no clone capability, so any
    /// type stays storable and the failure is deferred to the moment a copy is
    /// actually attempted.
    NotCloneable {
        /// Name of the held type.
        type_name: &'static str,
    },
}

impl fmt::Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnyError::CastMismatch { expected, found } => {
                write!(f, "cast to {expected} failed, container holds {found}")
            }
            AnyError::NotCloneable { type_name } => {
                write!(f, "value of type {type_name} was stored without clone support")
            }
        }
    }
}

impl core::error::Error for AnyError {}
