use core::{
    any::{type_name, TypeId},
    fmt,
    marker::PhantomData,
    mem::ManuallyDrop,
};

use alloc::boxed::Box;

use crate::{
    error::AnyError,
    storage::RawStorage,
    vtable::{
        boxed_vtable, boxed_vtable_cloneable, inline_vtable, inline_vtable_cloneable, VTable,
    },
};

/// Type-erased container holding at most one value of one type at a time.
///
/// Values that fit the fixed inline buffer are stored without allocation,
/// larger or over-aligned values are boxed. All lifecycle operations go
/// through a per-type operations table, so the container's own code never
/// sees the stored type.
///
/// Stored types may not implement `Send` and `Sync`, so the container itself
/// does not either.
///
/// # Example
///
/// ```
/// use anyvalue::AnyValue;
///
/// // u32 fits the inline storage, so no allocation is performed.
/// let mut a = AnyValue::from_value(42u32);
///
/// assert_eq!(a.downcast_ref::<u32>(), Some(&42));
/// assert_eq!(a.downcast_ref::<u64>(), None);
///
/// a.clear();
/// assert!(a.is_empty());
/// ```
pub struct AnyValue {
    model: Option<&'static VTable>,
    storage: RawStorage,
    unsend: PhantomData<*mut u8>,
}

impl Drop for AnyValue {
    #[inline(always)]
    fn drop(&mut self) {
        self.clear();
    }
}

impl Default for AnyValue {
    #[inline(always)]
    fn default() -> Self {
        AnyValue::new()
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.model {
            None => f.write_str("AnyValue(empty)"),
            Some(model) => write!(f, "AnyValue({})", (model.type_name)()),
        }
    }
}

impl AnyValue {
    /// Construct a new empty [`AnyValue`].
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvalue::AnyValue;
    /// use core::any::TypeId;
    ///
    /// let a = AnyValue::new();
    /// assert!(a.is_empty());
    /// assert_eq!(a.type_id(), TypeId::of::<()>());
    /// ```
    pub const fn new() -> Self {
        AnyValue {
            model: None,
            storage: RawStorage::new(),
            unsend: PhantomData,
        }
    }

    /// Returns `true` if the type `T` fits and is stored without allocation.
    /// If `true`, then storing a `T` is guaranteed to not allocate.
    pub const fn fits<T>() -> bool {
        RawStorage::fits::<T>()
    }

    /// Construct a new [`AnyValue`] holding the given value, without clone
    /// support.
    ///
    /// Any `'static` type is storable, including non-cloneable ones. Copy
    /// attempts on the resulting container report
    /// [`AnyError::NotCloneable`] instead of failing to compile.
    #[inline]
    pub fn from_value<T>(value: T) -> Self
    where
        T: 'static,
    {
        let mut place = AnyValue::new();
        place.emplace(value);
        place
    }

    /// Construct a new [`AnyValue`] holding the given value, with clone
    /// support.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvalue::AnyValue;
    /// let a = AnyValue::from_cloneable(String::from("hello"));
    /// let b = a.try_clone().unwrap();
    ///
    /// assert_eq!(b.downcast_ref::<String>().map(String::as_str), Some("hello"));
    /// ```
    #[inline]
    pub fn from_cloneable<T>(value: T) -> Self
    where
        T: Clone + 'static,
    {
        let mut place = AnyValue::new();
        place.emplace_cloneable(value);
        place
    }

    /// Destroys the current content and constructs `T` in place, without
    /// clone support. Returns a reference to the newly stored value.
    #[inline]
    pub fn emplace<T>(&mut self, value: T) -> &mut T
    where
        T: 'static,
    {
        self.emplace_raw(value, inline_vtable::<T>(), boxed_vtable::<T>())
    }

    /// Destroys the current content and constructs `T` in place, with clone
    /// support. Returns a reference to the newly stored value.
    #[inline]
    pub fn emplace_cloneable<T>(&mut self, value: T) -> &mut T
    where
        T: Clone + 'static,
    {
        self.emplace_raw(
            value,
            inline_vtable_cloneable::<T>(),
            boxed_vtable_cloneable::<T>(),
        )
    }

    fn emplace_raw<T>(
        &mut self,
        value: T,
        inline: &'static VTable,
        boxed: &'static VTable,
    ) -> &mut T
    where
        T: 'static,
    {
        self.clear();

        if RawStorage::fits::<T>() {
            self.storage.as_mut::<T>().write(value);
            // The table is installed only after the value is fully in place,
            // so the emptiness invariant holds at every step.
            self.model = Some(inline);
        } else {
            const {
                assert!(RawStorage::fits::<Box<T>>());
            }

            self.storage.as_mut::<Box<T>>().write(Box::new(value));
            self.model = Some(boxed);
        }

        // Safety: just initialized as `T` under a matching table.
        unsafe { self.downcast_mut_unchecked::<T>() }
    }

    /// Destroys the held value, if any, leaving the container empty.
    /// Clearing an already empty container is a no-op.
    #[inline]
    pub fn clear(&mut self) {
        if let Some(model) = self.model.take() {
            // Safety: `storage` holds a live value described by `model`.
            unsafe {
                (model.drop)(&mut self.storage);
            }
        }
    }

    /// Returns `true` if the container holds no value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
    }

    /// Returns the type id of the stored value, or the `()` sentinel when
    /// the container is empty.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        match self.model {
            None => TypeId::of::<()>(),
            Some(model) => (model.type_id)(),
        }
    }

    /// Returns the type name of the stored value, or `"()"` when empty.
    /// Intended for diagnostics only; the string is not a stable identifier.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self.model {
            None => "()",
            Some(model) => (model.type_name)(),
        }
    }

    /// Returns `true` if the held value lives in the inline buffer.
    /// An empty container reports `false`.
    #[inline]
    pub fn is_inline(&self) -> bool {
        self.model.is_some_and(|model| model.inline)
    }

    /// Returns `true` if the stored value is of type `T`.
    ///
    /// An empty container holds no type, so this is `false` for every `T`,
    /// including `()`.
    #[inline]
    pub fn is<T>(&self) -> bool
    where
        T: 'static,
    {
        matches!(self.model, Some(model) if (model.type_id)() == TypeId::of::<T>())
    }

    /// Returns some reference to the stored value if it is of type `T`.
    /// Otherwise returns none.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvalue::AnyValue;
    /// let a = AnyValue::from_value(42u32);
    ///
    /// assert_eq!(a.downcast_ref::<u32>(), Some(&42));
    /// ```
    #[inline]
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: 'static,
    {
        if self.is::<T>() {
            Some(unsafe { self.downcast_ref_unchecked::<T>() })
        } else {
            None
        }
    }

    /// Returns some mutable reference to the stored value if it is of type
    /// `T`. Otherwise returns none.
    #[inline]
    pub fn downcast_mut<T>(&mut self) -> Option<&mut T>
    where
        T: 'static,
    {
        if self.is::<T>() {
            Some(unsafe { self.downcast_mut_unchecked::<T>() })
        } else {
            None
        }
    }

    /// Returns a reference to the stored value of type `T`, or
    /// [`AnyError::CastMismatch`] if the container is empty or holds a
    /// different type.
    #[inline]
    pub fn cast_ref<T>(&self) -> Result<&T, AnyError>
    where
        T: 'static,
    {
        match self.downcast_ref::<T>() {
            Some(r) => Ok(r),
            None => Err(self.mismatch::<T>()),
        }
    }

    /// Returns a mutable reference to the stored value of type `T`, or
    /// [`AnyError::CastMismatch`].
    #[inline]
    pub fn cast_mut<T>(&mut self) -> Result<&mut T, AnyError>
    where
        T: 'static,
    {
        if self.is::<T>() {
            Ok(unsafe { self.downcast_mut_unchecked::<T>() })
        } else {
            Err(self.mismatch::<T>())
        }
    }

    /// Moves the stored value of type `T` out, leaving the container empty.
    ///
    /// On [`AnyError::CastMismatch`] the container is left untouched.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvalue::AnyValue;
    /// let mut a = AnyValue::from_value(42u32);
    ///
    /// assert!(a.cast_take::<u64>().is_err());
    /// assert!(!a.is_empty());
    ///
    /// assert_eq!(a.cast_take::<u32>(), Ok(42));
    /// assert!(a.is_empty());
    /// ```
    #[inline]
    pub fn cast_take<T>(&mut self) -> Result<T, AnyError>
    where
        T: 'static,
    {
        if self.is::<T>() {
            Ok(unsafe { self.take().downcast_unchecked() })
        } else {
            Err(self.mismatch::<T>())
        }
    }

    /// Returns the stored value if it is of type `T`.
    /// Otherwise returns self back.
    ///
    /// This will unbox the value if it was stored boxed.
    #[inline]
    pub fn downcast<T>(self) -> Result<T, AnyValue>
    where
        T: 'static,
    {
        if self.is::<T>() {
            Ok(unsafe { self.downcast_unchecked() })
        } else {
            Err(self)
        }
    }

    /// Moves the held value into a new container, leaving `self` empty.
    /// Taking from an empty container yields an empty container.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvalue::AnyValue;
    /// let mut a = AnyValue::from_value(42u32);
    /// let b = a.take();
    ///
    /// assert!(a.is_empty());
    /// assert_eq!(b.downcast_ref::<u32>(), Some(&42));
    /// ```
    pub fn take(&mut self) -> AnyValue {
        match self.model.take() {
            None => AnyValue::new(),
            Some(model) => {
                let mut storage = RawStorage::new();
                // Safety: `self.storage` holds a live value described by
                // `model` and is treated as logically empty afterwards.
                unsafe {
                    (model.move_construct)(&mut self.storage, &mut storage);
                }
                AnyValue {
                    model: Some(model),
                    storage,
                    unsend: PhantomData,
                }
            }
        }
    }

    /// Copy-constructs a new container from `self`.
    ///
    /// An empty container clones to an empty container. Returns
    /// [`AnyError::NotCloneable`] if the held value was stored without clone
    /// support; `self` is valid and unchanged either way.
    pub fn try_clone(&self) -> Result<AnyValue, AnyError> {
        let Some(model) = self.model else {
            return Ok(AnyValue::new());
        };

        let clone = model.clone.ok_or(AnyError::NotCloneable {
            type_name: (model.type_name)(),
        })?;

        let mut storage = RawStorage::new();
        // Safety: `self.storage` holds a live value described by `model`,
        // the fresh storage is uninitialized.
        unsafe {
            clone(&self.storage, &mut storage);
        }

        // The table is adopted only after the copy succeeded.
        Ok(AnyValue {
            model: Some(model),
            storage,
            unsend: PhantomData,
        })
    }

    /// Copy-assigns from `source` into `self`.
    ///
    /// Assigning from an empty container clears `self`. If both containers
    /// hold the same type the copy happens in place through the stored
    /// value's own clone-assignment; otherwise the current content is
    /// replaced by a fresh copy. When the source is not cloneable the error
    /// is reported before `self` gives up its current value.
    pub fn try_clone_from(&mut self, source: &AnyValue) -> Result<(), AnyError> {
        let Some(src_model) = source.model else {
            self.clear();
            return Ok(());
        };

        let not_cloneable = || AnyError::NotCloneable {
            type_name: (src_model.type_name)(),
        };

        match self.model {
            Some(model) if model.same_type(src_model) => {
                let clone_assign = src_model.clone_assign.ok_or_else(not_cloneable)?;
                // Safety: both storages hold live values of the same type.
                unsafe {
                    clone_assign(&source.storage, &mut self.storage);
                }
            }
            _ => {
                // Check copy support before discarding the current value.
                let clone = src_model.clone.ok_or_else(not_cloneable)?;
                self.clear();
                // Safety: `self.storage` is uninitialized after `clear`.
                unsafe {
                    clone(&source.storage, &mut self.storage);
                }
            }
        }

        self.model = Some(src_model);
        Ok(())
    }

    /// Move-assigns from `source` into `self`, leaving `source` empty.
    ///
    /// Moving from an empty container clears `self`. If both containers hold
    /// the same type the value is moved in place through the stored value's
    /// own assignment, which for boxed values keeps the existing allocation.
    pub fn move_from(&mut self, source: &mut AnyValue) {
        let Some(src_model) = source.model.take() else {
            self.clear();
            return;
        };

        match self.model {
            Some(model) if model.same_type(src_model) => {
                // Safety: both storages hold live values of the same type,
                // `source.storage` is treated as logically empty afterwards.
                unsafe {
                    (src_model.move_assign)(&mut source.storage, &mut self.storage);
                }
            }
            _ => {
                self.clear();
                // Safety: `self.storage` is uninitialized after `clear`.
                unsafe {
                    (src_model.move_construct)(&mut source.storage, &mut self.storage);
                }
            }
        }

        self.model = Some(src_model);
    }

    /// Returns reference to the stored value without type checking.
    ///
    /// # Safety
    ///
    /// The container must be non-empty and hold a value of type `T`.
    #[inline]
    pub unsafe fn downcast_ref_unchecked<T>(&self) -> &T
    where
        T: 'static,
    {
        debug_assert!(self.is::<T>());
        let model = unsafe { self.model.unwrap_unchecked() };
        let ptr = unsafe { (model.as_ptr)(&self.storage) };
        unsafe { &*ptr.cast() }
    }

    /// Returns mutable reference to the stored value without type checking.
    ///
    /// # Safety
    ///
    /// The container must be non-empty and hold a value of type `T`.
    #[inline]
    pub unsafe fn downcast_mut_unchecked<T>(&mut self) -> &mut T
    where
        T: 'static,
    {
        debug_assert!(self.is::<T>());
        let model = unsafe { self.model.unwrap_unchecked() };
        let ptr = unsafe { (model.as_mut)(&mut self.storage) };
        unsafe { &mut *ptr.cast() }
    }

    /// Returns the stored value without type checking.
    ///
    /// This will unbox the value if it was stored boxed.
    ///
    /// # Safety
    ///
    /// The container must be non-empty and hold a value of type `T`.
    pub unsafe fn downcast_unchecked<T>(self) -> T
    where
        T: 'static,
    {
        debug_assert!(self.is::<T>());
        // Prevent dropping through the table.
        let me = ManuallyDrop::new(self);

        // The strategy is a compile-time property of `T`, so the matching
        // representation can be read back directly.
        if RawStorage::fits::<T>() {
            // Safety: It was initialized as `T`.
            unsafe { me.storage.as_ref::<T>().assume_init_read() }
        } else {
            // Safety: It was initialized as `Box<T>`.
            let handle: Box<T> = unsafe { me.storage.as_ref::<Box<T>>().assume_init_read() };
            *handle
        }
    }

    fn mismatch<T>(&self) -> AnyError
    where
        T: 'static,
    {
        AnyError::CastMismatch {
            expected: type_name::<T>(),
            found: self.type_name(),
        }
    }
}
