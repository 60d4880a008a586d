use core::mem::{align_of, size_of, MaybeUninit};

const STORAGE_SIZE: usize = 16;
const STORAGE_ALIGN: usize = 16;

/// Storage that can hold any value of size `STORAGE_SIZE` and alignment `STORAGE_ALIGN`,
/// including an owning `Box` handle for values that do not fit.
#[repr(C, align(16))] // alignment value is in sync with `STORAGE_ALIGN`
#[derive(Clone, Copy)]
pub(crate) struct RawStorage {
    bytes: MaybeUninit<[u8; STORAGE_SIZE]>,
}

impl RawStorage {
    /// Construct new storage without initializing any value in it.
    pub const fn new() -> Self {
        RawStorage {
            bytes: MaybeUninit::uninit(),
        }
    }

    /// Returns `true` if the type `T` fits into the storage.
    pub const fn fits<T>() -> bool {
        size_of::<T>() <= STORAGE_SIZE && align_of::<T>() <= STORAGE_ALIGN
    }

    /// Returns reference to the potentially uninitialized value.
    /// Type must be not larger than `STORAGE_SIZE` and not more aligned than `STORAGE_ALIGN`.
    ///
    /// The caller is responsible to ensure that the type is correct and the value is
    /// initialized before accessing it.
    pub fn as_ref<T>(&self) -> &MaybeUninit<T> {
        // This can't be const, because then it'll be checked in branches that are not taken.
        assert!(size_of::<T>() <= STORAGE_SIZE);
        assert!(align_of::<T>() <= STORAGE_ALIGN);

        // Safety: This cast is safe due to the size and alignment constraints.
        unsafe { &*self.bytes.as_ptr().cast() }
    }

    /// Returns mutable reference to the potentially uninitialized value.
    /// Type must be not larger than `STORAGE_SIZE` and not more aligned than `STORAGE_ALIGN`.
    ///
    /// The caller is responsible to ensure that the type is correct and the value is
    /// initialized before accessing it.
    pub fn as_mut<T>(&mut self) -> &mut MaybeUninit<T> {
        // This can't be const, because then it'll be checked in branches that are not taken.
        assert!(size_of::<T>() <= STORAGE_SIZE);
        assert!(align_of::<T>() <= STORAGE_ALIGN);

        // Safety: This cast is safe due to the size and alignment constraints.
        unsafe { &mut *self.bytes.as_mut_ptr().cast() }
    }
}
