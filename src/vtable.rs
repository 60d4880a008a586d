use core::{
    any::{type_name, TypeId},
    ptr,
};

use alloc::boxed::Box;

use crate::storage::RawStorage;

unsafe fn drop_inline<T>(storage: &mut RawStorage) {
    // Safety: It was initialized as `T`.
    unsafe {
        storage.as_mut::<T>().assume_init_drop();
    }
}

unsafe fn drop_boxed<T>(storage: &mut RawStorage) {
    // Safety: It was initialized as `Box<T>`.
    unsafe {
        storage.as_mut::<Box<T>>().assume_init_drop();
    }
}

unsafe fn clone_inline<T: Clone>(src: &RawStorage, dst: &mut RawStorage) {
    // Safety: `src` was initialized as `T`, `dst` is uninitialized.
    let value = unsafe { src.as_ref::<T>().assume_init_ref() }.clone();
    dst.as_mut::<T>().write(value);
}

unsafe fn clone_boxed<T: Clone>(src: &RawStorage, dst: &mut RawStorage) {
    // Safety: `src` was initialized as `Box<T>`, `dst` is uninitialized.
    let pointee: &T = unsafe { src.as_ref::<Box<T>>().assume_init_ref() };
    dst.as_mut::<Box<T>>().write(Box::new(pointee.clone()));
}

unsafe fn clone_assign_inline<T: Clone>(src: &RawStorage, dst: &mut RawStorage) {
    // Safety: both slots hold initialized `T`.
    let src_ref = unsafe { src.as_ref::<T>().assume_init_ref() };
    let dst_ref = unsafe { dst.as_mut::<T>().assume_init_mut() };
    dst_ref.clone_from(src_ref);
}

unsafe fn clone_assign_boxed<T: Clone>(src: &RawStorage, dst: &mut RawStorage) {
    // Safety: both slots hold initialized `Box<T>`.
    // Assigns through the pointee, so the allocation behind `dst` is kept.
    let src_ref: &T = unsafe { src.as_ref::<Box<T>>().assume_init_ref() };
    let dst_ref: &mut T = unsafe { dst.as_mut::<Box<T>>().assume_init_mut() };
    dst_ref.clone_from(src_ref);
}

unsafe fn move_construct_inline<T>(src: &mut RawStorage, dst: &mut RawStorage) {
    // Safety: `src` was initialized as `T`, `dst` is uninitialized.
    // The caller must treat `src` as logically empty afterwards.
    let value = unsafe { src.as_ref::<T>().assume_init_read() };
    dst.as_mut::<T>().write(value);
}

unsafe fn move_construct_boxed<T>(src: &mut RawStorage, dst: &mut RawStorage) {
    // Safety: `src` was initialized as `Box<T>`, `dst` is uninitialized.
    // Only the handle relocates. The pointee never moves.
    let handle = unsafe { src.as_ref::<Box<T>>().assume_init_read() };
    dst.as_mut::<Box<T>>().write(handle);
}

unsafe fn move_assign_inline<T>(src: &mut RawStorage, dst: &mut RawStorage) {
    // Safety: both slots hold initialized `T`.
    // Plain assignment, so the value previously in `dst` is dropped.
    let value = unsafe { src.as_ref::<T>().assume_init_read() };
    let dst_ref = unsafe { dst.as_mut::<T>().assume_init_mut() };
    *dst_ref = value;
}

unsafe fn move_assign_boxed<T>(src: &mut RawStorage, dst: &mut RawStorage) {
    // Safety: both slots hold initialized `Box<T>`.
    // Assigns through the pointee: `dst` keeps its allocation, the source
    // handle is released once its value has been moved out.
    let handle: Box<T> = unsafe { src.as_ref::<Box<T>>().assume_init_read() };
    let dst_ref: &mut T = unsafe { dst.as_mut::<Box<T>>().assume_init_mut() };
    *dst_ref = *handle;
}

unsafe fn as_ptr_inline<T>(storage: &RawStorage) -> *const u8 {
    // Safety: It was initialized as `T`.
    let r: &T = unsafe { storage.as_ref::<T>().assume_init_ref() };
    ptr::from_ref(r).cast()
}

unsafe fn as_ptr_boxed<T>(storage: &RawStorage) -> *const u8 {
    // Safety: It was initialized as `Box<T>`.
    let r: &T = &**unsafe { storage.as_ref::<Box<T>>().assume_init_ref() };
    ptr::from_ref(r).cast()
}

unsafe fn as_mut_inline<T>(storage: &mut RawStorage) -> *mut u8 {
    // Safety: It was initialized as `T`.
    let r: &mut T = unsafe { storage.as_mut::<T>().assume_init_mut() };
    ptr::from_mut(r).cast()
}

unsafe fn as_mut_boxed<T>(storage: &mut RawStorage) -> *mut u8 {
    // Safety: It was initialized as `Box<T>`.
    let r: &mut T = &mut **unsafe { storage.as_mut::<Box<T>>().assume_init_mut() };
    ptr::from_mut(r).cast()
}

/// Per-type operations table.
///
/// One promoted `&'static` instance exists per stored type, storage strategy
/// and clone capability. The clone slots are `None` for values stored without
/// clone support, which turns a copy attempt into a reported error instead of
/// a compile-time requirement.
pub(crate) struct VTable {
    pub type_id: fn() -> TypeId,
    pub type_name: fn() -> &'static str,
    pub inline: bool,
    pub drop: unsafe fn(&mut RawStorage),
    pub clone: Option<unsafe fn(&RawStorage, &mut RawStorage)>,
    pub clone_assign: Option<unsafe fn(&RawStorage, &mut RawStorage)>,
    pub move_construct: unsafe fn(&mut RawStorage, &mut RawStorage),
    pub move_assign: unsafe fn(&mut RawStorage, &mut RawStorage),
    pub as_ptr: unsafe fn(&RawStorage) -> *const u8,
    pub as_mut: unsafe fn(&mut RawStorage) -> *mut u8,
}

impl VTable {
    /// Whether two tables describe the same stored type.
    ///
    /// Pointer equality is only a fast path. Promoted constants are not
    /// guaranteed unique per type, and the same type may carry tables with
    /// different clone capability, so the `TypeId` check decides.
    pub fn same_type(&'static self, other: &'static VTable) -> bool {
        ptr::eq(self, other) || (self.type_id)() == (other.type_id)()
    }
}

pub(crate) fn inline_vtable<T: 'static>() -> &'static VTable {
    &VTable {
        type_id: || TypeId::of::<T>(),
        type_name: || type_name::<T>(),
        inline: true,
        drop: drop_inline::<T>,
        clone: None,
        clone_assign: None,
        move_construct: move_construct_inline::<T>,
        move_assign: move_assign_inline::<T>,
        as_ptr: as_ptr_inline::<T>,
        as_mut: as_mut_inline::<T>,
    }
}

pub(crate) fn inline_vtable_cloneable<T: Clone + 'static>() -> &'static VTable {
    &VTable {
        type_id: || TypeId::of::<T>(),
        type_name: || type_name::<T>(),
        inline: true,
        drop: drop_inline::<T>,
        clone: Some(clone_inline::<T>),
        clone_assign: Some(clone_assign_inline::<T>),
        move_construct: move_construct_inline::<T>,
        move_assign: move_assign_inline::<T>,
        as_ptr: as_ptr_inline::<T>,
        as_mut: as_mut_inline::<T>,
    }
}

pub(crate) fn boxed_vtable<T: 'static>() -> &'static VTable {
    &VTable {
        type_id: || TypeId::of::<T>(),
        type_name: || type_name::<T>(),
        inline: false,
        drop: drop_boxed::<T>,
        clone: None,
        clone_assign: None,
        move_construct: move_construct_boxed::<T>,
        move_assign: move_assign_boxed::<T>,
        as_ptr: as_ptr_boxed::<T>,
        as_mut: as_mut_boxed::<T>,
    }
}

pub(crate) fn boxed_vtable_cloneable<T: Clone + 'static>() -> &'static VTable {
    &VTable {
        type_id: || TypeId::of::<T>(),
        type_name: || type_name::<T>(),
        inline: false,
        drop: drop_boxed::<T>,
        clone: Some(clone_boxed::<T>),
        clone_assign: Some(clone_assign_boxed::<T>),
        move_construct: move_construct_boxed::<T>,
        move_assign: move_assign_boxed::<T>,
        as_ptr: as_ptr_boxed::<T>,
        as_mut: as_mut_boxed::<T>,
    }
}
