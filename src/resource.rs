// src/resource.rs
//! The generic reference-counted wrapper every resource kind instantiates.
//!
//! A [`Resource`] pairs an opaque native handle with the shared lifecycle
//! contract: acquire (create or reference), release (destroy), cached status,
//! finish, and user data. The handle is a capability token; the wrapper never
//! looks inside it and never touches it after issuing its own destroy. All
//! bookkeeping against the [`registry`](crate::registry) happens here, once,
//! instead of being repeated per kind.

use std::fmt;
use std::marker::PhantomData;
use std::os::raw::c_void;
use std::panic::Location;
use std::ptr::NonNull;
use std::rc::Rc;

use crate::errors::Error;
use crate::registry;
use crate::status::Status;
use crate::sys::{self, NativeObjectFns};

/// One resource kind pluggable into [`Resource`]: names the kind for
/// diagnostics and selects its lifecycle entry points from the vtable.
pub trait ResourceKind: 'static {
    const NAME: &'static str;

    fn object_fns(vtable: &'static sys::NativeVtable) -> &'static NativeObjectFns;
}

/// Identity of a user-data slot. The *address* of the static key is the
/// identity the native library sees, and the type parameter pins what the
/// slot stores, so a lookup can never alias a differently-typed slot.
pub struct UserDataKey<T> {
    _type: PhantomData<fn() -> T>,
}

impl<T> UserDataKey<T> {
    pub const fn new() -> Self {
        Self { _type: PhantomData }
    }

    fn addr(&'static self) -> *const c_void {
        self as *const Self as *const c_void
    }
}

unsafe extern "C" fn drop_user_data<T>(data: *mut c_void) {
    drop(Box::from_raw(data as *mut Rc<T>));
}

/// Safe wrapper around one reference to a native object.
///
/// Cloning (or [`reference`](Resource::reference)) shares the underlying
/// object; dropping (or [`destroy`](Resource::destroy)) releases this
/// owner's reference. The native library frees the object when the last
/// reference is gone.
pub struct Resource<K: ResourceKind> {
    raw: NonNull<c_void>,
    _kind: PhantomData<K>,
}

impl<K: ResourceKind> Resource<K> {
    fn fns() -> &'static NativeObjectFns {
        K::object_fns(sys::vtable())
    }

    /// Adopt a handle fresh out of a native constructor.
    ///
    /// A NULL handle means the native library broke its own contract and is
    /// not a recoverable condition. A non-success status is: the handle is
    /// released again internally and the caller gets a typed error, never a
    /// broken handle it would have to clean up.
    #[track_caller]
    pub(crate) fn from_raw_created(raw: *mut c_void) -> Result<Self, Error> {
        let site = Location::caller();
        let Some(raw) = NonNull::new(raw) else {
            panic!("native {} constructor returned NULL", K::NAME);
        };

        let status = Status::from_raw(unsafe { (Self::fns().status)(raw.as_ptr()) });
        if !status.is_success() {
            unsafe { (Self::fns().destroy)(raw.as_ptr()) };
            return Err(Error::Construction(status));
        }

        registry::track(raw.as_ptr() as usize, K::NAME, site);
        Ok(Self { raw, _kind: PhantomData })
    }

    /// Share ownership of the underlying object: bumps the native reference
    /// count and records one more tracked unit for the same handle.
    ///
    /// `Clone` does the same; this form records the caller's location in the
    /// registry.
    #[track_caller]
    pub fn reference(&self) -> Self {
        let site = Location::caller();
        let returned = unsafe { (Self::fns().reference)(self.raw.as_ptr()) };
        debug_assert_eq!(
            returned,
            self.raw.as_ptr(),
            "native reference() must hand back the same object"
        );
        registry::track(self.raw.as_ptr() as usize, K::NAME, site);
        Self { raw: self.raw, _kind: PhantomData }
    }

    /// Release this owner's reference. Equivalent to dropping the wrapper;
    /// the handle is unreachable afterwards by construction.
    pub fn destroy(self) {
        drop(self);
    }

    /// Read the cached error state. Never mutates, never fails.
    pub fn status(&self) -> Status {
        Status::from_raw(unsafe { (Self::fns().status)(self.raw.as_ptr()) })
    }

    /// Sever ties to external resources. Idempotent. Afterwards, operations
    /// needing drawing capability fail with [`Error::Finished`]; lifecycle
    /// and metadata operations keep working.
    pub fn finish(&self) {
        unsafe { (Self::fns().finish)(self.raw.as_ptr()) }
    }

    /// The native library's own reference count for the underlying object.
    pub fn reference_count(&self) -> usize {
        unsafe { (Self::fns().reference_count)(self.raw.as_ptr()) as usize }
    }

    /// The raw handle, borrowed. The caller must not destroy it.
    pub fn raw(&self) -> *mut c_void {
        self.raw.as_ptr()
    }

    /// Hand this owner's reference over to raw code. The unit leaves the
    /// registry; the receiver is responsible for the matching destroy.
    pub fn into_raw(self) -> *mut c_void {
        let raw = self.raw.as_ptr();
        registry::untrack(raw as usize, K::NAME);
        std::mem::forget(self);
        raw
    }

    /// Adopt one reference from raw code.
    ///
    /// # Safety
    ///
    /// `raw` must be a live handle of kind `K`, and the caller must own one
    /// reference to it that nothing else will release.
    #[track_caller]
    pub unsafe fn from_raw(raw: *mut c_void) -> Self {
        let site = Location::caller();
        let raw = NonNull::new(raw).expect("from_raw called with a NULL handle");
        registry::track(raw.as_ptr() as usize, K::NAME, site);
        Self { raw, _kind: PhantomData }
    }

    /// Attach `value` under `key`, last-write-wins. The previous value under
    /// the same key is dropped exactly once, either here or when the object
    /// is destroyed.
    pub fn set_user_data<T: 'static>(
        &self,
        key: &'static UserDataKey<T>,
        value: Rc<T>,
    ) -> Result<(), Error> {
        let data = Box::into_raw(Box::new(value)) as *mut c_void;
        let status = unsafe {
            (Self::fns().set_user_data)(
                self.raw.as_ptr(),
                key.addr(),
                data,
                Some(drop_user_data::<T>),
            )
        };
        match Status::from_raw(status) {
            Status::Success => Ok(()),
            status => {
                // the native side refused the slot, so the payload is still ours
                unsafe { drop_user_data::<T>(data) };
                Err(Error::UserData(status))
            }
        }
    }

    /// The value stored under `key`, if any.
    pub fn user_data<T: 'static>(&self, key: &'static UserDataKey<T>) -> Option<Rc<T>> {
        let data = unsafe { (Self::fns().get_user_data)(self.raw.as_ptr(), key.addr()) };
        if data.is_null() {
            return None;
        }
        let stored = unsafe { &*(data as *const Rc<T>) };
        Some(Rc::clone(stored))
    }
}

impl<K: ResourceKind> Clone for Resource<K> {
    fn clone(&self) -> Self {
        self.reference()
    }
}

impl<K: ResourceKind> Drop for Resource<K> {
    fn drop(&mut self) {
        let raw = self.raw.as_ptr();
        // read before the decrement; the handle is off limits afterwards
        let last = self.reference_count() == 1;
        registry::untrack(raw as usize, K::NAME);
        if last {
            registry::assert_released(raw as usize, K::NAME);
        }
        unsafe { (Self::fns().destroy)(raw) };
    }
}

impl<K: ResourceKind> fmt::Debug for Resource<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::NAME)
            .field("raw", &self.raw.as_ptr())
            .field("status", &self.status())
            .finish()
    }
}
