//! Native library ABI: the fixed call contract this crate binds against.
//!
//! Everything behavior-bearing (rasterization, path filling, text shaping,
//! PNG encoding) lives on the other side of these signatures. The safe layer
//! above only does lifetime bookkeeping, so the contract is kept as a plain
//! `#[repr(C)]` dispatch table: one block of lifecycle entry points shared by
//! every resource kind, plus per-kind constructors and operations. The table
//! is installed once per process, either from the linked library (see
//! [`link`], behind the `link_native` feature) or by the embedder.

use std::os::raw::{c_char, c_double, c_int, c_uint, c_ulong, c_void};
use std::sync::OnceLock;

use anyhow::{bail, Result};

#[cfg(feature = "link_native")]
pub mod link;

#[cfg(test)]
pub(crate) mod fake;

/// Raw status code as the native library reports it. `0` is success.
pub type RawStatus = c_int;

#[repr(C)]
pub struct RawSurface {
    _private: [u8; 0],
}

#[repr(C)]
pub struct RawFontFace {
    _private: [u8; 0],
}

#[repr(C)]
pub struct RawPattern {
    _private: [u8; 0],
}

#[repr(C)]
pub struct RawContext {
    _private: [u8; 0],
}

/// Image view produced by mapping a surface; released through unmap only.
#[repr(C)]
pub struct RawImage {
    _private: [u8; 0],
}

/// Callback the native library invokes when it lets go of an attached
/// payload (user data or mime data).
pub type DestroyNotify = unsafe extern "C" fn(*mut c_void);

/// Lifecycle entry points every resource kind exposes. Handles are passed
/// type-erased; the per-kind tables below pair this block with the typed
/// constructors.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct NativeObjectFns {
    pub reference: unsafe extern "C" fn(*mut c_void) -> *mut c_void,
    pub destroy: unsafe extern "C" fn(*mut c_void),
    pub status: unsafe extern "C" fn(*mut c_void) -> RawStatus,
    pub finish: unsafe extern "C" fn(*mut c_void),
    pub reference_count: unsafe extern "C" fn(*mut c_void) -> c_uint,
    pub set_user_data: unsafe extern "C" fn(
        *mut c_void,
        *const c_void,
        *mut c_void,
        Option<DestroyNotify>,
    ) -> RawStatus,
    pub get_user_data: unsafe extern "C" fn(*mut c_void, *const c_void) -> *mut c_void,
}

#[repr(C)]
pub struct NativeSurfaceFns {
    pub object: NativeObjectFns,
    pub create: unsafe extern "C" fn(c_int, c_int, c_int) -> *mut RawSurface,
    pub create_similar: unsafe extern "C" fn(*mut RawSurface, c_int, c_int, c_int) -> *mut RawSurface,
    pub create_for_rectangle:
        unsafe extern "C" fn(*mut RawSurface, c_double, c_double, c_double, c_double) -> *mut RawSurface,
    pub write_to_png: unsafe extern "C" fn(*mut RawSurface, *const c_char) -> RawStatus,
    pub set_mime_data: unsafe extern "C" fn(
        *mut RawSurface,
        *const c_char,
        *const u8,
        c_ulong,
        Option<DestroyNotify>,
        *mut c_void,
    ) -> RawStatus,
    pub get_mime_data:
        unsafe extern "C" fn(*mut RawSurface, *const c_char, *mut *const u8, *mut c_ulong),
    pub map_to_image: unsafe extern "C" fn(*mut RawSurface) -> *mut RawImage,
    pub unmap_image: unsafe extern "C" fn(*mut RawSurface, *mut RawImage),
    pub image_status: unsafe extern "C" fn(*mut RawImage) -> RawStatus,
    pub image_width: unsafe extern "C" fn(*mut RawImage) -> c_int,
    pub image_height: unsafe extern "C" fn(*mut RawImage) -> c_int,
    pub image_stride: unsafe extern "C" fn(*mut RawImage) -> c_int,
    pub image_data: unsafe extern "C" fn(*mut RawImage) -> *const u8,
}

#[repr(C)]
pub struct NativeFontFns {
    pub object: NativeObjectFns,
    pub create_toy: unsafe extern "C" fn(*const c_char, c_int, c_int) -> *mut RawFontFace,
}

#[repr(C)]
pub struct NativePatternFns {
    pub object: NativeObjectFns,
    pub create_rgba: unsafe extern "C" fn(c_double, c_double, c_double, c_double) -> *mut RawPattern,
}

#[repr(C)]
pub struct NativeContextFns {
    pub object: NativeObjectFns,
    pub create: unsafe extern "C" fn(*mut RawSurface) -> *mut RawContext,
}

/// The complete native dispatch table.
#[repr(C)]
pub struct NativeVtable {
    pub surface: NativeSurfaceFns,
    pub font: NativeFontFns,
    pub pattern: NativePatternFns,
    pub context: NativeContextFns,
}

static VTABLE: OnceLock<&'static NativeVtable> = OnceLock::new();

/// Install the native entry points for this process. Must happen before any
/// resource is created; installing a second table is an error.
pub fn install(vtable: &'static NativeVtable) -> Result<()> {
    if VTABLE.set(vtable).is_err() {
        bail!("native vtable already installed");
    }
    log::debug!("native vtable installed");
    Ok(())
}

pub fn installed() -> bool {
    VTABLE.get().is_some()
}

pub(crate) fn vtable() -> &'static NativeVtable {
    VTABLE
        .get()
        .expect("native library not installed; call slate::sys::install first")
}
