// src/surface.rs
//! Surfaces: the drawable resource kind, plus the mapped-image view.

use std::ffi::CString;
use std::os::raw::{c_ulong, c_void};
use std::panic::Location;
use std::path::Path;
use std::ptr::NonNull;

use crate::errors::Error;
use crate::registry;
use crate::resource::{Resource, ResourceKind};
use crate::status::Status;
use crate::sys::{self, NativeSurfaceFns, RawImage, RawSurface};

/// Mime tags the native library recognizes for embedded data. Passed through
/// verbatim; unknown tags are stored but ignored by the encoders.
pub mod mime {
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const SVG: &str = "image/svg+xml";
}

/// What a surface stores per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    Color,
    Alpha,
    ColorAlpha,
}

impl Content {
    pub(crate) fn to_raw(self) -> i32 {
        match self {
            Content::Color => 0,
            Content::Alpha => 1,
            Content::ColorAlpha => 2,
        }
    }
}

pub enum SurfaceKind {}

impl ResourceKind for SurfaceKind {
    const NAME: &'static str = "surface";

    fn object_fns(vtable: &'static sys::NativeVtable) -> &'static sys::NativeObjectFns {
        &vtable.surface.object
    }
}

pub type Surface = Resource<SurfaceKind>;

const IMAGE_KIND: &str = "mapped image";

impl Surface {
    fn surface_fns() -> &'static NativeSurfaceFns {
        &sys::vtable().surface
    }

    fn raw_surface(&self) -> *mut RawSurface {
        self.raw().cast()
    }

    /// Create a surface of the given content and pixel size.
    #[track_caller]
    pub fn create(content: Content, width: i32, height: i32) -> Result<Surface, Error> {
        let raw = unsafe { (Self::surface_fns().create)(content.to_raw(), width, height) };
        Self::from_raw_created(raw.cast())
    }

    /// Create a surface as compatible as possible with this one.
    #[track_caller]
    pub fn create_similar(&self, content: Content, width: i32, height: i32) -> Result<Surface, Error> {
        let raw = unsafe {
            (Self::surface_fns().create_similar)(self.raw_surface(), content.to_raw(), width, height)
        };
        Self::from_raw_created(raw.cast())
    }

    /// Create a surface backed by a rectangular region of this one. The
    /// region must have positive area.
    #[track_caller]
    pub fn create_for_rectangle(&self, x: f64, y: f64, width: f64, height: f64) -> Result<Surface, Error> {
        let raw = unsafe {
            (Self::surface_fns().create_for_rectangle)(self.raw_surface(), x, y, width, height)
        };
        Self::from_raw_created(raw.cast())
    }

    /// Write the surface contents to a PNG file. Synchronous; blocks until
    /// the file is written.
    pub fn write_to_png<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = CString::new(path.as_ref().to_string_lossy().into_owned())?;
        let status =
            unsafe { (Self::surface_fns().write_to_png)(self.raw_surface(), path.as_ptr()) };
        match Status::from_raw(status) {
            Status::Success => Ok(()),
            Status::Finished => Err(Error::Finished),
            status => Err(Error::Write(status)),
        }
    }

    /// Attach encoded image data under a mime tag, last-write-wins per tag.
    pub fn set_mime_data(&self, mime_type: &str, data: Vec<u8>) -> Result<(), Error> {
        self.set_mime_data_with(mime_type, data, || {})
    }

    /// Like [`set_mime_data`](Surface::set_mime_data), with a hook that runs
    /// exactly once when the payload is released again: on overwrite of the
    /// same tag, on destroy of the surface, or on a failed store.
    pub fn set_mime_data_with(
        &self,
        mime_type: &str,
        data: Vec<u8>,
        on_release: impl FnOnce() + 'static,
    ) -> Result<(), Error> {
        let mime_type = CString::new(mime_type)?;
        let slot = Box::new(MimeSlot {
            data: data.into_boxed_slice(),
            on_release: Some(Box::new(on_release)),
        });
        let data_ptr = slot.data.as_ptr();
        let data_len = slot.data.len() as c_ulong;
        let closure = Box::into_raw(slot) as *mut c_void;

        let status = unsafe {
            (Self::surface_fns().set_mime_data)(
                self.raw_surface(),
                mime_type.as_ptr(),
                data_ptr,
                data_len,
                Some(release_mime_slot),
                closure,
            )
        };
        match Status::from_raw(status) {
            Status::Success => Ok(()),
            status => {
                unsafe { release_mime_slot(closure) };
                Err(Error::MimeData(status))
            }
        }
    }

    /// The payload stored under a mime tag, if any.
    pub fn mime_data(&self, mime_type: &str) -> Option<Vec<u8>> {
        let mime_type = CString::new(mime_type).ok()?;
        let mut data: *const u8 = std::ptr::null();
        let mut len: c_ulong = 0;
        unsafe {
            (Self::surface_fns().get_mime_data)(
                self.raw_surface(),
                mime_type.as_ptr(),
                &mut data,
                &mut len,
            );
        }
        if data.is_null() {
            return None;
        }
        Some(unsafe { std::slice::from_raw_parts(data, len as usize) }.to_vec())
    }

    /// Map the surface for direct pixel access.
    ///
    /// The returned [`MappedImage`] borrows the surface and is released
    /// through unmap only; it has no destroy of its own.
    #[track_caller]
    pub fn map_to_image(&self) -> Result<MappedImage<'_>, Error> {
        let site = Location::caller();
        let fns = Self::surface_fns();
        let raw = unsafe { (fns.map_to_image)(self.raw_surface()) };
        let raw = NonNull::new(raw).expect("native map_to_image returned NULL");

        let status = Status::from_raw(unsafe { (fns.image_status)(raw.as_ptr()) });
        if !status.is_success() {
            unsafe { (fns.unmap_image)(self.raw_surface(), raw.as_ptr()) };
            return Err(match status {
                Status::Finished => Error::Finished,
                status => Error::Construction(status),
            });
        }

        registry::track(raw.as_ptr() as usize, IMAGE_KIND, site);
        Ok(MappedImage { surface: self, raw })
    }
}

struct MimeSlot {
    data: Box<[u8]>,
    on_release: Option<Box<dyn FnOnce()>>,
}

unsafe extern "C" fn release_mime_slot(closure: *mut c_void) {
    let slot = Box::from_raw(closure as *mut MimeSlot);
    if let Some(hook) = slot.on_release {
        hook();
    }
}

/// Direct pixel view of a mapped surface.
///
/// Deliberately not a [`Resource`]: the generic reference/destroy contract
/// does not apply to mapped images, and this type cannot express it. The
/// mapping ends when the value is unmapped or dropped, and the borrow keeps
/// the parent surface alive until then.
#[derive(Debug)]
pub struct MappedImage<'a> {
    surface: &'a Surface,
    raw: NonNull<RawImage>,
}

impl MappedImage<'_> {
    pub fn width(&self) -> i32 {
        unsafe { (Surface::surface_fns().image_width)(self.raw.as_ptr()) }
    }

    pub fn height(&self) -> i32 {
        unsafe { (Surface::surface_fns().image_height)(self.raw.as_ptr()) }
    }

    /// Bytes per row, including padding.
    pub fn stride(&self) -> i32 {
        unsafe { (Surface::surface_fns().image_stride)(self.raw.as_ptr()) }
    }

    /// The mapped pixels, `height * stride` bytes.
    pub fn data(&self) -> &[u8] {
        let len = (self.height() as usize) * (self.stride() as usize);
        let data = unsafe { (Surface::surface_fns().image_data)(self.raw.as_ptr()) };
        unsafe { std::slice::from_raw_parts(data, len) }
    }

    pub fn raw(&self) -> *mut RawImage {
        self.raw.as_ptr()
    }

    /// End the mapping. Dropping the value does the same.
    pub fn unmap(self) {}
}

impl Drop for MappedImage<'_> {
    fn drop(&mut self) {
        registry::untrack(self.raw.as_ptr() as usize, IMAGE_KIND);
        unsafe {
            (Surface::surface_fns().unmap_image)(self.surface.raw_surface(), self.raw.as_ptr())
        };
    }
}
