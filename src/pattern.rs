// src/pattern.rs
//! Paint sources. Only the solid-color constructor is exposed; gradients and
//! surface patterns stay inside the native drawing model.

use crate::errors::Error;
use crate::resource::{Resource, ResourceKind};
use crate::sys;

pub enum PatternKind {}

impl ResourceKind for PatternKind {
    const NAME: &'static str = "pattern";

    fn object_fns(vtable: &'static sys::NativeVtable) -> &'static sys::NativeObjectFns {
        &vtable.pattern.object
    }
}

pub type Pattern = Resource<PatternKind>;

impl Pattern {
    /// A translucent solid-color source. Channels are unpremultiplied, in
    /// the 0.0 to 1.0 range; the native library clamps out-of-range values.
    #[track_caller]
    pub fn solid_rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Result<Pattern, Error> {
        let raw = unsafe { (sys::vtable().pattern.create_rgba)(red, green, blue, alpha) };
        Self::from_raw_created(raw.cast())
    }
}
