// src/font.rs
//! Font faces. Shaping and metrics live in the native library; this side
//! only manages the handle lifecycle.

use std::ffi::CString;

use crate::errors::Error;
use crate::resource::{Resource, ResourceKind};
use crate::sys;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slant {
    Normal,
    Italic,
    Oblique,
}

impl Slant {
    pub(crate) fn to_raw(self) -> i32 {
        match self {
            Slant::Normal => 0,
            Slant::Italic => 1,
            Slant::Oblique => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Normal,
    Bold,
}

impl Weight {
    pub(crate) fn to_raw(self) -> i32 {
        match self {
            Weight::Normal => 0,
            Weight::Bold => 1,
        }
    }
}

pub enum FontFaceKind {}

impl ResourceKind for FontFaceKind {
    const NAME: &'static str = "font_face";

    fn object_fns(vtable: &'static sys::NativeVtable) -> &'static sys::NativeObjectFns {
        &vtable.font.object
    }
}

pub type FontFace = Resource<FontFaceKind>;

impl FontFace {
    /// Create a font face from a family name and simple style selectors,
    /// resolved by the native library's font fallback.
    #[track_caller]
    pub fn toy(family: &str, slant: Slant, weight: Weight) -> Result<FontFace, Error> {
        let family = CString::new(family)?;
        let raw = unsafe {
            (sys::vtable().font.create_toy)(family.as_ptr(), slant.to_raw(), weight.to_raw())
        };
        Self::from_raw_created(raw.cast())
    }
}
