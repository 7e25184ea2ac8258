// src/context.rs
//! Drawing contexts. All drawing operations are native; the binding manages
//! creation against a target surface and the shared lifecycle.

use crate::errors::Error;
use crate::resource::{Resource, ResourceKind};
use crate::surface::Surface;
use crate::sys;

pub enum ContextKind {}

impl ResourceKind for ContextKind {
    const NAME: &'static str = "context";

    fn object_fns(vtable: &'static sys::NativeVtable) -> &'static sys::NativeObjectFns {
        &vtable.context.object
    }
}

pub type Context = Resource<ContextKind>;

impl Context {
    /// Create a context drawing onto `target`. The native library keeps its
    /// own reference on the target for as long as the context lives.
    #[track_caller]
    pub fn new(target: &Surface) -> Result<Context, Error> {
        let raw = unsafe { (sys::vtable().context.create)(target.raw().cast()) };
        Self::from_raw_created(raw.cast())
    }
}
