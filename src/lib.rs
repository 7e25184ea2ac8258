//! Safe reference-counted bindings for the Slate native 2D vector graphics
//! library. Rendering happens on the native side; this crate wraps the
//! opaque handles with the shared lifecycle contract and an opt-in registry
//! that catches leaks and double-destroys before they reach native code.

pub mod context;
pub mod errors;
pub mod font;
pub mod pattern;
pub mod registry;
pub mod resource;
pub mod status;
pub mod surface;
pub mod sys;

pub use context::Context;
pub use errors::Error;
pub use font::{FontFace, Slant, Weight};
pub use pattern::Pattern;
pub use resource::{Resource, ResourceKind, UserDataKey};
pub use status::Status;
pub use surface::{mime, Content, MappedImage, Surface};
