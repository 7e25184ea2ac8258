//! Declarations of the real native entry points, and a vtable wired to them.
//!
//! Only compiled with the `link_native` feature; the build then needs the
//! native library on the linker path. The lifecycle entry points are typed
//! per kind on the C side, so small shims erase them to the `void*` shape of
//! [`NativeObjectFns`](super::NativeObjectFns).

use std::os::raw::{c_char, c_double, c_int, c_uint, c_ulong, c_void};

use super::{
    DestroyNotify, NativeContextFns, NativeFontFns, NativeObjectFns, NativePatternFns,
    NativeSurfaceFns, NativeVtable, RawContext, RawFontFace, RawImage, RawPattern, RawStatus,
    RawSurface,
};

#[link(name = "slate")]
extern "C" {
    fn slate_surface_reference(surface: *mut RawSurface) -> *mut RawSurface;
    fn slate_surface_destroy(surface: *mut RawSurface);
    fn slate_surface_status(surface: *mut RawSurface) -> RawStatus;
    fn slate_surface_finish(surface: *mut RawSurface);
    fn slate_surface_get_reference_count(surface: *mut RawSurface) -> c_uint;
    fn slate_surface_set_user_data(
        surface: *mut RawSurface,
        key: *const c_void,
        data: *mut c_void,
        notify: Option<DestroyNotify>,
    ) -> RawStatus;
    fn slate_surface_get_user_data(surface: *mut RawSurface, key: *const c_void) -> *mut c_void;

    fn slate_surface_create(content: c_int, width: c_int, height: c_int) -> *mut RawSurface;
    fn slate_surface_create_similar(
        other: *mut RawSurface,
        content: c_int,
        width: c_int,
        height: c_int,
    ) -> *mut RawSurface;
    fn slate_surface_create_for_rectangle(
        parent: *mut RawSurface,
        x: c_double,
        y: c_double,
        width: c_double,
        height: c_double,
    ) -> *mut RawSurface;
    fn slate_surface_write_to_png(surface: *mut RawSurface, path: *const c_char) -> RawStatus;
    fn slate_surface_set_mime_data(
        surface: *mut RawSurface,
        mime_type: *const c_char,
        data: *const u8,
        length: c_ulong,
        notify: Option<DestroyNotify>,
        closure: *mut c_void,
    ) -> RawStatus;
    fn slate_surface_get_mime_data(
        surface: *mut RawSurface,
        mime_type: *const c_char,
        data: *mut *const u8,
        length: *mut c_ulong,
    );
    fn slate_surface_map_to_image(surface: *mut RawSurface) -> *mut RawImage;
    fn slate_surface_unmap_image(surface: *mut RawSurface, image: *mut RawImage);
    fn slate_image_status(image: *mut RawImage) -> RawStatus;
    fn slate_image_get_width(image: *mut RawImage) -> c_int;
    fn slate_image_get_height(image: *mut RawImage) -> c_int;
    fn slate_image_get_stride(image: *mut RawImage) -> c_int;
    fn slate_image_get_data(image: *mut RawImage) -> *const u8;

    fn slate_font_face_reference(face: *mut RawFontFace) -> *mut RawFontFace;
    fn slate_font_face_destroy(face: *mut RawFontFace);
    fn slate_font_face_status(face: *mut RawFontFace) -> RawStatus;
    fn slate_font_face_finish(face: *mut RawFontFace);
    fn slate_font_face_get_reference_count(face: *mut RawFontFace) -> c_uint;
    fn slate_font_face_set_user_data(
        face: *mut RawFontFace,
        key: *const c_void,
        data: *mut c_void,
        notify: Option<DestroyNotify>,
    ) -> RawStatus;
    fn slate_font_face_get_user_data(face: *mut RawFontFace, key: *const c_void) -> *mut c_void;
    fn slate_toy_font_face_create(
        family: *const c_char,
        slant: c_int,
        weight: c_int,
    ) -> *mut RawFontFace;

    fn slate_pattern_reference(pattern: *mut RawPattern) -> *mut RawPattern;
    fn slate_pattern_destroy(pattern: *mut RawPattern);
    fn slate_pattern_status(pattern: *mut RawPattern) -> RawStatus;
    fn slate_pattern_finish(pattern: *mut RawPattern);
    fn slate_pattern_get_reference_count(pattern: *mut RawPattern) -> c_uint;
    fn slate_pattern_set_user_data(
        pattern: *mut RawPattern,
        key: *const c_void,
        data: *mut c_void,
        notify: Option<DestroyNotify>,
    ) -> RawStatus;
    fn slate_pattern_get_user_data(pattern: *mut RawPattern, key: *const c_void) -> *mut c_void;
    fn slate_pattern_create_rgba(
        red: c_double,
        green: c_double,
        blue: c_double,
        alpha: c_double,
    ) -> *mut RawPattern;

    fn slate_context_reference(context: *mut RawContext) -> *mut RawContext;
    fn slate_context_destroy(context: *mut RawContext);
    fn slate_context_status(context: *mut RawContext) -> RawStatus;
    fn slate_context_finish(context: *mut RawContext);
    fn slate_context_get_reference_count(context: *mut RawContext) -> c_uint;
    fn slate_context_set_user_data(
        context: *mut RawContext,
        key: *const c_void,
        data: *mut c_void,
        notify: Option<DestroyNotify>,
    ) -> RawStatus;
    fn slate_context_get_user_data(context: *mut RawContext, key: *const c_void) -> *mut c_void;
    fn slate_context_create(target: *mut RawSurface) -> *mut RawContext;
}

macro_rules! object_shims {
    ($name:ident, $raw:ty, $reference:ident, $destroy:ident, $status:ident, $finish:ident,
     $count:ident, $set_user_data:ident, $get_user_data:ident) => {
        mod $name {
            use super::*;

            pub unsafe extern "C" fn reference(p: *mut c_void) -> *mut c_void {
                $reference(p.cast::<$raw>()).cast()
            }
            pub unsafe extern "C" fn destroy(p: *mut c_void) {
                $destroy(p.cast::<$raw>())
            }
            pub unsafe extern "C" fn status(p: *mut c_void) -> RawStatus {
                $status(p.cast::<$raw>())
            }
            pub unsafe extern "C" fn finish(p: *mut c_void) {
                $finish(p.cast::<$raw>())
            }
            pub unsafe extern "C" fn reference_count(p: *mut c_void) -> c_uint {
                $count(p.cast::<$raw>())
            }
            pub unsafe extern "C" fn set_user_data(
                p: *mut c_void,
                key: *const c_void,
                data: *mut c_void,
                notify: Option<DestroyNotify>,
            ) -> RawStatus {
                $set_user_data(p.cast::<$raw>(), key, data, notify)
            }
            pub unsafe extern "C" fn get_user_data(
                p: *mut c_void,
                key: *const c_void,
            ) -> *mut c_void {
                $get_user_data(p.cast::<$raw>(), key)
            }

            pub const FNS: NativeObjectFns = NativeObjectFns {
                reference,
                destroy,
                status,
                finish,
                reference_count,
                set_user_data,
                get_user_data,
            };
        }
    };
}

object_shims!(
    surface_object,
    RawSurface,
    slate_surface_reference,
    slate_surface_destroy,
    slate_surface_status,
    slate_surface_finish,
    slate_surface_get_reference_count,
    slate_surface_set_user_data,
    slate_surface_get_user_data
);
object_shims!(
    font_object,
    RawFontFace,
    slate_font_face_reference,
    slate_font_face_destroy,
    slate_font_face_status,
    slate_font_face_finish,
    slate_font_face_get_reference_count,
    slate_font_face_set_user_data,
    slate_font_face_get_user_data
);
object_shims!(
    pattern_object,
    RawPattern,
    slate_pattern_reference,
    slate_pattern_destroy,
    slate_pattern_status,
    slate_pattern_finish,
    slate_pattern_get_reference_count,
    slate_pattern_set_user_data,
    slate_pattern_get_user_data
);
object_shims!(
    context_object,
    RawContext,
    slate_context_reference,
    slate_context_destroy,
    slate_context_status,
    slate_context_finish,
    slate_context_get_reference_count,
    slate_context_set_user_data,
    slate_context_get_user_data
);

static LINKED: NativeVtable = NativeVtable {
    surface: NativeSurfaceFns {
        object: surface_object::FNS,
        create: slate_surface_create,
        create_similar: slate_surface_create_similar,
        create_for_rectangle: slate_surface_create_for_rectangle,
        write_to_png: slate_surface_write_to_png,
        set_mime_data: slate_surface_set_mime_data,
        get_mime_data: slate_surface_get_mime_data,
        map_to_image: slate_surface_map_to_image,
        unmap_image: slate_surface_unmap_image,
        image_status: slate_image_status,
        image_width: slate_image_get_width,
        image_height: slate_image_get_height,
        image_stride: slate_image_get_stride,
        image_data: slate_image_get_data,
    },
    font: NativeFontFns { object: font_object::FNS, create_toy: slate_toy_font_face_create },
    pattern: NativePatternFns {
        object: pattern_object::FNS,
        create_rgba: slate_pattern_create_rgba,
    },
    context: NativeContextFns { object: context_object::FNS, create: slate_context_create },
};

/// The linked library's entry points, ready for [`install`](super::install).
pub fn native_vtable() -> &'static NativeVtable {
    &LINKED
}
