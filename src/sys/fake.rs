//! In-process stand-in for the native library, used by the unit tests.
//!
//! Implements the full vtable contract: reference counting, cached statuses,
//! finish semantics, user-data and mime-data slots with destroy
//! notification, mapped images, and real PNG output. No drawing happens;
//! surfaces stay zero-filled.

use std::cell::Cell;
use std::ffi::CStr;
use std::os::raw::{c_char, c_double, c_int, c_uint, c_ulong, c_void};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{
    DestroyNotify, NativeContextFns, NativeFontFns, NativeObjectFns, NativePatternFns,
    NativeSurfaceFns, NativeVtable, RawContext, RawFontFace, RawImage, RawPattern, RawStatus,
    RawSurface,
};
use crate::status::raw as status;

/// Install the fake vtable. Idempotent so every test can call it first.
pub(crate) fn install() {
    let _ = super::install(&FAKE_VTABLE);
}

thread_local! {
    static FAIL_NEXT_ALLOC: Cell<bool> = const { Cell::new(false) };
    static LAST_CREATED: Cell<usize> = const { Cell::new(0) };
}

/// Make the next user-data or mime-data store on this thread report
/// `NoMemory`.
pub(crate) fn fail_next_alloc() {
    FAIL_NEXT_ALLOC.with(|flag| flag.set(true));
}

fn take_fail_next_alloc() -> bool {
    FAIL_NEXT_ALLOC.with(|flag| flag.replace(false))
}

/// Address of the most recent object allocated on this thread. Lets tests
/// assert that a rejected constructor left nothing tracked.
pub(crate) fn last_created() -> usize {
    LAST_CREATED.with(|last| last.get())
}

struct UserSlot {
    key: usize,
    data: *mut c_void,
    notify: Option<DestroyNotify>,
}

struct MimeEntry {
    mime: String,
    data: *const u8,
    len: c_ulong,
    notify: Option<DestroyNotify>,
    closure: *mut c_void,
}

struct SurfaceState {
    width: c_int,
    height: c_int,
    mime: Mutex<Vec<MimeEntry>>,
}

impl SurfaceState {
    fn new(width: c_int, height: c_int) -> Self {
        Self { width, height, mime: Mutex::new(Vec::new()) }
    }
}

struct FakeObject {
    refcount: AtomicUsize,
    status: AtomicI32,
    finished: AtomicBool,
    user_data: Mutex<Vec<UserSlot>>,
    surface: Option<SurfaceState>,
    /// Surface a context keeps referenced for its lifetime.
    target: Option<*mut c_void>,
}

fn new_object(
    code: RawStatus,
    surface: Option<SurfaceState>,
    target: Option<*mut c_void>,
) -> *mut FakeObject {
    let object = Box::into_raw(Box::new(FakeObject {
        refcount: AtomicUsize::new(1),
        status: AtomicI32::new(code),
        finished: AtomicBool::new(false),
        user_data: Mutex::new(Vec::new()),
        surface,
        target,
    }));
    LAST_CREATED.with(|last| last.set(object as usize));
    object
}

unsafe fn object<'a>(p: *mut c_void) -> &'a FakeObject {
    &*(p as *mut FakeObject)
}

unsafe extern "C" fn object_reference(p: *mut c_void) -> *mut c_void {
    object(p).refcount.fetch_add(1, Ordering::AcqRel);
    p
}

unsafe extern "C" fn object_destroy(p: *mut c_void) {
    if object(p).refcount.fetch_sub(1, Ordering::AcqRel) == 1 {
        free_object(p as *mut FakeObject);
    }
}

unsafe fn free_object(p: *mut FakeObject) {
    let FakeObject { user_data, surface, target, .. } = *Box::from_raw(p);

    for slot in user_data.into_inner().unwrap() {
        if let Some(notify) = slot.notify {
            notify(slot.data);
        }
    }
    if let Some(state) = surface {
        for entry in state.mime.into_inner().unwrap() {
            if let Some(notify) = entry.notify {
                notify(entry.closure);
            }
        }
    }
    if let Some(target) = target {
        object_destroy(target);
    }
}

unsafe extern "C" fn object_status(p: *mut c_void) -> RawStatus {
    object(p).status.load(Ordering::Acquire)
}

unsafe extern "C" fn object_finish(p: *mut c_void) {
    object(p).finished.store(true, Ordering::Release);
}

unsafe extern "C" fn object_reference_count(p: *mut c_void) -> c_uint {
    object(p).refcount.load(Ordering::Acquire) as c_uint
}

unsafe extern "C" fn object_set_user_data(
    p: *mut c_void,
    key: *const c_void,
    data: *mut c_void,
    notify: Option<DestroyNotify>,
) -> RawStatus {
    if take_fail_next_alloc() {
        return status::NO_MEMORY;
    }
    let mut slots = object(p).user_data.lock().unwrap();
    if let Some(existing) = slots.iter().position(|slot| slot.key == key as usize) {
        let old = slots.remove(existing);
        if let Some(notify) = old.notify {
            notify(old.data);
        }
    }
    if !data.is_null() {
        slots.push(UserSlot { key: key as usize, data, notify });
    }
    status::SUCCESS
}

unsafe extern "C" fn object_get_user_data(p: *mut c_void, key: *const c_void) -> *mut c_void {
    let slots = object(p).user_data.lock().unwrap();
    slots
        .iter()
        .find(|slot| slot.key == key as usize)
        .map_or(std::ptr::null_mut(), |slot| slot.data)
}

const OBJECT_FNS: NativeObjectFns = NativeObjectFns {
    reference: object_reference,
    destroy: object_destroy,
    status: object_status,
    finish: object_finish,
    reference_count: object_reference_count,
    set_user_data: object_set_user_data,
    get_user_data: object_get_user_data,
};

fn size_status(width: c_int, height: c_int) -> RawStatus {
    if width <= 0 || height <= 0 {
        status::INVALID_SIZE
    } else {
        status::SUCCESS
    }
}

fn content_status(content: c_int) -> RawStatus {
    if (0..=2).contains(&content) {
        status::SUCCESS
    } else {
        status::INVALID_CONTENT
    }
}

unsafe extern "C" fn surface_create(
    content: c_int,
    width: c_int,
    height: c_int,
) -> *mut RawSurface {
    let mut code = content_status(content);
    if code == status::SUCCESS {
        code = size_status(width, height);
    }
    new_object(code, Some(SurfaceState::new(width, height)), None) as *mut RawSurface
}

unsafe extern "C" fn surface_create_similar(
    other: *mut RawSurface,
    content: c_int,
    width: c_int,
    height: c_int,
) -> *mut RawSurface {
    let parent = object(other as *mut c_void);
    let mut code = parent.status.load(Ordering::Acquire);
    if parent.finished.load(Ordering::Acquire) {
        code = status::FINISHED;
    }
    if code == status::SUCCESS {
        code = content_status(content);
    }
    if code == status::SUCCESS {
        code = size_status(width, height);
    }
    new_object(code, Some(SurfaceState::new(width, height)), None) as *mut RawSurface
}

unsafe extern "C" fn surface_create_for_rectangle(
    parent: *mut RawSurface,
    _x: c_double,
    _y: c_double,
    width: c_double,
    height: c_double,
) -> *mut RawSurface {
    let parent = object(parent as *mut c_void);
    let code = if parent.finished.load(Ordering::Acquire) {
        status::FINISHED
    } else if width <= 0.0 || height <= 0.0 {
        status::INVALID_SIZE
    } else {
        status::SUCCESS
    };
    new_object(
        code,
        Some(SurfaceState::new(width as c_int, height as c_int)),
        None,
    ) as *mut RawSurface
}

unsafe extern "C" fn surface_write_to_png(s: *mut RawSurface, path: *const c_char) -> RawStatus {
    let surface = object(s as *mut c_void);
    if surface.finished.load(Ordering::Acquire) {
        return status::FINISHED;
    }
    let Some(state) = &surface.surface else {
        return status::NULL_POINTER;
    };
    if path.is_null() {
        return status::NULL_POINTER;
    }
    let Ok(path) = CStr::from_ptr(path).to_str() else {
        return status::INVALID_STRING;
    };
    let Ok(file) = std::fs::File::create(path) else {
        return status::WRITE_ERROR;
    };

    let mut encoder = png::Encoder::new(
        std::io::BufWriter::new(file),
        state.width as u32,
        state.height as u32,
    );
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let Ok(mut writer) = encoder.write_header() else {
        return status::WRITE_ERROR;
    };
    let pixels = vec![0u8; state.width as usize * state.height as usize * 4];
    if writer.write_image_data(&pixels).is_err() || writer.finish().is_err() {
        return status::WRITE_ERROR;
    }
    status::SUCCESS
}

unsafe extern "C" fn surface_set_mime_data(
    s: *mut RawSurface,
    mime: *const c_char,
    data: *const u8,
    len: c_ulong,
    notify: Option<DestroyNotify>,
    closure: *mut c_void,
) -> RawStatus {
    if take_fail_next_alloc() {
        return status::NO_MEMORY;
    }
    let surface = object(s as *mut c_void);
    let Some(state) = &surface.surface else {
        return status::NULL_POINTER;
    };
    let Ok(mime) = CStr::from_ptr(mime).to_str() else {
        return status::INVALID_STRING;
    };

    let mut entries = state.mime.lock().unwrap();
    if let Some(existing) = entries.iter().position(|entry| entry.mime == mime) {
        let old = entries.remove(existing);
        if let Some(notify) = old.notify {
            notify(old.closure);
        }
    }
    if !data.is_null() {
        entries.push(MimeEntry { mime: mime.to_owned(), data, len, notify, closure });
    }
    status::SUCCESS
}

unsafe extern "C" fn surface_get_mime_data(
    s: *mut RawSurface,
    mime: *const c_char,
    out_data: *mut *const u8,
    out_len: *mut c_ulong,
) {
    *out_data = std::ptr::null();
    *out_len = 0;
    let surface = object(s as *mut c_void);
    let Some(state) = &surface.surface else {
        return;
    };
    let Ok(mime) = CStr::from_ptr(mime).to_str() else {
        return;
    };
    let entries = state.mime.lock().unwrap();
    if let Some(entry) = entries.iter().find(|entry| entry.mime == mime) {
        *out_data = entry.data;
        *out_len = entry.len;
    }
}

struct FakeImage {
    status: RawStatus,
    width: c_int,
    height: c_int,
    stride: c_int,
    pixels: Vec<u8>,
}

unsafe extern "C" fn surface_map_to_image(s: *mut RawSurface) -> *mut RawImage {
    let surface = object(s as *mut c_void);
    let (code, width, height) = match &surface.surface {
        Some(_) if surface.finished.load(Ordering::Acquire) => (status::FINISHED, 0, 0),
        Some(state) => (surface.status.load(Ordering::Acquire), state.width, state.height),
        None => (status::NULL_POINTER, 0, 0),
    };
    let stride = width * 4;
    let image = Box::into_raw(Box::new(FakeImage {
        status: code,
        width,
        height,
        stride,
        pixels: vec![0u8; height as usize * stride as usize],
    }));
    LAST_CREATED.with(|last| last.set(image as usize));
    image as *mut RawImage
}

unsafe extern "C" fn surface_unmap_image(_s: *mut RawSurface, image: *mut RawImage) {
    drop(Box::from_raw(image as *mut FakeImage));
}

unsafe extern "C" fn image_status(image: *mut RawImage) -> RawStatus {
    (*(image as *mut FakeImage)).status
}

unsafe extern "C" fn image_width(image: *mut RawImage) -> c_int {
    (*(image as *mut FakeImage)).width
}

unsafe extern "C" fn image_height(image: *mut RawImage) -> c_int {
    (*(image as *mut FakeImage)).height
}

unsafe extern "C" fn image_stride(image: *mut RawImage) -> c_int {
    (*(image as *mut FakeImage)).stride
}

unsafe extern "C" fn image_data(image: *mut RawImage) -> *const u8 {
    (*(image as *mut FakeImage)).pixels.as_ptr()
}

unsafe extern "C" fn font_create_toy(
    family: *const c_char,
    _slant: c_int,
    _weight: c_int,
) -> *mut RawFontFace {
    let code = if family.is_null() {
        status::NULL_POINTER
    } else if CStr::from_ptr(family).to_str().is_err() {
        status::INVALID_STRING
    } else {
        status::SUCCESS
    };
    new_object(code, None, None) as *mut RawFontFace
}

unsafe extern "C" fn pattern_create_rgba(
    _red: c_double,
    _green: c_double,
    _blue: c_double,
    _alpha: c_double,
) -> *mut RawPattern {
    new_object(status::SUCCESS, None, None) as *mut RawPattern
}

unsafe extern "C" fn context_create(target: *mut RawSurface) -> *mut RawContext {
    let surface = object(target as *mut c_void);
    let code = if surface.finished.load(Ordering::Acquire) {
        status::FINISHED
    } else {
        surface.status.load(Ordering::Acquire)
    };
    if code != status::SUCCESS {
        return new_object(code, None, None) as *mut RawContext;
    }

    object_reference(target as *mut c_void);
    new_object(status::SUCCESS, None, Some(target as *mut c_void)) as *mut RawContext
}

pub(crate) static FAKE_VTABLE: NativeVtable = NativeVtable {
    surface: NativeSurfaceFns {
        object: OBJECT_FNS,
        create: surface_create,
        create_similar: surface_create_similar,
        create_for_rectangle: surface_create_for_rectangle,
        write_to_png: surface_write_to_png,
        set_mime_data: surface_set_mime_data,
        get_mime_data: surface_get_mime_data,
        map_to_image: surface_map_to_image,
        unmap_image: surface_unmap_image,
        image_status,
        image_width,
        image_height,
        image_stride,
        image_data,
    },
    font: NativeFontFns { object: OBJECT_FNS, create_toy: font_create_toy },
    pattern: NativePatternFns { object: OBJECT_FNS, create_rgba: pattern_create_rgba },
    context: NativeContextFns { object: OBJECT_FNS, create: context_create },
};
