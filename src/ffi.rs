//! C-compatible FFI API for cross-language bindings.
//!
//! # ABI Contract
//!
//! All exported functions use `extern "C"` calling convention and `#[no_mangle]`
//! to ensure stable symbol names.
//!
//! ## Input
//! - Resumes are passed as UTF-8 JSON bytes (`json_ptr`, `json_len`), not
//!   necessarily null-terminated.
//! - The company name is a null-terminated UTF-8 string.
//!
//! ## Memory management
//! - Buffers returned by `rf_*` functions are allocated on the Rust heap.
//! - Callers **must** free them with `rf_free_buffer` / `rf_free_string`.
//! - Passing a null pointer to a free function is a no-op.
//!
//! ## Error handling
//! - Functions that can fail return a `c_int`: `0` success, `1` null pointer,
//!   `2` invalid UTF-8, `3` invalid resume or layout JSON, `4` generation
//!   failure.
//! - Error details can be retrieved via `rf_last_error`.
//!
//! ## Thread safety
//! - The `rf_last_error` uses a thread-local, so it is safe to call from
//!   multiple threads.
//!
//! ## Usage from Go (cgo)
//! ```go
//! // #cgo LDFLAGS: -lresume_forge
//! // #include <stdint.h>
//! // extern int rf_generate_pdf(const uint8_t* json, uint32_t json_len,
//! //                            const char* company, const void* cfg,
//! //                            uint8_t** out_buf, uint32_t* out_len);
//! // extern void rf_free_buffer(uint8_t* buf, uint32_t len);
//! // extern const char* rf_last_error();
//! import "C"
//! ```

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::fonts::FontManager;
use crate::format::export_filename;
use crate::layout_config::LayoutConfig;
use crate::model::Resume;
use crate::pipeline::{
    compute_layout_config, generate_docx, generate_pdf, generate_plain_text,
    generate_preview_html, ExportConfig, PageOrientation,
};

const RC_NULL: c_int = 1;
const RC_UTF8: c_int = 2;
const RC_INPUT: c_int = 3;
const RC_GENERATE: c_int = 4;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = RefCell::new(None);
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

// ---------------------------------------------------------------------------
// C-compatible configuration types
// ---------------------------------------------------------------------------

/// Page orientation for use in [`RfExportConfig`].
#[repr(C)]
pub enum RfPageOrientation {
    /// Portrait mode: height > width (default).
    Portrait = 0,
    /// Landscape mode: width > height.
    Landscape = 1,
}

/// Output format selector for [`rf_export_filename`].
#[repr(C)]
pub enum RfExportFormat {
    Pdf = 0,
    Docx = 1,
    Text = 2,
    Html = 3,
}

/// Optional page geometry passed to the generation functions.
///
/// Fields set to `0` fall back to their A4 defaults:
/// - `page_width`  → 595.28 pt
/// - `page_height` → 841.89 pt
/// - `page_margin` → 40 pt
#[repr(C)]
pub struct RfExportConfig {
    /// Page width in points. Pass `0.0` to use the default (A4 = 595.28).
    pub page_width: f32,
    /// Page height in points. Pass `0.0` to use the default (A4 = 841.89).
    pub page_height: f32,
    /// Page margin in points. Pass `0.0` to use the default (40 pt).
    pub page_margin: f32,
    /// Page orientation (portrait = 0, landscape = 1).
    pub orientation: RfPageOrientation,
}

fn export_config_from_c(cfg: &RfExportConfig) -> ExportConfig {
    let defaults = ExportConfig::default();
    let or_default = |v: f32, d: f32| if v == 0.0 { d } else { v };

    ExportConfig {
        page_width: or_default(cfg.page_width, defaults.page_width),
        page_height: or_default(cfg.page_height, defaults.page_height),
        page_margin: or_default(cfg.page_margin, defaults.page_margin),
        orientation: match cfg.orientation {
            RfPageOrientation::Portrait => PageOrientation::Portrait,
            RfPageOrientation::Landscape => PageOrientation::Landscape,
        },
        ..defaults
    }
}

/// # Safety
/// `cfg`, if non-null, must point to a valid [`RfExportConfig`].
unsafe fn config_or_default(cfg: *const RfExportConfig) -> ExportConfig {
    if cfg.is_null() {
        ExportConfig::default()
    } else {
        export_config_from_c(&*cfg)
    }
}

// ---------------------------------------------------------------------------
// Argument decoding
// ---------------------------------------------------------------------------

/// # Safety
/// `json_ptr` must point to `json_len` readable bytes.
unsafe fn read_resume(json_ptr: *const u8, json_len: u32) -> Result<Resume, c_int> {
    let bytes = slice::from_raw_parts(json_ptr, json_len as usize);
    let json = std::str::from_utf8(bytes).map_err(|e| {
        set_last_error(&format!("Invalid UTF-8: {e}"));
        RC_UTF8
    })?;
    Resume::from_json(json).map_err(|e| {
        set_last_error(&e.to_string());
        RC_INPUT
    })
}

/// # Safety
/// `s` must be a valid null-terminated string.
unsafe fn read_cstr<'a>(s: *const c_char) -> Result<&'a str, c_int> {
    CStr::from_ptr(s).to_str().map_err(|e| {
        set_last_error(&format!("Invalid UTF-8: {e}"));
        RC_UTF8
    })
}

/// # Safety
/// `out_buf` and `out_len` must be valid for writes.
unsafe fn hand_out_buffer(bytes: Vec<u8>, out_buf: *mut *mut u8, out_len: *mut u32) {
    let len = bytes.len() as u32;
    let buf = bytes.into_boxed_slice();
    *out_buf = Box::into_raw(buf) as *mut u8;
    *out_len = len;
}

/// # Safety
/// `out` must be valid for writes.
unsafe fn hand_out_string(s: String, out: *mut *mut c_char) -> c_int {
    match CString::new(s) {
        Ok(cs) => {
            *out = cs.into_raw();
            0
        }
        Err(_) => {
            set_last_error("Output contained null byte");
            *out = ptr::null_mut();
            RC_GENERATE
        }
    }
}

macro_rules! try_rc {
    ($e:expr) => {
        match $e {
            Ok(v) => v,
            Err(rc) => return rc,
        }
    };
}

// ---------------------------------------------------------------------------
// Core API
// ---------------------------------------------------------------------------

/// Generate a PDF from a resume.
///
/// # Parameters
/// - `json_ptr`, `json_len`: UTF-8 resume JSON
/// - `company`: null-terminated company name, used for the document title
/// - `cfg`: optional pointer to an [`RfExportConfig`]; pass `NULL` for defaults
/// - `out_buf`, `out_len`: on success, the heap-allocated PDF bytes
///
/// # Returns
/// `0` on success, non-zero on error. On error, call `rf_last_error`.
///
/// # Safety
/// - `json_ptr` must point to `json_len` valid bytes.
/// - `company` must be a valid null-terminated string.
/// - `out_buf` and `out_len` must be valid pointers.
/// - The caller must free `*out_buf` by calling `rf_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn rf_generate_pdf(
    json_ptr: *const u8,
    json_len: u32,
    company: *const c_char,
    cfg: *const RfExportConfig,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || company.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return RC_NULL;
    }
    let resume = try_rc!(read_resume(json_ptr, json_len));
    let company = try_rc!(read_cstr(company));

    match generate_pdf(&resume, company, &config_or_default(cfg)) {
        Ok((pdf_bytes, _layout)) => {
            hand_out_buffer(pdf_bytes, out_buf, out_len);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            RC_GENERATE
        }
    }
}

/// Generate a PDF and also return the layout JSON.
///
/// # Safety
/// Same as `rf_generate_pdf`. Additionally, `*out_json_ptr` must be freed
/// with `rf_free_string`.
#[no_mangle]
pub unsafe extern "C" fn rf_generate_pdf_with_layout(
    json_ptr: *const u8,
    json_len: u32,
    company: *const c_char,
    cfg: *const RfExportConfig,
    out_pdf_buf: *mut *mut u8,
    out_pdf_len: *mut u32,
    out_json_ptr: *mut *mut c_char,
) -> c_int {
    if json_ptr.is_null()
        || company.is_null()
        || out_pdf_buf.is_null()
        || out_pdf_len.is_null()
        || out_json_ptr.is_null()
    {
        set_last_error("Null pointer argument");
        return RC_NULL;
    }
    let resume = try_rc!(read_resume(json_ptr, json_len));
    let company = try_rc!(read_cstr(company));

    match generate_pdf(&resume, company, &config_or_default(cfg)) {
        Ok((pdf_bytes, layout)) => {
            hand_out_buffer(pdf_bytes, out_pdf_buf, out_pdf_len);
            match CString::new(layout.to_json()) {
                Ok(cs) => *out_json_ptr = cs.into_raw(),
                Err(_) => *out_json_ptr = ptr::null_mut(),
            }
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            RC_GENERATE
        }
    }
}

/// Compute only the page layout (no PDF rendering). Returns JSON.
///
/// # Safety
/// Same as `rf_generate_pdf`; `*out_json_ptr` must be freed with
/// `rf_free_string`.
#[no_mangle]
pub unsafe extern "C" fn rf_compute_layout(
    json_ptr: *const u8,
    json_len: u32,
    company: *const c_char,
    cfg: *const RfExportConfig,
    out_json_ptr: *mut *mut c_char,
) -> c_int {
    if json_ptr.is_null() || company.is_null() || out_json_ptr.is_null() {
        set_last_error("Null pointer argument");
        return RC_NULL;
    }
    let resume = try_rc!(read_resume(json_ptr, json_len));
    let company = try_rc!(read_cstr(company));

    match compute_layout_config(&resume, company, &config_or_default(cfg)) {
        Ok(layout) => hand_out_string(layout.to_json(), out_json_ptr),
        Err(e) => {
            set_last_error(&e.to_string());
            RC_GENERATE
        }
    }
}

/// Render a PDF from a layout JSON string produced by `rf_compute_layout`.
///
/// Text is drawn with the built-in Helvetica faces.
///
/// # Safety
/// `json_ptr` must be a valid null-terminated string; `out_buf` and
/// `out_len` must be valid pointers.
#[no_mangle]
pub unsafe extern "C" fn rf_render_from_layout(
    json_ptr: *const c_char,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return RC_NULL;
    }
    let json = try_rc!(read_cstr(json_ptr));

    let layout = match LayoutConfig::from_json(json) {
        Ok(c) => c,
        Err(e) => {
            set_last_error(&format!("Invalid layout JSON: {e}"));
            return RC_INPUT;
        }
    };

    match crate::render::render_pdf(&layout, &FontManager::default()) {
        Ok(pdf_bytes) => {
            hand_out_buffer(pdf_bytes, out_buf, out_len);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            RC_GENERATE
        }
    }
}

/// Generate a DOCX package from a resume.
///
/// # Safety
/// `json_ptr` must point to `json_len` valid bytes; `out_buf` and `out_len`
/// must be valid pointers. Free `*out_buf` with `rf_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn rf_generate_docx(
    json_ptr: *const u8,
    json_len: u32,
    cfg: *const RfExportConfig,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return RC_NULL;
    }
    let resume = try_rc!(read_resume(json_ptr, json_len));

    match generate_docx(&resume, &config_or_default(cfg)) {
        Ok(bytes) => {
            hand_out_buffer(bytes, out_buf, out_len);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            RC_GENERATE
        }
    }
}

/// Plain-text rendering of a resume. Free the result with `rf_free_string`.
///
/// # Safety
/// `json_ptr` must point to `json_len` valid bytes; `out_str` must be valid.
#[no_mangle]
pub unsafe extern "C" fn rf_plain_text(
    json_ptr: *const u8,
    json_len: u32,
    out_str: *mut *mut c_char,
) -> c_int {
    if json_ptr.is_null() || out_str.is_null() {
        set_last_error("Null pointer argument");
        return RC_NULL;
    }
    let resume = try_rc!(read_resume(json_ptr, json_len));
    hand_out_string(generate_plain_text(&resume), out_str)
}

/// Standalone preview HTML. Free the result with `rf_free_string`.
///
/// # Safety
/// `json_ptr` must point to `json_len` valid bytes; `out_str` must be valid.
#[no_mangle]
pub unsafe extern "C" fn rf_preview_html(
    json_ptr: *const u8,
    json_len: u32,
    out_str: *mut *mut c_char,
) -> c_int {
    if json_ptr.is_null() || out_str.is_null() {
        set_last_error("Null pointer argument");
        return RC_NULL;
    }
    let resume = try_rc!(read_resume(json_ptr, json_len));
    hand_out_string(generate_preview_html(&resume), out_str)
}

/// Download filename for a resume exported against `company`.
///
/// # Safety
/// Same as `rf_generate_pdf` for the inputs; free `*out_str` with
/// `rf_free_string`.
#[no_mangle]
pub unsafe extern "C" fn rf_export_filename(
    json_ptr: *const u8,
    json_len: u32,
    company: *const c_char,
    format: RfExportFormat,
    out_str: *mut *mut c_char,
) -> c_int {
    if json_ptr.is_null() || company.is_null() || out_str.is_null() {
        set_last_error("Null pointer argument");
        return RC_NULL;
    }
    let resume = try_rc!(read_resume(json_ptr, json_len));
    let company = try_rc!(read_cstr(company));
    let ext = match format {
        RfExportFormat::Pdf => "pdf",
        RfExportFormat::Docx => "docx",
        RfExportFormat::Text => "txt",
        RfExportFormat::Html => "html",
    };
    hand_out_string(export_filename(&resume.header, company, ext), out_str)
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a buffer returned by `rf_generate_pdf`, `rf_generate_docx` or
/// `rf_render_from_layout`.
///
/// # Safety
/// `buf` must have been returned by one of those calls, and `len` must be
/// the corresponding length.
#[no_mangle]
pub unsafe extern "C" fn rf_free_buffer(buf: *mut u8, len: u32) {
    if !buf.is_null() {
        let _ = Box::from_raw(slice::from_raw_parts_mut(buf, len as usize));
    }
}

/// Free a string returned by an `rf_*` function.
///
/// # Safety
/// `s` must have been returned by Rust's `CString::into_raw`.
#[no_mangle]
pub unsafe extern "C" fn rf_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Retrieve the last error message. Returns a null-terminated string.
///
/// The returned pointer is valid until the next `rf_*` call on the same
/// thread. The caller should **not** free this pointer – it is managed
/// internally.
///
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn rf_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        let borrow = e.borrow();
        match borrow.as_ref() {
            Some(cs) => cs.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Return the library version as a null-terminated string.
/// The caller must **not** free this pointer.
#[no_mangle]
pub extern "C" fn rf_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::LEGACY_JSON;

    fn company() -> CString {
        CString::new("Acme").unwrap()
    }

    #[test]
    fn ffi_generate_pdf() {
        let json = LEGACY_JSON.as_bytes();
        let company = company();
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;

        let rc = unsafe {
            rf_generate_pdf(
                json.as_ptr(),
                json.len() as u32,
                company.as_ptr(),
                ptr::null(),
                &mut out_buf,
                &mut out_len,
            )
        };

        assert_eq!(rc, 0, "Expected success");
        assert!(!out_buf.is_null());
        assert!(out_len > 100);

        // Verify PDF header
        let bytes = unsafe { slice::from_raw_parts(out_buf, out_len as usize) };
        assert_eq!(&bytes[0..5], b"%PDF-");

        unsafe { rf_free_buffer(out_buf, out_len) };
    }

    #[test]
    fn ffi_compute_layout_landscape() {
        let json = LEGACY_JSON.as_bytes();
        let company = company();
        let cfg = RfExportConfig {
            page_width: 0.0,
            page_height: 0.0,
            page_margin: 0.0,
            orientation: RfPageOrientation::Landscape,
        };
        let mut json_ptr: *mut c_char = ptr::null_mut();

        let rc = unsafe {
            rf_compute_layout(
                json.as_ptr(),
                json.len() as u32,
                company.as_ptr(),
                &cfg,
                &mut json_ptr,
            )
        };

        assert_eq!(rc, 0);
        let out = unsafe { CStr::from_ptr(json_ptr) }.to_str().unwrap();
        // In landscape the effective width = A4 height (841.89)
        assert!(out.contains("841.89"), "Expected landscape width in JSON: {out}");
        unsafe { rf_free_string(json_ptr) };
    }

    #[test]
    fn ffi_render_from_layout() {
        let layout = LayoutConfig::a4().to_json();
        let layout = CString::new(layout).unwrap();
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;

        let rc = unsafe { rf_render_from_layout(layout.as_ptr(), &mut out_buf, &mut out_len) };
        assert_eq!(rc, 0);
        let bytes = unsafe { slice::from_raw_parts(out_buf, out_len as usize) };
        assert_eq!(&bytes[0..5], b"%PDF-");
        unsafe { rf_free_buffer(out_buf, out_len) };
    }

    #[test]
    fn ffi_generate_docx() {
        let json = LEGACY_JSON.as_bytes();
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;

        let rc = unsafe {
            rf_generate_docx(json.as_ptr(), json.len() as u32, ptr::null(), &mut out_buf, &mut out_len)
        };
        assert_eq!(rc, 0);
        let bytes = unsafe { slice::from_raw_parts(out_buf, out_len as usize) };
        assert_eq!(&bytes[0..2], b"PK");
        unsafe { rf_free_buffer(out_buf, out_len) };
    }

    #[test]
    fn ffi_plain_text() {
        let json = LEGACY_JSON.as_bytes();
        let mut out: *mut c_char = ptr::null_mut();
        let rc = unsafe { rf_plain_text(json.as_ptr(), json.len() as u32, &mut out) };
        assert_eq!(rc, 0);
        let text = unsafe { CStr::from_ptr(out) }.to_str().unwrap();
        assert!(text.starts_with("Jane Doe\n"));
        unsafe { rf_free_string(out) };
    }

    #[test]
    fn ffi_export_filename() {
        let json = br#"{"header": {"first_name": "Jane", "last_name": "Doe", "job_title": "Engineer"}}"#;
        let company = company();
        let mut out: *mut c_char = ptr::null_mut();
        let rc = unsafe {
            rf_export_filename(
                json.as_ptr(),
                json.len() as u32,
                company.as_ptr(),
                RfExportFormat::Docx,
                &mut out,
            )
        };
        assert_eq!(rc, 0);
        let name = unsafe { CStr::from_ptr(out) }.to_str().unwrap();
        assert_eq!(name, "Jane Doe - Engineer - Acme.docx");
        unsafe { rf_free_string(out) };
    }

    #[test]
    fn ffi_null_input() {
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;

        let rc = unsafe {
            rf_generate_docx(ptr::null(), 0, ptr::null(), &mut out_buf, &mut out_len)
        };

        assert_eq!(rc, RC_NULL, "Should fail on null input");
    }

    #[test]
    fn ffi_invalid_json_sets_last_error() {
        let json = b"{not json";
        let mut out: *mut c_char = ptr::null_mut();
        let rc = unsafe { rf_plain_text(json.as_ptr(), json.len() as u32, &mut out) };
        assert_eq!(rc, RC_INPUT);
        let err = rf_last_error();
        assert!(!err.is_null());
        let msg = unsafe { CStr::from_ptr(err) }.to_str().unwrap();
        assert!(msg.starts_with("Invalid resume input"), "{msg}");
    }

    #[test]
    fn ffi_version() {
        let v = rf_version();
        let version = unsafe { CStr::from_ptr(v) }.to_str().unwrap();
        assert_eq!(version, "0.1.0");
    }
}
