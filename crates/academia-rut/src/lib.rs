//! RUT (Chilean national identification number) codec.
//!
//! Pure synchronous; no I/O. Validation never errors: the free functions
//! return `false` or a partially formatted string for malformed input. Use
//! [`Rut::parse`] when a typed, validated value is needed.
//!
//! ```
//! use academia_rut::{format_for_display, is_valid};
//!
//! assert_eq!(format_for_display("123456785"), "12.345.678-5");
//! assert!(is_valid("12.345.678-5"));
//! ```

mod checksum;
pub mod error;
mod format;
mod rut;

pub use checksum::{LEGACY_BYPASS_RUT, RutPolicy, compute_check_digit, is_valid, normalize};
pub use error::{Result, RutError};
pub use format::{RutInput, format_for_display};
pub use rut::Rut;
