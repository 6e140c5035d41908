//! Triage PII - deterministic detection and redaction of structured PII.
//!
//! This crate is the detection core of Triage Guard. It finds Social
//! Security Numbers, payment card numbers (Luhn-validated), email addresses
//! and phone numbers in free text, and rewrites text with category
//! placeholders for audit logging.
//!
//! # Example
//!
//! ```rust
//! use triage_pii::{PatternLibrary, PiiCategory, PiiScanner, Redactor, ScanPolicy};
//!
//! let library = PatternLibrary::shared();
//! let scanner = PiiScanner::new(library.clone(), ScanPolicy::CollectAll);
//! let redactor = Redactor::new(library);
//!
//! let result = scanner.scan("My SSN is 123-45-6789.");
//! assert_eq!(result.first_category(), Some(PiiCategory::Ssn));
//!
//! let redacted = redactor.redact("Email a@b.com and call 555-123-4567");
//! assert_eq!(redacted.sanitized_text, "Email [EMAIL_REDACTED] and call [PHONE_REDACTED]");
//! ```
//!
//! # Precedence
//!
//! Rules run in a fixed order: SSN, bare card, formatted card, email, phone.
//! Under [`ScanPolicy::FirstMatchWins`] the first rule with a validated match
//! ends the scan; [`ScanPolicy::CollectAll`] reports every match. Card
//! candidates only count when they pass the Luhn checksum.
//!
//! Nothing here fails on untrusted input: absent or non-string input is
//! simply not sensitive. Only building a [`PatternLibrary`] can fail.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod category;
pub mod error;
pub mod luhn;
pub mod patterns;
pub mod redactor;
pub mod scanner;

// Re-export commonly used types
pub use category::{PatternKind, PiiCategory};
pub use error::{PiiError, Result};
pub use luhn::is_valid_card;
pub use patterns::{PatternLibrary, PatternRule, Span};
pub use redactor::{RedactionResult, Redactor};
pub use scanner::{PiiMatch, PiiScanner, ScanResult};
pub use triage_core::{CardLengthPolicy, ScanPolicy};
