//! # NHCX Convert
//!
//! Standalone claim-converter tool: turns clinical PDFs or pasted text
//! into NHCX FHIR claim bundles by calling the conversion service, and
//! renders the result for a terminal.
//!
//! Pieces:
//! - [`hi_type`]: healthcare-information type guessing (filename hint and
//!   keyword scoring over text). The filename guess is purely a hint,
//!   overwritten once the service's classification returns.
//! - [`client`]: the conversion-service HTTP client (`/health`,
//!   `/convert/claim`, `/convert/text`)
//! - [`highlight`]: ANSI JSON rendering of returned bundles
//! - [`bundle`]: parsed clinical view (Composition sections, Observations)
//! - [`files`]: PDF selection and bundle download

#![warn(rust_2018_idioms)]

pub mod bundle;
pub mod client;
pub mod files;
pub mod hi_type;
pub mod highlight;
pub mod models;

pub use bundle::{summarize, BundleSummary, ObservationView, SectionView};
pub use client::{ConvertClient, ConvertError, ConvertResult, DEFAULT_CONVERT_URL};
pub use files::{save_bundle, select_pdf_files, FileSelection};
pub use hi_type::{detect_from_text, guess_from_filename, HiType};
pub use highlight::highlight;
pub use models::{
    ClaimMetadata, ConvertMetadata, ConvertResponse, ConvertTextRequest, ConverterHealth,
    DocumentResult,
};
