//! # sped
//!
//! Brazilian fiscal bookkeeping file generation for the SPED family of
//! layouts: EFD ICMS/IPI ("SPED Fiscal") and EFD Contribuições (PIS/COFINS).
//!
//! The crate turns in-memory domain records (company registration data,
//! NF-e invoices, expense receipts) into the pipe-delimited, block-structured
//! text files the Receita Federal validator ingests. Field formatting, block
//! nesting, and the self-referential record counts of the closing block are
//! all handled by a shared engine; the two layout modules only describe which
//! records each block carries.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use sped::core::Company;
//! use sped::icms::{IcmsConfig, to_efd_icms_ipi};
//!
//! let company = Company {
//!     name: "ACME COMERCIO LTDA".into(),
//!     cnpj: Some("12.345.678/0001-95".into()),
//!     state: Some("SP".into()),
//!     city_code: Some("3550308".into()),
//!     ..Default::default()
//! };
//!
//! let file = to_efd_icms_ipi(
//!     &company,
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
//!     &[],
//!     &IcmsConfig::default(),
//! )
//! .unwrap();
//!
//! assert!(file.starts_with("|0000|018|0|01012024|31012024|ACME COMERCIO LTDA|12345678000195|"));
//! assert!(file.lines().last().unwrap().starts_with("|9999|"));
//! ```
//!
//! The generators are pure functions: no I/O, no shared state, safe to call
//! concurrently for different companies. Writing the result to disk (or
//! streaming it as a download) is the caller's concern.

pub mod contribuicoes;
pub mod core;
pub mod engine;
pub mod icms;

// Re-export core types at crate root for convenience
pub use crate::core::*;
