//! # Codec Configuration Module
//!
//! This module centralizes the configuration constants for the codec.
//! Constants are grouped by their functional area and interdependencies are
//! documented and enforced through compile-time assertions.
//!
//! ## Why Centralization?
//!
//! Scattered constants across multiple files lead to bugs where
//! interdependent values become mismatched. For example, `MAX_VARINT_LEN`
//! must cover every length the decoder accepts (`MAX_LENGTH`) or the writer
//! reserves too little buffer space. By co-locating these constants and
//! adding compile-time checks, we prevent such issues.
//!
//! ## Module Organization
//!
//! - [`constants`]: All numeric configuration values with dependency documentation

pub mod constants;
pub use constants::*;
