//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete.

/// Autocomplete handlers for category titles, student phones, periods and payment channels
pub mod autocomplete;
