//! Utility functions for display formatting and text matching.

pub mod format;

pub use format::{
    contains_ignore_case, format_amount, format_amount_value, format_date, or_placeholder,
    truncate_string, PLACEHOLDER,
};
