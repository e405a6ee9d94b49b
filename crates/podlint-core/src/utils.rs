//! Utility functions for rule implementations.

pub mod attributes;
pub mod paths;

#[doc(inline)]
pub use attributes::{has_cfg_test, has_test_attr, is_test_item};
#[doc(inline)]
pub use paths::{expanded_width, last_ident};
