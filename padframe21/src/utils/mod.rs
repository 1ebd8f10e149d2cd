//!
//! # Padframe21 Internal Utilities
//!

pub mod ser;
pub use ser::*;

pub mod error;
pub use error::*;

pub mod enumstr;
pub use enumstr::*;

pub mod lex;
