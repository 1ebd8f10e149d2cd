//!
//! # Context-Carrying Error Helpers
//!
//! Importers walk nested structures (libraries, then masters) and want every failure to say where
//! it happened. They implement [ErrorHelper], keeping a stack of [ErrorContext]s and converting a
//! bare message into a [PadframeError] carrying that stack.
//! [Unwrapper] adds the same routing as a postfix method on [Option] and [Result].
//!

use crate::error::{PadResult, PadframeError};

/// Enumerated importer contexts, reported with failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    /// Library source, by file name
    Library(String),
    /// Master (cell) definition, by name
    Master(String),
    /// Master size conversion
    Size,
    /// Distance units
    Units,
    /// Layout section, by keyword
    Section(&'static str),
    /// Instance (component), by name
    Instance(String),
    /// Net, by name
    Net(String),
}

///
/// # ErrorHelper
///
/// Implementers supply `err`, which wraps a message with whatever state they hold.
/// The remaining methods route through it.
///
pub trait ErrorHelper {
    /// Create a [PadframeError] from message `msg`
    fn err(&self, msg: impl Into<String>) -> PadframeError;
    /// Return failure
    fn fail<T>(&self, msg: impl Into<String>) -> PadResult<T> {
        Err(self.err(msg))
    }
    /// Unwrap `opt`, failing with `msg` if it is [None]
    fn unwrap<T>(&self, opt: Option<T>, msg: impl Into<String>) -> PadResult<T> {
        match opt {
            Some(val) => Ok(val),
            None => self.fail(msg),
        }
    }
    /// Fail with `msg` unless `b` holds
    fn assert(&self, b: bool, msg: impl Into<String>) -> PadResult<()> {
        if b {
            Ok(())
        } else {
            self.fail(msg)
        }
    }
}

///
/// # Unwrapper
///
/// Postfix form of [ErrorHelper::unwrap], for [Option]s and [Result]s alike.
/// Any inner error of a [Result] is discarded in favor of the helper's message.
///
pub trait Unwrapper {
    type Ok;
    fn unwrapper(self, helper: &impl ErrorHelper, msg: impl Into<String>) -> PadResult<Self::Ok>;
}
impl<T> Unwrapper for Option<T> {
    type Ok = T;
    fn unwrapper(self, helper: &impl ErrorHelper, msg: impl Into<String>) -> PadResult<T> {
        helper.unwrap(self, msg)
    }
}
impl<T, E> Unwrapper for Result<T, E> {
    type Ok = T;
    fn unwrapper(self, helper: &impl ErrorHelper, msg: impl Into<String>) -> PadResult<T> {
        helper.unwrap(self.ok(), msg)
    }
}
