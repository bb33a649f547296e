//!
//! # Job21 Error-Helper Utilities
//!
//! ```rust
//! use job21utils::error::{ErrorHelper, Unwrapper};
//!
//! /// Example implementer of [`ErrorHelper`], which names the record being checked.
//! struct RecordChecker {
//!     record: String,
//! }
//! impl ErrorHelper for RecordChecker {
//!     type Error = String;
//!     fn err(&self, msg: impl Into<String>) -> Self::Error {
//!         format!("{}: {}", self.record, msg.into())
//!     }
//! }
//! impl RecordChecker {
//!     fn check(&self, width: i32) -> Result<i32, String> {
//!         self.assert(width > 0, "Width must be positive")?;
//!         "12".parse::<i32>().unwrapper(self, "Invalid integer")
//!     }
//! }
//! let c = RecordChecker { record: "IMAGE_SIZE".into() };
//! assert_eq!(c.check(-1), Err("IMAGE_SIZE: Width must be positive".to_string()));
//! assert_eq!(c.check(1), Ok(12));
//! ```
//!

///
/// # ErrorHelper
///
/// Helper trait for the validators and writers which walk a job tree.
/// Each implementer generally has some internal state to report upon failure
/// (which record, which image, which section), and injects it in the required `err` method.
/// The remaining methods are provided in terms of `err`.
///
pub trait ErrorHelper {
    type Error;

    /// Create and return a [Self::Error] value.
    fn err(&self, msg: impl Into<String>) -> Self::Error;
    /// Return failure
    fn fail<T>(&self, msg: impl Into<String>) -> Result<T, Self::Error> {
        Err(self.err(msg))
    }
    /// Unwrap the [Option] `opt` if it is [Some], and return our error if not.
    fn unwrap<T>(&self, opt: Option<T>, msg: impl Into<String>) -> Result<T, Self::Error> {
        match opt {
            Some(val) => Ok(val),
            None => self.fail(msg),
        }
    }
    /// Unwrap the [Result] `res`. Return through our failure method if it is [Err].
    fn ok<T, E>(&self, res: Result<T, E>, msg: impl Into<String>) -> Result<T, Self::Error> {
        match res {
            Ok(val) => Ok(val),
            Err(_) => self.fail(msg),
        }
    }
    /// Assert a boolean condition. Returns through `self.fail` if it is not satisfied.
    fn assert(&self, b: bool, msg: impl Into<String>) -> Result<(), Self::Error> {
        match b {
            true => Ok(()),
            false => self.fail(msg),
        }
    }
}

///
/// # Unwrapper
///
/// Post-fix application of an [`ErrorHelper`] to [`Option`]s and [`Result`]s,
/// e.g. `lookup(id).unwrapper(self, "Not found")?`.
///
/// Not generally implemented for new types; import the trait and use it on the standard library types.
///
pub trait Unwrapper {
    type Ok;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper;
}

/// # Unwrapper for [`Option`]
impl<T> Unwrapper for Option<T> {
    type Ok = T;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        helper.unwrap(self, msg)
    }
}

/// # Unwrapper for [`Result`]
impl<T, E> Unwrapper for Result<T, E> {
    type Ok = T;
    fn unwrapper<H>(
        self,
        helper: &H,
        msg: impl Into<String>,
    ) -> Result<<Self as Unwrapper>::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        helper.ok(self, msg)
    }
}
