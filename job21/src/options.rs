//!
//! # Export Options
//!
//! Field-layout settings for the job text format.
//! The keywords themselves are fixed (see [crate::JobKey]); these settings cover how records are laid out.
//!

// Crates.io
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::{EnumStr, ErrorHelper, SerdeFile};
use crate::{Checker, ErrorContext, JobKey, JobResult};

/// Default [ExportOptions], shared by exports which do not specify their own
pub static DEFAULT_OPTIONS: Lazy<ExportOptions> = Lazy::new(ExportOptions::default);

/// # Export Options
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct ExportOptions {
    /// Indentation of records inside each section
    pub indent: String,
    /// Column, after the indentation, at which record values start
    pub key_width: usize,
    /// Decimal places written for each decimal value
    pub precision: u32,
    /// Maximum characters per comment line
    pub max_comment_len: usize,
}
impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            indent: "    ".into(),
            key_width: 32,
            precision: 6,
            max_comment_len: 40,
        }
    }
}
impl ExportOptions {
    /// Check that these options can lay out every record
    pub fn validate(&self) -> JobResult<()> {
        let checker = Checker(ErrorContext::Options);
        checker.assert(
            self.indent.chars().all(|c| c == ' ' || c == '\t'),
            "Indentation must be spaces or tabs",
        )?;
        let longest = JobKey::all().iter().map(|k| k.to_str().len()).max();
        let longest = checker.unwrap(longest, "Empty keyword table")?;
        checker.assert(
            self.key_width > longest,
            format!(
                "Key width {} must exceed the longest keyword ({} characters)",
                self.key_width, longest
            ),
        )?;
        checker.assert(self.precision <= 12, "Precision must be at most 12 places")?;
        checker.assert(
            self.max_comment_len > 0,
            "Maximum comment length must be positive",
        )
    }
}
impl SerdeFile for ExportOptions {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::SerializationFormat::{Toml, Yaml};

    #[test]
    fn test_default_options() -> JobResult<()> {
        DEFAULT_OPTIONS.validate()?;
        assert_eq!(*DEFAULT_OPTIONS, ExportOptions::default());
        Ok(())
    }
    #[test]
    fn test_partial_options() -> JobResult<()> {
        // Unspecified fields take their defaults
        let opts: ExportOptions = Yaml.from_str(
            r#"
            indent: "\t"
            key_width: 24
            "#,
        )?;
        assert_eq!(opts.indent, "\t");
        assert_eq!(opts.key_width, 24);
        assert_eq!(opts.precision, 6);
        opts.validate()?;

        let opts: ExportOptions = Toml.from_str("key_width = 8")?;
        assert!(opts.validate().is_err());
        Ok(())
    }
}
