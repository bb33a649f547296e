//!
//! # Enum-String Mapping Module
//!
//! Defines the [enumstr] macro and paired [EnumStr] trait,
//! mapping a fieldless enum onto a fixed table of strings.
//! Line-oriented tool formats are full of these: section names, record keywords,
//! and single-letter or upper-case option values.
//!
//! The [EnumStr] trait defines three methods:
//! * `to_str(&self) -> &'static str` converts the enum to its string value.
//! * `from_str(&str) -> Option<Self>` does the opposite, returning [None] on no match.
//! * `all() -> &'static [Self]` lists every variant, in declaration order.
//!
//! Example:
//!
//! ```rs
//! use job21utils::enumstr;
//!
//! enumstr!(
//! /// # Yes/No Flags
//! YesNo {
//!     Yes: "Y",
//!     No: "N",
//!  }
//! );
//! ```
//!

///
/// # String-Enumeration Trait
///
/// While [EnumStr] can be implemented by hand, its primary implementer is the [enumstr] macro.
///
pub trait EnumStr: std::marker::Sized + Copy + 'static {
    fn to_str(&self) -> &'static str;
    fn from_str(txt: &str) -> Option<Self>;
    fn all() -> &'static [Self];
    /// Case-insensitive parsing, for string-tables which are conventionally upper-case.
    fn parse_ignore_case(txt: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|v| v.to_str().eq_ignore_ascii_case(txt))
    }
}

///
/// # Enum-String Pairing Macro
///
/// Creates an `enum` which:
/// * (a) Has paired string-values, as they are written to file
/// * (b) Implements the [EnumStr] trait for conversions to and from these strings
/// * (c) Implements [std::fmt::Display], writing the string-values
/// * (d) Serializes as the string-values, so markup files use the same spelling as the tool
///
/// All variants are fieldless. Derives include `serde::{Serialize, Deserialize}`,
/// which must be in scope at the call site. Extra attributes, including further `derive`s,
/// can be passed ahead of the enum name.
///
#[macro_export]
macro_rules! enumstr {
    (   $(#[$meta: meta])*
        $enum_name: ident {
        $( $variant: ident : $strval: literal ),* $(,)?
    }) => {
        $(#[$meta])*
        #[allow(dead_code)]
        #[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $( #[doc=$strval]
               #[serde(rename = $strval)]
                $variant ),*
        }
        impl EnumStr for $enum_name {
            /// Convert a [$enum_name] variant to its paired (static) string value.
            fn to_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $strval),*,
                }
            }
            /// Create a [$enum_name] from one of its string-values.
            /// Matching is case *sensitive*; see `parse_ignore_case` for the alternative.
            fn from_str(txt: &str) -> Option<Self> {
                match txt {
                    $( $strval => Some(Self::$variant)),*,
                    _ => None,
                }
            }
            fn all() -> &'static [Self] {
                &[ $( Self::$variant ),* ]
            }
        }
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                f.write_str(self.to_str())
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    enumstr!(
        /// # Yes/No Flags
        YesNo {
            Yes: "Y",
            No: "N",
        }
    );

    #[test]
    fn test_enumstr() {
        assert_eq!(YesNo::Yes.to_str(), "Y");
        assert_eq!(YesNo::No.to_string(), "N");

        assert_eq!(YesNo::from_str("Y"), Some(YesNo::Yes));
        assert_eq!(YesNo::from_str("y"), None);
        assert_eq!(YesNo::parse_ignore_case("n"), Some(YesNo::No));
        assert_eq!(YesNo::from_str("MAYBE"), None);

        assert_eq!(YesNo::all(), &[YesNo::Yes, YesNo::No]);
    }
    #[test]
    fn test_enumstr_serde() {
        let s = serde_json::to_string(&YesNo::Yes).unwrap();
        assert_eq!(s, "\"Y\"");
        let v: YesNo = serde_json::from_str("\"N\"").unwrap();
        assert_eq!(v, YesNo::No);
    }
}
