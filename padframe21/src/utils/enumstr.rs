//!
//! # Enum-String Mapping
//!
//! Padframe configs, placement statuses, and orientations all arrive as one of a small set of
//! upper-case keywords. The [enumstr] macro declares a fieldless enum alongside its keyword for
//! each variant, and implements [EnumStr] and [std::fmt::Display] for it.
//!
//! ```text
//! enumstr!(
//!     /// Die Corners
//!     Corner {
//!         Sw: "SW",
//!         Ne: "NE",
//!     }
//! );
//! assert_eq!(Corner::from_str("NE"), Some(Corner::Ne));
//! assert_eq!(Corner::expected(), "SW|NE");
//! ```
//!

///
/// # String-Enumeration Trait
///
/// Conversions between a fieldless enum and its keyword strings.
/// Generally implemented by the [enumstr] macro rather than by hand.
///
pub trait EnumStr: Sized + Copy + 'static {
    /// All variants, in declaration order
    fn variants() -> &'static [Self];
    /// Keyword for `self`
    fn to_str(&self) -> &'static str;
    /// Variant for keyword `txt`, if any. Matching is case-sensitive.
    fn from_str(txt: &str) -> Option<Self> {
        Self::variants()
            .iter()
            .find(|v| v.to_str() == txt)
            .copied()
    }
    /// Pipe-separated list of all keywords, for error messages
    fn expected() -> String {
        Self::variants()
            .iter()
            .map(|v| v.to_str())
            .collect::<Vec<_>>()
            .join("|")
    }
}

///
/// # Enum-String Pairing Macro
///
/// Creates a `Copy` enum with serde, [schemars::JsonSchema], ordering and hashing derived,
/// plus implementations of [EnumStr] and [std::fmt::Display].
/// Variants serialize as their keywords.
///
macro_rules! enumstr {
    (   $(#[$meta: meta])*
        $enum_name: ident {
        $( $variant: ident : $strval: literal ),* $(,)?
    }) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Deserialize,
            ::serde::Serialize,
            ::schemars::JsonSchema,
        )]
        pub enum $enum_name {
            $( #[doc=$strval]
                #[serde(rename = $strval)]
                $variant ),*
        }
        impl $crate::utils::EnumStr for $enum_name {
            fn variants() -> &'static [Self] {
                &[ $( Self::$variant ),* ]
            }
            fn to_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $strval ),*
                }
            }
        }
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}", $crate::utils::EnumStr::to_str(self))
            }
        }
    }
}
pub(crate) use enumstr;

#[cfg(test)]
mod tests {
    use super::*;

    enumstr!(
        /// Traffic Lights
        Light {
            Red: "RED",
            Amber: "AMBER",
            Green: "GREEN",
        }
    );

    #[test]
    fn keywords() {
        assert_eq!(Light::Amber.to_str(), "AMBER");
        assert_eq!(Light::from_str("GREEN"), Some(Light::Green));
        assert_eq!(Light::from_str("green"), None);
        assert_eq!(Light::expected(), "RED|AMBER|GREEN");
        assert_eq!(format!("{}", Light::Red), "RED");
    }
}
