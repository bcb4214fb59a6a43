//! Closed string-labelled enums (statuses, roles, movement types).
//!
//! Feeds disagree on spelling (`"out_of_stock"`, `"Out of stock"`,
//! `"Delivered"`). Parsing goes through [`normalize_label`] so every
//! spelling lands on one variant; printing always uses the canonical
//! kebab-case label.

/// Normalize a loosely-formatted label.
///
/// Lowercases and maps `_` and whitespace to `-`, so `"Out_of stock"`,
/// `"out-of-stock"` and `"OUT_OF_STOCK"` all become `"out-of-stock"`.
pub fn normalize_label(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '_' => '-',
            c if c.is_whitespace() => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Implement `ALL`, `as_str`, `Display`, `FromStr` and `TryFrom<String>`
/// for a fieldless enum with canonical labels.
///
/// Pair with `#[serde(rename_all = "kebab-case", try_from = "String")]` so
/// serialization emits the canonical label and deserialization is lenient.
#[macro_export]
macro_rules! impl_label_enum {
    ($t:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $t {
            pub const ALL: &'static [$t] = &[$($t::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($t::$variant => $label),+
                }
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl core::str::FromStr for $t {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = $crate::normalize_label(s);
                $t::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == normalized)
                    .ok_or_else(|| $crate::DomainError::unknown($kind, s))
            }
        }

        impl TryFrom<String> for $t {
            type Error = $crate::DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum Shade {
        Light,
        PitchBlack,
    }

    impl_label_enum!(Shade, "shade", {
        Light => "light",
        PitchBlack => "pitch-black",
    });

    #[test]
    fn normalize_label_folds_case_and_separators() {
        assert_eq!(normalize_label("out_of_stock"), "out-of-stock");
        assert_eq!(normalize_label("Out of Stock"), "out-of-stock");
        assert_eq!(normalize_label("  Delivered "), "delivered");
        assert_eq!(normalize_label("low-stock"), "low-stock");
    }

    #[test]
    fn generated_parse_accepts_any_spelling() {
        assert_eq!("PITCH_BLACK".parse::<Shade>().unwrap(), Shade::PitchBlack);
        assert_eq!("Light".parse::<Shade>().unwrap(), Shade::Light);
        assert_eq!(Shade::PitchBlack.to_string(), "pitch-black");
        assert!("grey".parse::<Shade>().is_err());
    }
}
