//! Guard mode selection.
//!
//! - `strict` (default): every call is validated before it is formatted,
//!   and a mismatched format string never produces output. This is the
//!   mode of [`print_to`](crate::guard::print_to) and
//!   [`print`](crate::guard::print).
//! - `off`: formatting without validation, as a benchmark baseline. Only
//!   reachable by passing it to
//!   [`print_with_mode`](crate::guard::print_with_mode).
//!
//! The mode is a plain value chosen per call; nothing is cached.

/// Operating mode of the guard.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardMode {
    /// Validate the format string against the arguments, then format.
    #[default]
    Strict,
    /// Skip validation and format directly.
    Off,
}

impl GuardMode {
    /// Parse from string (case-insensitive). Unknown names fall back to `Strict`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "off" | "none" | "disabled" | "passthrough" => Self::Off,
            _ => Self::Strict,
        }
    }

    /// Returns true if validation is active.
    #[must_use]
    pub const fn validation_enabled(self) -> bool {
        !matches!(self, Self::Off)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Off => "off",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_guard_modes() {
        assert_eq!(GuardMode::from_str_loose("strict"), GuardMode::Strict);
        assert_eq!(GuardMode::from_str_loose("STRICT"), GuardMode::Strict);
        assert_eq!(GuardMode::from_str_loose("default"), GuardMode::Strict);
        assert_eq!(GuardMode::from_str_loose("off"), GuardMode::Off);
        assert_eq!(GuardMode::from_str_loose("None"), GuardMode::Off);
        assert_eq!(GuardMode::from_str_loose("passthrough"), GuardMode::Off);
        assert_eq!(GuardMode::from_str_loose("bogus"), GuardMode::Strict);
    }

    #[test]
    fn default_is_strict() {
        assert_eq!(GuardMode::default(), GuardMode::Strict);
        assert!(GuardMode::Strict.validation_enabled());
        assert!(!GuardMode::Off.validation_enabled());
    }

    #[test]
    fn names_round_trip() {
        for mode in [GuardMode::Strict, GuardMode::Off] {
            assert_eq!(GuardMode::from_str_loose(mode.as_str()), mode);
        }
    }
}
