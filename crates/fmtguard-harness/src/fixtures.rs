//! Fixture loading and management.

use std::path::Path;

use fmtguard_core::guard::{Arg, ArgValue, NativeType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading fixtures or parsing CLI arguments.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid argument '{spec}': {reason}")]
    BadArg { spec: String, reason: String },
}

/// One typed argument as written in a fixture file.
///
/// Serialized externally tagged by C type: `{"int": 5}`, `{"str": "x"}`,
/// `{"null": null}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureArg {
    Bool(bool),
    Int(i32),
    Uint(u32),
    Long(i64),
    Ulong(u64),
    LongLong(i64),
    UlongLong(u64),
    Size(u64),
    Ptrdiff(i64),
    Double(f64),
    LongDouble(f64),
    Char(char),
    WideChar(char),
    Str(String),
    WideStr(String),
    /// `void*` with the given address.
    Ptr(u64),
    /// `const void*` with the given address.
    ConstPtr(u64),
    Null(()),
}

impl FixtureArg {
    /// Borrow as a guard argument.
    #[must_use]
    pub fn to_arg(&self) -> Arg<'_> {
        match self {
            Self::Bool(v) => Arg::from(*v),
            Self::Int(v) => Arg::from(*v),
            Self::Uint(v) => Arg::from(*v),
            Self::Long(v) => Arg::long(*v),
            Self::Ulong(v) => Arg::ulong(*v),
            Self::LongLong(v) => Arg::from(*v),
            Self::UlongLong(v) => Arg::from(*v),
            Self::Size(v) => Arg::from(*v as usize),
            Self::Ptrdiff(v) => Arg::from(*v as isize),
            Self::Double(v) => Arg::from(*v),
            Self::LongDouble(v) => Arg::long_double(*v),
            Self::Char(c) => Arg::from(*c),
            Self::WideChar(c) => Arg::wide_char(*c),
            Self::Str(s) => Arg::from(s.as_str()),
            Self::WideStr(s) => Arg::wide_str(s),
            Self::Ptr(addr) => Arg::new(NativeType::VOID_PTR, ArgValue::Address(*addr as usize)),
            Self::ConstPtr(addr) => Arg::new(
                NativeType::CONST_VOID_PTR,
                ArgValue::Address(*addr as usize),
            ),
            Self::Null(()) => Arg::null(),
        }
    }

    /// Parse the CLI form `tag=value` (or bare `null`).
    pub fn parse_cli(spec: &str) -> Result<Self, FixtureError> {
        let bad = |reason: &str| FixtureError::BadArg {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };
        if spec == "null" {
            return Ok(Self::Null(()));
        }
        let (tag, value) = spec.split_once('=').ok_or_else(|| bad("expected tag=value"))?;
        let arg = match tag {
            "bool" => Self::Bool(value.parse().map_err(|_| bad("not a bool"))?),
            "int" => Self::Int(value.parse().map_err(|_| bad("not an int"))?),
            "uint" => Self::Uint(value.parse().map_err(|_| bad("not an unsigned int"))?),
            "long" => Self::Long(value.parse().map_err(|_| bad("not a long"))?),
            "ulong" => Self::Ulong(value.parse().map_err(|_| bad("not an unsigned long"))?),
            "long_long" => Self::LongLong(value.parse().map_err(|_| bad("not a long long"))?),
            "ulong_long" => {
                Self::UlongLong(value.parse().map_err(|_| bad("not an unsigned long long"))?)
            }
            "size" => Self::Size(value.parse().map_err(|_| bad("not a size"))?),
            "ptrdiff" => Self::Ptrdiff(value.parse().map_err(|_| bad("not a ptrdiff"))?),
            "double" => Self::Double(value.parse().map_err(|_| bad("not a double"))?),
            "long_double" => Self::LongDouble(value.parse().map_err(|_| bad("not a double"))?),
            "char" | "wide_char" => {
                let mut chars = value.chars();
                let c = match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => return Err(bad("expected exactly one character")),
                };
                if tag == "char" {
                    Self::Char(c)
                } else {
                    Self::WideChar(c)
                }
            }
            "str" => Self::Str(value.to_string()),
            "wide_str" => Self::WideStr(value.to_string()),
            "ptr" | "const_ptr" => {
                let digits = value.trim_start_matches("0x");
                let addr = u64::from_str_radix(digits, 16).map_err(|_| bad("not a hex address"))?;
                if tag == "ptr" {
                    Self::Ptr(addr)
                } else {
                    Self::ConstPtr(addr)
                }
            }
            _ => return Err(bad("unknown type tag")),
        };
        Ok(arg)
    }
}

fn default_mode() -> String {
    String::from("strict")
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// C11/POSIX section reference.
    #[serde(default)]
    pub section: String,
    /// printf format string.
    pub format: String,
    /// Arguments in call order.
    #[serde(default)]
    pub args: Vec<FixtureArg>,
    /// Rendered text, or `error:<message>` when the call must be rejected.
    pub expected_output: String,
    /// Return value of the print call, when the case pins it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_count: Option<i32>,
    /// Guard mode the case runs under (`strict`, `off` or `both`).
    #[serde(default = "default_mode")]
    pub mode: String,
}

impl FixtureCase {
    /// Arguments as guard arguments, borrowing from the case.
    #[must_use]
    pub fn call_args(&self) -> Vec<Arg<'_>> {
        self.args.iter().map(FixtureArg::to_arg).collect()
    }
}

/// A collection of fixture cases for one family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Case family name.
    pub family: String,
    /// UTC timestamp of capture.
    pub captured_at: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Load every `*.json` fixture in `dir`, sorted by path.
    ///
    /// Files that fail to parse are reported on stderr and skipped.
    pub fn load_dir(dir: &Path) -> Result<Vec<Self>, FixtureError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        paths.sort();

        let mut sets = Vec::new();
        for path in paths {
            match Self::from_file(&path) {
                Ok(set) => sets.push(set),
                Err(err) => eprintln!("Skipping {}: {}", path.display(), err),
            }
        }
        Ok(sets)
    }
}
