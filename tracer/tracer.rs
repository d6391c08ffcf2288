//! A trivial tracing facility: each grounding phase writes to
//! standard error when its level is enabled.

use bitmask_enum::bitmask;

#[bitmask]
pub enum Trace {
    All,
    Safety,
    Stratify,
    Ground,
    Assemble,
}

impl Trace {
    /// Parse a comma-separated list of level names, e.g. `"safety,ground"`.
    /// Unknown names are ignored.
    pub fn from_names(names: &str) -> Self {
        names
            .split(',')
            .map(|name| match name.trim().to_ascii_lowercase().as_str() {
                "all" => Trace::all(),
                "safety" => Trace::Safety,
                "stratify" => Trace::Stratify,
                "ground" => Trace::Ground,
                "assemble" => Trace::Assemble,
                _ => Trace::none(),
            })
            .fold(Trace::none(), |acc, level| acc | level)
    }
}

#[macro_export]
macro_rules! trace {
    ($trace:expr, $level:ident, $fmt:literal $(,)? $($arg:expr),* $(,)?) => {
        if $trace.intersects($crate::Trace::$level) {
            eprintln!($fmt, $($arg),*);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(Trace::from_names(""), Trace::none());
        assert_eq!(
            Trace::from_names("safety, Ground,bogus"),
            Trace::Safety | Trace::Ground
        );
        assert!(Trace::from_names("all").contains(Trace::Assemble));
    }
}
