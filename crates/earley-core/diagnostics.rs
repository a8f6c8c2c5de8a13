//! In-house trace/diagnostics mechanism gated on a numeric debug level,
//! in the style of `examples/acweathersby-radlr`'s `Journal`/debug-level
//! reporting (no external logging crate pulled in, matching the teacher).
//!
//! `Diagnostics` is owned by the grammar and threaded into the parser-list
//! builder and Leo engine. Every trace call checks the level *before*
//! formatting its arguments, so a grammar with `debug_level == 0` pays
//! nothing beyond the branch.

use std::fmt;

/// Trace verbosity for the parser-list builder (spec.md S6 `set_debug_level`).
/// Higher levels subsume lower ones.
pub mod level {
  /// No tracing.
  pub const SILENT: u32 = 0;
  /// One line per Earley set built.
  pub const SETS: u32 = 1;
  /// One line per situation added to a set.
  pub const SITUATIONS: u32 = 2;
  /// One line per scan/predict/complete step, including rejected
  /// lookahead-filtered candidates.
  pub const STEPS: u32 = 3;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnostics {
  debug_level: u32,
  leo_debug: bool,
}

impl Diagnostics {
  pub fn new(debug_level: u32, leo_debug: bool) -> Self {
    Self { debug_level, leo_debug }
  }

  pub fn set_debug_level(&mut self, level: u32) {
    self.debug_level = level;
  }

  pub fn set_leo_debug(&mut self, enabled: bool) {
    self.leo_debug = enabled;
  }

  pub fn debug_level(&self) -> u32 {
    self.debug_level
  }

  pub fn leo_debug(&self) -> bool {
    self.leo_debug
  }

  #[inline]
  pub fn enabled(&self, level: u32) -> bool {
    self.debug_level >= level
  }

  /// Emits `args` to stderr, prefixed with the position, if `debug_level`
  /// is at least `level`. Takes a closure so callers building anything
  /// beyond a `format!` string skip the work entirely when disabled.
  pub fn trace(&self, level: u32, position: u32, args: fmt::Arguments) {
    if self.enabled(level) {
      eprintln!("[{position}] {args}");
    }
  }

  /// Like [`Diagnostics::trace`] but gated on `leo_debug` instead of a
  /// numeric level, for Leo-chain-specific tracing (item creation, chain
  /// follows, completions served from the cache).
  pub fn trace_leo(&self, args: fmt::Arguments) {
    if self.leo_debug {
      eprintln!("[leo] {args}");
    }
  }
}

/// Emits a [`Diagnostics::trace`] call, formatting its arguments lazily.
#[macro_export]
macro_rules! trace {
  ($diag:expr, $level:expr, $position:expr, $($arg:tt)*) => {
    $diag.trace($level, $position, format_args!($($arg)*))
  };
}

/// Emits a [`Diagnostics::trace_leo`] call, formatting its arguments lazily.
#[macro_export]
macro_rules! trace_leo {
  ($diag:expr, $($arg:tt)*) => {
    $diag.trace_leo(format_args!($($arg)*))
  };
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn disabled_level_gates_the_check() {
    let diag = Diagnostics::new(level::SETS, false);
    assert!(diag.enabled(level::SETS));
    assert!(!diag.enabled(level::SITUATIONS));
  }

  #[test]
  fn leo_debug_is_independent_of_debug_level() {
    let diag = Diagnostics::new(level::SILENT, true);
    assert!(!diag.enabled(level::SETS));
    assert!(diag.leo_debug());
  }
}
