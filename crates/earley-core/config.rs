//! Parser configuration: a fluent builder in the style of
//! `examples/acweathersby-radlr/crates/radlr-core`'s `ParserConfig`
//! (`ParserConfig::new().hybrid().use_fork_states(false)`), covering the
//! configuration setters of spec.md S6 (`set_lookahead_level`,
//! `set_one_parse_flag`, `set_cost_flag`, `set_error_recovery_flag`,
//! `set_recovery_match`, `set_debug_level`, `set_leo_debug`).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookaheadLevel {
  /// No per-situation context; a consistent but maximally imprecise
  /// overapproximation.
  Static,
  /// FIRST of the RHS tail, plus the inherited context when the tail is
  /// nullable.
  Local,
  /// Same as `Local`, but completion additionally propagates the
  /// inherited context into expanded items.
  Dynamic,
}

impl Default for LookaheadLevel {
  fn default() -> Self {
    LookaheadLevel::Static
  }
}

/// Default recovery-match threshold `K` (spec.md S4.9): the number of
/// tokens a candidate resynchronization point must successfully consume
/// before it is considered a real recovery rather than a lucky scan.
pub const DEFAULT_RECOVERY_MATCH: u32 = 3;

#[derive(Debug, Clone, Copy)]
pub struct ParserConfig {
  pub lookahead_level: LookaheadLevel,
  pub one_parse: bool,
  pub cost_mode: bool,
  pub error_recovery: bool,
  pub recovery_match: u32,
  pub debug_level: u32,
  pub leo_debug: bool,
}

impl ParserConfig {
  pub fn new() -> Self {
    Self {
      lookahead_level: LookaheadLevel::Static,
      one_parse: false,
      cost_mode: false,
      error_recovery: false,
      recovery_match: DEFAULT_RECOVERY_MATCH,
      debug_level: 0,
      leo_debug: false,
    }
  }

  pub fn lookahead_level(mut self, level: LookaheadLevel) -> Self {
    self.lookahead_level = level;
    self
  }

  pub fn one_parse(mut self, enabled: bool) -> Self {
    self.one_parse = enabled;
    self
  }

  pub fn cost_mode(mut self, enabled: bool) -> Self {
    self.cost_mode = enabled;
    self
  }

  pub fn error_recovery(mut self, enabled: bool) -> Self {
    self.error_recovery = enabled;
    self
  }

  pub fn recovery_match(mut self, k: u32) -> Self {
    self.recovery_match = k;
    self
  }

  pub fn debug_level(mut self, level: u32) -> Self {
    self.debug_level = level;
    self
  }

  pub fn leo_debug(mut self, enabled: bool) -> Self {
    self.leo_debug = enabled;
    self
  }
}

impl Default for ParserConfig {
  fn default() -> Self {
    Self::new()
  }
}
