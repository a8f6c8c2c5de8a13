//! The parser-list builder: spec.md S4.7's main loop (bootstrap, scan,
//! predict/complete closure, Leo consultation, lookahead filtering,
//! dedup/intern/record, error check, termination). Grounded in
//! `examples/original_source/src/earley_engine.h`'s `build_new_set`/
//! `perform_predictions`/`perform_completions` sequence, restructured as a
//! worklist-driven closure over a single mutable `BuildingSet` rather than
//! repeated whole-set rescans.

use std::collections::{HashMap, VecDeque};

use earley_runtime::{EarleyError, ScannedToken};

use crate::compile::Interners;
use crate::config::{LookaheadLevel, ParserConfig};
use crate::diagnostics::Diagnostics;
use crate::grammar::GrammarStore;
use crate::parse::leo_engine::LeoEngine;
use crate::parse::recovery::{self, RecoveryCandidate, RecoveryEvent};
use crate::parse::source::{Source, SourceTable};
use crate::types::{
  EarleySet, EarleySetId, LeoHop, LeoItem, LeoKey, LeoStats, Rule, SetCore, SetCoreId, Situation, SituationId, SymbolId, TermSet,
};

/// A situation occurrence under construction for the set at `position`,
/// before it has been sorted into start/non-start order and interned.
///
/// A dotted item (a `SituationId`, content-addressed by `(rule, dot,
/// context)`) can legitimately occur at more than one origin within the
/// same set — e.g. `S : S S | a` reaching `[S -> S . S, origin k]` from
/// two different completions with different `k`s (spec.md S3's start
/// situations are an array, not a set keyed by dotted item alone). So
/// `origins` tracks every distinct origin seen for a situation, and
/// `order`/`waiters` carry `(situation, origin)` pairs rather than bare
/// situation ids, so prediction/completion runs once per occurrence
/// instead of collapsing distinct origins into one.
struct BuildingSet {
  position: u32,
  origins: HashMap<SituationId, Vec<u32>>,
  waiters: HashMap<crate::types::NonterminalId, Vec<(SituationId, u32)>>,
  order: Vec<(SituationId, u32)>,
}

impl BuildingSet {
  fn new(position: u32) -> Self {
    Self { position, origins: HashMap::new(), waiters: HashMap::new(), order: Vec::new() }
  }

  /// Inserts the `(situation, origin)` occurrence if not already present.
  /// Returns whether this was a new insertion (dedup per spec.md S4.7
  /// step 7, applied per-origin rather than per-situation).
  fn try_add(&mut self, situation: SituationId, origin: u32, after: Option<SymbolId>, worklist: &mut VecDeque<(SituationId, u32)>) -> bool {
    let seen = self.origins.entry(situation).or_default();
    if seen.contains(&origin) {
      return false;
    }
    seen.push(origin);
    self.order.push((situation, origin));
    if let Some(SymbolId::Nonterminal(n)) = after {
      self.waiters.entry(n).or_default().push((situation, origin));
    }
    worklist.push_back((situation, origin));
    true
  }
}

/// Per-set-core cache of "which situations wait for which nonterminal",
/// this crate's rendition of spec.md S2's core-symbol-vector component
/// (the "transitions" vector specifically; "reduces" and "transitive
/// transitions" are folded into the completion/Leo logic directly rather
/// than precomputed, since this design tracks origin through explicit
/// distances instead of transitive chain-walking — see DESIGN.md).
///
/// Indexed by position within `core.situations` rather than by
/// `SituationId` directly: the same dotted item can appear at more than
/// one index (one per distinct origin, each with its own entry in the
/// set's parallel `distances` array), so a `SituationId`-keyed map would
/// collapse them back down to one.
struct CoreIndex {
  waiters: HashMap<crate::types::NonterminalId, Vec<usize>>,
}

impl CoreIndex {
  fn build(core: &SetCore, grammar: &GrammarStore, interners: &Interners) -> Self {
    let mut waiters: HashMap<crate::types::NonterminalId, Vec<usize>> = HashMap::new();
    for (index, situation_id) in core.situations.iter().enumerate() {
      let situation = interners.situation(*situation_id);
      let rule = grammar.rule(situation.rule);
      if let Some(SymbolId::Nonterminal(n)) = rule.symbol_after(situation.dot) {
        waiters.entry(n).or_default().push(index);
      }
    }
    Self { waiters }
  }
}

pub struct ParseOutcome {
  pub parser_list: Vec<EarleySetId>,
  pub tokens: Vec<ScannedToken>,
  pub accepted: bool,
  pub leo_stats: LeoStats,
  pub sources: SourceTable,
  pub recovery_events: Vec<RecoveryEvent>,
}

pub struct ListBuilder {
  config: ParserConfig,
  diagnostics: Diagnostics,
  leo: LeoEngine,
  sources: SourceTable,
  parser_list: Vec<EarleySetId>,
  core_index_cache: HashMap<SetCoreId, CoreIndex>,
  token_buffer: VecDeque<ScannedToken>,
  tokens_consumed: Vec<ScannedToken>,
  recovery_events: Vec<RecoveryEvent>,
}

impl ListBuilder {
  pub fn new(config: ParserConfig, diagnostics: Diagnostics) -> Self {
    Self {
      config,
      diagnostics,
      leo: LeoEngine::new(),
      sources: SourceTable::new(),
      parser_list: Vec::new(),
      core_index_cache: HashMap::new(),
      token_buffer: VecDeque::new(),
      tokens_consumed: Vec::new(),
      recovery_events: Vec::new(),
    }
  }

  pub fn run(
    mut self,
    grammar: &GrammarStore,
    interners: &mut Interners,
    read_token: &mut dyn FnMut() -> ScannedToken,
  ) -> Result<ParseOutcome, EarleyError> {
    let augmented = grammar
      .augmented_start
      .ok_or_else(|| EarleyError::Text("grammar has no start symbol".to_string()))?;

    let mut building = self.bootstrap(grammar, interners, augmented);
    let peeked = self.peek_token(read_token);
    self.close(&mut building, peeked, grammar, interners);

    loop {
      let position = building.position;
      let reached_via = if position == 0 { None } else { self.last_scanned_code() };
      let set_id = self.finalize(building, reached_via, interners);
      self.parser_list.push(set_id);

      let token = self.pull_token(read_token);
      if token.is_end_of_input() {
        break;
      }
      self.tokens_consumed.push(token);

      let scanned = self.scan(set_id, position, token, grammar, interners);
      if scanned.is_empty() {
        if self.config.error_recovery {
          match self.attempt_recovery(position, token, grammar, interners, read_token) {
            Some(resumed) => {
              building = resumed;
              continue;
            }
            None => return Err(EarleyError::ParseSyntax { token_index: position as usize }),
          }
        }
        return Err(EarleyError::ParseSyntax { token_index: position as usize });
      }

      let mut next = BuildingSet::new(position + 1);
      let mut worklist = VecDeque::new();
      for (new_id, from_id, origin) in scanned {
        let after = interners.situation(new_id).dot_symbol(grammar);
        next.try_add(new_id, origin, after, &mut worklist);
        self.sources.record(position + 1, new_id, Source::Scan { from_position: position, from_situation: from_id });
      }

      let peeked = self.peek_token(read_token);
      self.close(&mut next, peeked, grammar, interners);
      building = next;
    }

    let accepted = self.check_acceptance(grammar, augmented, interners);
    Ok(ParseOutcome {
      parser_list: self.parser_list,
      tokens: self.tokens_consumed,
      accepted,
      leo_stats: self.leo.stats(),
      sources: self.sources,
      recovery_events: self.recovery_events,
    })
  }

  fn last_scanned_code(&self) -> Option<i64> {
    self.tokens_consumed.last().map(|t| t.code)
  }

  fn pull_token(&mut self, read_token: &mut dyn FnMut() -> ScannedToken) -> ScannedToken {
    self.token_buffer.pop_front().unwrap_or_else(read_token)
  }

  fn peek_token(&mut self, read_token: &mut dyn FnMut() -> ScannedToken) -> Option<ScannedToken> {
    if self.token_buffer.is_empty() {
      self.token_buffer.push_back(read_token());
    }
    self.token_buffer.front().copied()
  }

  fn bootstrap(&mut self, grammar: &GrammarStore, interners: &mut Interners, augmented: crate::types::NonterminalId) -> BuildingSet {
    let ctx0 = if self.config.lookahead_level == LookaheadLevel::Static {
      None
    } else {
      Some(interners.intern_term_set(grammar.follow[augmented.0 as usize].clone()))
    };
    let mut building = BuildingSet::new(0);
    let mut worklist = VecDeque::new();
    for rule_id in grammar.nonterminal(augmented).rules.clone() {
      let situation = Situation::new(rule_id, 0, ctx0);
      let id = interners.intern_situation(situation);
      let after = grammar.rule(rule_id).symbol_after(0);
      building.try_add(id, 0, after, &mut worklist);
    }
    self.run_closure(&mut building, None, grammar, interners, &mut worklist);
    building
  }

  fn close(&mut self, building: &mut BuildingSet, peeked: Option<ScannedToken>, grammar: &GrammarStore, interners: &mut Interners) {
    let mut worklist: VecDeque<(SituationId, u32)> = building.order.iter().copied().collect();
    self.run_closure(building, peeked, grammar, interners, &mut worklist);
  }

  fn run_closure(
    &mut self,
    building: &mut BuildingSet,
    peeked: Option<ScannedToken>,
    grammar: &GrammarStore,
    interners: &mut Interners,
    worklist: &mut VecDeque<(SituationId, u32)>,
  ) {
    while let Some((situation_id, origin)) = worklist.pop_front() {
      let situation = *interners.situation(situation_id);
      let rule = grammar.rule(situation.rule);
      match rule.symbol_after(situation.dot) {
        None => self.do_complete(building, situation, origin, grammar, interners, peeked, worklist),
        Some(SymbolId::Terminal(_)) => {}
        Some(SymbolId::Nonterminal(n)) => self.do_predict(building, n, situation, origin, grammar, interners, peeked, worklist),
      }
    }
  }

  fn do_predict(
    &mut self,
    building: &mut BuildingSet,
    nonterminal: crate::types::NonterminalId,
    parent: Situation,
    parent_origin: u32,
    grammar: &GrammarStore,
    interners: &mut Interners,
    peeked: Option<ScannedToken>,
    worklist: &mut VecDeque<(SituationId, u32)>,
  ) {
    let parent_rule = grammar.rule(parent.rule);
    let ctx = predict_context(parent_rule, parent.dot, parent.lookahead, self.config.lookahead_level, grammar, interners);
    for rule_id in grammar.nonterminal(nonterminal).rules.clone() {
      let new_situation = Situation::new(rule_id, 0, ctx);
      let id = interners.intern_situation(new_situation);
      if !passes_filter(id, peeked, self.config.lookahead_level, grammar, interners) {
        continue;
      }
      let after = grammar.rule(rule_id).symbol_after(0);
      building.try_add(id, building.position, after, worklist);
    }
    if grammar.nullable[nonterminal.0 as usize] {
      let advanced = parent.advanced();
      let advanced_id = interners.intern_situation(advanced);
      if passes_filter(advanced_id, peeked, self.config.lookahead_level, grammar, interners) {
        let after = grammar.rule(advanced.rule).symbol_after(advanced.dot);
        building.try_add(advanced_id, parent_origin, after, worklist);
      }
    }
  }

  fn do_complete(
    &mut self,
    building: &mut BuildingSet,
    completed: Situation,
    origin: u32,
    grammar: &GrammarStore,
    interners: &mut Interners,
    peeked: Option<ScannedToken>,
    worklist: &mut VecDeque<(SituationId, u32)>,
  ) {
    let lhs = grammar.rule(completed.rule).lhs;
    let completed_id = interners.intern_situation(completed);
    let key = LeoKey { set_index: origin, nonterminal: lhs };

    // spec.md S4.8 step 5: consult the Leo table before enumerating
    // waiters at all. A hit means a previous completion of this exact
    // `(origin, nonterminal)` pair already established there is exactly
    // one waiter and that it qualifies for a Leo hop (see the
    // registration branch below) — the origin set's contents never
    // change once built, so that finding is still valid here. The
    // standard loop is skipped entirely for this nonterminal: we advance
    // the cached waiter directly instead of re-deriving it through
    // `lookup_waiters`.
    if let Some(item) = self.leo.consult(&key) {
      self.leo.note_completion();
      let hop = LeoHop { situation: item.waiting_situation, position: origin, origin: item.waiting_origin };
      crate::trace_leo!(self.diagnostics, "set {} completes {:?}: leo consult hits situation {:?}", building.position, lhs, item.waiting_situation);
      self.advance_waiter(building, item.waiting_situation, item.waiting_origin, completed_id, Some(hop), grammar, interners, peeked, worklist);
      return;
    }

    let waiters = self.lookup_waiters(origin, lhs, building, grammar, interners);
    if waiters.is_empty() {
      return;
    }

    // Condition (a): the origin set has exactly one waiter. Condition
    // (b): advancing it past the just-completed nonterminal leaves no
    // remaining RHS symbols, i.e. it finishes its own rule too.
    let mut leo_target = None;
    if waiters.len() == 1 {
      let (w, wo) = waiters[0];
      let s = *interners.situation(w);
      if grammar.rule(s.rule).is_complete(s.dot + 1) {
        self.leo.register(key, LeoItem { waiting_situation: w, waiting_origin: wo });
        leo_target = Some(w);
        crate::trace_leo!(self.diagnostics, "set {} completes {:?}: registers leo hop via situation {:?}", building.position, lhs, w);
      }
    }

    for (waiter, waiter_origin) in waiters {
      let hop = (Some(waiter) == leo_target).then(|| LeoHop { situation: waiter, position: origin, origin: waiter_origin });
      self.advance_waiter(building, waiter, waiter_origin, completed_id, hop, grammar, interners, peeked, worklist);
    }
  }

  /// Advances a single waiting situation past the nonterminal it just saw
  /// completed, recording the source link (and, when `hop` is `Some`, the
  /// Leo hop the forest extractor needs to reconstruct the collapsed
  /// intermediate node on demand).
  fn advance_waiter(
    &mut self,
    building: &mut BuildingSet,
    waiter: SituationId,
    waiter_origin: u32,
    completed_id: SituationId,
    hop: Option<LeoHop>,
    grammar: &GrammarStore,
    interners: &mut Interners,
    peeked: Option<ScannedToken>,
    worklist: &mut VecDeque<(SituationId, u32)>,
  ) {
    let waiter_situation = *interners.situation(waiter);
    let advanced = waiter_situation.advanced();
    let advanced_id = interners.intern_situation(advanced);
    if !passes_filter(advanced_id, peeked, self.config.lookahead_level, grammar, interners) {
      return;
    }
    let after = grammar.rule(advanced.rule).symbol_after(advanced.dot);
    building.try_add(advanced_id, waiter_origin, after, worklist);
    self.sources.record(
      building.position,
      advanced_id,
      Source::Complete { from_position: waiter_origin, from_situation: waiter, sub_position: building.position, sub_situation: completed_id, leo_hops: hop.into_iter().collect() },
    );
  }

  fn lookup_waiters(
    &mut self,
    origin: u32,
    nonterminal: crate::types::NonterminalId,
    building: &BuildingSet,
    grammar: &GrammarStore,
    interners: &Interners,
  ) -> Vec<(SituationId, u32)> {
    if origin == building.position {
      return building.waiters.get(&nonterminal).cloned().unwrap_or_default();
    }
    let Some(set_id) = self.parser_list.get(origin as usize).copied() else { return Vec::new() };
    let set = interners.set(set_id).clone();
    let core_id = set.core;
    if !self.core_index_cache.contains_key(&core_id) {
      let core = interners.set_core(core_id).clone();
      let index = CoreIndex::build(&core, grammar, interners);
      self.core_index_cache.insert(core_id, index);
    }
    let core = interners.set_core(core_id);
    let index = &self.core_index_cache[&core_id];
    index
      .waiters
      .get(&nonterminal)
      .map(|positions| {
        positions
          .iter()
          .map(|&position_in_core| {
            let situation_id = core.situations[position_in_core];
            let waiter_origin = if position_in_core < core.start_count { set.origin_of_start(origin, position_in_core) } else { origin };
            (situation_id, waiter_origin)
          })
          .collect()
      })
      .unwrap_or_default()
  }

  fn scan(
    &mut self,
    set_id: EarleySetId,
    position: u32,
    token: ScannedToken,
    grammar: &GrammarStore,
    interners: &mut Interners,
  ) -> Vec<(SituationId, SituationId, u32)> {
    let set = interners.set(set_id).clone();
    let core = interners.set_core(set.core).clone();
    let mut scanned = Vec::new();
    for (index, situation_id) in core.situations.iter().enumerate() {
      let situation = *interners.situation(*situation_id);
      let rule = grammar.rule(situation.rule);
      let Some(SymbolId::Terminal(terminal)) = rule.symbol_after(situation.dot) else { continue };
      if grammar.terminal(terminal).code != token.code {
        continue;
      }
      let advanced = situation.advanced();
      let advanced_id = interners.intern_situation(advanced);
      let origin = if index < core.start_count { set.origin_of_start(position, index) } else { position };
      scanned.push((advanced_id, *situation_id, origin));
    }
    scanned
  }

  fn finalize(&mut self, building: BuildingSet, reached_via: Option<i64>, interners: &mut Interners) -> EarleySetId {
    let mut starts: Vec<(SituationId, u32)> = Vec::new();
    let mut non_starts: Vec<SituationId> = Vec::new();
    for (situation_id, origin) in &building.order {
      if *origin == building.position {
        non_starts.push(*situation_id);
      } else {
        starts.push((*situation_id, building.position - origin));
      }
    }
    // A dotted item can appear as a start situation more than once, each
    // occurrence with its own origin/distance — keep every entry (and its
    // paired distance) rather than deduplicating on the id alone.
    starts.sort_by_key(|(id, distance)| (id.0, *distance));
    non_starts.sort_by_key(|id| id.0);
    let mut situations = Vec::with_capacity(starts.len() + non_starts.len());
    let mut distances = Vec::with_capacity(starts.len());
    for (id, distance) in &starts {
      situations.push(*id);
      distances.push(*distance);
    }
    situations.extend(non_starts);
    let core = SetCore { reached_via, situations, start_count: starts.len() };
    let core_id = interners.intern_set_core(core);
    let set = EarleySet { core: core_id, distances };
    interners.intern_set(set)
  }

  fn check_acceptance(&self, grammar: &GrammarStore, augmented: crate::types::NonterminalId, interners: &Interners) -> bool {
    let Some(last) = self.parser_list.last() else { return false };
    let set = interners.set(*last);
    let core = interners.set_core(set.core);
    for (index, situation_id) in core.situations.iter().enumerate() {
      let situation = interners.situation(*situation_id);
      let rule = grammar.rule(situation.rule);
      if rule.lhs != augmented || !rule.is_complete(situation.dot) {
        continue;
      }
      let origin = if index < core.start_count { set.origin_of_start((self.parser_list.len() - 1) as u32, index) } else { (self.parser_list.len() - 1) as u32 };
      if origin == 0 {
        return true;
      }
    }
    false
  }

  /// Bounded speculative resynchronization (spec.md S4.9). Buffers up to
  /// `recovery_match` further tokens to score candidate skip counts without
  /// losing them from the real stream, then resumes the main loop from the
  /// chosen point.
  fn attempt_recovery(
    &mut self,
    failure_position: u32,
    failing_token: ScannedToken,
    grammar: &GrammarStore,
    interners: &mut Interners,
    read_token: &mut dyn FnMut() -> ScannedToken,
  ) -> Option<BuildingSet> {
    let admission = recovery::find_most_recent_error_admission(&self.parser_list, grammar, interners)?;

    let mut trial_tokens = vec![failing_token];
    for _ in 0..self.config.recovery_match {
      trial_tokens.push(self.pull_token(read_token));
    }

    let mut candidates = Vec::new();
    for skip in 0..trial_tokens.len() as u32 {
      let consumed = self.score_candidate(admission.set_position, admission.situation, &trial_tokens[skip as usize..], grammar, interners);
      candidates.push(RecoveryCandidate { tokens_discarded: skip, tokens_consumed: consumed });
    }
    let chosen = recovery::best_candidate(&candidates)?;

    for token in trial_tokens.iter().skip(chosen.tokens_discarded as usize).rev() {
      self.token_buffer.push_front(*token);
    }

    let start_ignored = failure_position;
    let start_recovered = failure_position + chosen.tokens_discarded;
    self.recovery_events.push(RecoveryEvent { error_token: failure_position, start_ignored: Some(start_ignored), start_recovered: Some(start_recovered) });

    while self.parser_list.len() as u32 > admission.set_position + 1 {
      self.parser_list.pop();
    }

    let advanced = interners.situation(admission.situation).advanced();
    let advanced_id = interners.intern_situation(advanced);
    let mut building = BuildingSet::new(admission.set_position + 1);
    let mut worklist = VecDeque::new();
    if building.try_add(advanced_id, admission.set_position, grammar.rule(advanced.rule).symbol_after(advanced.dot), &mut worklist) {
      self.sources.record(
        admission.set_position + 1,
        advanced_id,
        Source::Recovered { from_position: admission.set_position, from_situation: admission.situation, span: (start_ignored, start_recovered) },
      );
    }
    self.run_closure(&mut building, None, grammar, interners, &mut worklist);
    Some(building)
  }

  /// Runs a disposable trial scan/closure loop starting from the
  /// error-admitting situation, counting how many of `tokens` it can
  /// consume before the first one it cannot (spec.md S4.9 step 3). Does
  /// not mutate `self.parser_list` or any interned state beyond situation
  /// interning (harmless: situations are pure data, re-interning existing
  /// ones is a no-op).
  fn score_candidate(
    &mut self,
    admission_position: u32,
    admission_situation: SituationId,
    tokens: &[ScannedToken],
    grammar: &GrammarStore,
    interners: &mut Interners,
  ) -> u32 {
    let advanced = interners.situation(admission_situation).advanced();
    let advanced_id = interners.intern_situation(advanced);
    let mut building = BuildingSet::new(admission_position + 1);
    let mut worklist = VecDeque::new();
    building.try_add(advanced_id, admission_position, grammar.rule(advanced.rule).symbol_after(advanced.dot), &mut worklist);
    self.run_closure(&mut building, None, grammar, interners, &mut worklist);

    let mut consumed = 0;
    for token in tokens {
      if token.is_end_of_input() {
        break;
      }
      let finalized = self.finalize_trial(&building, interners);
      let scanned = self.scan(finalized, building.position, *token, grammar, interners);
      if scanned.is_empty() {
        break;
      }
      let mut next = BuildingSet::new(building.position + 1);
      let mut next_worklist = VecDeque::new();
      for (new_id, _, origin) in scanned {
        let after = interners.situation(new_id).dot_symbol(grammar);
        next.try_add(new_id, origin, after, &mut next_worklist);
      }
      self.run_closure(&mut next, None, grammar, interners, &mut next_worklist);
      building = next;
      consumed += 1;
    }
    consumed
  }

  fn finalize_trial(&self, building: &BuildingSet, interners: &mut Interners) -> EarleySetId {
    let mut starts: Vec<(SituationId, u32)> = Vec::new();
    let mut non_starts: Vec<SituationId> = Vec::new();
    for (situation_id, origin) in &building.order {
      if *origin == building.position {
        non_starts.push(*situation_id);
      } else {
        starts.push((*situation_id, building.position - origin));
      }
    }
    starts.sort_by_key(|(id, distance)| (id.0, *distance));
    non_starts.sort_by_key(|id| id.0);
    let mut situations = Vec::with_capacity(starts.len() + non_starts.len());
    let mut distances = Vec::with_capacity(starts.len());
    for (id, distance) in &starts {
      situations.push(*id);
      distances.push(*distance);
    }
    situations.extend(non_starts);
    let core = SetCore { reached_via: None, situations, start_count: starts.len() };
    let core_id = interners.intern_set_core(core);
    interners.intern_set(EarleySet { core: core_id, distances })
  }
}

fn predict_context(
  parent_rule: &Rule,
  parent_dot: u16,
  parent_context: Option<crate::types::TermSetId>,
  level: LookaheadLevel,
  grammar: &GrammarStore,
  interners: &mut Interners,
) -> Option<crate::types::TermSetId> {
  if level == LookaheadLevel::Static {
    return None;
  }
  let terminal_count = grammar.terminals.len();
  let mut ctx = TermSet::empty(terminal_count);
  let mut tail_nullable = true;
  for symbol in &parent_rule.rhs[(parent_dot as usize + 1)..] {
    match symbol {
      SymbolId::Terminal(t) => {
        ctx.insert(t.0 as usize);
        tail_nullable = false;
        break;
      }
      SymbolId::Nonterminal(n) => {
        let addition = grammar.first[n.0 as usize].clone();
        ctx.union_with(&addition);
        if !grammar.nullable[n.0 as usize] {
          tail_nullable = false;
          break;
        }
      }
    }
  }
  if tail_nullable {
    match level {
      LookaheadLevel::Local => {
        let follow = grammar.follow[parent_rule.lhs.0 as usize].clone();
        ctx.union_with(&follow);
      }
      LookaheadLevel::Dynamic => {
        if let Some(pc) = parent_context {
          let inherited = interners.term_set(pc).clone();
          ctx.union_with(&inherited);
        } else {
          let follow = grammar.follow[parent_rule.lhs.0 as usize].clone();
          ctx.union_with(&follow);
        }
      }
      LookaheadLevel::Static => unreachable!(),
    }
  }
  Some(interners.intern_term_set(ctx))
}

fn passes_filter(
  situation_id: SituationId,
  peeked: Option<ScannedToken>,
  level: LookaheadLevel,
  grammar: &GrammarStore,
  interners: &Interners,
) -> bool {
  if level == LookaheadLevel::Static {
    return true;
  }
  let Some(token) = peeked else { return true };
  if token.is_end_of_input() {
    return true;
  }
  let situation = interners.situation(situation_id);
  let Some(ctx_id) = situation.lookahead else { return true };
  let Some(terminal_id) = grammar.terminal_by_code(token.code) else { return true };
  interners.term_set(ctx_id).contains(terminal_id.0 as usize)
}

impl Situation {
  /// The symbol after this situation's dot, resolved against `grammar`.
  /// Small convenience used where only a bare `Situation` (not the rule)
  /// is at hand.
  fn dot_symbol(&self, grammar: &GrammarStore) -> Option<SymbolId> {
    grammar.rule(self.rule).symbol_after(self.dot)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compile::compute_first_follow;
  use earley_runtime::{ScannedToken, Token};

  fn build_expr_grammar() -> (GrammarStore, crate::types::TerminalId, crate::types::TerminalId) {
    let mut store = GrammarStore::new();
    let num = store.declare_terminal("NUM", 2, Token::empty()).unwrap();
    let plus = store.declare_terminal("PLUS", 1, Token::empty()).unwrap();
    let expr = store.declare_nonterminal("Expr");
    let n = store.declare_nonterminal("Num");
    store.add_rule(expr, vec![SymbolId::Nonterminal(expr), SymbolId::Terminal(plus), SymbolId::Nonterminal(n)], None);
    store.add_rule(expr, vec![SymbolId::Nonterminal(n)], None);
    store.add_rule(n, vec![SymbolId::Terminal(num)], None);
    store.set_start_symbol(expr);
    store.validate().unwrap();
    compute_first_follow(&mut store);
    (store, num, plus)
  }

  #[test]
  fn accepts_a_simple_expression() {
    let (grammar, _num, _plus) = build_expr_grammar();
    let mut interners = Interners::new();
    let mut codes = VecDeque::from(vec![
      ScannedToken::new(2, Default::default()),
      ScannedToken::new(1, Default::default()),
      ScannedToken::new(2, Default::default()),
      ScannedToken::new(-1, Default::default()),
    ]);
    let builder = ListBuilder::new(ParserConfig::new(), Diagnostics::default());
    let outcome = builder.run(&grammar, &mut interners, &mut || codes.pop_front().unwrap()).unwrap();
    assert!(outcome.accepted);
  }

  #[test]
  fn rejects_a_malformed_expression_without_recovery() {
    let (grammar, _num, plus) = build_expr_grammar();
    let mut interners = Interners::new();
    let mut codes = VecDeque::from(vec![ScannedToken::new(1, Default::default()), ScannedToken::new(-1, Default::default())]);
    let _ = plus;
    let builder = ListBuilder::new(ParserConfig::new(), Diagnostics::default());
    let result = builder.run(&grammar, &mut interners, &mut || codes.pop_front().unwrap());
    assert!(result.is_err());
  }

  #[test]
  fn leo_right_recursion_parses_and_reports_stats() {
    let mut store = GrammarStore::new();
    let a = store.declare_terminal("a", 1, Token::empty()).unwrap();
    let b = store.declare_terminal("b", 2, Token::empty()).unwrap();
    let s = store.declare_nonterminal("S");
    store.add_rule(s, vec![SymbolId::Nonterminal(s), SymbolId::Terminal(a)], None);
    store.add_rule(s, vec![SymbolId::Terminal(b)], None);
    store.set_start_symbol(s);
    store.validate().unwrap();
    compute_first_follow(&mut store);
    let mut interners = Interners::new();
    let mut codes = VecDeque::from(vec![
      ScannedToken::new(2, Default::default()),
      ScannedToken::new(1, Default::default()),
      ScannedToken::new(1, Default::default()),
      ScannedToken::new(1, Default::default()),
      ScannedToken::new(-1, Default::default()),
    ]);
    let config = ParserConfig::new().lookahead_level(LookaheadLevel::Local);
    let builder = ListBuilder::new(config, Diagnostics::default());
    let outcome = builder.run(&store, &mut interners, &mut || codes.pop_front().unwrap()).unwrap();
    assert!(outcome.accepted);
    assert!(outcome.leo_stats.n_items >= 1);
  }
}
