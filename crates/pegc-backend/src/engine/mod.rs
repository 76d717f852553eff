//! Backtracking interpreter over an allocated [`Grammar`].

pub mod callbacks;
mod eval;

use std::collections::HashSet;

use pegc_runtime::{Expectation, ParseError, PositionCache, Span, Tracker, Value};

use crate::{
    ast::{ExprKind, RcString},
    backend::grammar::{Grammar, RuleHandle},
    error::{ErrorAccumulator, GrammarError},
};

pub use callbacks::{Callbacks, Context};

#[derive(Clone, Default)]
pub struct ParseOptions {
    /// Defaults to the first rule of the grammar.
    pub start_rule: Option<RuleHandle>,
    /// Name of the input, attached to error locations.
    pub source: Option<RcString>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Matched,
    Failed,
}

impl Outcome {
    pub fn from_bool(matched: bool) -> Outcome {
        match matched {
            true => Outcome::Matched,
            false => Outcome::Failed,
        }
    }
    pub fn is_matched(self) -> bool {
        self == Outcome::Matched
    }
    pub fn is_failed(self) -> bool {
        self == Outcome::Failed
    }
    pub fn invert(self) -> Outcome {
        Outcome::from_bool(self.is_failed())
    }
}

/// Content of an activation slot.
#[derive(Clone, Default, Debug)]
pub(crate) enum Slot {
    #[default]
    Empty,
    Pos(usize),
    Value(Value),
}

/// State of one rule invocation.
pub(crate) struct Activation {
    slots: Vec<Slot>,
    /// Labels in scope, innermost last. Indices point into `slots`.
    bindings: Vec<(RcString, u32)>,
}

impl Activation {
    fn new(result_count: u32) -> Activation {
        Activation {
            slots: vec![Slot::Empty; result_count as usize],
            bindings: Vec::new(),
        }
    }
    fn set(&mut self, index: u32, value: Value) {
        self.slots[index as usize] = Slot::Value(value);
    }
    fn take(&mut self, index: u32) -> Value {
        match std::mem::take(&mut self.slots[index as usize]) {
            Slot::Value(value) => value,
            other => unreachable!("Slot {index} holds {other:?} instead of a value"),
        }
    }
    fn save_pos(&mut self, index: u32, pos: usize) {
        self.slots[index as usize] = Slot::Pos(pos);
    }
    fn pos(&self, index: u32) -> usize {
        match self.slots[index as usize] {
            Slot::Pos(pos) => pos,
            ref other => unreachable!("Slot {index} holds {other:?} instead of a position"),
        }
    }
    fn push_element(&mut self, index: u32, value: Value) {
        match &mut self.slots[index as usize] {
            Slot::Value(Value::List(list)) => list.push(value),
            other => unreachable!("Slot {index} holds {other:?} instead of a list"),
        }
    }
}

pub struct Parser {
    grammar: Grammar,
    callbacks: Callbacks,
    start: RuleHandle,
}

impl Parser {
    /// Checks that the grammar has been compiled and that every action and predicate it
    /// uses has a callback.
    pub fn new(grammar: Grammar, callbacks: Callbacks) -> Result<Parser, Vec<GrammarError>> {
        let Some(start) = grammar.start_rule() else {
            return Err(vec![GrammarError::Empty]);
        };

        let err = ErrorAccumulator::new();
        let mut used = HashSet::new();
        for (_, rule) in grammar.iter() {
            if rule.result_count.is_none() {
                err.error(GrammarError::NotAllocated(rule.name.clone()));
            }
            let mut unresolved = false;
            rule.expr.visit(|expr| match &expr.kind {
                ExprKind::UnresolvedRef(_) => unresolved = true,
                ExprKind::Action { code, .. } => {
                    used.insert(code.clone());
                    if callbacks.get_action(code).is_none() {
                        err.error(GrammarError::MissingAction {
                            rule: rule.name.clone(),
                            code: code.clone(),
                        });
                    }
                }
                ExprKind::SemanticAnd(code) | ExprKind::SemanticNot(code) => {
                    used.insert(code.clone());
                    if callbacks.get_predicate(code).is_none() {
                        err.error(GrammarError::MissingPredicate {
                            rule: rule.name.clone(),
                            code: code.clone(),
                        });
                    }
                }
                _ => {}
            });
            if unresolved {
                err.error(GrammarError::Unresolved(rule.name.clone()));
            }
        }
        err.finish()?;

        for code in callbacks.action_codes().chain(callbacks.predicate_codes()) {
            if !used.contains(code) {
                log::warn!("Callback `{code}` is not used by the grammar");
            }
        }

        Ok(Parser {
            grammar,
            callbacks,
            start,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn parse(&self, input: &str) -> Result<Value, ParseError> {
        self.parse_with(input, &ParseOptions::default())
    }

    pub fn parse_with(&self, input: &str, options: &ParseOptions) -> Result<Value, ParseError> {
        let start = options.start_rule.unwrap_or(self.start);
        let mut state = ParseState::new(self, input, options.source.clone());

        let Some(rule) = self.grammar.get_rule(start) else {
            let location = state.positions.location(Span::at(0));
            return Err(ParseError::simple(
                format!("Can't start parsing from rule #{}", start.as_u32()),
                location,
            ));
        };
        log::debug!(
            "Parsing {} bytes starting at rule `{}`",
            input.len(),
            rule.name
        );

        state.tracker.begin(0);

        let (outcome, value) = state.call_rule(start)?;
        if outcome.is_matched() {
            if state.cursor == input.len() {
                log::debug!("Matched the whole input");
                return Ok(value);
            }
            state.tracker.expect(state.cursor, Expectation::End);
        }

        let err = state.into_error();
        log::debug!("Failed at offset {}: {}", err.location.start.offset, err.message);
        Err(err)
    }
}

/// Mutable state of a single `parse` call.
pub(crate) struct ParseState<'p> {
    parser: &'p Parser,
    input: &'p str,
    cursor: usize,
    tracker: Tracker,
    positions: PositionCache<'p>,
}

impl<'p> ParseState<'p> {
    fn new(parser: &'p Parser, input: &'p str, source: Option<RcString>) -> ParseState<'p> {
        ParseState {
            parser,
            input,
            cursor: 0,
            tracker: Tracker::new(),
            positions: PositionCache::new(input, source),
        }
    }

    fn call_rule(&mut self, handle: RuleHandle) -> Result<(Outcome, Value), ParseError> {
        let parser = self.parser;
        let rule = &parser.grammar.rules[handle];
        let result_count = match rule.result_count {
            Some(count) => count,
            None => unreachable!("Rule `{}` has not been allocated", rule.name),
        };

        log::trace!("Enter `{}` at {}", rule.name, self.cursor);
        let mut activation = Activation::new(result_count);
        let outcome = self.eval(&rule.expr, &mut activation)?;
        log::trace!("Leave `{}` at {}: {outcome:?}", rule.name, self.cursor);

        let value = match outcome {
            Outcome::Matched => activation.take(rule.expr.result_index),
            Outcome::Failed => Value::Null,
        };
        Ok((outcome, value))
    }

    fn into_error(self) -> ParseError {
        let ParseState {
            input,
            tracker,
            mut positions,
            ..
        } = self;

        let frame = tracker.into_furthest().unwrap_or_default();
        let found = input[frame.pos..].chars().next();
        let span = match found {
            Some(ch) => Span::new(frame.pos, frame.pos + ch.len_utf8()),
            None => Span::at(frame.pos),
        };
        let found = found.map(|_| span.as_str(input).to_owned());
        let location = positions.location(span);

        match frame.variants.is_empty() {
            true => ParseError::unexpected(found, location),
            false => ParseError::structured(frame.variants, found, location),
        }
    }
}
