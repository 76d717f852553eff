use std::collections::HashMap;

use pegc_runtime::{Expectation, Location, ParseError, PositionCache, Span, Value};

use crate::ast::RcString;

use super::Slot;

pub type ActionFn = dyn Fn(&mut Context<'_, '_>) -> Result<Value, ParseError>;
pub type PredicateFn = dyn Fn(&mut Context<'_, '_>) -> Result<bool, ParseError>;

/// User code attached to the grammar, keyed by the code string of the `Action`,
/// `SemanticAnd` and `SemanticNot` nodes that invoke it.
#[derive(Default)]
pub struct Callbacks {
    actions: HashMap<RcString, Box<ActionFn>>,
    predicates: HashMap<RcString, Box<PredicateFn>>,
}

impl Callbacks {
    pub fn new() -> Callbacks {
        Self::default()
    }
    pub fn action(
        mut self,
        code: &str,
        f: impl Fn(&mut Context<'_, '_>) -> Result<Value, ParseError> + 'static,
    ) -> Callbacks {
        self.actions.insert(code.into(), Box::new(f));
        self
    }
    pub fn predicate(
        mut self,
        code: &str,
        f: impl Fn(&mut Context<'_, '_>) -> Result<bool, ParseError> + 'static,
    ) -> Callbacks {
        self.predicates.insert(code.into(), Box::new(f));
        self
    }
    pub fn get_action(&self, code: &str) -> Option<&ActionFn> {
        self.actions.get(code).map(|f| &**f)
    }
    pub fn get_predicate(&self, code: &str) -> Option<&PredicateFn> {
        self.predicates.get(code).map(|f| &**f)
    }
    pub fn action_codes(&self) -> impl Iterator<Item = &RcString> {
        self.actions.keys()
    }
    pub fn predicate_codes(&self) -> impl Iterator<Item = &RcString> {
        self.predicates.keys()
    }
}

/// What a callback can see of the parse: the matched range, the labeled values in scope and
/// ways to fail the whole parse.
///
/// For predicates the range is empty and sits at the current position.
pub struct Context<'a, 'src> {
    input: &'src str,
    span: Span,
    bindings: &'a [(RcString, u32)],
    slots: &'a [Slot],
    positions: &'a mut PositionCache<'src>,
}

impl<'a, 'src> Context<'a, 'src> {
    pub(super) fn new(
        input: &'src str,
        span: Span,
        bindings: &'a [(RcString, u32)],
        slots: &'a [Slot],
        positions: &'a mut PositionCache<'src>,
    ) -> Context<'a, 'src> {
        Context {
            input,
            span,
            bindings,
            slots,
            positions,
        }
    }

    /// The matched input.
    pub fn text(&self) -> &'src str {
        self.span.as_str(self.input)
    }
    pub fn offset(&self) -> usize {
        self.span.start()
    }
    pub fn range(&self) -> Span {
        self.span
    }
    pub fn location(&mut self) -> Location {
        self.positions.location(self.span)
    }

    /// Value of the innermost binding of `label` visible at this point.
    pub fn get(&self, label: &str) -> Option<&'a Value> {
        let slots = self.slots;
        self.bindings
            .iter()
            .rev()
            .find(|(name, _)| &**name == label)
            .and_then(|&(_, index)| match &slots[index as usize] {
                Slot::Value(value) => Some(value),
                Slot::Empty | Slot::Pos(_) => None,
            })
    }

    /// Fails the parse with `message`, located at the matched range.
    pub fn error(&mut self, message: impl Into<String>) -> ParseError {
        let location = self.location();
        ParseError::simple(message, location)
    }
    pub fn error_at(&self, message: impl Into<String>, location: Location) -> ParseError {
        ParseError::simple(message, location)
    }

    /// Fails the parse claiming `description` was expected instead of the matched text.
    pub fn expected(&mut self, description: &str) -> ParseError {
        let location = self.location();
        self.expected_at(description, location)
    }
    pub fn expected_at(&self, description: &str, location: Location) -> ParseError {
        let found = match self.span.is_empty() {
            true => None,
            false => Some(self.text().to_owned()),
        };
        ParseError::structured(vec![Expectation::other(description)], found, location)
    }
}
