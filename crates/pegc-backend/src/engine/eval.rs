use pegc_runtime::{CharClass, Expectation, ParseError, Span, Value};

use crate::ast::{Expr, ExprKind, RcString};

use super::{callbacks::Context, Activation, Outcome, ParseState};

fn pos_index(expr: &Expr) -> u32 {
    match expr.pos_index {
        Some(index) => index,
        None => unreachable!("{} has no position slot", expr.kind.name()),
    }
}

fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

impl<'p> ParseState<'p> {
    /// Matches `expr` at the cursor. On success the cursor is past the match and the value is
    /// in the expression's result slot, on failure the cursor is where it started.
    ///
    /// `Err` aborts the whole parse, no construct recovers from it.
    pub(super) fn eval(
        &mut self,
        expr: &'p Expr,
        act: &mut Activation,
    ) -> Result<Outcome, ParseError> {
        let index = expr.result_index;
        let outcome = match &expr.kind {
            ExprKind::Literal { text, ignore_case } => self.eval_literal(text, *ignore_case, index, act),
            ExprKind::Class(class) => self.eval_class(class, index, act),
            ExprKind::Any => match self.peek() {
                Some(ch) => {
                    self.tracker.matched(self.cursor, Expectation::Any);
                    self.advance(ch, index, act)
                }
                None => {
                    self.tracker.expect(self.cursor, Expectation::Any);
                    Outcome::Failed
                }
            },
            ExprKind::RuleRef(handle) => {
                let (outcome, value) = self.call_rule(*handle)?;
                act.set(index, value);
                outcome
            }
            ExprKind::UnresolvedRef(name) => {
                unreachable!("Reference to `{name}` should have been resolved")
            }
            ExprKind::Sequence(elements) => self.eval_sequence(expr, elements, act, false)?,
            ExprKind::Choice(alternatives) => {
                let mut outcome = Outcome::Failed;
                for alternative in alternatives {
                    outcome = self.eval(alternative, act)?;
                    if outcome.is_matched() {
                        break;
                    }
                }
                outcome
            }
            ExprKind::Action { code, expr: child } => self.eval_action(expr, code, child, act)?,
            ExprKind::Labeled { expr: child, .. } => self.eval(child, act)?,
            ExprKind::Named { name, expr: child } => {
                let start = self.cursor;
                self.tracker.begin(start);
                self.tracker.enter_silent();
                let outcome = self.eval(child, act)?;
                self.tracker.leave_silent();
                self.tracker.end(false);
                let expected = Expectation::other(name.clone());
                match outcome {
                    Outcome::Matched => self.tracker.matched(start, expected),
                    Outcome::Failed => self.tracker.expect(start, expected),
                }
                outcome
            }
            ExprKind::Optional(child) => {
                if self.eval(child, act)?.is_failed() {
                    act.set(index, Value::Null);
                }
                Outcome::Matched
            }
            ExprKind::ZeroOrMore(child) => {
                self.eval_repetition(child, index, act)?;
                Outcome::Matched
            }
            ExprKind::OneOrMore(child) => Outcome::from_bool(self.eval_repetition(child, index, act)? > 0),
            ExprKind::SimpleAnd(child) => {
                let pos_index = pos_index(expr);
                act.save_pos(pos_index, self.cursor);
                let outcome = self.eval(child, act)?;
                self.cursor = act.pos(pos_index);
                act.set(index, Value::Null);
                outcome
            }
            ExprKind::SimpleNot(child) => {
                let pos_index = pos_index(expr);
                act.save_pos(pos_index, self.cursor);
                self.tracker.begin_not(self.cursor);
                let outcome = self.eval(child, act)?;
                self.tracker.end_not(outcome.is_matched());
                self.cursor = act.pos(pos_index);
                act.set(index, Value::Null);
                outcome.invert()
            }
            ExprKind::SemanticAnd(code) => {
                let matched = self.run_predicate(code, act)?;
                act.set(index, Value::Null);
                Outcome::from_bool(matched)
            }
            ExprKind::SemanticNot(code) => {
                let matched = self.run_predicate(code, act)?;
                act.set(index, Value::Null);
                Outcome::from_bool(!matched)
            }
        };
        Ok(outcome)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.cursor..].chars().next()
    }

    /// Consumes `ch`, which must be the next character, and stores it as the value.
    fn advance(&mut self, ch: char, index: u32, act: &mut Activation) -> Outcome {
        let end = self.cursor + ch.len_utf8();
        act.set(index, Value::Str(self.input[self.cursor..end].into()));
        self.cursor = end;
        Outcome::Matched
    }

    fn eval_literal(
        &mut self,
        text: &RcString,
        ignore_case: bool,
        index: u32,
        act: &mut Activation,
    ) -> Outcome {
        match self.match_literal(text, ignore_case) {
            Some(end) => {
                self.tracker
                    .matched(self.cursor, Expectation::literal(text.clone(), ignore_case));
                act.set(index, Value::Str(self.input[self.cursor..end].into()));
                self.cursor = end;
                Outcome::Matched
            }
            None => {
                self.tracker
                    .expect(self.cursor, Expectation::literal(text.clone(), ignore_case));
                Outcome::Failed
            }
        }
    }

    /// End offset of `text` if the input continues with it.
    fn match_literal(&self, text: &str, ignore_case: bool) -> Option<usize> {
        let rest = &self.input[self.cursor..];
        if !ignore_case {
            return match rest.starts_with(text) {
                true => Some(self.cursor + text.len()),
                false => None,
            };
        }

        let mut end = self.cursor;
        let mut chars = rest.chars();
        for expected in text.chars() {
            let ch = chars.next()?;
            if !eq_ignore_case(ch, expected) {
                return None;
            }
            end += ch.len_utf8();
        }
        Some(end)
    }

    fn eval_class(&mut self, class: &CharClass, index: u32, act: &mut Activation) -> Outcome {
        match self.peek() {
            Some(ch) if class.matches(ch) => {
                self.tracker
                    .matched(self.cursor, Expectation::Class(class.clone()));
                self.advance(ch, index, act)
            }
            _ => {
                self.tracker
                    .expect(self.cursor, Expectation::Class(class.clone()));
                Outcome::Failed
            }
        }
    }

    /// With `keep_bindings` the labels of the elements stay in scope after a successful
    /// match, for the enclosing action to read. The sequence's own value is not built then,
    /// the action replaces it.
    fn eval_sequence(
        &mut self,
        expr: &'p Expr,
        elements: &'p [Expr],
        act: &mut Activation,
        keep_bindings: bool,
    ) -> Result<Outcome, ParseError> {
        let index = expr.result_index;
        let Some(pos_index) = expr.pos_index else {
            act.set(index, Value::List(Vec::new()));
            return Ok(Outcome::Matched);
        };

        act.save_pos(pos_index, self.cursor);
        let mark = act.bindings.len();
        for element in elements {
            if self.eval(element, act)?.is_failed() {
                self.cursor = act.pos(pos_index);
                act.bindings.truncate(mark);
                return Ok(Outcome::Failed);
            }
            if let ExprKind::Labeled { label, .. } = &element.kind {
                act.bindings.push((label.clone(), element.result_index));
            }
        }

        match keep_bindings {
            true => act.set(index, Value::Null),
            false => {
                let values = elements
                    .iter()
                    .map(|element| act.take(element.result_index))
                    .collect();
                act.set(index, Value::List(values));
                act.bindings.truncate(mark);
            }
        }
        Ok(Outcome::Matched)
    }

    fn eval_action(
        &mut self,
        expr: &'p Expr,
        code: &RcString,
        child: &'p Expr,
        act: &mut Activation,
    ) -> Result<Outcome, ParseError> {
        let pos_index = pos_index(expr);
        act.save_pos(pos_index, self.cursor);
        let mark = act.bindings.len();

        let outcome = match &child.kind {
            ExprKind::Sequence(elements) => self.eval_sequence(child, elements, act, true)?,
            _ => self.eval(child, act)?,
        };
        if outcome.is_failed() {
            act.bindings.truncate(mark);
            return Ok(Outcome::Failed);
        }
        if let ExprKind::Labeled { label, .. } = &child.kind {
            act.bindings.push((label.clone(), child.result_index));
        }

        let span = Span::new(act.pos(pos_index), self.cursor);
        let value = self.run_action(code, span, act);
        act.bindings.truncate(mark);
        act.set(expr.result_index, value?);
        Ok(Outcome::Matched)
    }

    /// Matches `child` as many times as possible, collecting the values into the list at
    /// `index`. Returns the number of matches.
    fn eval_repetition(
        &mut self,
        child: &'p Expr,
        index: u32,
        act: &mut Activation,
    ) -> Result<usize, ParseError> {
        act.set(index, Value::List(Vec::new()));
        let mut count = 0;
        loop {
            let start = self.cursor;
            if self.eval(child, act)?.is_failed() {
                break;
            }
            let value = act.take(child.result_index);
            act.push_element(index, value);
            count += 1;
            // would loop forever, compiled grammars reject such repetitions
            if self.cursor == start {
                break;
            }
        }
        Ok(count)
    }

    fn run_action(
        &mut self,
        code: &RcString,
        span: Span,
        act: &Activation,
    ) -> Result<Value, ParseError> {
        let parser = self.parser;
        let Some(action) = parser.callbacks.get_action(code) else {
            unreachable!("Action `{code}` has no callback")
        };
        let mut cx = Context::new(
            self.input,
            span,
            &act.bindings,
            &act.slots,
            &mut self.positions,
        );
        action(&mut cx)
    }

    fn run_predicate(&mut self, code: &RcString, act: &Activation) -> Result<bool, ParseError> {
        let parser = self.parser;
        let Some(predicate) = parser.callbacks.get_predicate(code) else {
            unreachable!("Predicate `{code}` has no callback")
        };
        let mut cx = Context::new(
            self.input,
            Span::at(self.cursor),
            &act.bindings,
            &act.slots,
            &mut self.positions,
        );
        predicate(&mut cx)
    }
}
