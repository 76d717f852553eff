use std::cell::RefCell;

use crate::ast::RcString;

/// Problems with the grammar itself, as opposed to the input being parsed.
#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("Grammar has no rules")]
    Empty,
    #[error("Duplicate rule name `{0}`")]
    DuplicateRule(RcString),
    #[error("Rule `{rule}` references undefined rule `{name}`")]
    UndefinedRule { rule: RcString, name: RcString },
    #[error("Rule `{rule}` contains a repetition which may match without consuming input")]
    InfiniteRepetition { rule: RcString },
    #[error("Rule `{rule}` uses action `{code}` which has no callback")]
    MissingAction { rule: RcString, code: RcString },
    #[error("Rule `{rule}` uses predicate `{code}` which has no callback")]
    MissingPredicate { rule: RcString, code: RcString },
    #[error("Rule `{0}` still contains references by name")]
    Unresolved(RcString),
    #[error("Rule `{0}` has no slot layout")]
    NotAllocated(RcString),
}

#[derive(Default)]
pub struct ErrorAccumulator {
    errors: RefCell<Vec<GrammarError>>,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn error(&self, err: GrammarError) {
        log::debug!("{err}");
        self.errors.borrow_mut().push(err);
    }
    pub fn get(&self) -> std::cell::Ref<Vec<GrammarError>> {
        self.errors.borrow()
    }
    pub fn is_empty(&self) -> bool {
        self.errors.borrow().is_empty()
    }
    /// Drains the accumulated errors, `Ok` if there were none.
    pub fn finish(&self) -> Result<(), Vec<GrammarError>> {
        let errors = std::mem::take(&mut *self.errors.borrow_mut());
        match errors.is_empty() {
            true => Ok(()),
            false => Err(errors),
        }
    }
}

#[test]
fn test_accumulator() {
    let err = ErrorAccumulator::new();
    assert!(err.finish().is_ok());

    err.error(GrammarError::DuplicateRule("a".into()));
    err.error(GrammarError::Empty);
    assert_eq!(err.get().len(), 2);
    assert_eq!(
        err.get()[0].to_string(),
        "Duplicate rule name `a`".to_owned()
    );

    let errors = err.finish().unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(err.is_empty());
}
