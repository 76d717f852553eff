use cranelift_entity::{entity_impl, PrimaryMap};

use crate::{
    ast::{Expr, RcString},
    error::{ErrorAccumulator, GrammarError},
};

use super::{
    check,
    resolve::{self, ResolveCx},
    slots, Rule,
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RuleHandle(u32);

entity_impl! { RuleHandle }

impl RuleHandle {
    pub fn name(self, cx: &Grammar) -> &RcString {
        &cx.rules[self].name
    }
}

/// Ordered rule set, the first rule is the default start rule.
#[derive(Default)]
pub struct Grammar {
    pub rules: PrimaryMap<RuleHandle, Rule>,
}

impl Grammar {
    pub fn new() -> Grammar {
        Self::default()
    }

    pub fn add_rule(&mut self, name: &str, expr: Expr) -> RuleHandle {
        self.rules.push(Rule::new(name, expr))
    }

    /// Builder form of [`Grammar::add_rule`].
    pub fn rule(mut self, name: &str, expr: Expr) -> Grammar {
        self.add_rule(name, expr);
        self
    }

    pub fn get_rule(&self, handle: RuleHandle) -> Option<&Rule> {
        self.rules.get(handle)
    }

    pub fn find_rule(&self, name: &str) -> Option<RuleHandle> {
        self.rules
            .iter()
            .find(|(_, rule)| &*rule.name == name)
            .map(|(handle, _)| handle)
    }

    pub fn start_rule(&self) -> Option<RuleHandle> {
        self.rules.keys().next()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> cranelift_entity::Iter<'_, RuleHandle, Rule> {
        self.rules.iter()
    }

    pub fn iter_mut(&mut self) -> cranelift_entity::IterMut<'_, RuleHandle, Rule> {
        self.rules.iter_mut()
    }

    pub fn resolve(&mut self, err: &ErrorAccumulator) {
        let cx = ResolveCx::new(self, err);
        resolve::resolve(self, &cx);
    }

    pub fn allocate(&mut self) {
        slots::allocate(self);
    }

    /// Resolves references, checks the grammar and lays out the slots of every rule.
    pub fn compile(mut self) -> Result<Grammar, Vec<GrammarError>> {
        let err = ErrorAccumulator::new();
        if self.is_empty() {
            err.error(GrammarError::Empty);
        }
        self.resolve(&err);
        // repetitions can only be analyzed across rules once every reference resolved
        if err.is_empty() {
            check::check_repetitions(&self, &err);
        }
        err.finish()?;

        self.allocate();
        Ok(self)
    }

    pub fn display_into(&self, buf: &mut dyn std::fmt::Write) -> std::fmt::Result {
        for (_, rule) in self.rules.iter() {
            write!(buf, "\n")?;
            match rule.result_count {
                Some(count) => write!(buf, "{} = ({} slots)\n", rule.name, count)?,
                None => write!(buf, "{} =\n", rule.name)?,
            }
            rule.expr.display_into_indent(buf, self, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn grammar() -> Grammar {
        Grammar::new()
            .rule(
                "start",
                Expr::sequence(vec![Expr::literal("a").labeled("x"), Expr::rule("b")])
                    .action("pair"),
            )
            .rule("b", Expr::literal("b").optional())
    }

    #[test]
    fn test_find_rule() {
        let grammar = grammar();
        let b = grammar.find_rule("b").unwrap();
        assert_eq!(&**b.name(&grammar), "b");
        assert_eq!(grammar.start_rule(), grammar.find_rule("start"));
        assert_eq!(grammar.find_rule("c"), None);
    }

    #[test]
    fn test_display() {
        let grammar = grammar().compile().unwrap();
        let mut buf = String::new();
        grammar.display_into(&mut buf).unwrap();

        let expected = r#"
start = (5 slots)
  Action {pair} [0, pos 0]
    Sequence [1, pos 2]
      Labeled x: [3]
        Literal "a" [3]
      RuleRef b [4]

b = (1 slots)
  Optional [0]
    Literal "b" [0]
"#;
        assert_eq!(buf, expected);
    }
}
