//! Replaces references by name with rule handles. Rule names form a single flat namespace.

use std::collections::{hash_map::Entry, HashMap};

use cranelift_entity::EntitySet;

use crate::{
    ast::{ExprKind, RcString},
    error::{ErrorAccumulator, GrammarError},
};

use super::grammar::{Grammar, RuleHandle};

pub struct ResolveCx<'a> {
    pub err: &'a ErrorAccumulator,
    pub name_to_rule: HashMap<RcString, RuleHandle>,
}

impl<'a> ResolveCx<'a> {
    pub fn new(grammar: &Grammar, err: &'a ErrorAccumulator) -> ResolveCx<'a> {
        let mut this = ResolveCx {
            err,
            name_to_rule: HashMap::new(),
        };
        this.populate(grammar);
        this
    }

    fn populate(&mut self, grammar: &Grammar) {
        for (handle, rule) in grammar.iter() {
            match self.name_to_rule.entry(rule.name.clone()) {
                Entry::Occupied(_) => self
                    .err
                    .error(GrammarError::DuplicateRule(rule.name.clone())),
                Entry::Vacant(v) => {
                    v.insert(handle);
                }
            }
        }
    }
}

pub fn resolve(grammar: &mut Grammar, cx: &ResolveCx) {
    for (_, rule) in grammar.iter_mut() {
        let rule_name = &rule.name;
        rule.expr.visit_mut(|expr| {
            if let ExprKind::UnresolvedRef(name) = &expr.kind {
                match cx.name_to_rule.get(name) {
                    Some(&handle) => expr.kind = ExprKind::RuleRef(handle),
                    None => cx.err.error(GrammarError::UndefinedRule {
                        rule: rule_name.clone(),
                        name: name.clone(),
                    }),
                }
            }
        });
    }

    if let Some(start) = grammar.start_rule() {
        let reachable = reachable_rules(grammar, start);
        for (handle, rule) in grammar.iter() {
            if !reachable.contains(handle) {
                log::debug!("Rule `{}` is unreachable from `{}`", rule.name, start.name(grammar));
            }
        }
    }
}

/// Rules transitively referenced from `start`, including itself.
pub fn reachable_rules(grammar: &Grammar, start: RuleHandle) -> EntitySet<RuleHandle> {
    let mut visited = EntitySet::new();
    let mut stack = vec![start];
    while let Some(handle) = stack.pop() {
        if visited.contains(handle) {
            continue;
        }
        visited.insert(handle);
        grammar.rules[handle].expr.visit(|expr| {
            if let ExprKind::RuleRef(next) = expr.kind {
                stack.push(next);
            }
        });
    }
    visited
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::Expr;

    #[test]
    fn test_resolve() {
        let mut grammar = Grammar::new()
            .rule("a", Expr::sequence(vec![Expr::rule("b"), Expr::rule("a")]))
            .rule("b", Expr::literal("b"))
            .rule("c", Expr::rule("b"));
        let err = ErrorAccumulator::new();
        grammar.resolve(&err);
        assert!(err.is_empty());

        let a = grammar.find_rule("a").unwrap();
        let b = grammar.find_rule("b").unwrap();
        let c = grammar.find_rule("c").unwrap();

        let mut refs = Vec::new();
        grammar.rules[a].expr.visit(|expr| {
            if let ExprKind::RuleRef(handle) = expr.kind {
                refs.push(handle);
            }
        });
        assert_eq!(refs, vec![b, a]);

        let reachable = reachable_rules(&grammar, a);
        assert!(reachable.contains(a));
        assert!(reachable.contains(b));
        assert!(!reachable.contains(c));
    }

    #[test]
    fn test_resolve_errors() {
        let mut grammar = Grammar::new()
            .rule("a", Expr::choice(vec![Expr::rule("missing"), Expr::any()]))
            .rule("a", Expr::any());
        let err = ErrorAccumulator::new();
        grammar.resolve(&err);

        assert_eq!(
            err.finish().unwrap_err(),
            vec![
                GrammarError::DuplicateRule("a".into()),
                GrammarError::UndefinedRule {
                    rule: "a".into(),
                    name: "missing".into()
                },
            ]
        );
    }
}
