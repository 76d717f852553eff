use crate::{
    ast::{Expr, ExprKind},
    error::{ErrorAccumulator, GrammarError},
};

use super::grammar::{Grammar, RuleHandle};

/// Reports `*` and `+` whose operand can succeed without consuming input, matching them
/// would never terminate.
pub fn check_repetitions(grammar: &Grammar, err: &ErrorAccumulator) {
    for (_, rule) in grammar.iter() {
        rule.expr.visit(|expr| match &expr.kind {
            ExprKind::ZeroOrMore(child) | ExprKind::OneOrMore(child) => {
                let mut stack = Vec::new();
                if !always_consumes(child, grammar, &mut stack) {
                    err.error(GrammarError::InfiniteRepetition {
                        rule: rule.name.clone(),
                    });
                }
            }
            _ => {}
        });
    }
}

/// Whether every successful match of `expr` advances the cursor.
///
/// Rules already being analyzed further up are assumed not to consume, left recursion
/// is not supported anyway.
pub fn always_consumes(expr: &Expr, grammar: &Grammar, stack: &mut Vec<RuleHandle>) -> bool {
    match &expr.kind {
        ExprKind::Literal { text, .. } => !text.is_empty(),
        ExprKind::Class(_) | ExprKind::Any => true,
        ExprKind::RuleRef(handle) => {
            if stack.contains(handle) {
                return false;
            }
            stack.push(*handle);
            let consumes = always_consumes(&grammar.rules[*handle].expr, grammar, stack);
            stack.pop();
            consumes
        }
        ExprKind::Sequence(elements) => elements
            .iter()
            .any(|element| always_consumes(element, grammar, stack)),
        ExprKind::Choice(alternatives) => alternatives
            .iter()
            .all(|alternative| always_consumes(alternative, grammar, stack)),
        ExprKind::Action { expr, .. }
        | ExprKind::Labeled { expr, .. }
        | ExprKind::Named { expr, .. }
        | ExprKind::OneOrMore(expr) => always_consumes(expr, grammar, stack),
        ExprKind::Optional(_)
        | ExprKind::ZeroOrMore(_)
        | ExprKind::SimpleAnd(_)
        | ExprKind::SimpleNot(_)
        | ExprKind::SemanticAnd(_)
        | ExprKind::SemanticNot(_) => false,
        ExprKind::UnresolvedRef(_) => unreachable!("Should have been resolved"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn check(grammar: Grammar) -> Vec<GrammarError> {
        match grammar.compile() {
            Ok(_) => Vec::new(),
            Err(errors) => errors,
        }
    }

    #[test]
    fn test_infinite_repetition() {
        let grammar = Grammar::new()
            .rule("a", Expr::rule("b").zero_or_more())
            .rule("b", Expr::literal("b").optional());
        assert_eq!(
            check(grammar),
            vec![GrammarError::InfiniteRepetition { rule: "a".into() }]
        );

        let grammar = Grammar::new().rule("a", Expr::sequence(vec![]).one_or_more());
        assert_eq!(
            check(grammar),
            vec![GrammarError::InfiniteRepetition { rule: "a".into() }]
        );
    }

    #[test]
    fn test_finite_repetition() {
        let grammar = Grammar::new()
            .rule(
                "list",
                Expr::sequence(vec![Expr::rule("item"), Expr::literal(",").optional()])
                    .zero_or_more(),
            )
            .rule(
                "item",
                Expr::choice(vec![
                    Expr::literal("x"),
                    Expr::sequence(vec![Expr::literal("("), Expr::rule("list"), Expr::literal(")")]),
                ]),
            );
        assert_eq!(check(grammar), vec![]);
    }
}
