//! Lays out the per-activation slot array of every rule.
//!
//! Each node writes its value into `result_index`. Nodes which need to remember where they
//! started (to rewind or to compute the matched range) also get a `pos_index`. The parent
//! assigns the child's `result_index` before recursing, siblings whose values are no longer
//! needed reuse the same slots, so the array length is the deepest nesting of simultaneously
//! live values rather than the number of nodes.
//!
//! | node                               | pos       | children at                 |
//! |------------------------------------|-----------|-----------------------------|
//! | action, `&e`, `!e`                 | index     | index + 1                   |
//! | `e*`, `e+`                         | -         | index + 1, index is the list|
//! | labeled, named, `e?`               | -         | index                       |
//! | choice                             | -         | index, every alternative    |
//! | sequence                           | index + 1 | element `i` at index + 2 + i|

use crate::ast::{Expr, ExprKind};

use super::{grammar::Grammar, Rule};

/// Slot which receives the value of a whole rule.
pub const RULE_RESULT_INDEX: u32 = 0;

pub fn allocate(grammar: &mut Grammar) {
    for (_, rule) in grammar.iter_mut() {
        let count = allocate_rule(rule);
        log::debug!("Rule `{}` needs {} slots", rule.name, count);
    }
}

pub fn allocate_rule(rule: &mut Rule) -> u32 {
    rule.expr.result_index = RULE_RESULT_INDEX;
    let count = compute(&mut rule.expr) + 1;
    rule.result_count = Some(count);
    count
}

fn child_at(child: &mut Expr, index: u32) -> u32 {
    child.result_index = index;
    compute(child)
}

/// Assigns the slots of the subtree and returns its depth, the highest slot it touches
/// relative to its own `result_index`.
fn compute(expr: &mut Expr) -> u32 {
    let index = expr.result_index;
    let (depth, pos_index) = match &mut expr.kind {
        ExprKind::Literal { .. }
        | ExprKind::Class(_)
        | ExprKind::Any
        | ExprKind::SemanticAnd(_)
        | ExprKind::SemanticNot(_)
        | ExprKind::UnresolvedRef(_)
        | ExprKind::RuleRef(_) => (0, None),
        ExprKind::Labeled { expr: child, .. }
        | ExprKind::Named { expr: child, .. }
        | ExprKind::Optional(child) => (child_at(child, index), None),
        ExprKind::Action { expr: child, .. }
        | ExprKind::SimpleAnd(child)
        | ExprKind::SimpleNot(child) => (child_at(child, index + 1) + 1, Some(index)),
        ExprKind::ZeroOrMore(child) | ExprKind::OneOrMore(child) => {
            (child_at(child, index + 1) + 1, None)
        }
        ExprKind::Choice(alternatives) => {
            let depth = alternatives
                .iter_mut()
                .map(|alternative| child_at(alternative, index))
                .max()
                .unwrap_or(0);
            (depth, None)
        }
        ExprKind::Sequence(elements) => match elements.is_empty() {
            true => (0, None),
            false => {
                let mut depth = 0;
                for (i, element) in elements.iter_mut().enumerate() {
                    let i = i as u32;
                    depth = depth.max(i + child_at(element, index + 2 + i));
                }
                (depth + 2, Some(index + 1))
            }
        },
    };
    expr.pos_index = pos_index;
    depth
}
