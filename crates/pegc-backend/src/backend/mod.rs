pub mod check;
pub mod grammar;
pub mod resolve;
pub mod slots;

use crate::ast::{Expr, RcString};

pub struct Rule {
    pub name: RcString,
    pub expr: Expr,
    /// Length of the slot array an activation of this rule needs, `None` until the grammar
    /// has been allocated.
    pub result_count: Option<u32>,
}

impl Rule {
    pub fn new(name: &str, expr: Expr) -> Rule {
        Rule {
            name: name.into(),
            expr,
            result_count: None,
        }
    }
}
