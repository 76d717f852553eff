pub mod display;

use std::slice;

use pegc_runtime::{CharClass, ClassPart};

use crate::backend::grammar::RuleHandle;

pub use pegc_runtime::RcString;

#[derive(Clone, Debug)]
pub enum ExprKind {
    Choice(Vec<Expr>),
    Sequence(Vec<Expr>),
    Action { code: RcString, expr: Box<Expr> },
    Labeled { label: RcString, expr: Box<Expr> },
    Named { name: RcString, expr: Box<Expr> },
    Optional(Box<Expr>),
    ZeroOrMore(Box<Expr>),
    OneOrMore(Box<Expr>),
    SimpleAnd(Box<Expr>),
    SimpleNot(Box<Expr>),
    SemanticAnd(RcString),
    SemanticNot(RcString),
    /// Reference by name, replaced by `RuleRef` during resolution.
    UnresolvedRef(RcString),
    RuleRef(RuleHandle),
    Literal { text: RcString, ignore_case: bool },
    Class(CharClass),
    Any,
}

impl ExprKind {
    pub fn to_expr(self) -> Expr {
        Expr {
            kind: self,
            result_index: 0,
            pos_index: None,
        }
    }
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Choice(_) => "Choice",
            ExprKind::Sequence(_) => "Sequence",
            ExprKind::Action { .. } => "Action",
            ExprKind::Labeled { .. } => "Labeled",
            ExprKind::Named { .. } => "Named",
            ExprKind::Optional(_) => "Optional",
            ExprKind::ZeroOrMore(_) => "ZeroOrMore",
            ExprKind::OneOrMore(_) => "OneOrMore",
            ExprKind::SimpleAnd(_) => "SimpleAnd",
            ExprKind::SimpleNot(_) => "SimpleNot",
            ExprKind::SemanticAnd(_) => "SemanticAnd",
            ExprKind::SemanticNot(_) => "SemanticNot",
            ExprKind::UnresolvedRef(_) => "UnresolvedRef",
            ExprKind::RuleRef(_) => "RuleRef",
            ExprKind::Literal { .. } => "Literal",
            ExprKind::Class(_) => "Class",
            ExprKind::Any => "Any",
        }
    }
}

/// Grammar expression node.
///
/// `result_index` and `pos_index` are filled in by [`crate::backend::slots`], before that
/// they are meaningless.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub result_index: u32,
    pub pos_index: Option<u32>,
}

impl Expr {
    pub fn choice(alternatives: Vec<Expr>) -> Expr {
        ExprKind::Choice(alternatives).to_expr()
    }
    pub fn sequence(elements: Vec<Expr>) -> Expr {
        ExprKind::Sequence(elements).to_expr()
    }
    pub fn literal(text: &str) -> Expr {
        ExprKind::Literal {
            text: text.into(),
            ignore_case: false,
        }
        .to_expr()
    }
    pub fn literal_ignore_case(text: &str) -> Expr {
        ExprKind::Literal {
            text: text.into(),
            ignore_case: true,
        }
        .to_expr()
    }
    pub fn class(parts: &[ClassPart]) -> Expr {
        ExprKind::Class(CharClass::new(parts.to_vec(), false, false)).to_expr()
    }
    pub fn class_inverted(parts: &[ClassPart]) -> Expr {
        ExprKind::Class(CharClass::new(parts.to_vec(), true, false)).to_expr()
    }
    pub fn any() -> Expr {
        ExprKind::Any.to_expr()
    }
    pub fn rule(name: &str) -> Expr {
        ExprKind::UnresolvedRef(name.into()).to_expr()
    }
    pub fn semantic_and(code: &str) -> Expr {
        ExprKind::SemanticAnd(code.into()).to_expr()
    }
    pub fn semantic_not(code: &str) -> Expr {
        ExprKind::SemanticNot(code.into()).to_expr()
    }
    pub fn action(self, code: &str) -> Expr {
        ExprKind::Action {
            code: code.into(),
            expr: Box::new(self),
        }
        .to_expr()
    }
    pub fn labeled(self, label: &str) -> Expr {
        ExprKind::Labeled {
            label: label.into(),
            expr: Box::new(self),
        }
        .to_expr()
    }
    pub fn named(self, name: &str) -> Expr {
        ExprKind::Named {
            name: name.into(),
            expr: Box::new(self),
        }
        .to_expr()
    }
    pub fn optional(self) -> Expr {
        ExprKind::Optional(Box::new(self)).to_expr()
    }
    pub fn zero_or_more(self) -> Expr {
        ExprKind::ZeroOrMore(Box::new(self)).to_expr()
    }
    pub fn one_or_more(self) -> Expr {
        ExprKind::OneOrMore(Box::new(self)).to_expr()
    }
    pub fn and(self) -> Expr {
        ExprKind::SimpleAnd(Box::new(self)).to_expr()
    }
    pub fn not(self) -> Expr {
        ExprKind::SimpleNot(Box::new(self)).to_expr()
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }
    pub fn children(&self) -> &[Expr] {
        match &self.kind {
            ExprKind::Choice(children) | ExprKind::Sequence(children) => children,
            ExprKind::Action { expr, .. }
            | ExprKind::Labeled { expr, .. }
            | ExprKind::Named { expr, .. }
            | ExprKind::Optional(expr)
            | ExprKind::ZeroOrMore(expr)
            | ExprKind::OneOrMore(expr)
            | ExprKind::SimpleAnd(expr)
            | ExprKind::SimpleNot(expr) => slice::from_ref(&**expr),
            ExprKind::SemanticAnd(_)
            | ExprKind::SemanticNot(_)
            | ExprKind::UnresolvedRef(_)
            | ExprKind::RuleRef(_)
            | ExprKind::Literal { .. }
            | ExprKind::Class(_)
            | ExprKind::Any => &[],
        }
    }
    pub fn children_mut(&mut self) -> &mut [Expr] {
        match &mut self.kind {
            ExprKind::Choice(children) | ExprKind::Sequence(children) => children,
            ExprKind::Action { expr, .. }
            | ExprKind::Labeled { expr, .. }
            | ExprKind::Named { expr, .. }
            | ExprKind::Optional(expr)
            | ExprKind::ZeroOrMore(expr)
            | ExprKind::OneOrMore(expr)
            | ExprKind::SimpleAnd(expr)
            | ExprKind::SimpleNot(expr) => slice::from_mut(&mut **expr),
            ExprKind::SemanticAnd(_)
            | ExprKind::SemanticNot(_)
            | ExprKind::UnresolvedRef(_)
            | ExprKind::RuleRef(_)
            | ExprKind::Literal { .. }
            | ExprKind::Class(_)
            | ExprKind::Any => &mut [],
        }
    }
    fn visit_impl(&self, f: &mut dyn FnMut(&Expr)) {
        for child in self.children() {
            child.visit_impl(f);
        }
        f(self)
    }
    /// Postorder traversal
    pub fn visit(&self, mut f: impl FnMut(&Expr)) {
        self.visit_impl(&mut f)
    }
    fn visit_mut_impl(&mut self, f: &mut dyn FnMut(&mut Expr)) {
        for child in self.children_mut() {
            child.visit_mut_impl(f);
        }
        f(self)
    }
    pub fn visit_mut(&mut self, mut f: impl FnMut(&mut Expr)) {
        self.visit_mut_impl(&mut f)
    }
}
