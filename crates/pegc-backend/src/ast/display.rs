use pegc_runtime::expectation::escape_literal;

use crate::backend::grammar::Grammar;

use super::{Expr, ExprKind};

impl ExprKind {
    pub fn display_into(&self, buf: &mut dyn std::fmt::Write, cx: &Grammar) -> std::fmt::Result {
        write!(buf, "{}", self.name())?;
        match self {
            ExprKind::Action { code, .. } => write!(buf, " {{{code}}}"),
            ExprKind::Labeled { label, .. } => write!(buf, " {label}:"),
            ExprKind::Named { name, .. } => write!(buf, " {name:?}"),
            ExprKind::SemanticAnd(code) | ExprKind::SemanticNot(code) => {
                write!(buf, " {{{code}}}")
            }
            ExprKind::UnresolvedRef(name) => write!(buf, " {name}"),
            ExprKind::RuleRef(handle) => write!(buf, " {}", handle.name(cx)),
            ExprKind::Literal { text, ignore_case } => {
                write!(buf, " \"")?;
                escape_literal(buf, text)?;
                write!(buf, "\"")?;
                if *ignore_case {
                    write!(buf, "i")?;
                }
                Ok(())
            }
            ExprKind::Class(class) => {
                write!(buf, " ")?;
                class.display_into(buf)
            }
            ExprKind::Choice(_)
            | ExprKind::Sequence(_)
            | ExprKind::Optional(_)
            | ExprKind::ZeroOrMore(_)
            | ExprKind::OneOrMore(_)
            | ExprKind::SimpleAnd(_)
            | ExprKind::SimpleNot(_)
            | ExprKind::Any => Ok(()),
        }
    }
}

impl Expr {
    pub fn display_into_indent(
        &self,
        buf: &mut dyn std::fmt::Write,
        cx: &Grammar,
        indent: u32,
    ) -> std::fmt::Result {
        for _ in 0..indent {
            write!(buf, "  ")?;
        }
        self.kind.display_into(buf, cx)?;
        match self.pos_index {
            Some(pos) => write!(buf, " [{}, pos {}]\n", self.result_index, pos)?,
            None => write!(buf, " [{}]\n", self.result_index)?,
        }
        for child in self.children() {
            child.display_into_indent(buf, cx, indent + 1)?;
        }

        Ok(())
    }
    pub fn display_into(&self, buf: &mut dyn std::fmt::Write, cx: &Grammar) -> std::fmt::Result {
        self.display_into_indent(buf, cx, 0)
    }
}
