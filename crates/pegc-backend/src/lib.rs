pub mod ast;
pub mod backend;
pub mod engine;
pub mod error;

pub use ast::{Expr, ExprKind, RcString};
pub use backend::grammar::{Grammar, RuleHandle};
pub use engine::{Callbacks, Context, ParseOptions, Parser};
pub use error::GrammarError;
