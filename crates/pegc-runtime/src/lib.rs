pub mod error;
pub mod expectation;
pub mod position;
pub mod span;
pub mod tracker;
pub mod value;

use std::rc::Rc;

pub use error::ParseError;
pub use expectation::{CharClass, ClassPart, Expectation};
pub use position::{Location, Position, PositionCache};
pub use span::Span;
pub use tracker::Tracker;
pub use value::Value;

pub type RcString = Rc<str>;
