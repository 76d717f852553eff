//! Arithmetic expression grammar, built with the expression constructors.
//!
//! Operators do not have precedence, every binary rule takes a primary on the left and
//! the rest of the expression on the right, so `2*3+4` is `2*(3+4)`.

use pegc_backend::{Callbacks, Context, Expr, Grammar, GrammarError, Parser};
use pegc_runtime::{ClassPart, ParseError, Value};

fn binary_rule(operator: &str, action: &str) -> Expr {
    Expr::sequence(vec![
        Expr::rule("primary").labeled("left"),
        Expr::literal(operator),
        Expr::rule("any").labeled("right"),
    ])
    .action(action)
}

pub fn grammar() -> Grammar {
    Grammar::new()
        .rule("start", Expr::rule("any"))
        .rule(
            "any",
            Expr::choice(vec![
                Expr::rule("multiplicative"),
                Expr::rule("divisive"),
                Expr::rule("additive"),
                Expr::rule("subtractive"),
                Expr::rule("primary"),
            ]),
        )
        .rule(
            "primary",
            Expr::choice(vec![
                Expr::rule("float"),
                Expr::rule("integer"),
                Expr::sequence(vec![
                    Expr::literal("("),
                    Expr::rule("any").labeled("any"),
                    Expr::literal(")"),
                ])
                .action("paren"),
            ]),
        )
        .rule("additive", binary_rule("+", "add"))
        .rule("multiplicative", binary_rule("*", "mul"))
        .rule("subtractive", binary_rule("-", "sub"))
        .rule("divisive", binary_rule("/", "div"))
        .rule(
            "float",
            Expr::sequence(vec![
                Expr::rule("_"),
                Expr::rule("digits").labeled("left"),
                Expr::literal("."),
                Expr::rule("digits").labeled("right"),
                Expr::rule("_"),
            ])
            .action("float")
            .named("float"),
        )
        .rule(
            "integer",
            Expr::sequence(vec![
                Expr::rule("_"),
                Expr::rule("digits").labeled("digits"),
                Expr::rule("_"),
            ])
            .action("integer")
            .named("integer"),
        )
        .rule(
            "_",
            Expr::class(&[ClassPart::Char(' '), ClassPart::Char('\t')]).zero_or_more(),
        )
        .rule("digits", Expr::class(&[ClassPart::Range('0', '9')]).one_or_more())
}

/// Integer operands stay integers when `int` is given, anything else is computed in
/// floating point.
fn arithmetic(
    cx: &mut Context<'_, '_>,
    int: Option<fn(i64, i64) -> Option<i64>>,
    float: fn(f64, f64) -> f64,
) -> Result<Value, ParseError> {
    let (Some(left), Some(right)) = (cx.get("left"), cx.get("right")) else {
        return Err(cx.error("Missing operand"));
    };

    if let (Value::Int(a), Value::Int(b), Some(int)) = (left, right, int) {
        return match int(*a, *b) {
            Some(result) => Ok(Value::Int(result)),
            None => Err(cx.error("Integer overflow")),
        };
    }

    match (left.as_float(), right.as_float()) {
        (Some(a), Some(b)) => Ok(Value::Float(float(a, b))),
        _ => Err(cx.error("Operands must be numbers")),
    }
}

pub fn callbacks() -> Callbacks {
    Callbacks::new()
        .action("add", |cx| arithmetic(cx, Some(i64::checked_add), |a, b| a + b))
        .action("sub", |cx| arithmetic(cx, Some(i64::checked_sub), |a, b| a - b))
        .action("mul", |cx| arithmetic(cx, Some(i64::checked_mul), |a, b| a * b))
        .action("div", |cx| arithmetic(cx, None, |a, b| a / b))
        .action("paren", |cx| match cx.get("any") {
            Some(value) => Ok(value.clone()),
            None => Err(cx.error("Missing parenthesized expression")),
        })
        .action("float", |cx| {
            let text = match (cx.get("left"), cx.get("right")) {
                (Some(left), Some(right)) => format!("{}.{}", left.to_text(), right.to_text()),
                _ => return Err(cx.error("Missing digits")),
            };
            match text.parse::<f64>() {
                Ok(value) => Ok(Value::Float(value)),
                Err(_) => Err(cx.expected("float")),
            }
        })
        .action("integer", |cx| {
            let digits = cx.get("digits").map(Value::to_text).unwrap_or_default();
            match digits.parse::<i64>() {
                Ok(value) => Ok(Value::Int(value)),
                Err(_) => Err(cx.error(format!("Integer literal {digits} is out of range"))),
            }
        })
}

pub fn parser() -> Result<Parser, Vec<GrammarError>> {
    Parser::new(grammar().compile()?, callbacks())
}

#[cfg(test)]
mod tests {
    use pegc_runtime::Expectation;
    use pretty_assertions::assert_eq;

    use super::*;

    fn eval(input: &str) -> Value {
        parser().unwrap().parse(input).unwrap()
    }

    fn fail(input: &str) -> ParseError {
        parser().unwrap().parse(input).unwrap_err()
    }

    #[test]
    fn test_evaluate() {
        assert_eq!(eval("1+2*3"), Value::Int(7));
        assert_eq!(eval("(1+2)*3"), Value::Int(9));
        assert_eq!(eval("2*3+4"), Value::Int(14));
        assert_eq!(eval("8-2-1"), Value::Int(7));
        assert_eq!(eval("42"), Value::Int(42));
        assert_eq!(eval(" 1 +\t2 "), Value::Int(3));
        assert_eq!(eval("((7))"), Value::Int(7));
    }

    #[test]
    fn test_floats() {
        assert_eq!(eval("1.5*2"), Value::Float(3.0));
        assert_eq!(eval("7/2"), Value::Float(3.5));
        assert_eq!(eval("0.25+0.25"), Value::Float(0.5));
    }

    #[test]
    fn test_incomplete_expression() {
        let err = fail("1+");
        assert_eq!(
            err.message,
            "Expected \"(\", [ \\t], [0-9], float, or integer but end of input found."
        );
        assert_eq!(err.found, None);
        assert_eq!(err.location.start.offset, 2);

        let expected = err.expected.unwrap();
        assert!(expected.contains(&Expectation::literal("(", false)));
        assert!(expected.contains(&Expectation::other("float")));
        assert!(expected.contains(&Expectation::other("integer")));
    }

    #[test]
    fn test_unclosed_paren() {
        let err = fail("(1");
        assert_eq!(
            err.message,
            "Expected \")\", \"*\", \"+\", \"-\", or \"/\" but end of input found."
        );
        assert_eq!(err.location.start.column, 3);
    }

    #[test]
    fn test_action_errors() {
        let err = fail("99999999999999999999");
        assert_eq!(
            err.message,
            "Integer literal 99999999999999999999 is out of range"
        );
        assert!(!err.is_structured());
        assert_eq!(err.location.end.offset, 20);

        assert_eq!(fail("9223372036854775807+1").message, "Integer overflow");
    }

    #[test]
    fn test_error_json() {
        let err = fail("1+");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["found"], serde_json::Value::Null);
        assert_eq!(json["expected"][0]["type"], "other");
        assert_eq!(json["location"]["start"]["offset"], 2);
    }
}
