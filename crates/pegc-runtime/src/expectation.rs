//! Descriptors of what the parser expected at a failure position and the "Expected X but Y
//! found." message built from them.

use std::{fmt::Write, rc::Rc};

use serde::Serialize;

use crate::RcString;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(untagged)]
pub enum ClassPart {
    Char(char),
    /// Inclusive range
    Range(char, char),
}

impl ClassPart {
    pub fn contains(self, ch: char) -> bool {
        match self {
            ClassPart::Char(c) => c == ch,
            ClassPart::Range(start, end) => start <= ch && ch <= end,
        }
    }
    fn display_into(self, buf: &mut dyn Write) -> std::fmt::Result {
        match self {
            ClassPart::Char(c) => escape_class_char(buf, c),
            ClassPart::Range(start, end) => {
                escape_class_char(buf, start)?;
                buf.write_char('-')?;
                escape_class_char(buf, end)
            }
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct CharClass {
    pub parts: Rc<[ClassPart]>,
    pub inverted: bool,
    pub ignore_case: bool,
}

impl CharClass {
    pub fn new(parts: impl Into<Rc<[ClassPart]>>, inverted: bool, ignore_case: bool) -> CharClass {
        Self {
            parts: parts.into(),
            inverted,
            ignore_case,
        }
    }
    fn contains(&self, ch: char) -> bool {
        self.parts.iter().any(|part| part.contains(ch))
    }
    pub fn matches(&self, ch: char) -> bool {
        let mut hit = self.contains(ch);
        if !hit && self.ignore_case {
            hit = ch
                .to_lowercase()
                .chain(ch.to_uppercase())
                .any(|c| self.contains(c));
        }
        hit != self.inverted
    }
    pub fn display_into(&self, buf: &mut dyn Write) -> std::fmt::Result {
        buf.write_char('[')?;
        if self.inverted {
            buf.write_char('^')?;
        }
        for part in self.parts.iter() {
            part.display_into(buf)?;
        }
        buf.write_char(']')
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expectation {
    Literal { text: RcString, ignore_case: bool },
    Class(CharClass),
    Any,
    End,
    Other { description: RcString },
    Not { expected: Box<Expectation> },
}

impl Expectation {
    pub fn literal(text: impl Into<RcString>, ignore_case: bool) -> Expectation {
        Expectation::Literal {
            text: text.into(),
            ignore_case,
        }
    }
    pub fn other(description: impl Into<RcString>) -> Expectation {
        Expectation::Other {
            description: description.into(),
        }
    }
    /// Wraps the descriptor in `Not`, or strips one `Not` layer if already negated.
    pub fn negate(self) -> Expectation {
        match self {
            Expectation::Not { expected } => *expected,
            other => Expectation::Not {
                expected: Box::new(other),
            },
        }
    }
    pub fn display_into(&self, buf: &mut dyn Write) -> std::fmt::Result {
        match self {
            Expectation::Literal { text, .. } => {
                buf.write_char('"')?;
                escape_literal(buf, text)?;
                buf.write_char('"')
            }
            Expectation::Class(class) => class.display_into(buf),
            Expectation::Any => buf.write_str("any character"),
            Expectation::End => buf.write_str("end of input"),
            Expectation::Other { description } => buf.write_str(description),
            Expectation::Not { expected } => {
                buf.write_str("not ")?;
                expected.display_into(buf)
            }
        }
    }
    pub fn describe(&self) -> String {
        let mut buf = String::new();
        // writing into a String never fails
        let _ = self.display_into(&mut buf);
        buf
    }
}

fn escape_control(buf: &mut dyn Write, ch: char) -> std::fmt::Result {
    match ch {
        '\0' => buf.write_str("\\0"),
        '\t' => buf.write_str("\\t"),
        '\n' => buf.write_str("\\n"),
        '\r' => buf.write_str("\\r"),
        '\x00'..='\x0F' => write!(buf, "\\x0{:X}", ch as u32),
        '\x10'..='\x1F' | '\x7F'..='\u{9F}' => write!(buf, "\\x{:X}", ch as u32),
        _ => buf.write_char(ch),
    }
}

pub fn escape_literal(buf: &mut dyn Write, text: &str) -> std::fmt::Result {
    for ch in text.chars() {
        match ch {
            '\\' => buf.write_str("\\\\")?,
            '"' => buf.write_str("\\\"")?,
            _ => escape_control(buf, ch)?,
        }
    }
    Ok(())
}

fn escape_class_char(buf: &mut dyn Write, ch: char) -> std::fmt::Result {
    match ch {
        '\\' | ']' | '^' | '-' => {
            buf.write_char('\\')?;
            buf.write_char(ch)
        }
        _ => escape_control(buf, ch),
    }
}

/// Renders, sorts and deduplicates the descriptors, then joins them as "A", "A or B" or
/// "A, B, or C".
pub fn describe_expected(expected: &[Expectation]) -> String {
    let mut descriptions: Vec<String> = expected.iter().map(Expectation::describe).collect();
    descriptions.sort();
    descriptions.dedup();

    match descriptions.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [first, second] => format!("{first} or {second}"),
        [init @ .., last] => format!("{}, or {last}", init.join(", ")),
    }
}

pub fn describe_found(found: Option<&str>) -> String {
    match found {
        Some(found) => {
            let mut buf = String::from("\"");
            let _ = escape_literal(&mut buf, found);
            buf.push('"');
            buf
        }
        None => "end of input".to_owned(),
    }
}

pub fn build_message(expected: &[Expectation], found: Option<&str>) -> String {
    format!(
        "Expected {} but {} found.",
        describe_expected(expected),
        describe_found(found)
    )
}
