//! Recursive-descent parser for signature text.
//!
//! Grammar:
//!
//! ```text
//! SIGNATURE  := ATOM
//!             | '[' SIGNATURE ']'
//!             | '{' SIGNATURE SIGNATURE '}'
//!             | '(' SIGNATURE* ')' ANNOTATION?
//!             | 'o' ANNOTATION?
//!             | 'X' ANNOTATION? SIGNATURE
//! ANNOTATION := '<' TEXT '>'          (TEXT non-empty, '<' '>' balanced)
//! ATOM       := 'c' | 'C' | 'w' | 'W' | 'i' | 'I' | 'l' | 'L'
//!             | 'f' | 'd' | 'b' | 's' | 'm' | 'v' | '*'
//! ```

use super::cursor::Cursor;
use super::markers::*;
use super::{ScalarKind, Signature};
use crate::{SignatureError, SignatureErrorKind};

/// Deepest composite nesting accepted before parsing fails with
/// [`SignatureErrorKind::TooDeep`].
pub const MAX_NESTING_DEPTH: usize = 256;

/// Single-pass parser over one signature text.
pub struct SignatureParser<'src> {
    cursor: Cursor<'src>,
    depth: usize,
}

impl<'src> SignatureParser<'src> {
    /// Create a parser over `text`.
    pub fn new(text: &'src str) -> Self {
        Self {
            cursor: Cursor::new(text),
            depth: 0,
        }
    }

    /// Parse one complete signature; any leftover input is an error.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(mut self) -> Result<Signature, SignatureError> {
        let sig = self.parse_node()?;
        if !self.cursor.is_eof() {
            return Err(self.error(
                SignatureErrorKind::TrailingInput,
                format!(
                    "unexpected '{}' after complete signature",
                    &self.cursor.source()[self.cursor.offset()..]
                ),
            ));
        }
        Ok(sig)
    }

    fn error(&self, kind: SignatureErrorKind, message: impl Into<String>) -> SignatureError {
        SignatureError::new(kind, self.cursor.source(), self.cursor.offset(), message)
    }

    fn parse_node(&mut self) -> Result<Signature, SignatureError> {
        if self.depth == MAX_NESTING_DEPTH {
            return Err(self.error(
                SignatureErrorKind::TooDeep,
                format!("signature nests deeper than {MAX_NESTING_DEPTH} levels"),
            ));
        }
        self.depth += 1;
        let node = self.parse_kind();
        self.depth -= 1;
        node
    }

    fn parse_kind(&mut self) -> Result<Signature, SignatureError> {
        let Some(ch) = self.cursor.peek() else {
            return Err(self.error(
                SignatureErrorKind::UnexpectedEnd,
                "expected a signature",
            ));
        };

        let node = match ch {
            LIST_BEGIN => {
                self.cursor.advance();
                let element = self.parse_child(LIST_END, "list", 1)?;
                self.expect_close(LIST_END, "list", 1)?;
                Signature::List(Box::new(element))
            }
            MAP_BEGIN => {
                self.cursor.advance();
                let key = self.parse_child(MAP_END, "map", 2)?;
                let value = self.parse_child(MAP_END, "map", 2)?;
                self.expect_close(MAP_END, "map", 2)?;
                Signature::Map(Box::new(key), Box::new(value))
            }
            TUPLE_BEGIN => {
                self.cursor.advance();
                let mut elements = Vec::new();
                while !self.cursor.eat(TUPLE_END) {
                    elements.push(self.parse_node()?);
                }
                let annotation = self.parse_annotation()?;
                return Ok(Signature::Tuple {
                    elements,
                    annotation,
                });
            }
            OBJECT => {
                self.cursor.advance();
                let interface = self.parse_annotation()?;
                return Ok(Signature::Object { interface });
            }
            EXTERNAL => {
                self.cursor.advance();
                let native = self.parse_annotation()?;
                let inner = self.parse_node()?;
                return Ok(Signature::External {
                    native,
                    inner: Box::new(inner),
                });
            }
            LIST_END | MAP_END | TUPLE_END => {
                return Err(self.error(
                    SignatureErrorKind::MismatchedDelimiter,
                    format!("unmatched '{ch}'"),
                ));
            }
            _ => match ScalarKind::from_char(ch) {
                Some(kind) => {
                    self.cursor.advance();
                    Signature::Scalar(kind)
                }
                None => {
                    return Err(self.error(
                        SignatureErrorKind::UnknownAtom,
                        format!("'{ch}' is not a signature character"),
                    ));
                }
            },
        };

        // Scalars, lists and maps never carry an annotation.
        if self.cursor.peek() == Some(ANNOTATION_BEGIN) {
            return Err(self.error(
                SignatureErrorKind::UnexpectedAnnotation,
                format!("'{node}' cannot carry an annotation"),
            ));
        }
        Ok(node)
    }

    /// Parse one child of a fixed-arity composite.
    fn parse_child(
        &mut self,
        close: char,
        what: &str,
        arity: usize,
    ) -> Result<Signature, SignatureError> {
        if self.cursor.peek() == Some(close) {
            return Err(self.error(
                SignatureErrorKind::WrongArity,
                format!("{what} expects exactly {arity} element(s)"),
            ));
        }
        self.parse_node()
    }

    fn expect_close(&mut self, close: char, what: &str, arity: usize) -> Result<(), SignatureError> {
        match self.cursor.peek() {
            Some(ch) if ch == close => {
                self.cursor.advance();
                Ok(())
            }
            None => Err(self.error(
                SignatureErrorKind::UnexpectedEnd,
                format!("missing '{close}'"),
            )),
            Some(LIST_END | MAP_END | TUPLE_END) => Err(self.error(
                SignatureErrorKind::MismatchedDelimiter,
                format!("expected '{close}' to close {what}"),
            )),
            Some(_) => Err(self.error(
                SignatureErrorKind::WrongArity,
                format!("{what} expects exactly {arity} element(s)"),
            )),
        }
    }

    /// Parse an optional `<…>` annotation. Absent means empty.
    fn parse_annotation(&mut self) -> Result<String, SignatureError> {
        if self.cursor.peek() != Some(ANNOTATION_BEGIN) {
            return Ok(String::new());
        }
        match self.cursor.eat_angle_run() {
            Some("") => Err(self.error(SignatureErrorKind::EmptyAnnotation, "empty '<>'")),
            Some(text) => Ok(text.to_string()),
            None => Err(self.error(
                SignatureErrorKind::UnterminatedAnnotation,
                format!("missing '{ANNOTATION_END}'"),
            )),
        }
    }
}

/// Parse a parameter tuple and return its element signatures.
///
/// Runtime metadata describes a method's parameters as a single tuple
/// signature; this splits it into one signature per argument.
pub fn parse_function_arguments(text: &str) -> Result<Vec<Signature>, SignatureError> {
    match Signature::parse(text)? {
        Signature::Tuple { elements, .. } => Ok(elements),
        other => Err(SignatureError::new(
            SignatureErrorKind::WrongArity,
            text,
            0,
            format!("expected a parameter tuple, found '{other}'"),
        )),
    }
}
