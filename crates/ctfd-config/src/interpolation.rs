//! Interpolating reads from the layered store
//!
//! Stored values may reference other options of the same section (or of
//! `[DEFAULT]`):
//! - `%(name)s` - value of option `name`
//! - `%%` - a literal `%`
//!
//! After expansion, an empty stored value is replaced by the environment
//! variable named exactly like the option, coerced through [`crate::coerce`].

use crate::coerce::process_string_var;
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::store::Store;
use crate::value::Value;

/// Deepest chain of `%(name)s` references that is expanded
pub const MAX_INTERPOLATION_DEPTH: usize = 10;

/// A parsed stored value
#[derive(Debug, Clone, PartialEq)]
pub enum Interpolation {
    /// Literal text (with `%%` already unescaped)
    Literal(String),
    /// A reference to another option: `%(name)s`
    Ref(String),
    /// A concatenation of multiple parts
    Concat(Vec<Interpolation>),
}

/// Parser for `%(name)s` expressions
pub struct InterpolationParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> InterpolationParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Parse the entire input string
    pub fn parse(&mut self) -> Result<Interpolation> {
        let mut parts = Vec::new();
        let mut literal = String::new();

        while let Some(c) = self.current() {
            if c != '%' {
                literal.push(c);
                self.advance();
                continue;
            }

            match self.peek() {
                Some('%') => {
                    literal.push('%');
                    self.advance();
                    self.advance();
                }
                Some('(') => {
                    if !literal.is_empty() {
                        parts.push(Interpolation::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(self.parse_ref()?);
                }
                _ => {
                    return Err(Error::interpolation(format!(
                        "'%' must be followed by '%' or '(', found: {}",
                        &self.input[self.pos..]
                    )))
                }
            }
        }

        if !literal.is_empty() {
            parts.push(Interpolation::Literal(literal));
        }

        match parts.len() {
            0 => Ok(Interpolation::Literal(String::new())),
            1 => Ok(parts.remove(0)),
            _ => Ok(Interpolation::Concat(parts)),
        }
    }

    /// Parse `%(name)s` starting at the `%`
    fn parse_ref(&mut self) -> Result<Interpolation> {
        let start = self.pos;
        self.advance(); // %
        self.advance(); // (

        let mut name = String::new();
        loop {
            match self.current() {
                Some(')') => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    name.push(c);
                    self.advance();
                }
                None => return Err(self.bad_reference(start)),
            }
        }

        if self.current() != Some('s') || name.is_empty() {
            return Err(self.bad_reference(start));
        }
        self.advance(); // s

        Ok(Interpolation::Ref(name))
    }

    fn bad_reference(&self, start: usize) -> Error {
        Error::interpolation(format!(
            "Bad interpolation variable reference: {}",
            &self.input[start..]
        ))
    }

    fn current(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current() {
            self.pos += c.len_utf8();
        }
    }
}

/// Parse a stored value
pub fn parse(input: &str) -> Result<Interpolation> {
    InterpolationParser::new(input).parse()
}

/// Reads options from a [`Store`], expanding references and applying
/// environment overrides to empty values
pub struct EnvInterpolation<'a> {
    store: &'a Store,
    env: &'a dyn Environment,
    schema: &'a Schema,
}

impl<'a> EnvInterpolation<'a> {
    pub fn new(store: &'a Store, env: &'a dyn Environment, schema: &'a Schema) -> Self {
        Self { store, env, schema }
    }

    /// Read an option.
    ///
    /// Returns the expanded stored value as a string unless it is empty and
    /// a non-empty environment variable of the same name exists, in which
    /// case the coerced environment value is returned. A missing option
    /// reads as the empty string.
    pub fn get(&self, section: &str, option: &str) -> Result<Value> {
        let stored = self.expanded(section, option)?;
        if stored.is_empty() {
            if let Some(var) = self.env.var(option).filter(|v| !v.is_empty()) {
                log::debug!("{}.{} taken from the environment", section, option);
                return process_string_var(&var, Some(option), self.schema)
                    .map_err(|e| e.with_path(format!("{}.{}", section, option)));
            }
        }
        Ok(Value::String(stored))
    }

    /// The stored value with references expanded, without environment lookup
    pub fn expanded(&self, section: &str, option: &str) -> Result<String> {
        let raw = self.store.get(section, option).unwrap_or_default();
        self.expand(section, raw, 1)
            .map_err(|e| e.with_path(format!("{}.{}", section, option)))
    }

    /// Option names visible from a section
    pub fn options(&self, section: &str) -> Vec<&'a str> {
        self.store.option_names(section)
    }

    fn expand(&self, section: &str, raw: &str, depth: usize) -> Result<String> {
        if !raw.contains('%') {
            return Ok(raw.to_string());
        }
        if depth > MAX_INTERPOLATION_DEPTH {
            return Err(Error::interpolation(format!(
                "More than {} nested references; check for a reference cycle",
                MAX_INTERPOLATION_DEPTH
            )));
        }

        let mut out = String::new();
        self.render(section, &parse(raw)?, depth, &mut out)?;
        Ok(out)
    }

    fn render(
        &self,
        section: &str,
        part: &Interpolation,
        depth: usize,
        out: &mut String,
    ) -> Result<()> {
        match part {
            Interpolation::Literal(s) => out.push_str(s),
            Interpolation::Ref(name) => {
                let referenced = self.store.get(section, name).ok_or_else(|| {
                    Error::interpolation(format!(
                        "Referenced option '{}' does not exist in section '{}'",
                        name, section
                    ))
                })?;
                out.push_str(&self.expand(section, referenced, depth + 1)?);
            }
            Interpolation::Concat(parts) => {
                for p in parts {
                    self.render(section, p, depth, out)?;
                }
            }
        }
        Ok(())
    }
}
