use crate::decode::lexer::{Token, TokenKind};
use crate::options::ParseOptions;
use crate::types::{Array, Object, Value};
use crate::{Error, Result};

/// Build a value tree from a complete token sequence. The sequence must hold
/// exactly one value.
pub fn parse_tokens(tokens: &[Token], options: &ParseOptions) -> Result<Value> {
    let mut parser = Parser::new(tokens, options);
    parser.parse_document()
}

struct Parser<'t> {
    tokens: &'t [Token],
    position: usize,
    depth: usize,
    max_depth: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token], options: &ParseOptions) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            max_depth: options.max_depth,
        }
    }

    fn parse_document(&mut self) -> Result<Value> {
        if self.tokens.is_empty() {
            return Err(Error::syntax("empty document"));
        }
        let value = self.parse_value()?;
        if let Some(token) = self.peek() {
            return Err(unexpected(token, "end of input"));
        }
        Ok(value)
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Result<&'t Token> {
        let token = self
            .tokens
            .get(self.position)
            .ok_or_else(|| Error::syntax("unexpected end of input"))?;
        self.position += 1;
        Ok(token)
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<&'t Token> {
        let token = self.next()?;
        if token.kind != kind {
            return Err(unexpected(token, context));
        }
        Ok(token)
    }

    /// Consumes the next token only when it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> bool {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.position += 1;
                true
            }
            _ => false,
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Number => parse_number(token).map(Value::Number),
            TokenKind::String => Ok(Value::String(token.content.clone())),
            TokenKind::True => Ok(Value::Boolean(true)),
            TokenKind::False => Ok(Value::Boolean(false)),
            TokenKind::Null => Ok(Value::Null),
            TokenKind::ObjectStart => self.nested(Self::parse_object_body).map(Value::Object),
            TokenKind::ArrayStart => self.nested(Self::parse_array_body).map(Value::Array),
            _ => Err(unexpected(token, "a value")),
        }
    }

    fn nested<T>(&mut self, body: fn(&mut Self) -> Result<T>) -> Result<T> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Error::syntax(format!(
                "nesting deeper than {} levels",
                self.max_depth
            )));
        }
        let result = body(self);
        self.depth -= 1;
        result
    }

    /// Called after the opening `{` has been consumed.
    fn parse_object_body(&mut self) -> Result<Object> {
        let mut object = Object::new();
        if self.eat(TokenKind::ObjectEnd) {
            return Ok(object);
        }

        loop {
            let key = self.expect(TokenKind::String, "a string key")?;
            self.expect(TokenKind::Colon, "':' after object key")?;
            let value = self.parse_value()?;
            // Upsert keeps a repeated key at its first position.
            *object.entry(&key.content) = value;

            let separator = self.next()?;
            match separator.kind {
                TokenKind::Comma => continue,
                TokenKind::ObjectEnd => return Ok(object),
                _ => return Err(unexpected(separator, "',' or '}'")),
            }
        }
    }

    /// Called after the opening `[` has been consumed.
    fn parse_array_body(&mut self) -> Result<Array> {
        let mut array = Array::new();
        if self.eat(TokenKind::ArrayEnd) {
            return Ok(array);
        }

        loop {
            array.push(self.parse_value()?);

            let separator = self.next()?;
            match separator.kind {
                TokenKind::Comma => continue,
                TokenKind::ArrayEnd => return Ok(array),
                _ => return Err(unexpected(separator, "',' or ']'")),
            }
        }
    }
}

fn unexpected(token: &Token, expected: &str) -> Error {
    Error::syntax(format!(
        "expected {expected}, found {}",
        token.kind.describe()
    ))
    .with_location(token.location)
}

fn parse_number(token: &Token) -> Result<f32> {
    match token.content.parse::<f32>() {
        Ok(number) if number.is_finite() => Ok(number),
        Ok(_) => Err(Error::syntax(format!(
            "number '{}' is out of range",
            token.content
        ))
        .with_location(token.location)),
        Err(_) => Err(Error::syntax(format!("invalid number '{}'", token.content))
            .with_location(token.location)),
    }
}
