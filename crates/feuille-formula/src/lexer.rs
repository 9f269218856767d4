//! Formula tokenizer
//!
//! Splits formula source text into spans tagged as string, number, reference,
//! call or operator. Offsets are byte offsets into the full source text,
//! including the leading `=`.

use crate::error::{FormulaError, FormulaResult};

/// Kind of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `"`-delimited string literal, quotes included
    String,
    /// Digits with at most one `,` decimal separator
    Number,
    /// Cell reference such as `A1` or `$B$2`
    Reference,
    /// Reference text immediately followed by `(`
    Call,
    /// Any other single character, or one of `<=`, `>=`, `<>`
    Operator,
}

/// A span of formula source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    pub kind: TokenKind,
    /// Source text covered by the token
    pub text: String,
}

impl Token {
    /// Check if this is the given operator
    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    /// Check if this is a reference token
    pub fn is_reference(&self) -> bool {
        self.kind == TokenKind::Reference
    }
}

/// Tokenize a formula
///
/// The first character (the `=` prefix) is skipped unconditionally.
///
/// # Example
/// ```rust
/// use feuille_formula::lexer::{tokenize, TokenKind};
///
/// let tokens = tokenize("=A1+1,5").unwrap();
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[0].kind, TokenKind::Reference);
/// assert_eq!(tokens[2].text, "1,5");
/// ```
pub fn tokenize(source: &str) -> FormulaResult<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }

    log::trace!("tokenized {:?} into {} tokens", source, tokens.len());
    Ok(tokens)
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        let pos = input.chars().next().map_or(0, char::len_utf8);
        Self { input, pos }
    }

    fn next_token(&mut self) -> FormulaResult<Option<Token>> {
        self.skip_whitespace();

        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(None),
        };

        let start = self.pos;
        let kind = match c {
            '"' => self.scan_string()?,
            ',' | '0'..='9' => self.scan_number()?,
            '$' | 'A'..='Z' => self.scan_reference(),
            _ => self.scan_operator(c),
        };

        Ok(Some(Token {
            start,
            end: self.pos,
            kind,
            text: self.input[start..self.pos].to_string(),
        }))
    }

    fn scan_string(&mut self) -> FormulaResult<TokenKind> {
        let start = self.pos;
        self.advance(); // Skip opening quote

        loop {
            match self.peek_char() {
                None => return Err(FormulaError::UnterminatedString { offset: start }),
                Some('\\') if self.peek_char_at(1) == Some('"') => {
                    self.advance();
                    self.advance();
                }
                Some('"') => {
                    self.advance();
                    return Ok(TokenKind::String);
                }
                Some(_) => self.advance(),
            }
        }
    }

    fn scan_number(&mut self) -> FormulaResult<TokenKind> {
        let mut has_comma = false;

        while let Some(c) = self.peek_char() {
            match c {
                '0'..='9' => {}
                ',' if has_comma => {
                    return Err(FormulaError::MalformedNumber { offset: self.pos });
                }
                ',' => has_comma = true,
                _ => break,
            }
            self.advance();
        }

        Ok(TokenKind::Number)
    }

    fn scan_reference(&mut self) -> TokenKind {
        while self
            .peek_char()
            .map_or(false, |c| c == '$' || c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            self.advance();
        }

        if self.peek_char() == Some('(') {
            TokenKind::Call
        } else {
            TokenKind::Reference
        }
    }

    fn scan_operator(&mut self, c: char) -> TokenKind {
        self.advance();

        let two_chars = matches!(
            (c, self.peek_char()),
            ('<', Some('=')) | ('<', Some('>')) | ('>', Some('='))
        );
        if two_chars {
            self.advance();
        }

        TokenKind::Operator
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(' ' | '\t' | '\n')) {
            self.advance();
        }
    }
}
