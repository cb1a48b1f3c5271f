use crate::error::{NsError, Span};
use crate::fragments;
use crate::value::escape_str;
use log::trace;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    // Single-character tokens
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    Comma,
    Equal,

    // Literals
    Num,
    String,
    Identifier,

    // Keywords
    None,

    // Special
    Bad,
    Eof,
}

impl TokenType {
    /// How the kind is named in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Star => "*",
            TokenType::Slash => "/",
            TokenType::LeftParen => "(",
            TokenType::RightParen => ")",
            TokenType::Comma => ",",
            TokenType::Equal => "=",
            TokenType::Num => "num",
            TokenType::String => "str",
            TokenType::Identifier => "id",
            TokenType::None => "none",
            TokenType::Bad => "<bad>",
            TokenType::Eof => "<eof>",
        }
    }
}

/// A classified slice of the input line.
///
/// `lexeme` is the identifier name, the number text, the unescaped string
/// contents, or the punctuation/bad character itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, span: Span) -> Self {
        Self {
            token_type,
            lexeme,
            span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.token_type {
            TokenType::String => write!(f, "'{}'", escape_str(&self.lexeme)),
            TokenType::Eof => write!(f, "<eof>"),
            _ => write!(f, "{}", self.lexeme),
        }
    }
}

/// On-demand tokenizer: every call to `next_token` classifies one more token.
pub struct Lexer {
    source: Vec<char>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            start: 0,
            current: 0,
        }
    }

    /// Lexes the whole line, `Eof` included.
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, NsError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let at_end = token.token_type == TokenType::Eof;
            tokens.push(token);

            if at_end {
                return Ok(tokens);
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, NsError> {
        self.skip_whitespace();
        self.start = self.current;

        let token = if self.is_at_end() {
            Token::new(TokenType::Eof, String::new(), Span::single(self.current))
        } else {
            self.scan_token()?
        };

        trace!("token {:?} `{}` at {:?}", token.token_type, token, token.span);
        Ok(token)
    }

    fn scan_token(&mut self) -> Result<Token, NsError> {
        let c = self.advance();

        match c {
            '+' => Ok(self.make_token(TokenType::Plus)),
            '-' => Ok(self.make_token(TokenType::Minus)),
            '*' => Ok(self.make_token(TokenType::Star)),
            '/' => Ok(self.make_token(TokenType::Slash)),
            '(' => Ok(self.make_token(TokenType::LeftParen)),
            ')' => Ok(self.make_token(TokenType::RightParen)),
            ',' => Ok(self.make_token(TokenType::Comma)),
            '=' => Ok(self.make_token(TokenType::Equal)),
            '\'' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() => Ok(self.identifier()),
            // not an error until the parser tries to use it as a term
            _ => Ok(self.make_token(TokenType::Bad)),
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        if !self.is_at_end() {
            self.current += 1;
        }
        c
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), ' ' | '\t' | '\n') && !self.is_at_end() {
            self.current += 1;
        }
    }

    fn is_identifier_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_'
    }

    fn string(&mut self) -> Result<Token, NsError> {
        let mut contents = String::new();

        loop {
            if self.is_at_end() {
                return Err(NsError::lex_error(
                    Span::new(self.start, self.current),
                    fragments!["unclosed string"],
                )
                .with_help("strings are closed by a second `'`"));
            }

            match self.advance() {
                '\'' => break,
                '\\' => {
                    if self.is_at_end() {
                        continue;
                    }

                    let escape_start = self.current - 1;
                    let escaped = self.advance();
                    contents.push(match escaped {
                        '\\' => '\\',
                        '\'' => '\'',
                        'v' => '\u{b}',
                        'n' => '\n',
                        't' => '\t',
                        '0' => '\0',
                        _ => {
                            return Err(NsError::lex_error(
                                Span::new(escape_start, self.current),
                                fragments!["unknown escaped char `\\", escaped, "`"],
                            )
                            .with_help("supported escapes are \\\\ \\' \\v \\n \\t \\0"))
                        }
                    });
                }
                c => contents.push(c),
            }
        }

        Ok(Token::new(
            TokenType::String,
            contents,
            Span::new(self.start, self.current),
        ))
    }

    fn number(&mut self) -> Result<Token, NsError> {
        while self.peek().is_ascii_digit() || self.peek() == '.' {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let span = Span::new(self.start, self.current);

        if text.matches('.').count() > 1 {
            return Err(NsError::lex_error(
                span,
                fragments!["number cannot include more than one dot"],
            ));
        }

        if text.ends_with('.') {
            return Err(NsError::lex_error(span, fragments!["number cannot end with a dot"]));
        }

        if Self::is_identifier_char(self.peek()) {
            while Self::is_identifier_char(self.peek()) {
                self.advance();
            }

            return Err(NsError::lex_error(
                Span::new(self.start, self.current),
                fragments!["number cannot include part of identifier"],
            )
            .with_help("identifiers must start with a letter"));
        }

        Ok(Token::new(TokenType::Num, text, span))
    }

    fn identifier(&mut self) -> Token {
        while Self::is_identifier_char(self.peek()) {
            self.advance();
        }

        let token = self.make_token(TokenType::Identifier);
        if token.lexeme == "none" {
            Token::new(TokenType::None, token.lexeme, token.span)
        } else {
            token
        }
    }

    fn make_token(&self, token_type: TokenType) -> Token {
        let text: String = self.source[self.start..self.current].iter().collect();
        Token::new(token_type, text, Span::new(self.start, self.current))
    }
}
