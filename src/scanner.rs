use std::{fmt, str::Chars};

use tracing::{debug, trace};

use crate::error::{SyntaxError, SyntaxErrorKind};

pub(crate) const EOF_CHAR: char = '\0';

pub struct Scanner<'a> {
    source: &'a str,
    chars: Chars<'a>,
    start: usize,
    line: usize,
    finished: bool,
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.scan_token();
        match &item {
            Ok(token) if token.kind == TokenKind::Eof => self.finished = true,
            Ok(token) => trace!(%token, "scanned"),
            Err(_) => self.finished = true,
        }
        Some(item)
    }
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_line(source, 1)
    }

    /// Starts counting lines at `line`, for input that does not begin a file.
    pub fn with_line(source: &'a str, line: usize) -> Self {
        Self {
            source,
            chars: source.chars(),
            start: 0,
            line,
            finished: false,
        }
    }

    /// Scans the whole source. The result always ends with a single `Eof`.
    pub fn scan_tokens(self) -> Result<Vec<Token>, SyntaxError> {
        let tokens = self.collect::<Result<Vec<Token>, SyntaxError>>()?;
        debug!(count = tokens.len(), "scanned tokens");
        Ok(tokens)
    }

    fn scan_token(&mut self) -> Result<Token, SyntaxError> {
        loop {
            self.start = self.offset();
            let Some(c) = self.advance() else {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    lexeme: String::new(),
                    literal: None,
                    line: self.line,
                });
            };

            let kind = match c {
                ' ' | '\r' | '\t' => continue,
                '\n' => {
                    self.line += 1;
                    continue;
                }
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                '{' => TokenKind::LeftBrace,
                '}' => TokenKind::RightBrace,
                ',' => TokenKind::Comma,
                '.' => TokenKind::Dot,
                '-' => TokenKind::Minus,
                '+' => TokenKind::Plus,
                ';' => TokenKind::Semicolon,
                '*' => TokenKind::Star,
                '?' => TokenKind::Question,
                ':' => TokenKind::Colon,
                '!' => self.either('=', TokenKind::BangEqual, TokenKind::Bang),
                '=' => self.either('=', TokenKind::EqualEqual, TokenKind::Equal),
                '<' => self.either('=', TokenKind::LessEqual, TokenKind::Less),
                '>' => self.either('=', TokenKind::GreaterEqual, TokenKind::Greater),
                '/' => match self.peek_first() {
                    '/' => {
                        self.advance_until('\n');
                        continue;
                    }
                    '*' => {
                        self.advance();
                        self.block_comment();
                        continue;
                    }
                    _ => TokenKind::Slash,
                },
                '"' => return self.string(),
                '0'..='9' => return Ok(self.number()),
                c if is_identifier_start(c) => return Ok(self.identifier()),
                c => {
                    return Err(SyntaxError::lexical(
                        self.line,
                        SyntaxErrorKind::UnexpectedCharacter(c),
                    ))
                }
            };

            return Ok(self.create_token(kind, None, self.line));
        }
    }

    fn create_token(&self, kind: TokenKind, literal: Option<Literal>, line: usize) -> Token {
        Token {
            kind,
            lexeme: self.source[self.start..self.offset()].to_string(),
            literal,
            line,
        }
    }

    fn either(&mut self, expected: char, matched: TokenKind, otherwise: TokenKind) -> TokenKind {
        if self.peek_first() == expected {
            self.advance();
            matched
        } else {
            otherwise
        }
    }

    // Called with the opening `/*` already consumed. Running out of input
    // before the matching `*/` simply ends the comment.
    fn block_comment(&mut self) {
        while !self.is_at_end() {
            match (self.peek_first(), self.peek_second()) {
                ('*', '/') => {
                    self.advance();
                    self.advance();
                    return;
                }
                ('/', '*') => {
                    self.advance();
                    self.advance();
                    self.block_comment();
                }
                ('\n', _) => {
                    self.line += 1;
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn string(&mut self) -> Result<Token, SyntaxError> {
        let line = self.line;
        let mut value = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(SyntaxError::lexical(
                        self.line,
                        SyntaxErrorKind::UnterminatedString,
                    ))
                }
                Some('"') => break,
                Some(c) => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    value.push(c);
                }
            }
        }

        Ok(self.create_token(TokenKind::String, Some(Literal::String(value)), line))
    }

    fn number(&mut self) -> Token {
        self.advance_while(|c| c.is_ascii_digit());

        if self.peek_first() == '.' && self.peek_second().is_ascii_digit() {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }

        let text = &self.source[self.start..self.offset()];
        // A run of ASCII digits with at most one inner dot always parses.
        let value = text.parse::<f64>().unwrap_or_default();
        self.create_token(TokenKind::Number, Some(Literal::Number(value)), self.line)
    }

    fn identifier(&mut self) -> Token {
        self.advance_while(is_identifier_continue);
        let text = &self.source[self.start..self.offset()];
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Identifier);
        self.create_token(kind, None, self.line)
    }

    fn advance_until(&mut self, predicate_char: char) {
        while !self.is_at_end() && self.peek_first() != predicate_char {
            self.advance();
        }
    }

    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while !self.is_at_end() && predicate(self.peek_first()) {
            self.advance();
        }
    }

    fn peek_first(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    fn peek_second(&self) -> char {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().unwrap_or(EOF_CHAR)
    }

    fn advance(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn is_at_end(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    fn offset(&self) -> usize {
        self.source.len() - self.chars.as_str().len()
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub line: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.kind, self.lexeme)?;
        match &self.literal {
            Some(Literal::Number(n)) => write!(f, "{n:?}")?,
            Some(Literal::String(s)) => write!(f, "{s}")?,
            None => write!(f, "null")?,
        }
        write!(f, " {}", self.line)
    }
}

/// Decoded value carried by `Number` and `String` tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Single character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,
    Question,
    Colon,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    Eof,
}

impl TokenKind {
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "and" => TokenKind::And,
            "class" => TokenKind::Class,
            "else" => TokenKind::Else,
            "false" => TokenKind::False,
            "for" => TokenKind::For,
            "fun" => TokenKind::Fun,
            "if" => TokenKind::If,
            "nil" => TokenKind::Nil,
            "or" => TokenKind::Or,
            "print" => TokenKind::Print,
            "return" => TokenKind::Return,
            "super" => TokenKind::Super,
            "this" => TokenKind::This,
            "true" => TokenKind::True,
            "var" => TokenKind::Var,
            "while" => TokenKind::While,
            _ => return None,
        };
        Some(kind)
    }

    fn name(self) -> &'static str {
        match self {
            TokenKind::LeftParen => "LEFT_PAREN",
            TokenKind::RightParen => "RIGHT_PAREN",
            TokenKind::LeftBrace => "LEFT_BRACE",
            TokenKind::RightBrace => "RIGHT_BRACE",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::Minus => "MINUS",
            TokenKind::Plus => "PLUS",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Slash => "SLASH",
            TokenKind::Star => "STAR",
            TokenKind::Question => "QUESTION",
            TokenKind::Colon => "COLON",
            TokenKind::Bang => "BANG",
            TokenKind::BangEqual => "BANG_EQUAL",
            TokenKind::Equal => "EQUAL",
            TokenKind::EqualEqual => "EQUAL_EQUAL",
            TokenKind::Greater => "GREATER",
            TokenKind::GreaterEqual => "GREATER_EQUAL",
            TokenKind::Less => "LESS",
            TokenKind::LessEqual => "LESS_EQUAL",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::And => "AND",
            TokenKind::Class => "CLASS",
            TokenKind::Else => "ELSE",
            TokenKind::False => "FALSE",
            TokenKind::Fun => "FUN",
            TokenKind::For => "FOR",
            TokenKind::If => "IF",
            TokenKind::Nil => "NIL",
            TokenKind::Or => "OR",
            TokenKind::Print => "PRINT",
            TokenKind::Return => "RETURN",
            TokenKind::Super => "SUPER",
            TokenKind::This => "THIS",
            TokenKind::True => "TRUE",
            TokenKind::Var => "VAR",
            TokenKind::While => "WHILE",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
