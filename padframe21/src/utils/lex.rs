//!
//! # Text Lexing
//!
//! Shared by the padframe-config and DEF readers.
//! Both formats are streams of whitespace-separated words terminated by semicolons,
//! with `#` comments running to end-of-line.
//! DEF additionally treats parentheses and double-quoted strings as tokens of their own.
//!

// Std-Lib
use std::str::Chars;

// Local Imports
use crate::db::Int;

/// Location of a [Token] in the source string
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Start byte index (inclusive)
    pub start: usize,
    /// End byte index (exclusive)
    pub stop: usize,
    /// Line number, starting from one
    pub line: usize,
}
/// Lexer Token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub loc: SourceLocation,
    pub ttype: TokenType,
}
impl Token {
    /// Get the text of `src` spanned by this token
    pub fn substr<'a>(&self, src: &'a str) -> &'a str {
        &src[self.loc.start..self.loc.stop]
    }
}
/// Get the trimmed content of line number `line` of `src`, for error reporting
pub fn line_content(src: &str, line: usize) -> String {
    src.lines()
        .nth(line.saturating_sub(1))
        .unwrap_or("")
        .trim()
        .to_string()
}
/// Token Types Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Any word which does not parse as an integer
    Name,
    /// Word which parses as an integer
    Number,
    /// Double-quoted string, quotes included
    Str,
    SemiColon,
    LeftParen,
    RightParen,
    NewLine,
    WhiteSpace,
    Comment,
}

///
/// # Lexer
///
/// Breaks the source string into [Token]s, one per call to `next_token`.
/// Whitespace, newlines, and comments are consumed but never emitted.
///
pub struct Lexer<'src> {
    src: &'src str,
    /// Source-string character iterator
    chars: Chars<'src>,
    /// Peekable next character
    next_char: Option<char>,
    /// Peekable next Token
    next_tok: Option<Token>,
    /// Start byte-index of the token in progress
    start: usize,
    /// Active byte index
    pos: usize,
    /// Active line number
    line: usize,
    /// Whether parentheses and quoted strings split words
    punctuated: bool,
}
impl<'src> Lexer<'src> {
    /// Create a [Lexer] in which only semicolons and comments split words
    pub fn new(src: &'src str) -> Self {
        Self::create(src, false)
    }
    /// Create a [Lexer] which also emits parentheses and quoted strings as tokens
    pub fn punctuated(src: &'src str) -> Self {
        Self::create(src, true)
    }
    fn create(src: &'src str, punctuated: bool) -> Self {
        let mut chars = src.chars();
        let next_char = chars.next();
        let mut lex = Self {
            src,
            chars,
            next_char,
            next_tok: None,
            start: 0,
            pos: 0,
            line: 1,
            punctuated,
        };
        lex.next_tok = lex._next_token();
        lex
    }
    /// Active line number. At end of input, the last line.
    pub fn line(&self) -> usize {
        self.line
    }
    pub fn peek_token(&self) -> Option<&Token> {
        self.next_tok.as_ref()
    }
    /// Get and return our next token
    pub fn next_token(&mut self) -> Option<Token> {
        let mut tok = self._next_token();
        std::mem::swap(&mut tok, &mut self.next_tok);
        tok
    }
    /// Get and return our next character, updating our position along the way
    fn next_char(&mut self) -> Option<char> {
        let mut rv = self.chars.next();
        std::mem::swap(&mut rv, &mut self.next_char);
        if let Some(c) = rv {
            self.pos += c.len_utf8();
        }
        rv
    }
    /// Pull our next semantic [Token], skipping whitespace, newlines, and comments
    fn _next_token(&mut self) -> Option<Token> {
        use TokenType::{Comment, NewLine, WhiteSpace};
        loop {
            let tok = self.lex_one()?;
            match tok.ttype {
                WhiteSpace | Comment | NewLine => continue,
                _ => return Some(tok),
            }
        }
    }
    /// Emit a [Token] of [TokenType] `ttype` spanning from `start` to the current position
    fn emit(&mut self, ttype: TokenType) -> Token {
        let loc = SourceLocation {
            start: self.start,
            stop: self.pos,
            line: self.line,
        };
        self.start = self.pos;
        Token { loc, ttype }
    }
    /// Accept a character if it meets predicate-function `f`
    fn accept(&mut self, f: impl Fn(char) -> bool) -> bool {
        match self.next_char {
            Some(ch) if f(ch) => {
                self.next_char();
                true
            }
            _ => false,
        }
    }
    fn accept_char(&mut self, c: char) -> bool {
        self.accept(|a| a == c)
    }
    /// Boolean indication of whether `c` ends a word
    fn is_delim(&self, c: char) -> bool {
        c.is_whitespace()
            || c == ';'
            || c == '#'
            || (self.punctuated && (c == '(' || c == ')' || c == '"'))
    }
    /// Lex the next [Token], or `None` at end of input
    fn lex_one(&mut self) -> Option<Token> {
        self.next_char?;
        if self.accept_char('\n') {
            let tok = self.emit(TokenType::NewLine);
            self.line += 1;
            return Some(tok);
        }
        if self.accept(char::is_whitespace) {
            while self.accept(|c| c.is_whitespace() && c != '\n') {}
            return Some(self.emit(TokenType::WhiteSpace));
        }
        if self.accept_char(';') {
            return Some(self.emit(TokenType::SemiColon));
        }
        if self.accept_char('#') {
            while self.accept(|c| c != '\n') {}
            return Some(self.emit(TokenType::Comment));
        }
        if self.punctuated {
            if self.accept_char('(') {
                return Some(self.emit(TokenType::LeftParen));
            }
            if self.accept_char(')') {
                return Some(self.emit(TokenType::RightParen));
            }
            if self.accept_char('"') {
                while let Some(c) = self.next_char() {
                    match c {
                        '"' => break,
                        '\\' => {
                            self.next_char();
                        }
                        '\n' => self.line += 1,
                        _ => (),
                    }
                }
                return Some(self.emit(TokenType::Str));
            }
        }
        // Everything else is a word, running to the next delimiter
        while let Some(c) = self.next_char {
            if self.is_delim(c) {
                break;
            }
            self.next_char();
        }
        let word = &self.src[self.start..self.pos];
        let ttype = if word.parse::<Int>().is_ok() {
            TokenType::Number
        } else {
            TokenType::Name
        };
        Some(self.emit(ttype))
    }
}
