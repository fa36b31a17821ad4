use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};
use substring::Substring;

use crate::error::{Error, ScanError};
use crate::literal::Literal;
use crate::token::{Token, Type};

/// Converts source text into a flat token list ending in a single `EOF`.
/// Lexeme text is sliced directly out of `source` by char position rather than
/// rebuilt character by character.
pub struct Scanner<'a> {
    source: &'a str,
    chars: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source,
            chars: source.chars().peekmore(),
            tokens: vec![],
            start: 0,
            current: 0,
            line: 1,
        }
    }

    pub fn scan_tokens(&mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(Token::new(Type::EOF, String::new(), None, self.line));
        std::mem::take(&mut self.tokens)
    }

    fn advance(&mut self) -> char {
        let c = self.chars.next().expect("advance past end of source");
        self.current += 1;
        c
    }

    fn peek(&mut self) -> char {
        self.chars.peek().copied().unwrap_or('\0')
    }

    fn peek_next(&mut self) -> char {
        self.chars.peek_next().copied().unwrap_or('\0')
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn lexeme(&self) -> String {
        self.source.substring(self.start, self.current).to_string()
    }

    fn add_token(&mut self, r#type: Type, literal: Option<Literal>) {
        self.tokens.push(Token::new(r#type, self.lexeme(), literal, self.line));
    }

    fn string(&mut self) {
        let start_line = self.line;

        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            ScanError { line: start_line, message: "Unterminated string.".to_string() }.throw();
            return;
        }

        self.advance(); // Closing quote.

        // Literal excludes the surrounding quotes, unlike the lexeme.
        let value = self.source.substring(self.start + 1, self.current - 1).to_string();
        self.add_token(Type::String, Some(Literal::String(value)));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // peek_next() leaves the lookahead cursor advanced even when the '.' isn't
        // followed by a digit; reset it so the next peek()/is_at_end() call reads
        // from the true current position instead of the stale lookahead.
        let has_fraction = self.peek() == '.' && self.peek_next().is_ascii_digit();
        self.chars.reset_cursor();

        if has_fraction {
            self.advance(); // Consume the '.'.

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let value: f64 = self.lexeme().parse().expect("scanned digits to parse as a number");
        self.add_token(Type::Number, Some(Literal::Number(value)));
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let r#type = match self.lexeme().as_str() {
            "and" => Type::And,
            "class" => Type::Class,
            "else" => Type::Else,
            "false" => Type::False,
            "for" => Type::For,
            "fun" => Type::Fun,
            "if" => Type::If,
            "nil" => Type::Nil,
            "or" => Type::Or,
            "print" => Type::Print,
            "return" => Type::Return,
            "super" => Type::Super,
            "this" => Type::This,
            "true" => Type::True,
            "var" => Type::Var,
            "while" => Type::While,
            _ => Type::Identifier,
        };

        self.add_token(r#type, None);
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(Type::LeftParen, None),
            ')' => self.add_token(Type::RightParen, None),
            '{' => self.add_token(Type::LeftBrace, None),
            '}' => self.add_token(Type::RightBrace, None),
            ',' => self.add_token(Type::Comma, None),
            '.' => self.add_token(Type::Dot, None),
            '-' => self.add_token(Type::Minus, None),
            '+' => self.add_token(Type::Plus, None),
            ';' => self.add_token(Type::Semicolon, None),
            '*' => self.add_token(Type::Star, None),

            '!' => {
                let r#type = if self.match_next('=') { Type::BangEqual } else { Type::Bang };
                self.add_token(r#type, None);
            },
            '=' => {
                let r#type = if self.match_next('=') { Type::EqualEqual } else { Type::Equal };
                self.add_token(r#type, None);
            },
            '<' => {
                let r#type = if self.match_next('=') { Type::LessEqual } else { Type::Less };
                self.add_token(r#type, None);
            },
            '>' => {
                let r#type = if self.match_next('=') { Type::GreaterEqual } else { Type::Greater };
                self.add_token(r#type, None);
            },
            '/' => {
                if self.match_next('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(Type::Slash, None);
                }
            },

            ' ' | '\r' | '\t' => (),
            '\n' => self.line += 1,

            '"' => self.string(),

            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),

            _ => {
                ScanError {
                    line: self.line,
                    message: format!("Unexpected character '{c}'."),
                }.throw();
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn scans_every_single_and_double_char_token() {
        let mut scanner = Scanner::new("(){},.-+;*/ ! != = == < <= > >=");
        let kinds: Vec<Type> = scanner.scan_tokens().iter().map(|t| t.r#type).collect();
        assert_eq!(kinds, vec![
            Type::LeftParen, Type::RightParen, Type::LeftBrace, Type::RightBrace,
            Type::Comma, Type::Dot, Type::Minus, Type::Plus, Type::Semicolon,
            Type::Star, Type::Slash, Type::Bang, Type::BangEqual, Type::Equal,
            Type::EqualEqual, Type::Less, Type::LessEqual, Type::Greater,
            Type::GreaterEqual, Type::EOF,
        ]);
    }

    #[test]
    fn always_terminates_with_a_single_eof() {
        let mut scanner = Scanner::new("var a = 1;");
        let tokens = scanner.scan_tokens();
        assert_eq!(tokens.last().unwrap().r#type, Type::EOF);
        assert_eq!(tokens.iter().filter(|t| t.r#type == Type::EOF).count(), 1);
    }

    #[test]
    fn scans_keywords_and_identifiers() {
        let mut scanner = Scanner::new("super this classy");
        let tokens = scanner.scan_tokens();
        assert_eq!(tokens[0].r#type, Type::Super);
        assert_eq!(tokens[1].r#type, Type::This);
        assert_eq!(tokens[2].r#type, Type::Identifier);
        assert_eq!(tokens[2].lexeme, "classy");
    }

    #[test]
    fn scans_number_literal() {
        let mut scanner = Scanner::new("123.456");
        let tokens = scanner.scan_tokens();
        assert_eq!(tokens[0].literal, Some(Literal::Number(123.456)));
    }

    #[test]
    fn trailing_dot_at_end_of_source_is_not_dropped() {
        // A '.' with no following digit belongs to a separate Dot token; it must
        // still be scanned even when it's the last character in the source.
        let mut scanner = Scanner::new("123.");
        let tokens = scanner.scan_tokens();
        assert_eq!(tokens[0].r#type, Type::Number);
        assert_eq!(tokens[0].literal, Some(Literal::Number(123.0)));
        assert_eq!(tokens[1].r#type, Type::Dot);
        assert_eq!(tokens[2].r#type, Type::EOF);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn string_literal_excludes_quotes_but_lexeme_includes_them() {
        let mut scanner = Scanner::new("\"hi\"");
        let tokens = scanner.scan_tokens();
        assert_eq!(tokens[0].lexeme, "\"hi\"");
        assert_eq!(tokens[0].literal, Some(Literal::String("hi".to_string())));
    }

    #[test]
    fn unterminated_string_reports_on_starting_line() {
        let mut scanner = Scanner::new("\"abc");
        let tokens = scanner.scan_tokens();
        // No string token is emitted; only the synthetic EOF remains.
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].r#type, Type::EOF);
    }

    #[test]
    fn newlines_inside_strings_advance_the_line_counter() {
        let mut scanner = Scanner::new("\"a\nb\" 1");
        let tokens = scanner.scan_tokens();
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn comment_is_skipped_entirely() {
        let mut scanner = Scanner::new("// a comment\nvar");
        let tokens = scanner.scan_tokens();
        assert_eq!(tokens[0].r#type, Type::Var);
        assert_eq!(tokens[0].line, 2);
    }
}
