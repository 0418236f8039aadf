// ABOUTME: Single-pass character scanner turning source text into located tokens

use crate::source_map::{Location, Range};
use crate::token::{keyword_kind, Token, TokenKind};
use std::rc::Rc;

pub struct Lexer {
    filename: Rc<str>,
    text: Rc<str>,
    chars: Vec<char>,
    pos: usize,
    end_of_file: bool,
}

impl Lexer {
    pub fn new(filename: impl Into<Rc<str>>, text: impl Into<Rc<str>>) -> Self {
        let filename = filename.into();
        let text = text.into();
        let chars = text.chars().collect();
        Lexer {
            filename,
            text,
            chars,
            pos: 0,
            end_of_file: false,
        }
    }

    fn loc(&self) -> Location {
        Location::new(self.filename.clone(), self.text.clone(), self.pos)
    }

    fn peek(&self) -> char {
        self.chars.get(self.pos).copied().unwrap_or('\0')
    }

    fn advance(&mut self) {
        if self.pos < self.chars.len() {
            self.pos += 1;
        } else if !self.end_of_file {
            self.pos += 1;
            self.end_of_file = true;
        } else {
            self.end_of_file = true;
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            let c = self.peek();
            if c == '#' {
                while self.peek() != '\n' && self.peek() != '\0' {
                    self.advance();
                }
            } else if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn range_from(&self, start: Location) -> Range {
        Range::new(start, self.loc())
    }

    /// Scan and return the next token. Once the end of input is
    /// reached, repeated calls return a single terminal `End` token at
    /// the same location (whitespace after the last real token is not
    /// counted in its range).
    pub fn lex(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.loc();
        let c = self.peek();

        if c == '\0' {
            return Token::new(TokenKind::End, Range::new(start.clone(), start), "");
        }

        use TokenKind::*;

        macro_rules! one_char {
            ($kind:expr) => {{
                self.advance();
                return Token::new($kind, self.range_from(start), c.to_string());
            }};
        }

        match c {
            ';' => one_char!(Semicolon),
            ':' => one_char!(Colon),
            ',' => one_char!(Comma),
            '(' => one_char!(LParen),
            ')' => one_char!(RParen),
            '{' => one_char!(LBrace),
            '}' => one_char!(RBrace),
            '[' => one_char!(LBracket),
            ']' => one_char!(RBracket),
            '.' => one_char!(Dot),
            '?' => one_char!(Question),
            _ => {}
        }

        if c == '=' {
            self.advance();
            if self.peek() == '=' {
                self.advance();
                return Token::new(Eq, self.range_from(start), "==");
            }
            return Token::new(Assign, self.range_from(start), "=");
        }
        if c == '!' {
            self.advance();
            if self.peek() == '=' {
                self.advance();
                return Token::new(Ne, self.range_from(start), "!=");
            }
            return Token::new(Bang, self.range_from(start), "!");
        }
        if c == '<' {
            self.advance();
            if self.peek() == '=' {
                self.advance();
                return Token::new(Le, self.range_from(start), "<=");
            }
            return Token::new(Lt, self.range_from(start), "<");
        }
        if c == '>' {
            self.advance();
            if self.peek() == '=' {
                self.advance();
                return Token::new(Ge, self.range_from(start), ">=");
            }
            return Token::new(Gt, self.range_from(start), ">");
        }
        if c == '&' {
            self.advance();
            if self.peek() == '&' {
                self.advance();
                return Token::new(And, self.range_from(start), "&&");
            }
            return Token::new(Amp, self.range_from(start), "&");
        }
        if c == '|' {
            self.advance();
            if self.peek() == '|' {
                self.advance();
                return Token::new(Or, self.range_from(start), "||");
            }
            return Token::new(Pipe, self.range_from(start), "|");
        }
        if c == '+' {
            self.advance();
            if self.peek() == '+' {
                self.advance();
                return Token::new(Inc, self.range_from(start), "++");
            }
            if self.peek() == '=' {
                self.advance();
                return Token::new(PlusEqual, self.range_from(start), "+=");
            }
            return Token::new(Plus, self.range_from(start), "+");
        }
        if c == '-' {
            self.advance();
            if self.peek() == '-' {
                self.advance();
                return Token::new(Dec, self.range_from(start), "--");
            }
            if self.peek() == '=' {
                self.advance();
                return Token::new(MinusEqual, self.range_from(start), "-=");
            }
            if self.peek().is_ascii_digit() {
                // documented quirk: `-` immediately followed by a digit is
                // consumed as part of a negative numeric literal.
                let mut number = String::from("-");
                let mut is_float = false;
                let mut cc = self.peek();
                while cc.is_ascii_digit() || (cc == '.' && !is_float) {
                    if cc == '.' {
                        is_float = true;
                    }
                    number.push(cc);
                    self.advance();
                    cc = self.peek();
                }
                return Token::new(Number, self.range_from(start), number);
            }
            return Token::new(Minus, self.range_from(start), "-");
        }
        if c == '*' {
            self.advance();
            if self.peek() == '=' {
                self.advance();
                return Token::new(StarEqual, self.range_from(start), "*=");
            }
            return Token::new(Star, self.range_from(start), "*");
        }
        if c == '/' {
            self.advance();
            if self.peek() == '=' {
                self.advance();
                return Token::new(SlashEqual, self.range_from(start), "/=");
            }
            return Token::new(Slash, self.range_from(start), "/");
        }
        if c == '%' {
            self.advance();
            if self.peek() == '=' {
                self.advance();
                return Token::new(PercentEqual, self.range_from(start), "%=");
            }
            return Token::new(Percent, self.range_from(start), "%");
        }

        if c.is_ascii_digit() {
            let mut number = String::new();
            let mut is_float = false;
            let mut cc = c;
            while cc.is_ascii_digit() || (cc == '.' && !is_float) {
                if cc == '.' {
                    is_float = true;
                }
                number.push(cc);
                self.advance();
                cc = self.peek();
            }
            return Token::new(Number, self.range_from(start), number);
        }

        if c == '"' {
            self.advance();
            let mut s = String::new();
            loop {
                let cc = self.peek();
                if cc == '"' || cc == '\0' {
                    break;
                }
                if cc == '\\' {
                    self.advance();
                    let next = self.peek();
                    match next {
                        '"' => s.push('"'),
                        '\\' => s.push('\\'),
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        other => s.push(other),
                    }
                    self.advance();
                } else {
                    s.push(cc);
                    self.advance();
                }
            }
            if self.peek() == '"' {
                self.advance();
                return Token::new(String, self.range_from(start), s);
            }
            return Token::new(Junk, self.range_from(start), s);
        }

        if c.is_alphabetic() || c == '_' {
            let mut ident = String::new();
            let mut cc = c;
            while cc.is_alphanumeric() || cc == '_' {
                ident.push(cc);
                self.advance();
                cc = self.peek();
            }
            if let Some(kind) = keyword_kind(&ident) {
                return Token::new(kind, self.range_from(start), ident);
            }
            return Token::new(Ident, self.range_from(start), ident);
        }

        self.advance();
        Token::new(Junk, self.range_from(start), c.to_string())
    }

    /// Lex the whole buffer into a vector, always ending with one `End`
    /// token.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.lex();
            let is_end = tok.kind == TokenKind::End;
            tokens.push(tok);
            if is_end {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new("test.li", src)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn skips_whitespace_and_hash_comments() {
        let toks = kinds("  # a comment\n  42");
        assert_eq!(toks, vec![TokenKind::Number, TokenKind::End]);
    }

    #[test]
    fn negative_number_quirk() {
        let toks = kinds("a-1");
        assert_eq!(
            toks,
            vec![TokenKind::Ident, TokenKind::Number, TokenKind::End]
        );
        let lex = Lexer::new("t", "a-1").tokenize();
        assert_eq!(lex[1].lexeme, "-1");
    }

    #[test]
    fn trailing_dot_number() {
        let lex = Lexer::new("t", "42.").tokenize();
        assert_eq!(lex[0].kind, TokenKind::Number);
        assert_eq!(lex[0].lexeme, "42.");
    }

    #[test]
    fn two_char_operators() {
        let toks = kinds("== != <= >= && || ++ -- += -= *= /= %=");
        assert_eq!(
            toks,
            vec![
                TokenKind::Eq,
                TokenKind::Ne,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Inc,
                TokenKind::Dec,
                TokenKind::PlusEqual,
                TokenKind::MinusEqual,
                TokenKind::StarEqual,
                TokenKind::SlashEqual,
                TokenKind::PercentEqual,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn keywords_recognized() {
        let toks = kinds("let const fn class import true false null in foreach");
        assert_eq!(
            toks,
            vec![
                TokenKind::Let,
                TokenKind::Const,
                TokenKind::Fn,
                TokenKind::Class,
                TokenKind::Import,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Null,
                TokenKind::In,
                TokenKind::Foreach,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_junk() {
        let toks = kinds("\"abc");
        assert_eq!(toks, vec![TokenKind::Junk, TokenKind::End]);
    }

    #[test]
    fn string_escapes() {
        let lex = Lexer::new("t", r#""a\n\t\"b""#).tokenize();
        assert_eq!(lex[0].lexeme, "a\n\t\"b");
    }

    #[test]
    fn repeated_end_token_at_eof() {
        let mut lex = Lexer::new("t", "");
        let a = lex.lex();
        let b = lex.lex();
        assert_eq!(a.kind, TokenKind::End);
        assert_eq!(b.kind, TokenKind::End);
    }
}
