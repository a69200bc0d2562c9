//! The lexer: turns a source buffer into a flat, `END`-terminated token
//! sequence.
//!
//! Position tracking is byte-oriented (the language is restricted to
//! `[A-Za-z0-9_]` identifiers and ASCII punctuation, so byte and
//! character offsets coincide). The lexer keeps the whole source split
//! into lines up front (tabs expanded to single spaces) purely so that
//! every emitted token can carry an owned copy of its line's text without
//! re-scanning from the start on every diagnostic.

use crate::error::LexError;
use crate::token::{Token, TokenKind};
use subc_util::SourceLoc;

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
    /// Source split into lines, tabs expanded to a single space each.
    lines: Vec<String>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        let lines = src
            .split('\n')
            .map(|line| line.replace('\t', " "))
            .collect();
        Self {
            src: src.as_bytes(),
            pos: 0,
            line: 1,
            col: 0,
            lines,
        }
    }

    /// Lex the entire buffer, returning the full token stream (always
    /// ending with exactly one `END` sentinel) or the first lexical
    /// error encountered.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments()?;
            let loc = self.here();
            let Some(ch) = self.peek(0) else {
                tokens.push(Token::new(TokenKind::End, loc));
                return Ok(tokens);
            };

            let kind = if ch.is_ascii_digit() {
                self.lex_integer()
            } else if is_ident_start(ch) {
                self.lex_identifier_or_keyword()
            } else {
                self.lex_operator_or_punctuation(loc.clone())?
            };
            tokens.push(Token::new(kind, loc));
        }
    }

    fn here(&self) -> SourceLoc {
        let text = self.lines.get(self.line - 1).cloned().unwrap_or_default();
        SourceLoc::new(self.line, self.col, text)
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.src.get(self.pos + offset).map(|&b| b as char)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek(0)?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek(0) {
                Some(c) if c == ' ' || c == '\t' || c == '\n' => {
                    self.bump();
                }
                Some('/') if self.peek(1) == Some('/') => {
                    while !matches!(self.peek(0), None | Some('\n')) {
                        self.bump();
                    }
                }
                Some('/') if self.peek(1) == Some('*') => {
                    let start = self.here();
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek(0) {
                            None => {
                                return Err(LexError::UnterminatedComment { loc: start });
                            }
                            Some('*') if self.peek(1) == Some('/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn lex_integer(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        // The language has no literal overflow handling beyond what fits
        // an i64 intermediate; codegen truncates to 32 bits downstream.
        let value: i64 = text.parse().unwrap_or(i64::MAX);
        TokenKind::IntegerLiteral(value)
    }

    fn lex_identifier_or_keyword(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if is_ident_continue(c) {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        match text.as_str() {
            "int" => TokenKind::Int,
            "void" => TokenKind::Void,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "goto" => TokenKind::Goto,
            _ => TokenKind::Identifier(text),
        }
    }

    /// Matches punctuation and operators, longest match first, per the
    /// tokenization tie-break policy: three-character forms before
    /// two-character before one-character, with the compound-assignment
    /// and doubled-operator forms explicitly ordered ahead of their
    /// single-character components.
    fn lex_operator_or_punctuation(&mut self, loc: SourceLoc) -> Result<TokenKind, LexError> {
        let c0 = self.peek(0).unwrap();
        let c1 = self.peek(1);
        let c2 = self.peek(2);

        macro_rules! take {
            ($n:expr, $kind:expr) => {{
                for _ in 0..$n {
                    self.bump();
                }
                return Ok($kind);
            }};
        }

        match (c0, c1, c2) {
            ('<', Some('<'), Some('=')) => take!(3, TokenKind::ShlEq),
            ('>', Some('>'), Some('=')) => take!(3, TokenKind::ShrEq),
            ('<', Some('<'), _) => take!(2, TokenKind::Shl),
            ('>', Some('>'), _) => take!(2, TokenKind::Shr),
            ('+', Some('='), _) => take!(2, TokenKind::PlusEq),
            ('-', Some('='), _) => take!(2, TokenKind::MinusEq),
            ('*', Some('='), _) => take!(2, TokenKind::StarEq),
            ('/', Some('='), _) => take!(2, TokenKind::SlashEq),
            ('%', Some('='), _) => take!(2, TokenKind::PercentEq),
            ('&', Some('='), _) => take!(2, TokenKind::AmpEq),
            ('|', Some('='), _) => take!(2, TokenKind::PipeEq),
            ('^', Some('='), _) => take!(2, TokenKind::CaretEq),
            ('&', Some('&'), _) => take!(2, TokenKind::AmpAmp),
            ('|', Some('|'), _) => take!(2, TokenKind::PipePipe),
            ('=', Some('='), _) => take!(2, TokenKind::EqEq),
            ('!', Some('='), _) => take!(2, TokenKind::NotEq),
            ('<', Some('='), _) => take!(2, TokenKind::LtEq),
            ('>', Some('='), _) => take!(2, TokenKind::GtEq),
            ('+', Some('+'), _) => take!(2, TokenKind::PlusPlus),
            ('-', Some('-'), _) => take!(2, TokenKind::MinusMinus),
            ('{', ..) => take!(1, TokenKind::OpenBrace),
            ('}', ..) => take!(1, TokenKind::CloseBrace),
            ('(', ..) => take!(1, TokenKind::OpenParen),
            (')', ..) => take!(1, TokenKind::CloseParen),
            (';', ..) => take!(1, TokenKind::Semicolon),
            (':', ..) => take!(1, TokenKind::Colon),
            ('?', ..) => take!(1, TokenKind::Question),
            (',', ..) => take!(1, TokenKind::Comma),
            ('-', ..) => take!(1, TokenKind::Minus),
            ('~', ..) => take!(1, TokenKind::Tilde),
            ('+', ..) => take!(1, TokenKind::Plus),
            ('*', ..) => take!(1, TokenKind::Star),
            ('/', ..) => take!(1, TokenKind::Slash),
            ('%', ..) => take!(1, TokenKind::Percent),
            ('&', ..) => take!(1, TokenKind::Amp),
            ('|', ..) => take!(1, TokenKind::Pipe),
            ('^', ..) => take!(1, TokenKind::Caret),
            ('=', ..) => take!(1, TokenKind::Assign),
            ('!', ..) => take!(1, TokenKind::Bang),
            ('<', ..) => take!(1, TokenKind::Lt),
            ('>', ..) => take!(1, TokenKind::Gt),
            (other, ..) => {
                self.bump();
                Err(LexError::UnknownCharacter { ch: other, loc })
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        assert_eq!(
            kinds("int main"),
            vec![
                TokenKind::Int,
                TokenKind::Identifier("main".into()),
                TokenKind::End
            ]
        );
    }

    #[test]
    fn longest_match_for_operators() {
        assert_eq!(
            kinds("<<= << < <= &&"),
            vec![
                TokenKind::ShlEq,
                TokenKind::Shl,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::AmpAmp,
                TokenKind::End
            ]
        );
    }

    #[test]
    fn keyword_requires_non_identifier_boundary() {
        assert_eq!(
            kinds("intx"),
            vec![TokenKind::Identifier("intx".into()), TokenKind::End]
        );
    }

    #[test]
    fn skips_line_and_block_comments() {
        assert_eq!(
            kinds("int /* skip\nme */ x; // trailing\n"),
            vec![
                TokenKind::Int,
                TokenKind::Identifier("x".into()),
                TokenKind::Semicolon,
                TokenKind::End
            ]
        );
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        assert!(matches!(
            Lexer::new("/* never closes").tokenize(),
            Err(LexError::UnterminatedComment { .. })
        ));
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = Lexer::new("int\n  x;").tokenize().unwrap();
        let x_tok = &tokens[1];
        assert_eq!(x_tok.loc.line, 2);
        assert_eq!(x_tok.loc.column, 2);
    }
}
