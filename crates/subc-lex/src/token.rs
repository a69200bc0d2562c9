//! Token kinds and the `Token` record itself.

use subc_util::SourceLoc;

/// The closed set of token kinds the lexer can produce, per the external
/// interface's token-kind enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Punctuation
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    Semicolon,
    Colon,
    Question,
    Comma,

    // Keywords
    Int,
    Void,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    Goto,

    // Literals / names
    Identifier(String),
    IntegerLiteral(i64),

    // Operators
    Minus,
    Tilde,
    Plus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    Assign,
    Bang,
    AmpAmp,
    PipePipe,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    PlusEq,
    MinusEq,
    SlashEq,
    StarEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    ShlEq,
    ShrEq,
    PlusPlus,
    MinusMinus,

    /// Sentinel terminating every token stream exactly once.
    End,
}

impl TokenKind {
    /// A short, human-readable name used in "expecting X got Y" syntax
    /// error messages and in token dumps under `--lex`.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::OpenBrace => "'{'".into(),
            TokenKind::CloseBrace => "'}'".into(),
            TokenKind::OpenParen => "'('".into(),
            TokenKind::CloseParen => "')'".into(),
            TokenKind::Semicolon => "';'".into(),
            TokenKind::Colon => "':'".into(),
            TokenKind::Question => "'?'".into(),
            TokenKind::Comma => "','".into(),
            TokenKind::Int => "'int'".into(),
            TokenKind::Void => "'void'".into(),
            TokenKind::Return => "'return'".into(),
            TokenKind::If => "'if'".into(),
            TokenKind::Else => "'else'".into(),
            TokenKind::For => "'for'".into(),
            TokenKind::While => "'while'".into(),
            TokenKind::Do => "'do'".into(),
            TokenKind::Break => "'break'".into(),
            TokenKind::Continue => "'continue'".into(),
            TokenKind::Goto => "'goto'".into(),
            TokenKind::Identifier(name) => format!("identifier '{}'", name),
            TokenKind::IntegerLiteral(v) => format!("integer '{}'", v),
            TokenKind::Minus => "'-'".into(),
            TokenKind::Tilde => "'~'".into(),
            TokenKind::Plus => "'+'".into(),
            TokenKind::Star => "'*'".into(),
            TokenKind::Slash => "'/'".into(),
            TokenKind::Percent => "'%'".into(),
            TokenKind::Amp => "'&'".into(),
            TokenKind::Pipe => "'|'".into(),
            TokenKind::Caret => "'^'".into(),
            TokenKind::Shl => "'<<'".into(),
            TokenKind::Shr => "'>>'".into(),
            TokenKind::Assign => "'='".into(),
            TokenKind::Bang => "'!'".into(),
            TokenKind::AmpAmp => "'&&'".into(),
            TokenKind::PipePipe => "'||'".into(),
            TokenKind::EqEq => "'=='".into(),
            TokenKind::NotEq => "'!='".into(),
            TokenKind::Lt => "'<'".into(),
            TokenKind::LtEq => "'<='".into(),
            TokenKind::Gt => "'>'".into(),
            TokenKind::GtEq => "'>='".into(),
            TokenKind::PlusEq => "'+='".into(),
            TokenKind::MinusEq => "'-='".into(),
            TokenKind::SlashEq => "'/='".into(),
            TokenKind::StarEq => "'*='".into(),
            TokenKind::PercentEq => "'%='".into(),
            TokenKind::AmpEq => "'&='".into(),
            TokenKind::PipeEq => "'|='".into(),
            TokenKind::CaretEq => "'^='".into(),
            TokenKind::ShlEq => "'<<='".into(),
            TokenKind::ShrEq => "'>>='".into(),
            TokenKind::PlusPlus => "'++'".into(),
            TokenKind::MinusMinus => "'--'".into(),
            TokenKind::End => "end of input".into(),
        }
    }
}

/// A lexed token: its kind, plus the source location of its first byte.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: SourceLoc,
}

impl Token {
    pub fn new(kind: TokenKind, loc: SourceLoc) -> Self {
        Self { kind, loc }
    }
}
