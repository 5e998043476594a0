use super::{Column, LineNumber};

#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: Kind,
    pub lexeme: String,
    pub line: LineNumber,
    pub column: Column,
}

impl Token {
    pub fn new(kind: Kind, lexeme: &str, line: LineNumber, column: Column) -> Token {
        Token {
            kind,
            lexeme: lexeme.to_string(),
            line,
            column,
        }
    }

    pub fn is_word(&self, word: Word) -> bool {
        self.kind == Kind::Word(word)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.kind {
            Kind::String => write!(f, "\"{}\"", self.lexeme),
            _ => write!(f, "{}", self.lexeme),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Kind {
    Integer,
    Float,
    String,
    Identifier,
    Function,
    Word(Word),
    Operator(Operator),
    LParen,
    RParen,
    Comma,
    Colon,
    Semicolon,
}

impl Kind {
    /// Reserved words and punctuation. Identifiers and literals are not here.
    pub fn from_string(s: &str) -> Option<Kind> {
        if let Some(word) = Word::from_string(s) {
            return Some(Kind::Word(word));
        }
        if let Some(op) = Operator::from_string(s) {
            return Some(Kind::Operator(op));
        }
        match s {
            "(" => Some(Kind::LParen),
            ")" => Some(Kind::RParen),
            "," => Some(Kind::Comma),
            ":" => Some(Kind::Colon),
            ";" => Some(Kind::Semicolon),
            _ => None,
        }
    }

    pub fn is_reserved_word(&self) -> bool {
        match self {
            Kind::Word(_) => true,
            Kind::Operator(op) => op.is_reserved_word(),
            _ => false,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Word {
    Auto,
    Data,
    Def,
    Dim,
    Else,
    End,
    Exit,
    For,
    Gosub,
    Goto,
    If,
    Input,
    Label,
    Let,
    Next,
    Poke,
    Print,
    Quit,
    Read,
    Rem,
    Return,
    Run,
    Step,
    Stop,
    Then,
    To,
}

impl Word {
    pub fn from_string(s: &str) -> Option<Word> {
        use Word::*;
        Some(match s {
            "AUTO" => Auto,
            "DATA" => Data,
            "DEF" => Def,
            "DIM" => Dim,
            "ELSE" => Else,
            "END" => End,
            "EXIT" => Exit,
            "FOR" => For,
            "GOSUB" => Gosub,
            "GOTO" => Goto,
            "IF" => If,
            "INPUT" => Input,
            "LABEL" => Label,
            "LET" => Let,
            "NEXT" => Next,
            "POKE" => Poke,
            "PRINT" | "?" => Print,
            "QUIT" => Quit,
            "READ" => Read,
            "REM" => Rem,
            "RETURN" => Return,
            "RUN" => Run,
            "STEP" => Step,
            "STOP" => Stop,
            "THEN" => Then,
            "TO" => To,
            _ => return None,
        })
    }

    /// Words that can start a statement.
    pub fn is_command(self) -> bool {
        use Word::*;
        !matches!(self, Else | Rem | Step | Then | To)
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Word::*;
        match self {
            Auto => write!(f, "AUTO"),
            Data => write!(f, "DATA"),
            Def => write!(f, "DEF"),
            Dim => write!(f, "DIM"),
            Else => write!(f, "ELSE"),
            End => write!(f, "END"),
            Exit => write!(f, "EXIT"),
            For => write!(f, "FOR"),
            Gosub => write!(f, "GOSUB"),
            Goto => write!(f, "GOTO"),
            If => write!(f, "IF"),
            Input => write!(f, "INPUT"),
            Label => write!(f, "LABEL"),
            Let => write!(f, "LET"),
            Next => write!(f, "NEXT"),
            Poke => write!(f, "POKE"),
            Print => write!(f, "PRINT"),
            Quit => write!(f, "QUIT"),
            Read => write!(f, "READ"),
            Rem => write!(f, "REM"),
            Return => write!(f, "RETURN"),
            Run => write!(f, "RUN"),
            Step => write!(f, "STEP"),
            Stop => write!(f, "STOP"),
            Then => write!(f, "THEN"),
            To => write!(f, "TO"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operator {
    Caret,
    Multiply,
    Divide,
    Plus,
    Minus,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Not,
    And,
    Or,
}

impl Operator {
    pub fn from_string(s: &str) -> Option<Operator> {
        use Operator::*;
        Some(match s {
            "^" => Caret,
            "*" => Multiply,
            "/" => Divide,
            "+" => Plus,
            "-" => Minus,
            "=" => Equal,
            "<>" => NotEqual,
            "<" => Less,
            "<=" => LessEqual,
            ">" => Greater,
            ">=" => GreaterEqual,
            "NOT" => Not,
            "AND" => And,
            "OR" => Or,
            _ => return None,
        })
    }

    pub fn is_reserved_word(&self) -> bool {
        matches!(self, Operator::Not | Operator::And | Operator::Or)
    }

    pub fn is_relational(&self) -> bool {
        use Operator::*;
        matches!(
            self,
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual
        )
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Operator::*;
        match self {
            Caret => write!(f, "^"),
            Multiply => write!(f, "*"),
            Divide => write!(f, "/"),
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Equal => write!(f, "="),
            NotEqual => write!(f, "<>"),
            Less => write!(f, "<"),
            LessEqual => write!(f, "<="),
            Greater => write!(f, ">"),
            GreaterEqual => write!(f, ">="),
            Not => write!(f, "NOT"),
            And => write!(f, "AND"),
            Or => write!(f, "OR"),
        }
    }
}
