use super::{Column, LineNumber};

#[derive(Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    line_number: LineNumber,
    column: Column,
    message: String,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, ..$col:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_column($col)
    };
    ($err:ident, $line:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_line_number($line)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, ..$col:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_column($col)
            .message($msg)
    };
    ($err:ident, $line:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code,
            line_number: None,
            column: 0..0,
            message: String::new(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn category(&self) -> Category {
        self.code.category()
    }

    pub fn line_number(&self) -> LineNumber {
        self.line_number
    }

    pub fn column(&self) -> Column {
        self.column.clone()
    }

    pub fn is_direct(&self) -> bool {
        self.line_number.is_none()
    }

    /// Attributes the error to a line unless an inner frame already did.
    pub fn in_line_number(self, line: LineNumber) -> Error {
        if self.line_number.is_some() {
            return self;
        }
        Error {
            line_number: line,
            ..self
        }
    }

    pub fn in_column(self, column: &Column) -> Error {
        if self.column != (0..0) {
            return self;
        }
        Error {
            column: column.clone(),
            ..self
        }
    }

    pub fn message(self, message: &str) -> Error {
        Error {
            message: message.to_string(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Lex,
    Parse,
    Runtime,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Category::Lex => write!(f, "LEX ERROR"),
            Category::Parse => write!(f, "PARSE ERROR"),
            Category::Runtime => write!(f, "RUNTIME ERROR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    UnterminatedString,
    InvalidNumber,
    UnknownCharacter,
    ReservedWord,
    LineNumberRange,

    SyntaxError,
    ArgumentCount,
    UnbalancedParentheses,
    UnknownCommand,
    IllegalDirect,

    TypeMismatch,
    UndefinedIdentifier,
    SubscriptOutOfRange,
    IllegalQuantity,
    ReturnWithoutGosub,
    NextWithoutFor,
    ExitWithoutFor,
    DivisionByZero,
    Overflow,
    UndefinedLine,
    UndefinedFunction,
    OutOfData,
    OutOfMemory,
    Break,
    DirectStatementInFile,
    InternalError,
}

impl ErrorCode {
    pub fn category(self) -> Category {
        use ErrorCode::*;
        match self {
            UnterminatedString | InvalidNumber | UnknownCharacter | ReservedWord
            | LineNumberRange => Category::Lex,
            SyntaxError | ArgumentCount | UnbalancedParentheses | UnknownCommand
            | IllegalDirect => Category::Parse,
            _ => Category::Runtime,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use ErrorCode::*;
        let code_str = match self {
            UnterminatedString => "UNTERMINATED STRING LITERAL",
            InvalidNumber => "INVALID NUMERIC LITERAL",
            UnknownCharacter => "UNKNOWN CHARACTER",
            ReservedWord => "RESERVED WORD IN VARIABLE NAME",
            LineNumberRange => "LINE NUMBER OUT OF RANGE",
            SyntaxError => "SYNTAX ERROR",
            ArgumentCount => "WRONG NUMBER OF ARGUMENTS",
            UnbalancedParentheses => "UNBALANCED PARENTHESES",
            UnknownCommand => "UNKNOWN COMMAND",
            IllegalDirect => "ILLEGAL DIRECT",
            TypeMismatch => "TYPE MISMATCH",
            UndefinedIdentifier => "UNDEFINED IDENTIFIER",
            SubscriptOutOfRange => "SUBSCRIPT OUT OF RANGE",
            IllegalQuantity => "ILLEGAL QUANTITY",
            ReturnWithoutGosub => "RETURN WITHOUT GOSUB",
            NextWithoutFor => "NEXT WITHOUT FOR",
            ExitWithoutFor => "EXIT WITHOUT FOR",
            DivisionByZero => "DIVISION BY ZERO",
            Overflow => "OVERFLOW",
            UndefinedLine => "UNDEFINED LINE",
            UndefinedFunction => "UNDEFINED USER FUNCTION",
            OutOfData => "OUT OF DATA",
            OutOfMemory => "OUT OF MEMORY",
            Break => "BREAK",
            DirectStatementInFile => "DIRECT STATEMENT IN FILE",
            InternalError => "INTERNAL ERROR",
        };
        write!(f, "{}", code_str)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut suffix = String::new();
        if let Some(line_number) = self.line_number {
            suffix.push_str(&format!(" {}", line_number));
        }
        if !self.message.is_empty() {
            suffix.push_str(&format!("; {}", self.message));
        }
        if suffix.is_empty() {
            write!(f, "{}", self.code)
        } else if self.line_number.is_some() {
            write!(f, "{} IN{}", self.code, suffix)
        } else {
            write!(f, "{}{}", self.code, suffix)
        }
    }
}
