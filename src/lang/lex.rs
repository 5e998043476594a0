use super::{token::*, Column, Error, LineNumber, MaxValue, Scope};

type Result<T> = std::result::Result<T, Error>;

/// Splits off the line number and tokenizes the rest of the line.
/// Identifiers already known to `scope` as functions come back as
/// `Kind::Function`.
pub fn lex<S: Scope + ?Sized>(s: &str, scope: &S) -> Result<(LineNumber, Vec<Token>)> {
    BasicLexer::lex(s, scope)
}

fn is_basic_whitespace(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r' || c == '\n'
}

fn is_basic_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_basic_alphabetic(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_sigil(c: char) -> bool {
    c == '$' || c == '#' || c == '%'
}

trait Tokenizers<'a> {
    fn chars(&mut self) -> &mut std::iter::Peekable<std::str::Chars<'a>>;
    fn col(&mut self) -> &mut usize;
    fn line(&self) -> LineNumber;
    fn is_function(&self, name: &str) -> bool;

    fn next_char(&mut self) -> Option<char> {
        let ch = self.chars().next()?;
        *self.col() += 1;
        Some(ch)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars().peek().copied()
    }

    fn token(&mut self, kind: Kind, lexeme: &str, start: usize) -> Token {
        let end = *self.col();
        Token::new(kind, lexeme, self.line(), start..end)
    }

    fn whitespace(&mut self) {
        while let Some(pk) = self.peek_char() {
            if !is_basic_whitespace(pk) {
                break;
            }
            self.next_char();
        }
    }

    fn number(&mut self) -> Result<Token> {
        let start = *self.col();
        let mut s = String::new();
        while let Some(pk) = self.peek_char() {
            if !is_basic_digit(pk) {
                break;
            }
            s.push(pk);
            self.next_char();
        }
        if s == "0" {
            if let Some('x') | Some('X') = self.peek_char() {
                self.next_char();
                s.push('x');
                while let Some(pk) = self.peek_char() {
                    if !pk.is_ascii_alphanumeric() {
                        break;
                    }
                    s.push(pk.to_ascii_uppercase());
                    self.next_char();
                }
                return Ok(self.token(Kind::Integer, &s, start));
            }
        }
        if let Some('.') = self.peek_char() {
            self.next_char();
            s.push('.');
            match self.peek_char() {
                Some(pk) if is_basic_digit(pk) => {}
                _ => {
                    let col = start..*self.col();
                    return Err(error!(InvalidNumber, ..&col; "INVALID FLOATING POINT LITERAL"));
                }
            }
            while let Some(pk) = self.peek_char() {
                if !is_basic_digit(pk) {
                    break;
                }
                s.push(pk);
                self.next_char();
            }
            return Ok(self.token(Kind::Float, &s, start));
        }
        Ok(self.token(Kind::Integer, &s, start))
    }

    fn string(&mut self) -> Result<Token> {
        let start = *self.col();
        let mut s = String::new();
        self.next_char();
        loop {
            match self.next_char() {
                Some('"') => return Ok(self.token(Kind::String, &s, start)),
                Some(ch) => s.push(ch),
                None => {
                    let col = start..*self.col();
                    return Err(error!(UnterminatedString, ..&col));
                }
            }
        }
    }

    fn alphabetic(&mut self) -> Result<Token> {
        let start = *self.col();
        let mut s = String::new();
        while let Some(pk) = self.peek_char() {
            if !is_basic_alphabetic(pk) && !is_basic_digit(pk) {
                break;
            }
            s.push(pk.to_ascii_uppercase());
            self.next_char();
        }
        if let Some(sigil) = self.peek_char().filter(|pk| is_sigil(*pk)) {
            self.next_char();
            if let Some(kind) = Kind::from_string(&s) {
                if kind.is_reserved_word() {
                    let col = start..*self.col();
                    return Err(error!(ReservedWord, ..&col; &format!("{}{}", s, sigil)));
                }
            }
            s.push(sigil);
        } else if let Some(kind) = Kind::from_string(&s) {
            return Ok(self.token(kind, &s, start));
        }
        if self.is_function(&s) {
            Ok(self.token(Kind::Function, &s, start))
        } else {
            Ok(self.token(Kind::Identifier, &s, start))
        }
    }

    fn minutia(&mut self) -> Result<Token> {
        let start = *self.col();
        let mut s = String::new();
        if let Some(ch) = self.next_char() {
            s.push(ch);
            if ch == '<' || ch == '>' {
                if let Some(pk) = self.peek_char() {
                    let mut pair = s.clone();
                    pair.push(pk);
                    if Kind::from_string(&pair).is_some() {
                        self.next_char();
                        s = pair;
                    }
                }
            }
        }
        match Kind::from_string(&s) {
            Some(kind) => Ok(self.token(kind, &s, start)),
            None => {
                let col = start..*self.col();
                Err(error!(UnknownCharacter, ..&col; &s))
            }
        }
    }
}

struct BasicLexer<'a, 'b, S: Scope + ?Sized> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    col: usize,
    line: LineNumber,
    scope: &'b S,
    remark: bool,
}

impl<'a, 'b, S: Scope + ?Sized> Tokenizers<'a> for BasicLexer<'a, 'b, S> {
    fn chars(&mut self) -> &mut std::iter::Peekable<std::str::Chars<'a>> {
        &mut self.chars
    }

    fn col(&mut self) -> &mut usize {
        &mut self.col
    }

    fn line(&self) -> LineNumber {
        self.line
    }

    fn is_function(&self, name: &str) -> bool {
        self.scope.is_function(name)
    }
}

impl<'a, 'b, S: Scope + ?Sized> Iterator for BasicLexer<'a, 'b, S> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remark {
            return None;
        }
        self.whitespace();
        let pk = self.peek_char()?;
        if is_basic_digit(pk) || pk == '.' {
            return Some(self.number());
        }
        if is_basic_alphabetic(pk) {
            let r = self.alphabetic();
            if let Ok(t) = &r {
                if t.is_word(Word::Rem) {
                    self.remark = true;
                    return None;
                }
            }
            return Some(r);
        }
        if pk == '"' {
            return Some(self.string());
        }
        Some(self.minutia())
    }
}

impl<'a, 'b, S: Scope + ?Sized> BasicLexer<'a, 'b, S> {
    fn lex(s: &'a str, scope: &'b S) -> Result<(LineNumber, Vec<Token>)> {
        let (line_number, offset) = Self::line_number(s)?;
        let mut lexer = BasicLexer {
            chars: s[offset..].chars().peekable(),
            col: s[..offset].chars().count(),
            line: line_number,
            scope,
            remark: false,
        };
        let mut tokens = vec![];
        while let Some(token) = lexer.next() {
            match token {
                Ok(token) => tokens.push(token),
                Err(e) => return Err(e.in_line_number(line_number)),
            }
        }
        Ok((line_number, tokens))
    }

    /// A run of digits at the very start of the line is its number.
    fn line_number(s: &str) -> Result<(LineNumber, usize)> {
        let trimmed = s.trim_start_matches(|c| c == ' ' || c == '\t');
        let skipped = s.len() - trimmed.len();
        let digits = trimmed.chars().take_while(|c| is_basic_digit(*c)).count();
        if digits == 0 {
            return Ok((None, 0));
        }
        let end = skipped + digits;
        let col: Column = skipped..end;
        match s[skipped..end].parse::<u32>() {
            Ok(n) if n <= LineNumber::max_value() as u32 => Ok((Some(n as u16), end)),
            _ => Err(error!(LineNumberRange, ..&col; &s[skipped..end])),
        }
    }
}
