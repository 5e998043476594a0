use super::{ast::*, token::*, Column, Error, Ident, LineNumber, Scope};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Parses one line of tokens into statements. `DEF` and `FOR` reach into
/// `scope` while parsing; nothing else does.
pub fn parse<S: Scope + ?Sized>(
    line_number: LineNumber,
    tokens: &[Token],
    scope: &mut S,
) -> Result<Vec<Leaf>> {
    match Parser::parse(line_number, tokens, scope) {
        Err(e) => Err(e.in_line_number(line_number)),
        Ok(r) => Ok(r),
    }
}

struct Parser<'a, 'b, S: Scope + ?Sized> {
    tokens: &'a [Token],
    index: usize,
    scope: &'b mut S,
    line: LineNumber,
    statement: usize,
    in_arm: bool,
    col: Column,
}

impl<'a, 'b, S: Scope + ?Sized> Parser<'a, 'b, S> {
    fn parse(line: LineNumber, tokens: &'a [Token], scope: &'b mut S) -> Result<Vec<Leaf>> {
        let mut parse = Parser {
            tokens,
            index: 0,
            scope,
            line,
            statement: 0,
            in_arm: false,
            col: 0..0,
        };
        let mut r: Vec<Leaf> = vec![];
        loop {
            match parse.peek_kind() {
                None => return Ok(r),
                Some(Kind::Colon) => {
                    parse.advance();
                    continue;
                }
                _ => {}
            }
            parse.statement = r.len();
            match parse.statement().and_then(|s| parse.end_of_statement().map(|_| s)) {
                Ok(s) => r.push(s),
                Err(e) => return Err(e.in_column(&parse.col)),
            }
        }
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let t = self.tokens.get(self.index)?;
        self.index += 1;
        self.col = t.column.clone();
        Some(t)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.index)
    }

    fn peek_kind(&self) -> Option<Kind> {
        self.peek().map(|t| t.kind)
    }

    fn peek_word(&self, word: Word) -> bool {
        self.peek_kind() == Some(Kind::Word(word))
    }

    fn peek_operator(&self, op: Operator) -> bool {
        self.peek_kind() == Some(Kind::Operator(op))
    }

    fn at_end_of_statement(&self) -> bool {
        matches!(
            self.peek_kind(),
            None | Some(Kind::Colon) | Some(Kind::Word(Word::Else))
        )
    }

    fn end_of_statement(&mut self) -> Result<()> {
        if self.at_end_of_statement() {
            return Ok(());
        }
        match self.advance() {
            Some(t) if t.kind == Kind::RParen => Err(error!(UnbalancedParentheses)),
            Some(t) => Err(error!(SyntaxError; &format!("UNEXPECTED {}", t))),
            None => Ok(()),
        }
    }

    fn statement(&mut self) -> Result<Leaf> {
        match self.peek_kind() {
            Some(Kind::Word(word)) => {
                self.advance();
                self.for_word(word)
            }
            _ => self.assignment(),
        }
    }

    /// `target = value`, or failing that a bare expression.
    fn assignment(&mut self) -> Result<Leaf> {
        let start = self.index;
        if let Some(Kind::Identifier) = self.peek_kind() {
            let target = self.identifier()?;
            if self.peek_operator(Operator::Equal) {
                self.advance();
                let value = self.expression()?;
                return Ok(Leaf::assignment(target, value));
            }
            self.index = start;
        }
        let expr = self.expression()?;
        if let Leaf::Identifier(Ident::Plain(name), None) = &expr {
            return Err(error!(UnknownCommand; name));
        }
        Ok(expr)
    }

    fn expression(&mut self) -> Result<Leaf> {
        self.logical()
    }

    fn logical(&mut self) -> Result<Leaf> {
        let mut lhs = self.logical_not()?;
        while let Some(Kind::Operator(op)) = self.peek_kind() {
            if op != Operator::And && op != Operator::Or {
                break;
            }
            self.advance();
            let rhs = self.logical_not()?;
            lhs = Leaf::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn logical_not(&mut self) -> Result<Leaf> {
        if self.peek_operator(Operator::Not) {
            self.advance();
            let operand = self.logical_not()?;
            return Ok(Leaf::Unary(Operator::Not, Box::new(operand)));
        }
        self.relational()
    }

    fn relational(&mut self) -> Result<Leaf> {
        let mut lhs = self.subtraction()?;
        while let Some(Kind::Operator(op)) = self.peek_kind() {
            if !op.is_relational() {
                break;
            }
            self.advance();
            let rhs = self.subtraction()?;
            lhs = Leaf::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn subtraction(&mut self) -> Result<Leaf> {
        let mut lhs = self.addition()?;
        while self.peek_operator(Operator::Minus) {
            self.advance();
            let rhs = self.addition()?;
            lhs = Leaf::binary(Operator::Minus, lhs, rhs);
        }
        Ok(lhs)
    }

    fn addition(&mut self) -> Result<Leaf> {
        let mut lhs = self.multiplication()?;
        while self.peek_operator(Operator::Plus) {
            self.advance();
            let rhs = self.multiplication()?;
            lhs = Leaf::binary(Operator::Plus, lhs, rhs);
        }
        Ok(lhs)
    }

    fn multiplication(&mut self) -> Result<Leaf> {
        let mut lhs = self.division()?;
        while self.peek_operator(Operator::Multiply) {
            self.advance();
            let rhs = self.division()?;
            lhs = Leaf::binary(Operator::Multiply, lhs, rhs);
        }
        Ok(lhs)
    }

    fn division(&mut self) -> Result<Leaf> {
        let mut lhs = self.unary()?;
        while self.peek_operator(Operator::Divide) {
            self.advance();
            let rhs = self.unary()?;
            lhs = Leaf::binary(Operator::Divide, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Leaf> {
        if self.peek_operator(Operator::Minus) {
            self.advance();
            let operand = self.unary()?;
            return Ok(Leaf::Unary(Operator::Minus, Box::new(operand)));
        }
        self.exponent()
    }

    fn exponent(&mut self) -> Result<Leaf> {
        let mut lhs = self.function_call()?;
        while self.peek_operator(Operator::Caret) {
            self.advance();
            let rhs = if self.peek_operator(Operator::Minus) {
                self.unary()?
            } else {
                self.function_call()?
            };
            lhs = Leaf::binary(Operator::Caret, lhs, rhs);
        }
        Ok(lhs)
    }

    fn function_call(&mut self) -> Result<Leaf> {
        let token = match self.peek() {
            Some(t) if t.kind == Kind::Function => t,
            _ => return self.primary(),
        };
        self.advance();
        let name: Rc<str> = token.lexeme.as_str().into();
        let arguments = self.expression_list()?;
        match self.scope.arity(&name) {
            Some(arity) if arity.contains(&arguments.len()) => {}
            Some(arity) => {
                return Err(error!(ArgumentCount; &format!(
                    "{} TAKES {} TO {} ARGUMENTS, GOT {}",
                    name,
                    arity.start(),
                    arity.end(),
                    arguments.len()
                )))
            }
            None => return Err(error!(SyntaxError; &format!("{} IS NOT A FUNCTION", name))),
        }
        Ok(Leaf::Function(
            name,
            Box::new(Leaf::Arguments(ArgumentKind::FunctionArgument, arguments)),
        ))
    }

    fn primary(&mut self) -> Result<Leaf> {
        let token = match self.peek() {
            Some(t) => t,
            None => return Err(error!(SyntaxError; "EXPECTED EXPRESSION")),
        };
        match token.kind {
            Kind::Integer | Kind::Float | Kind::String => {
                self.advance();
                Self::for_literal(token)
            }
            Kind::Identifier => self.identifier(),
            Kind::LParen => {
                self.advance();
                let expr = self.expression()?;
                match self.advance() {
                    Some(t) if t.kind == Kind::RParen => Ok(Leaf::Grouping(Box::new(expr))),
                    _ => Err(error!(UnbalancedParentheses; "EXPECTED RIGHT PARENTHESIS")),
                }
            }
            Kind::Operator(Operator::Plus) => {
                self.advance();
                self.function_call()
            }
            Kind::RParen => {
                self.advance();
                Err(error!(UnbalancedParentheses))
            }
            _ => {
                self.advance();
                Err(error!(SyntaxError; &format!("EXPECTED EXPRESSION, FOUND {}", token)))
            }
        }
    }

    fn identifier(&mut self) -> Result<Leaf> {
        let ident = match self.advance() {
            Some(t) if t.kind == Kind::Identifier => Ident::from_name(&t.lexeme),
            _ => return Err(error!(SyntaxError; "EXPECTED IDENTIFIER")),
        };
        let subscripts = if self.peek_kind() == Some(Kind::LParen) {
            let list = self.expression_list()?;
            Some(Box::new(Leaf::Arguments(ArgumentKind::ArraySubscript, list)))
        } else {
            None
        };
        Ok(Leaf::Identifier(ident, subscripts))
    }

    /// An identifier with a type sigil, the only kind that names storage.
    fn variable(&mut self) -> Result<Leaf> {
        let leaf = self.identifier()?;
        if leaf.ident().map_or(false, |ident| !ident.is_plain()) {
            Ok(leaf)
        } else {
            Err(error!(SyntaxError; "EXPECTED VARIABLE NAME WITH $, # OR %"))
        }
    }

    fn expression_list(&mut self) -> Result<Vec<Leaf>> {
        self.expect(Kind::LParen)?;
        let mut v: Vec<Leaf> = vec![];
        if self.peek_kind() == Some(Kind::RParen) {
            self.advance();
            return Ok(v);
        }
        loop {
            v.push(self.expression()?);
            match self.advance() {
                Some(t) if t.kind == Kind::RParen => return Ok(v),
                Some(t) if t.kind == Kind::Comma => continue,
                _ => return Err(error!(UnbalancedParentheses; "EXPECTED RIGHT PARENTHESIS")),
            }
        }
    }

    fn printer_list(&mut self) -> Result<Vec<Leaf>> {
        let mut v: Vec<Leaf> = vec![];
        let mut linefeed = true;
        loop {
            match self.peek_kind() {
                None | Some(Kind::Colon) | Some(Kind::Word(Word::Else)) => {
                    if linefeed {
                        v.push(Leaf::Char('\n'));
                    }
                    return Ok(v);
                }
                Some(Kind::Semicolon) => {
                    linefeed = false;
                    self.advance();
                }
                Some(Kind::Comma) => {
                    linefeed = false;
                    self.advance();
                    v.push(Leaf::Char('\t'));
                }
                _ => {
                    linefeed = true;
                    v.push(self.expression()?);
                }
            };
        }
    }

    fn variable_list(&mut self) -> Result<Vec<Leaf>> {
        let mut v = vec![self.variable()?];
        while self.peek_kind() == Some(Kind::Comma) {
            self.advance();
            v.push(self.variable()?);
        }
        Ok(v)
    }

    fn optional_expression(&mut self) -> Result<Option<Leaf>> {
        if self.at_end_of_statement() {
            Ok(None)
        } else {
            Ok(Some(self.expression()?))
        }
    }

    fn expect(&mut self, kind: Kind) -> Result<()> {
        if let Some(t) = self.advance() {
            if t.kind == kind {
                return Ok(());
            }
        }
        Err(match kind {
            Kind::Word(word) => error!(SyntaxError; &format!("EXPECTED {}", word)),
            Kind::Operator(op) => error!(SyntaxError; &format!("EXPECTED {}", op)),
            Kind::LParen => error!(SyntaxError; "EXPECTED LEFT PARENTHESIS"),
            Kind::RParen => error!(UnbalancedParentheses; "EXPECTED RIGHT PARENTHESIS"),
            Kind::Comma => error!(SyntaxError; "EXPECTED COMMA"),
            Kind::Colon => error!(SyntaxError; "EXPECTED COLON"),
            Kind::Semicolon => error!(SyntaxError; "EXPECTED SEMICOLON"),
            Kind::Identifier | Kind::Function => error!(SyntaxError; "EXPECTED IDENTIFIER"),
            Kind::Integer | Kind::Float | Kind::String => error!(SyntaxError; "EXPECTED LITERAL"),
        })
    }

    fn for_literal(token: &Token) -> Result<Leaf> {
        let s = token.lexeme.as_str();
        match token.kind {
            Kind::String => Ok(Leaf::String(s.into())),
            Kind::Float => match s.parse::<f64>() {
                Ok(f) => Ok(Leaf::Float(f)),
                Err(_) => Err(error!(SyntaxError; "INVALID FLOATING POINT LITERAL")),
            },
            _ => {
                let parsed = match s.strip_prefix("0x") {
                    Some(hex) => i64::from_str_radix(hex, 16),
                    None => s.parse::<i64>(),
                };
                match parsed {
                    Ok(n) => Ok(Leaf::Integer(n)),
                    Err(_) => Err(error!(SyntaxError; &format!("INVALID INTEGER LITERAL {}", s))),
                }
            }
        }
    }

    fn for_word(&mut self, word: Word) -> Result<Leaf> {
        use Word::*;
        match word {
            Auto => self.r#auto(),
            Data => self.r#data(),
            Def => self.r#def(),
            Dim => self.r#dim(),
            End | Exit | Quit | Stop => Ok(Leaf::command(word, None)),
            For => self.r#for(),
            Gosub | Goto => self.r#goto(word),
            If => self.r#if(),
            Input => self.r#input(),
            Label => self.r#label(),
            Let => self.r#let(),
            Next => self.r#next(),
            Poke => self.r#poke(),
            Print => self.r#print(),
            Read => self.r#read(),
            Return | Run => {
                let right = self.optional_expression()?;
                Ok(Leaf::command(word, right))
            }
            Else | Rem | Step | Then | To => {
                Err(error!(SyntaxError; &format!("EXPECTED STATEMENT, FOUND {}", word)))
            }
        }
    }

    fn r#auto(&mut self) -> Result<Leaf> {
        let right = self.optional_expression()?;
        Ok(Leaf::command(Word::Auto, right))
    }

    fn r#data(&mut self) -> Result<Leaf> {
        let mut literals = vec![];
        loop {
            let negative = self.peek_operator(Operator::Minus);
            if negative {
                self.advance();
            }
            let literal = match self.advance() {
                Some(t) if t.kind == Kind::Integer || t.kind == Kind::Float => {
                    Self::for_literal(t)?
                }
                Some(t) if t.kind == Kind::String && !negative => Self::for_literal(t)?,
                _ => return Err(error!(SyntaxError; "EXPECTED LITERAL IN DATA")),
            };
            literals.push(match literal {
                Leaf::Integer(n) if negative => Leaf::Integer(-n),
                Leaf::Float(f) if negative => Leaf::Float(-f),
                other => other,
            });
            if self.peek_kind() != Some(Kind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(Leaf::command(
            Word::Data,
            Some(Leaf::Arguments(ArgumentKind::FunctionArgument, literals)),
        ))
    }

    fn r#def(&mut self) -> Result<Leaf> {
        let name: Rc<str> = match self.advance() {
            Some(t) if t.kind == Kind::Identifier || t.kind == Kind::Function => {
                t.lexeme.as_str().into()
            }
            _ => return Err(error!(SyntaxError; "EXPECTED FUNCTION NAME")),
        };
        self.expect(Kind::LParen)?;
        let mut parameters: Vec<Ident> = vec![];
        if self.peek_kind() == Some(Kind::RParen) {
            self.advance();
        } else {
            loop {
                match self.variable()? {
                    Leaf::Identifier(ident, None) => parameters.push(ident),
                    _ => return Err(error!(SyntaxError; "PARAMETERS CANNOT HAVE SUBSCRIPTS")),
                }
                match self.advance() {
                    Some(t) if t.kind == Kind::Comma => continue,
                    Some(t) if t.kind == Kind::RParen => break,
                    _ => return Err(error!(UnbalancedParentheses; "EXPECTED RIGHT PARENTHESIS")),
                }
            }
        }
        let body = if self.peek_operator(Operator::Equal) {
            self.advance();
            FunctionBody::Expression(self.expression()?)
        } else {
            match self.line {
                Some(line) => FunctionBody::Line(line),
                None => return Err(error!(IllegalDirect; "DEF WITHOUT A BODY NEEDS A LINE NUMBER")),
            }
        };
        let parameter_leaves = parameters
            .iter()
            .map(|p| Leaf::Identifier(p.clone(), None))
            .collect();
        self.scope.define_function(FunctionDef {
            name: name.clone(),
            parameters,
            body,
        });
        Ok(Leaf::command(
            Word::Def,
            Some(Leaf::Function(
                name,
                Box::new(Leaf::Arguments(
                    ArgumentKind::FunctionArgument,
                    parameter_leaves,
                )),
            )),
        ))
    }

    fn r#dim(&mut self) -> Result<Leaf> {
        let mut arrays = vec![];
        loop {
            let array = self.variable()?;
            if array.subscripts().is_none() {
                return Err(error!(SyntaxError; "EXPECTED ARRAY DIMENSIONS"));
            }
            arrays.push(array);
            if self.peek_kind() != Some(Kind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(Leaf::command(
            Word::Dim,
            Some(Leaf::Arguments(ArgumentKind::FunctionArgument, arrays)),
        ))
    }

    fn r#for(&mut self) -> Result<Leaf> {
        if self.in_arm {
            return Err(error!(SyntaxError; "FOR CANNOT BE INSIDE IF"));
        }
        let target = self.variable()?;
        let variable = match &target {
            Leaf::Identifier(ident, None) if ident.is_numeric() => ident.clone(),
            _ => return Err(error!(SyntaxError; "FOR NEEDS A NUMERIC VARIABLE")),
        };
        self.expect(Kind::Operator(Operator::Equal))?;
        let init = self.expression()?;
        self.expect(Kind::Word(Word::To))?;
        let to = self.expression()?;
        let step = if self.peek_word(Word::Step) {
            self.advance();
            self.expression()?
        } else {
            Leaf::Integer(1)
        };
        self.scope.push_loop(LoopHeader {
            variable,
            to: to.clone(),
            step: step.clone(),
            body: Position::new(self.line, self.statement + 1),
        })?;
        Ok(Leaf::command(
            Word::For,
            Some(Leaf::Arguments(
                ArgumentKind::FunctionArgument,
                vec![Leaf::assignment(target, init), to, step],
            )),
        ))
    }

    fn r#goto(&mut self, word: Word) -> Result<Leaf> {
        if self.at_end_of_statement() {
            return Err(error!(SyntaxError; &format!("{} NEEDS A LINE NUMBER OR LABEL", word)));
        }
        let target = self.expression()?;
        Ok(Leaf::command(word, Some(target)))
    }

    fn r#if(&mut self) -> Result<Leaf> {
        let condition = self.expression()?;
        self.expect(Kind::Word(Word::Then))?;
        let outer = std::mem::replace(&mut self.in_arm, true);
        let arms = self.arms();
        self.in_arm = outer;
        let (then_arm, else_arm) = arms?;
        Ok(Leaf::Branch(Box::new(condition), then_arm, else_arm))
    }

    fn arms(&mut self) -> Result<(Vec<Leaf>, Vec<Leaf>)> {
        let then_arm = self.arm()?;
        let else_arm = if self.peek_word(Word::Else) {
            self.advance();
            self.arm()?
        } else {
            vec![]
        };
        Ok((then_arm, else_arm))
    }

    /// Statements up to the end of the line or a `: ELSE`. A lone line
    /// number is shorthand for `GOTO`.
    fn arm(&mut self) -> Result<Vec<Leaf>> {
        if let Some(Kind::Integer) = self.peek_kind() {
            let target = self.expression()?;
            return Ok(vec![Leaf::command(Word::Goto, Some(target))]);
        }
        let mut v = vec![];
        loop {
            match self.peek_kind() {
                None | Some(Kind::Word(Word::Else)) => break,
                Some(Kind::Colon) => {
                    let else_follows = matches!(
                        self.tokens.get(self.index + 1).map(|t| t.kind),
                        Some(Kind::Word(Word::Else))
                    );
                    self.advance();
                    if else_follows {
                        break;
                    }
                    continue;
                }
                _ => {}
            }
            v.push(self.statement()?);
            self.end_of_statement()?;
        }
        if v.is_empty() {
            return Err(error!(SyntaxError; "EXPECTED STATEMENT AFTER THEN"));
        }
        Ok(v)
    }

    fn r#input(&mut self) -> Result<Leaf> {
        let prompt = match self.peek() {
            Some(t) if t.kind == Kind::String => {
                self.advance();
                match self.advance() {
                    Some(sep) if sep.kind == Kind::Comma || sep.kind == Kind::Semicolon => {}
                    _ => return Err(error!(SyntaxError; "EXPECTED , OR ; AFTER PROMPT")),
                }
                Leaf::String(t.lexeme.as_str().into())
            }
            _ => Leaf::String("".into()),
        };
        let mut list = vec![prompt];
        list.append(&mut self.variable_list()?);
        Ok(Leaf::command(
            Word::Input,
            Some(Leaf::Arguments(ArgumentKind::FunctionArgument, list)),
        ))
    }

    fn r#label(&mut self) -> Result<Leaf> {
        match self.identifier()? {
            Leaf::Identifier(ident @ Ident::Plain(_), None) => {
                Ok(Leaf::command(Word::Label, Some(Leaf::Identifier(ident, None))))
            }
            _ => Err(error!(SyntaxError; "LABEL NAMES HAVE NO TYPE SIGIL")),
        }
    }

    fn r#let(&mut self) -> Result<Leaf> {
        let target = self.identifier()?;
        self.expect(Kind::Operator(Operator::Equal))?;
        let value = self.expression()?;
        Ok(Leaf::command(Word::Let, Some(Leaf::assignment(target, value))))
    }

    fn r#next(&mut self) -> Result<Leaf> {
        if self.at_end_of_statement() {
            return Ok(Leaf::command(Word::Next, None));
        }
        match self.variable()? {
            leaf @ Leaf::Identifier(_, None) => Ok(Leaf::command(Word::Next, Some(leaf))),
            _ => Err(error!(SyntaxError; "NEXT TAKES A PLAIN LOOP VARIABLE")),
        }
    }

    fn r#poke(&mut self) -> Result<Leaf> {
        let address = self.expression()?;
        self.expect(Kind::Comma)?;
        let value = self.expression()?;
        Ok(Leaf::command(
            Word::Poke,
            Some(Leaf::Arguments(
                ArgumentKind::FunctionArgument,
                vec![address, value],
            )),
        ))
    }

    fn r#print(&mut self) -> Result<Leaf> {
        let list = self.printer_list()?;
        Ok(Leaf::command(
            Word::Print,
            Some(Leaf::Arguments(ArgumentKind::FunctionArgument, list)),
        ))
    }

    fn r#read(&mut self) -> Result<Leaf> {
        let targets = self.variable_list()?;
        Ok(Leaf::command(
            Word::Read,
            Some(Leaf::Arguments(ArgumentKind::FunctionArgument, targets)),
        ))
    }
}
