use std::rc::Rc;

/// Identifier as written, sigil included. The sigil fixes the type of a
/// variable for its whole life. Plain names carry no type and can only
/// name labels and functions.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Ident {
    Plain(Rc<str>),
    String(Rc<str>),
    Integer(Rc<str>),
    Float(Rc<str>),
}

impl Ident {
    pub fn from_name(name: &str) -> Ident {
        match name.chars().last() {
            Some('$') => Ident::String(name.into()),
            Some('#') => Ident::Integer(name.into()),
            Some('%') => Ident::Float(name.into()),
            _ => Ident::Plain(name.into()),
        }
    }

    pub fn name(&self) -> &Rc<str> {
        use Ident::*;
        match self {
            Plain(s) | String(s) | Integer(s) | Float(s) => s,
        }
    }

    pub fn is_plain(&self) -> bool {
        matches!(self, Ident::Plain(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Ident::Integer(_) | Ident::Float(_))
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
