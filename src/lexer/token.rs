use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    True,
    False,
    Var,
    Set,
    Print,
}

impl Keyword {
    pub fn name(&self) -> &'static str {
        match self {
            Keyword::True => "TRUE",
            Keyword::False => "FALSE",
            Keyword::Var => "VAR",
            Keyword::Set => "SET",
            Keyword::Print => "PRINT",
        }
    }
}

/// Payload-free discriminant of a [`Token`]. This is what the grammar
/// matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    End,
    Operator(char),
    Keyword(Keyword),
    TypeName,
    Identifier,
    Number,
    Str,
}

impl Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tag::End => write!(f, "<eof>"),
            Tag::Operator(c) => write!(f, "{}", c),
            Tag::Keyword(kw) => write!(f, "{}", kw.name().to_lowercase()),
            Tag::TypeName => write!(f, "TYPE"),
            Tag::Identifier => write!(f, "ID"),
            Tag::Number => write!(f, "NUM"),
            Tag::Str => write!(f, "STR"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Token {
    End,
    Operator(char),
    Keyword(Keyword),
    TypeName(Rc<str>),
    Identifier(Rc<str>),
    Number(i64),
    Str(String),
}

impl Token {
    pub fn tag(&self) -> Tag {
        match self {
            Token::End => Tag::End,
            Token::Operator(c) => Tag::Operator(*c),
            Token::Keyword(kw) => Tag::Keyword(*kw),
            Token::TypeName(_) => Tag::TypeName,
            Token::Identifier(_) => Tag::Identifier,
            Token::Number(_) => Tag::Number,
            Token::Str(_) => Tag::Str,
        }
    }

    pub fn is(&self, tag: Tag) -> bool {
        self.tag() == tag
    }

    pub fn is_op(&self, c: char) -> bool {
        self.is(Tag::Operator(c))
    }

    /// Text of an identifier or type name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Token::TypeName(name) | Token::Identifier(name) => Some(&**name),
            _ => None,
        }
    }

    /// Whether both tokens come from the same entry of the identifier table.
    /// Payload-free tokens only need matching tags.
    pub fn same_instance(&self, other: &Token) -> bool {
        match (self, other) {
            (Token::TypeName(a), Token::TypeName(b))
            | (Token::Identifier(a), Token::Identifier(b)) => Rc::ptr_eq(a, b),
            (Token::Number(a), Token::Number(b)) => a == b,
            (Token::Str(a), Token::Str(b)) => a == b,
            _ => self.tag() == other.tag(),
        }
    }

    /// `{ } , ;` keep the current trace line in block context, everything
    /// else puts it in expression context.
    pub(crate) fn is_block_punct(&self) -> bool {
        matches!(self, Token::Operator('{' | '}' | ',' | ';'))
    }
}

/// Tokens compare by tag only: any NUMBER equals any other NUMBER.
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.tag() == other.tag()
    }
}

impl Eq for Token {}

impl PartialEq<Tag> for Token {
    fn eq(&self, other: &Tag) -> bool {
        self.tag() == *other
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::End => write!(f, "<END>"),
            Token::Operator(c) => write!(f, "<'{}'>", c),
            Token::Keyword(kw) => write!(f, "<{}>", kw.name()),
            Token::TypeName(name) => write!(f, "<TYPE, {}>", name),
            Token::Identifier(name) => write!(f, "<ID, {}>", name),
            Token::Number(n) => write!(f, "<NUM, {}>", n),
            Token::Str(s) => write!(f, "<STR, {:?}>", s),
        }
    }
}
