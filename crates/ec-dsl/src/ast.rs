/// Source span as a byte range.
pub type Span = std::ops::Range<usize>;

/// A syntax node with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    /// The wrapped node.
    pub node: T,
    /// The byte range of this node in the source text.
    pub span: Span,
}

/// A parsed declaration file: a flat list of blocks.
#[derive(Debug, Clone, Default)]
pub struct DeclFile {
    /// Blocks in file order.
    pub blocks: Vec<Spanned<RawBlock>>,
}

/// `<header atoms> { <body> }`, uninterpreted.
///
/// For `entityDef light { ... }` the header is `["entityDef", "light"]`.
#[derive(Debug, Clone)]
pub struct RawBlock {
    /// Words before the opening brace: block type, then name.
    pub header: Vec<Spanned<String>>,
    /// Contents of the outer braces.
    pub body: Spanned<Vec<Spanned<TokenTree>>>,
}

impl RawBlock {
    /// The block type (first header word).
    pub fn kind(&self) -> Option<&Spanned<String>> {
        self.header.first()
    }

    /// The declared name (second header word).
    pub fn name(&self) -> Option<&Spanned<String>> {
        self.header.get(1)
    }
}

/// Which bracket pair encloses a [`TokenTree::Group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `{ ... }`
    Brace,
    /// `( ... )`
    Paren,
}

/// One element of a block body.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenTree {
    /// A word or string.
    Atom(String),
    /// A `,` separator.
    Comma,
    /// A nested bracketed group.
    Group(Delimiter, Vec<Spanned<TokenTree>>),
}

impl TokenTree {
    /// The text of an atom, `None` for punctuation and groups.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            TokenTree::Atom(text) => Some(text),
            _ => None,
        }
    }
}
