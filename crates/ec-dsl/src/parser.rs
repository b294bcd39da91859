use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::ast::*;
use crate::lexer::Token;

type Span = SimpleSpan;

/// Parse error with source span.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Byte range the error points at.
    pub span: std::ops::Range<usize>,
    /// Human-readable description.
    pub message: String,
}

fn spanned<T>(node: T, span: Span) -> Spanned<T> {
    Spanned {
        node,
        span: span.into_range(),
    }
}

/// Build the declaration file parser.
///
/// The grammar only knows about atoms and bracket nesting:
/// `file := (atom+ '{' tree* '}')*`, `tree := atom | ',' | '{' tree* '}' | '(' tree* ')'`.
fn decl_file_parser<'a, I>() -> impl Parser<'a, I, DeclFile, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = Span>,
{
    let atom = select! {
        Token::Word(w) => w,
        Token::Str(s) => s,
    }
    .labelled("word or string");

    let tree = recursive(|tree| {
        let braced = tree
            .clone()
            .repeated()
            .collect::<Vec<Spanned<TokenTree>>>()
            .delimited_by(just(Token::LBrace), just(Token::RBrace))
            .map(|children| TokenTree::Group(Delimiter::Brace, children));

        let parened = tree
            .repeated()
            .collect::<Vec<Spanned<TokenTree>>>()
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .map(|children| TokenTree::Group(Delimiter::Paren, children));

        choice((
            atom.clone().map(TokenTree::Atom),
            just(Token::Comma).to(TokenTree::Comma),
            braced,
            parened,
        ))
        .map_with(|tree, e| spanned(tree, e.span()))
        .labelled("value")
    });

    let header = atom
        .map_with(|word, e| spanned(word, e.span()))
        .repeated()
        .at_least(1)
        .collect::<Vec<Spanned<String>>>()
        .labelled("declaration header");

    let body = tree
        .repeated()
        .collect::<Vec<Spanned<TokenTree>>>()
        .delimited_by(just(Token::LBrace), just(Token::RBrace))
        .map_with(|body, e| spanned(body, e.span()))
        .labelled("declaration body");

    let block = header
        .then(body)
        .map_with(|(header, body), e| spanned(RawBlock { header, body }, e.span()));

    block
        .repeated()
        .collect::<Vec<Spanned<RawBlock>>>()
        .then_ignore(end())
        .map(|blocks| DeclFile { blocks })
}

/// Parse a token stream into raw blocks.
pub fn parse(tokens: &[(Token, std::ops::Range<usize>)]) -> Result<DeclFile, Vec<ParseError>> {
    let token_iter = tokens
        .iter()
        .map(|(tok, span)| (tok.clone(), Span::from(span.clone())));

    let len = tokens.last().map_or(0, |(_, s)| s.end);
    let eoi: Span = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let (output, errors) = decl_file_parser().parse(stream).into_output_errors();

    match output {
        Some(file) if errors.is_empty() => Ok(file),
        _ => Err(errors
            .into_iter()
            .map(|e| ParseError {
                span: e.span().into_range(),
                message: e.to_string(),
            })
            .collect()),
    }
}
