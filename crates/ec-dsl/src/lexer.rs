use logos::{FilterResult, Lexer, Logos};
use std::fmt;

/// Token type for declaration files.
///
/// Keys, values and block types are all plain words or strings; what they
/// mean is decided when blocks are lowered.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Left brace `{`.
    LBrace,
    /// Right brace `}`.
    RBrace,
    /// Left parenthesis `(`.
    LParen,
    /// Right parenthesis `)`.
    RParen,
    /// Comma separator `,`.
    Comma,
    /// Double-quoted string, quotes stripped.
    Str(String),
    /// Bare word: a name, a number, a path.
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Str(s) => write!(f, "\"{s}\""),
            Token::Word(w) => write!(f, "{w}"),
        }
    }
}

/// Internal logos token, borrowing from the source until converted.
#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
enum RawToken {
    #[token("/*", block_comment)]
    BlockComment,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[regex(r#""[^"\n]*""#)]
    Str,

    #[regex(r#"[^\s{}(),"/][^\s{}(),"]*"#)]
    Word,
}

/// Skip to the end of a `/* */` comment. An unterminated comment swallows
/// the rest of the input and is reported as an error.
fn block_comment(lex: &mut Lexer<RawToken>) -> FilterResult<(), ()> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            FilterResult::Error(())
        }
    }
}

/// A lexer error with source location.
#[derive(Debug, Clone)]
pub struct LexError {
    /// Byte range of the erroneous input in the source.
    pub span: std::ops::Range<usize>,
    /// Human-readable description of the lexer error.
    pub message: String,
}

/// Lex source text into a sequence of `(Token, Span)` pairs.
///
/// Lexing continues past errors so that one stray character does not hide
/// the rest of the file.
pub fn lex(source: &str) -> (Vec<(Token, std::ops::Range<usize>)>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(raw) => {
                let token = match raw {
                    RawToken::LBrace => Token::LBrace,
                    RawToken::RBrace => Token::RBrace,
                    RawToken::LParen => Token::LParen,
                    RawToken::RParen => Token::RParen,
                    RawToken::Comma => Token::Comma,
                    RawToken::Str => {
                        let slice = lexer.slice();
                        Token::Str(slice[1..slice.len() - 1].to_string())
                    }
                    RawToken::Word => Token::Word(lexer.slice().to_string()),
                    // Filtered out by its callback
                    RawToken::BlockComment => continue,
                };
                tokens.push((token, span));
            }
            Err(()) => {
                let text = &source[span.clone()];
                let message = if text.starts_with('"') {
                    "unterminated string".to_string()
                } else if text.starts_with("/*") {
                    "unterminated comment".to_string()
                } else {
                    format!("unexpected character: {text:?}")
                };
                errors.push(LexError { span, message });
            }
        }
    }

    (tokens, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(source: &str) -> Vec<String> {
        let (tokens, errors) = lex(source);
        assert!(errors.is_empty(), "errors: {errors:?}");
        tokens.iter().map(|(t, _)| t.to_string()).collect()
    }

    #[test]
    fn lex_entity_def() {
        let source = r#"entityDef light {
    "editor_color" "0 1 0"
    spawnclass idLight
}"#;
        assert_eq!(
            rendered(source),
            vec![
                "entityDef",
                "light",
                "{",
                "\"editor_color\"",
                "\"0 1 0\"",
                "spawnclass",
                "idLight",
                "}"
            ]
        );
    }

    #[test]
    fn strings_keep_spaces_and_drop_quotes() {
        let (tokens, _) = lex(r#""editor_bool noshadows" "Turn off shadows.""#);
        assert!(matches!(&tokens[0].0, Token::Str(s) if s == "editor_bool noshadows"));
        assert!(matches!(&tokens[1].0, Token::Str(s) if s == "Turn off shadows."));
    }

    #[test]
    fn comments_are_skipped() {
        let source = "// line comment\nentityDef /* inline */ a /* multi\nline */ { }";
        assert_eq!(rendered(source), vec!["entityDef", "a", "{", "}"]);
    }

    #[test]
    fn block_comment_with_stars_and_slashes() {
        let source = "/**\n * Lights / torches\n **/ entityDef /* a * b / c */ light { }";
        assert_eq!(rendered(source), vec!["entityDef", "light", "{", "}"]);
    }

    #[test]
    fn unterminated_block_comment_is_reported() {
        let (tokens, errors) = lex("entityDef a { } /* never closed");
        assert_eq!(tokens.len(), 4);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "unterminated comment");
        assert_eq!(errors[0].span, 16..31);
    }

    #[test]
    fn paths_and_numbers_are_words() {
        assert_eq!(
            rendered(r"model models/md5/chars/guard.md5mesh -16.5 \path\to"),
            vec!["model", "models/md5/chars/guard.md5mesh", "-16.5", r"\path\to"]
        );
    }

    #[test]
    fn anim_line_with_commas_and_parens() {
        assert_eq!(
            rendered("anim idle a.md5anim, b.md5anim offset ( 0 0 -2 )"),
            vec!["anim", "idle", "a.md5anim", ",", "b.md5anim", "offset", "(", "0", "0", "-2", ")"]
        );
    }

    #[test]
    fn unterminated_string_is_reported() {
        let (tokens, errors) = lex("entityDef a { \"key");
        assert_eq!(errors[0].message, "unterminated string");
        assert_eq!(errors[0].span.start, 14);
        assert!(tokens.len() >= 3);
    }

    #[test]
    fn lex_preserves_spans() {
        let (tokens, _) = lex("entityDef  light");
        assert_eq!(tokens[0].1, 0..9);
        assert_eq!(tokens[1].1, 11..16);
    }
}
