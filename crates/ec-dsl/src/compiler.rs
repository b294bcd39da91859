//! Lowering of raw blocks into the declaration blocks the registry consumes.

use ec_core::{DeclBlock, Diagnostic, EntityDefBlock, ModelDefBlock, SourceInfo};
use tracing::debug;

use crate::ast::*;

/// Result of lowering one parsed file.
#[derive(Debug, Default)]
pub struct LowerResult {
    /// Entity and model blocks in file order.
    pub blocks: Vec<DeclBlock>,
    /// Warnings about blocks or keys that were skipped.
    pub diagnostics: Vec<Diagnostic>,
}

/// Turn raw blocks into entity and model declarations.
///
/// Block types are matched case-insensitively. Types other than `entityDef`
/// and `model` belong to other subsystems and are skipped without comment.
pub fn lower(file: &DeclFile, source: &SourceInfo) -> LowerResult {
    let mut lowerer = Lowerer {
        source,
        diagnostics: Vec::new(),
    };

    let mut blocks = Vec::new();
    for block in &file.blocks {
        if let Some(decl) = lowerer.lower_block(&block.node, &block.span) {
            blocks.push(decl);
        }
    }

    LowerResult {
        blocks,
        diagnostics: lowerer.diagnostics,
    }
}

struct Lowerer<'a> {
    source: &'a SourceInfo,
    diagnostics: Vec<Diagnostic>,
}

impl Lowerer<'_> {
    fn warn(&mut self, span: &Span, message: impl Into<String>) {
        self.diagnostics.push(
            Diagnostic::warning(message)
                .in_file(self.source.file.clone())
                .with_span(span.clone()),
        );
    }

    fn lower_block(&mut self, block: &RawBlock, span: &Span) -> Option<DeclBlock> {
        let kind = block.kind()?;
        let Some(name) = block.name() else {
            self.warn(span, format!("{} block without a name", kind.node));
            return None;
        };

        if kind.node.eq_ignore_ascii_case("entityDef") {
            Some(DeclBlock::EntityDef(self.lower_entity_def(&name.node, &block.body.node)))
        } else if kind.node.eq_ignore_ascii_case("model") {
            Some(DeclBlock::Model(self.lower_model(&name.node, &block.body.node)))
        } else {
            None
        }
    }

    // -- entityDef --

    fn lower_entity_def(&mut self, name: &str, body: &[Spanned<TokenTree>]) -> EntityDefBlock {
        let mut pairs = Vec::new();
        let mut pending: Option<(&String, &Span)> = None;

        for tree in body {
            let TokenTree::Atom(text) = &tree.node else {
                self.warn(
                    &tree.span,
                    format!("unexpected {} in entityDef {name}", describe(&tree.node)),
                );
                continue;
            };
            match pending.take() {
                Some((key, _)) => pairs.push((key.clone(), text.clone())),
                None => pending = Some((text, &tree.span)),
            }
        }

        if let Some((key, span)) = pending {
            self.warn(span, format!("key \"{key}\" without value in entityDef {name}"));
        }

        EntityDefBlock {
            name: name.to_string(),
            pairs,
            source: self.source.clone(),
        }
    }

    // -- model --

    fn lower_model(&mut self, name: &str, body: &[Spanned<TokenTree>]) -> ModelDefBlock {
        let mut model = ModelDefBlock {
            name: name.to_string(),
            inherit: None,
            mesh: None,
            skin: None,
            anims: Vec::new(),
            source: self.source.clone(),
        };

        let mut trees = body.iter().peekable();
        while let Some(tree) = trees.next() {
            let Some(keyword) = tree.node.as_atom() else {
                continue;
            };

            match keyword {
                "inherit" | "mesh" | "skin" => {
                    let Some(value) = trees.next().and_then(|t| t.node.as_atom()) else {
                        self.warn(&tree.span, format!("{keyword} without value in model {name}"));
                        continue;
                    };
                    let slot = match keyword {
                        "inherit" => &mut model.inherit,
                        "mesh" => &mut model.mesh,
                        _ => &mut model.skin,
                    };
                    *slot = Some(value.to_string());
                }
                "anim" => {
                    let anim_name = trees.next().and_then(|t| t.node.as_atom());
                    let file = trees.next().and_then(|t| t.node.as_atom());
                    let (Some(anim_name), Some(file)) = (anim_name, file) else {
                        self.warn(&tree.span, format!("incomplete anim in model {name}"));
                        continue;
                    };

                    // Alternative files after commas and a frame command block
                    while trees.next_if(|t| t.node == TokenTree::Comma).is_some() {
                        trees.next();
                    }
                    trees.next_if(|t| matches!(t.node, TokenTree::Group(Delimiter::Brace, _)));

                    model.anims.push((anim_name.to_string(), file.to_string()));
                }
                "offset" => {
                    trees.next_if(|t| matches!(t.node, TokenTree::Group(Delimiter::Paren, _)));
                }
                "channel" => {
                    trees.next();
                    trees.next_if(|t| matches!(t.node, TokenTree::Group(Delimiter::Paren, _)));
                }
                other => debug!("ignoring model keyword \"{}\" in {}", other, name),
            }
        }

        model
    }
}

fn describe(tree: &TokenTree) -> &'static str {
    match tree {
        TokenTree::Atom(_) => "value",
        TokenTree::Comma => "','",
        TokenTree::Group(Delimiter::Brace, _) => "nested block",
        TokenTree::Group(Delimiter::Paren, _) => "parenthesised group",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer, parser};

    fn lower_source(source: &str) -> LowerResult {
        let (tokens, lex_errors) = lexer::lex(source);
        assert!(lex_errors.is_empty(), "lex errors: {lex_errors:?}");
        let file = parser::parse(&tokens).unwrap();
        lower(&file, &SourceInfo::new("def/test.def", "base"))
    }

    fn entity(result: &LowerResult, index: usize) -> &EntityDefBlock {
        match &result.blocks[index] {
            DeclBlock::EntityDef(block) => block,
            other => panic!("expected entityDef, got {other:?}"),
        }
    }

    fn model(result: &LowerResult, index: usize) -> &ModelDefBlock {
        match &result.blocks[index] {
            DeclBlock::Model(block) => block,
            other => panic!("expected model, got {other:?}"),
        }
    }

    #[test]
    fn lower_entity_def_pairs_in_order() {
        let result = lower_source(
            r#"entityDef atdm:ai_guard {
    "inherit" "atdm:ai_base"
    "editor_usage" "A guard."
    "model" "guard_model"
}"#,
        );

        assert!(result.diagnostics.is_empty());
        let block = entity(&result, 0);
        assert_eq!(block.name, "atdm:ai_guard");
        assert_eq!(
            block.pairs,
            vec![
                ("inherit".to_string(), "atdm:ai_base".to_string()),
                ("editor_usage".to_string(), "A guard.".to_string()),
                ("model".to_string(), "guard_model".to_string()),
            ]
        );
        assert_eq!(block.source.file, "def/test.def");
    }

    #[test]
    fn block_type_is_case_insensitive() {
        let result = lower_source("ENTITYDEF a { } Model b { }");
        assert_eq!(result.blocks.len(), 2);
    }

    #[test]
    fn other_block_types_are_ignored() {
        let result = lower_source("skin s { a b } table t { { 0, 1 } } particle p { { count 1 } }");
        assert!(result.blocks.is_empty());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn dangling_key_warns() {
        let result = lower_source(r#"entityDef a { "health" "10" "speed" }"#);
        assert_eq!(entity(&result, 0).pairs.len(), 1);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].message.contains("\"speed\" without value"));
        assert!(result.diagnostics[0].span.is_some());
    }

    #[test]
    fn nested_group_in_entity_def_warns() {
        let result = lower_source(r#"entityDef a { "x" "1" { "y" "2" } }"#);
        assert_eq!(entity(&result, 0).pairs.len(), 1);
        assert!(result.diagnostics[0].message.contains("nested block"));
    }

    #[test]
    fn malformed_entity_def_warnings() {
        let result = lower_source(r#"entityDef a { "x" "1" ( 2 ) , "y" } entityDef { }"#);
        let messages: Vec<String> = result.diagnostics.iter().map(ToString::to_string).collect();
        insta::assert_snapshot!(messages.join("\n"), @r#"
        warning: def/test.def: unexpected parenthesised group in entityDef a
        warning: def/test.def: unexpected ',' in entityDef a
        warning: def/test.def: key "y" without value in entityDef a
        warning: def/test.def: entityDef block without a name
        "#);
    }

    #[test]
    fn nameless_block_warns() {
        let result = lower_source("entityDef { }");
        assert!(result.blocks.is_empty());
        assert!(result.diagnostics[0].message.contains("without a name"));
    }

    #[test]
    fn lower_model_def() {
        let result = lower_source(
            r#"model guard_elite {
    inherit guard_base
    mesh models/md5/chars/elite.md5mesh
    skin skins/elite
    offset ( 0 0 -2 )
    channel torso ( *Spine_Dummy )
    anim idle models/md5/idle.md5anim, models/md5/idle2.md5anim {
        frame 1 sound_voice snd_idle
    }
    anim walk models/md5/walk.md5anim
}"#,
        );

        let block = model(&result, 0);
        assert_eq!(block.inherit.as_deref(), Some("guard_base"));
        assert_eq!(block.mesh.as_deref(), Some("models/md5/chars/elite.md5mesh"));
        assert_eq!(block.skin.as_deref(), Some("skins/elite"));
        assert_eq!(
            block.anims,
            vec![
                ("idle".to_string(), "models/md5/idle.md5anim".to_string()),
                ("walk".to_string(), "models/md5/walk.md5anim".to_string()),
            ]
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn incomplete_anim_warns() {
        let result = lower_source("model m { anim }");
        assert!(model(&result, 0).anims.is_empty());
        assert!(result.diagnostics[0].message.contains("incomplete anim"));
    }
}
