/// Ruby parsing through Tree-sitter
use anyhow::Result;
use once_cell::sync::Lazy;
use std::sync::RwLock;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::analysis::ast::error::AstError;

/// Inputs above this size are rejected before parsing
pub const MAX_SOURCE_BYTES: usize = 10_000_000;

// Languages can be shared between parsers; build the grammar once per process
static RUBY_LANGUAGE: Lazy<RwLock<Option<Language>>> = Lazy::new(|| RwLock::new(None));

/// Language cache manager for the Ruby grammar
pub struct LanguageCache;

impl LanguageCache {
    /// Get or create the Tree-sitter language for Ruby
    pub fn ruby() -> Result<Language> {
        {
            let cache = RUBY_LANGUAGE
                .read()
                .map_err(|e| AstError::LanguageSetup(format!("language cache poisoned: {}", e)))?;
            if let Some(lang) = cache.as_ref() {
                return Ok(lang.clone());
            }
        }

        let language: Language = tree_sitter_ruby::LANGUAGE.into();
        let mut cache = RUBY_LANGUAGE
            .write()
            .map_err(|e| AstError::LanguageSetup(format!("language cache poisoned: {}", e)))?;
        Ok(cache.get_or_insert_with(|| language).clone())
    }

    /// Create a parser configured for Ruby
    pub fn create_parser() -> Result<Parser> {
        let language = Self::ruby()?;
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| AstError::LanguageSetup(e.to_string()))?;
        Ok(parser)
    }
}

/// A parsed source file: the buffer together with its syntax tree.
///
/// The tree is read-only for analysis; corrections are staged as text edits
/// against `source`, never applied to the tree.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }
}

/// Parse Ruby source, rejecting oversized input and trees with syntax errors
pub fn parse_ruby(source: &str) -> Result<ParsedSource<'_>> {
    if source.len() > MAX_SOURCE_BYTES {
        return Err(AstError::SourceTooLarge(source.len()).into());
    }

    let mut parser = LanguageCache::create_parser()?;
    let tree = parser.parse(source, None).ok_or(AstError::ParseFailed)?;

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        return Err(AstError::SyntaxError { line }.into());
    }

    Ok(ParsedSource { source, tree })
}

fn first_error_line(root: Node<'_>) -> Option<usize> {
    let mut stack = vec![root];
    while let Some(n) = stack.pop() {
        if n.is_error() || n.is_missing() {
            return Some(n.start_position().row + 1);
        }
        if !n.has_error() {
            continue;
        }
        let mut cursor = n.walk();
        let children: Vec<Node<'_>> = n.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}
