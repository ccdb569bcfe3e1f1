/// Ruby syntax tree access: parsing, node helpers, pattern matching and traversal
pub mod error;
pub mod kinds;
pub mod languages;
pub mod matcher;
pub mod node;
pub mod visitor;

// Re-export main types for convenience
pub use error::AstError;
pub use languages::{parse_ruby, LanguageCache, ParsedSource};
pub use matcher::{Captures, Matcher};
pub use node::SendNode;
pub use visitor::RuleVisitor;
