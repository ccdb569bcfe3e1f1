/// Source analysis over the Ruby syntax tree
pub mod ast;
