//! Node kinds of the tree-sitter Ruby grammar used by the rules

pub const PROGRAM: &str = "program";
pub const CALL: &str = "call";
pub const IDENTIFIER: &str = "identifier";
pub const CONSTANT: &str = "constant";
pub const SCOPE_RESOLUTION: &str = "scope_resolution";
pub const ARGUMENT_LIST: &str = "argument_list";
pub const BLOCK: &str = "block";
pub const DO_BLOCK: &str = "do_block";
pub const BLOCK_BODY: &str = "block_body";
pub const BODY_STATEMENT: &str = "body_statement";
pub const BLOCK_PARAMETERS: &str = "block_parameters";
pub const PARENTHESIZED_STATEMENTS: &str = "parenthesized_statements";
pub const COMMENT: &str = "comment";
pub const EMPTY_STATEMENT: &str = "empty_statement";

pub const PAIR: &str = "pair";
pub const HASH: &str = "hash";
pub const ARRAY: &str = "array";
pub const SYMBOL_ARRAY: &str = "symbol_array";
pub const ELEMENT_REFERENCE: &str = "element_reference";
pub const RANGE: &str = "range";
pub const BINARY: &str = "binary";
pub const CONDITIONAL: &str = "conditional";
pub const IF_MODIFIER: &str = "if_modifier";
pub const UNLESS_MODIFIER: &str = "unless_modifier";
pub const ASSIGNMENT: &str = "assignment";
pub const METHOD: &str = "method";
pub const METHOD_PARAMETERS: &str = "method_parameters";

pub const SIMPLE_SYMBOL: &str = "simple_symbol";
pub const DELIMITED_SYMBOL: &str = "delimited_symbol";
pub const BARE_SYMBOL: &str = "bare_symbol";
pub const HASH_KEY_SYMBOL: &str = "hash_key_symbol";
pub const STRING: &str = "string";
pub const STRING_CONTENT: &str = "string_content";
pub const INTEGER: &str = "integer";
pub const FLOAT: &str = "float";
pub const UNARY: &str = "unary";

pub const INSTANCE_VARIABLE: &str = "instance_variable";
pub const CLASS_VARIABLE: &str = "class_variable";
pub const GLOBAL_VARIABLE: &str = "global_variable";

/// Kinds that may stand in for one endpoint of a range whose other endpoint is a literal
pub const VARIABLE_LIKE: &[&str] = &[
    IDENTIFIER,
    CONSTANT,
    INSTANCE_VARIABLE,
    CLASS_VARIABLE,
    GLOBAL_VARIABLE,
];

/// Symbol literal kinds, all decodable to a plain name
pub const SYMBOL_LIKE: &[&str] = &[SIMPLE_SYMBOL, DELIMITED_SYMBOL, BARE_SYMBOL, HASH_KEY_SYMBOL];

/// Ruby reserved words; a bare call with one of these names does not parse as a call
pub const RUBY_KEYWORDS: &[&str] = &[
    "__ENCODING__",
    "__LINE__",
    "__FILE__",
    "BEGIN",
    "END",
    "alias",
    "and",
    "begin",
    "break",
    "case",
    "class",
    "def",
    "defined?",
    "do",
    "else",
    "elsif",
    "end",
    "ensure",
    "false",
    "for",
    "if",
    "in",
    "module",
    "next",
    "nil",
    "not",
    "or",
    "redo",
    "rescue",
    "retry",
    "return",
    "self",
    "super",
    "then",
    "true",
    "undef",
    "unless",
    "until",
    "when",
    "while",
    "yield",
];
