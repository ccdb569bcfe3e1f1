use thiserror::Error;

#[derive(Debug, Error)]
pub enum AstError {
    #[error("source code too large ({0} bytes), refusing to analyze")]
    SourceTooLarge(usize),

    #[error("failed to set up the Ruby grammar: {0}")]
    LanguageSetup(String),

    #[error("failed to parse Ruby source code")]
    ParseFailed,

    #[error("source code contains syntax errors near line {line}")]
    SyntaxError { line: usize },
}
