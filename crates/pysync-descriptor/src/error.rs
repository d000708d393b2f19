//! Error types for pysync-descriptor

/// Result type for pysync-descriptor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while locating or rewriting the `setup(...)` call
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("setup.py does not parse as Python: syntax error at line {line}, column {column}")]
    SyntaxError { line: usize, column: usize },

    #[error("no setup(...) call found in setup.py")]
    NoCallFound,

    #[error("found {count} setup(...) calls in setup.py, expected exactly one")]
    AmbiguousCall { count: usize },

    #[error("setup(...) has no '{keyword}' argument")]
    ArgumentAbsent { keyword: String },

    #[error("'{keyword}' in setup.py is not a literal list of strings; pysync can only edit literal lists")]
    NotALiteralList { keyword: String },

    #[error("failed to load the Python grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("the Python parser returned no syntax tree")]
    ParserUnavailable,
}
