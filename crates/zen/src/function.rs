//! User-defined function storage.

use crate::token::Token;

/// A function registered by a `func` statement.
///
/// The body is a cloned slice of the defining token stream, braces included,
/// replayed by the block executor on each call.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Token>,
}

impl Function {
    #[must_use]
    pub fn new(name: impl Into<String>, params: Vec<String>, body: Vec<Token>) -> Self {
        Self {
            name: name.into(),
            params,
            body,
        }
    }
}
