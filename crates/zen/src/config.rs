//! Run configuration threaded from the CLI (or an embedder) into the interpreter.

use std::path::PathBuf;

use crate::resource::DEFAULT_MAX_RECURSION_DEPTH;

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Maximum function-call depth before a recursion error is reported.
    pub max_call_depth: usize,
    /// Directory searched first when resolving `import`.
    pub module_path: PathBuf,
    /// Suppresses the REPL's version/feature banner.
    pub quiet: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_RECURSION_DEPTH,
            module_path: default_module_path(),
            quiet: false,
        }
    }
}

fn default_module_path() -> PathBuf {
    PathBuf::from("/usr/local/share/zen/modules")
}
