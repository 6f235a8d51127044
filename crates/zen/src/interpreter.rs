//! Ties together the environment, function/module registries, and host
//! capabilities into the single context threaded through evaluation and
//! execution. Constructed once by the driver/REPL and reused across lines.

use indexmap::IndexMap;
use log::debug;

use crate::{
    config::RunConfig,
    environment::Environment,
    function::Function,
    host::HostCapabilities,
    io::{OutputSink, StdOut},
    resource::RecursionGuard,
    value::{ModuleValue, Value},
};

pub struct Interpreter {
    pub env: Environment,
    pub functions: IndexMap<String, Function>,
    pub modules: IndexMap<String, ModuleValue>,
    pub host: HostCapabilities,
    pub config: RunConfig,
    pub out: Box<dyn OutputSink>,
    pub(crate) recursion: RecursionGuard,
    pub(crate) return_val: Value,
    pub(crate) is_returning: bool,
}

impl Interpreter {
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        Self::with_output(config, Box::new(StdOut))
    }

    #[must_use]
    pub fn with_output(config: RunConfig, out: Box<dyn OutputSink>) -> Self {
        let recursion = RecursionGuard::new(config.max_call_depth);
        Self {
            env: Environment::new(),
            functions: IndexMap::new(),
            modules: IndexMap::new(),
            host: HostCapabilities::default(),
            config,
            out,
            recursion,
            return_val: Value::Null,
            is_returning: false,
        }
    }

    /// True only inside an active function call frame that has hit `return`.
    #[must_use]
    pub fn is_returning(&self) -> bool {
        self.is_returning
    }

    pub fn register_function(&mut self, function: Function) {
        debug!("zen::exec: defining function '{}' ({} params)", function.name, function.params.len());
        self.functions.insert(function.name.clone(), function);
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}
