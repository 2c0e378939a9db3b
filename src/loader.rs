//! Dynamic loading of JavaScript test files.
//!
//! A `ScriptUnit` owns its embedded QuickJS engine. Loading evaluates the
//! file's top-level statements immediately; the global function bindings
//! that exist afterwards are the unit's callables. Loaded code is trusted
//! and runs with full host privileges -- there is no sandbox.

use std::fs;
use std::path::{Path, PathBuf};

use rquickjs::{CatchResultExt, Context, Function, Runtime, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("test file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("script engine error: {0}")]
    Engine(#[from] rquickjs::Error),
    #[error("failed to evaluate {path}: {message}")]
    Eval { path: PathBuf, message: String },
}

/// A thrown JS exception, carried as data.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ScriptException {
    pub message: String,
}

/// One loaded test file: an executable scope exposing named callables.
pub struct ScriptUnit {
    _runtime: Runtime,
    context: Context,
    path: PathBuf,
    callables: Vec<String>,
}

impl ScriptUnit {
    /// Load the file, run its top level, and capture its callables.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        let source = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let runtime = Runtime::new()?;
        let context = Context::full(&runtime)?;

        let callables = context.with(|ctx| -> Result<Vec<String>, LoadError> {
            if let Err(caught) = ctx.eval::<(), _>(source.as_str()).catch(&ctx) {
                return Err(LoadError::Eval {
                    path: path.to_path_buf(),
                    message: caught.to_string(),
                });
            }

            let globals = ctx.globals();
            let mut names = Vec::new();
            for key in globals.keys::<String>() {
                let key = key?;
                let value: Value = globals.get(key.as_str())?;
                if value.is_function() {
                    names.push(key);
                }
            }
            Ok(names)
        })?;

        tracing::debug!(path = %path.display(), callables = callables.len(), "Loaded test file");

        Ok(Self {
            _runtime: runtime,
            context,
            path: path.to_path_buf(),
            callables,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of global function bindings, in definition order.
    pub fn callable_names(&self) -> &[String] {
        &self.callables
    }

    /// Invoke a named callable with no arguments. A thrown exception comes
    /// back as a `ScriptException` value, never as a Rust panic.
    pub fn invoke(&self, name: &str) -> Result<(), ScriptException> {
        self.context.with(|ctx| {
            let function: Function = match ctx.globals().get(name) {
                Ok(function) => function,
                Err(err) => {
                    return Err(ScriptException {
                        message: format!("{name} is not callable: {err}"),
                    });
                }
            };
            match function.call::<_, Value>(()).catch(&ctx) {
                Ok(_) => Ok(()),
                Err(caught) => Err(ScriptException {
                    message: caught.to_string(),
                }),
            }
        })
    }
}

impl std::fmt::Debug for ScriptUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptUnit")
            .field("path", &self.path)
            .field("callables", &self.callables)
            .finish_non_exhaustive()
    }
}
