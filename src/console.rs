use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::command::{parse_leading_int, Command, Native};
use crate::config::ConsoleConfig;
use crate::error::{DispatchError, RegistryError};
use crate::identifier::Identifier;
use crate::keymap::{KeyBindings, KeyCode};
use crate::output::{ConsoleSink, LogSink};
use crate::persist;
use crate::registry::Registry;
use crate::storage::{CellHandle, ValueTable};
use crate::tokenizer::{Statements, Word};
use crate::variable::{Assignment, Variable};

/// The command dispatcher.
///
/// A console owns the identifier registry, a handle to the value table its
/// variables live in, the key bindings and the output sink. Every re-entry
/// into the dispatcher (alias expansion, expression arguments, `( )`
/// sub-expressions, scripts) is counted; going past
/// [`ConsoleConfig::max_depth`] aborts the whole dispatch chain with
/// [`DispatchError::RecursionLimit`].
pub struct Console {
    registry: Registry,
    values: ValueTable,
    bindings: KeyBindings,
    sink: Arc<dyn ConsoleSink>,
    config: ConsoleConfig,
    depth: usize,
    abort: Option<DispatchError>,
    frames: Vec<Vec<String>>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Creates an empty console with default limits, reporting through `log`.
    pub fn new() -> Self {
        Self::with_config(ConsoleConfig::default())
    }

    pub fn with_config(config: ConsoleConfig) -> Self {
        Self::with_parts(config, ValueTable::new(), Arc::new(LogSink))
    }

    /// Creates a console sharing `values` with the subsystems that own the cells.
    pub fn with_parts(
        config: ConsoleConfig,
        values: ValueTable,
        sink: Arc<dyn ConsoleSink>,
    ) -> Self {
        Self {
            registry: Registry::new(),
            values,
            bindings: KeyBindings::new(),
            sink,
            config,
            depth: 0,
            abort: None,
            frames: Vec::new(),
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn values(&self) -> &ValueTable {
        &self.values
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    /// Current dispatch nesting; zero outside of any dispatch.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Writes a line of user-facing output.
    pub fn report(&self, line: impl AsRef<str>) {
        self.sink.write_line(line.as_ref());
    }

    pub fn register(&mut self, identifier: impl Into<Identifier>) -> Result<(), RegistryError> {
        self.registry.insert(identifier)
    }

    /// Allocates a cell holding `initial` and registers a variable over it.
    pub fn add_variable(
        &mut self,
        name: &str,
        min: i32,
        initial: i32,
        max: i32,
    ) -> Result<CellHandle, RegistryError> {
        let handle = self.values.allocate(initial);
        self.registry.insert(Variable::new(name, min, max, handle))?;
        Ok(handle)
    }

    pub fn add_command(&mut self, name: &str, native: Native) -> Result<(), RegistryError> {
        self.registry.insert(Command::new(name, native))
    }

    pub fn define_alias(&mut self, name: &str, action: &str) -> Result<(), RegistryError> {
        self.registry.define_alias(name, action)
    }

    /// Current value of a variable.
    pub fn value_of(&self, name: &str) -> Option<i32> {
        match self.registry.get(name)? {
            Identifier::Variable(variable) => Some(variable.value(&self.values)),
            _ => None,
        }
    }

    /// Text substituted for a `$name` word: an alias's action or a variable's value.
    pub fn lookup(&self, name: &str) -> Option<String> {
        match self.registry.get(name)? {
            Identifier::Alias(alias) => Some(alias.action().to_string()),
            Identifier::Variable(variable) => Some(variable.value(&self.values).to_string()),
            Identifier::Command(_) => None,
        }
    }

    /// Executes a command line as a key press and returns the last statement's value.
    pub fn execute(&mut self, line: &str) -> Result<i32, DispatchError> {
        self.execute_edge(line, true)
    }

    /// Executes a command line for one input edge.
    pub fn execute_edge(&mut self, line: &str, is_down: bool) -> Result<i32, DispatchError> {
        self.scoped("command line", |console| console.run_line(line, is_down))
    }

    /// Evaluates command text for its integer result, as expression arguments are.
    pub fn evaluate(&mut self, text: &str) -> Result<i32, DispatchError> {
        self.scoped("expression", |console| console.run_line(text, true))
    }

    /// Runs an alias body with `args` as the `$N` frame for its words.
    pub(crate) fn execute_alias(
        &mut self,
        name: &str,
        body: &str,
        args: &[String],
        is_down: bool,
    ) -> Result<i32, DispatchError> {
        self.frames.push(args.to_vec());
        let result = self.scoped(name, |console| console.run_line(body, is_down));
        self.frames.pop();
        result
    }

    /// Invokes an identifier directly with already split arguments.
    ///
    /// Unknown names fail without side effects.
    pub fn invoke(&mut self, name: &str, args: &[&str], is_down: bool) -> Result<i32, DispatchError> {
        let identifier = self
            .registry
            .get(name)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownIdentifier(name.to_string()))?;
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        self.scoped(name, |console| console.dispatch(identifier, &args, is_down))
    }

    /// Direct `name value` assignment entry point.
    pub fn assign(&mut self, name: &str, value: Option<&str>) -> Result<Assignment, DispatchError> {
        let variable = match self.registry.get(name) {
            Some(Identifier::Variable(variable)) => variable.clone(),
            Some(_) => return Err(DispatchError::NotAVariable(name.to_string())),
            None => return Err(DispatchError::UnknownIdentifier(name.to_string())),
        };
        let outcome = variable.assign(&self.values, value, true);
        self.report_assignment(&variable, outcome);
        Ok(outcome)
    }

    /// Feeds a key press or release into the bindings.
    pub fn key_event(&mut self, key: KeyCode, is_down: bool) -> Result<i32, DispatchError> {
        let Some(action) = self.bindings.edge(key, is_down) else {
            return Ok(0);
        };
        log::debug!("{key} {} -> {action:?}", if is_down { "down" } else { "up" });
        self.execute_edge(&action, is_down)
    }

    /// Executes every statement of a script file.
    pub fn exec_file<P: AsRef<Path>>(&mut self, path: P) -> Result<i32> {
        let path = path.as_ref();
        let script = fs::read_to_string(path)
            .with_context(|| format!("unable to read script {}", path.display()))?;
        log::debug!("executing {}", path.display());
        Ok(self.execute(&script)?)
    }

    /// Serializes every persisted identifier and key binding.
    pub fn write_config<W: Write>(&self, out: &mut W) -> io::Result<()> {
        persist::write_config(self, out)
    }

    pub fn write_config_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("unable to create config {}", path.display()))?;
        let mut out = BufWriter::new(file);
        self.write_config(&mut out)
            .and_then(|()| out.flush())
            .with_context(|| format!("unable to write config {}", path.display()))
    }

    fn scoped<F>(&mut self, context: &str, run: F) -> Result<i32, DispatchError>
    where
        F: FnOnce(&mut Self) -> Result<i32, DispatchError>,
    {
        let result = match self.enter(context) {
            Ok(()) => {
                let result = run(self);
                self.depth -= 1;
                result
            }
            Err(err) => Err(err),
        };
        if self.depth == 0 {
            if let Some(err) = self.abort.take() {
                log::error!("{err}");
                self.report(err.to_string());
                return Err(err);
            }
        }
        result
    }

    fn enter(&mut self, context: &str) -> Result<(), DispatchError> {
        if let Some(err) = &self.abort {
            return Err(err.clone());
        }
        if self.depth >= self.config.max_depth {
            let err = DispatchError::RecursionLimit {
                limit: self.config.max_depth,
                context: context.to_string(),
            };
            self.abort = Some(err.clone());
            return Err(err);
        }
        self.depth += 1;
        Ok(())
    }

    fn run_line(&mut self, line: &str, is_down: bool) -> Result<i32, DispatchError> {
        let mut value = 0;
        for statement in Statements::new(line) {
            let words = match statement {
                Ok(words) => words,
                Err(err) => {
                    self.report(err.to_string());
                    break;
                }
            };
            if words.is_empty() {
                continue;
            }
            let words = self.resolve_words(words)?;
            value = self.run_statement(&words, is_down)?;
            if let Some(err) = &self.abort {
                return Err(err.clone());
            }
        }
        Ok(value)
    }

    fn resolve_words(&mut self, mut words: Vec<Word<'_>>) -> Result<Vec<String>, DispatchError> {
        let limit = self.config.max_args;
        if words.len() > limit {
            log::warn!(
                "dropping {} word(s) past the {limit}-word limit",
                words.len() - limit
            );
            words.truncate(limit);
        }
        words
            .into_iter()
            .map(|word| self.resolve_word(word))
            .collect()
    }

    fn resolve_word(&mut self, word: Word<'_>) -> Result<String, DispatchError> {
        match word {
            Word::Plain(text) => match text.strip_prefix('$').filter(|name| !name.is_empty()) {
                Some(name) => {
                    let resolved = self.argument(name).or_else(|| self.lookup(name));
                    Ok(resolved.unwrap_or_else(|| {
                        log::warn!("unknown alias lookup: {name}");
                        self.report(format!("unknown alias lookup: {name}"));
                        text.to_string()
                    }))
                }
                None => Ok(text.to_string()),
            },
            Word::Quoted(text) | Word::Block(text) => Ok(text.to_string()),
            Word::Expr(text) => self.evaluate(text).map(|value| value.to_string()),
        }
    }

    /// Resolves `$N` against the innermost alias call; missing arguments are empty.
    fn argument(&self, digits: &str) -> Option<String> {
        if !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        let frame = self.frames.last()?;
        let arg = digits
            .parse::<usize>()
            .ok()
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| frame.get(index));
        Some(arg.cloned().unwrap_or_default())
    }

    fn run_statement(&mut self, words: &[String], is_down: bool) -> Result<i32, DispatchError> {
        let Some((name, args)) = words.split_first() else {
            return Ok(0);
        };
        if name.is_empty() {
            return Ok(0);
        }
        match self.registry.get(name).cloned() {
            Some(identifier) => self.dispatch(identifier, args, is_down),
            None => match parse_leading_int(name) {
                Some(value) => Ok(value),
                None => {
                    if is_down {
                        self.report(format!("unknown command: {name}"));
                    }
                    Ok(0)
                }
            },
        }
    }

    fn dispatch(
        &mut self,
        identifier: Identifier,
        args: &[String],
        is_down: bool,
    ) -> Result<i32, DispatchError> {
        match identifier {
            Identifier::Command(command) => command.execute(self, args, is_down),
            Identifier::Alias(alias) => alias.execute(self, args, is_down),
            Identifier::Variable(variable) => {
                if !is_down {
                    return Ok(variable.value(&self.values));
                }
                let text = args.first().map(String::as_str);
                let outcome = variable.assign(&self.values, text, is_down);
                self.report_assignment(&variable, outcome);
                Ok(outcome.value())
            }
        }
    }

    fn report_assignment(&self, variable: &Variable, outcome: Assignment) {
        match outcome {
            Assignment::Query(value) => self.report(format!("{} = {value}", variable.name())),
            Assignment::Set { clamped: true, .. } => self.report(format!(
                "valid range for {} is {}..{}",
                variable.name(),
                variable.min(),
                variable.max()
            )),
            Assignment::Set { clamped: false, .. } => {}
            Assignment::ReadOnly(_) => {
                self.report(format!("variable {} is read-only", variable.name()))
            }
        }
    }
}
