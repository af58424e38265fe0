//! Console dispatch engine for the Crystal runtime.
//!
//! The crate binds names to three kinds of entries: range-checked integer
//! [`Variable`]s backed by cells the host owns, native [`Command`]s whose
//! typed callback fixes how textual arguments are decoded, and [`Alias`]
//! macros replayed through the dispatcher. The [`Console`] resolves command
//! lines and key events against its [`Registry`]; rendering, input polling
//! and the game loop stay outside of the crate so the engine can be embedded
//! in headless tools.

pub mod alias;
pub mod builtins;
pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod identifier;
pub mod keymap;
pub mod output;
pub mod persist;
pub mod registry;
pub mod storage;
pub mod tokenizer;
pub mod variable;

pub use alias::Alias;
pub use command::{Command, Native, Signature};
pub use config::ConsoleConfig;
pub use console::Console;
pub use error::{ConfigError, DispatchError, RegistryError, TokenizeError};
pub use identifier::{Identifier, IdentifierInfo, IdentifierKind};
pub use keymap::{KeyBindings, KeyCode, NamedKey};
pub use output::{BufferedSink, ConsoleSink, LogSink, StdoutSink};
pub use registry::Registry;
pub use storage::{CellHandle, ValueTable};
pub use variable::{Assignment, Variable};
