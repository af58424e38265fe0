use serde::Serialize;

use crate::alias::Alias;
use crate::command::{Command, Signature};
use crate::storage::ValueTable;
use crate::variable::Variable;

/// Discriminator for the three kinds of bindable names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    Variable,
    Command,
    Alias,
}

/// Any entry of the console namespace.
#[derive(Debug, Clone)]
pub enum Identifier {
    Variable(Variable),
    Command(Command),
    Alias(Alias),
}

impl Identifier {
    pub fn name(&self) -> &str {
        match self {
            Identifier::Variable(variable) => variable.name(),
            Identifier::Command(command) => command.name(),
            Identifier::Alias(alias) => alias.name(),
        }
    }

    /// Whether the config writer should emit this entry.
    pub fn persist(&self) -> bool {
        match self {
            Identifier::Variable(variable) => variable.persist(),
            Identifier::Command(command) => command.persist(),
            Identifier::Alias(alias) => alias.persist(),
        }
    }

    pub fn set_persist(&mut self, persist: bool) {
        match self {
            Identifier::Variable(variable) => variable.set_persist(persist),
            Identifier::Command(command) => command.set_persist(persist),
            Identifier::Alias(alias) => alias.set_persist(persist),
        }
    }

    pub fn kind(&self) -> IdentifierKind {
        match self {
            Identifier::Variable(_) => IdentifierKind::Variable,
            Identifier::Command(_) => IdentifierKind::Command,
            Identifier::Alias(_) => IdentifierKind::Alias,
        }
    }

    /// Serializable summary of the entry, resolving variable values through `values`.
    pub fn info(&self, values: &ValueTable) -> IdentifierInfo {
        let mut info = IdentifierInfo {
            name: self.name().to_string(),
            kind: self.kind(),
            persist: self.persist(),
            signature: None,
            min: None,
            max: None,
            value: None,
            action: None,
        };
        match self {
            Identifier::Variable(variable) => {
                info.min = Some(variable.min());
                info.max = Some(variable.max());
                info.value = Some(variable.value(values));
            }
            Identifier::Command(command) => info.signature = Some(command.signature()),
            Identifier::Alias(alias) => info.action = Some(alias.action().to_string()),
        }
        info
    }
}

impl From<Variable> for Identifier {
    fn from(variable: Variable) -> Self {
        Identifier::Variable(variable)
    }
}

impl From<Command> for Identifier {
    fn from(command: Command) -> Self {
        Identifier::Command(command)
    }
}

impl From<Alias> for Identifier {
    fn from(alias: Alias) -> Self {
        Identifier::Alias(alias)
    }
}

/// Snapshot of a registry entry for listings and tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierInfo {
    pub name: String,
    pub kind: IdentifierKind,
    pub persist: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}
