use indexmap::IndexMap;

use crate::alias::Alias;
use crate::error::RegistryError;
use crate::identifier::{Identifier, IdentifierInfo};
use crate::storage::ValueTable;

/// Characters that the tokenizer treats specially and therefore cannot appear in names.
const RESERVED: &[char] = &[';', '"', '[', ']', '(', ')', '$'];

/// Name → identifier table, iterated in registration order.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    entries: IndexMap<String, Identifier>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new identifier; names are unique across all kinds.
    pub fn insert(&mut self, identifier: impl Into<Identifier>) -> Result<(), RegistryError> {
        let identifier = identifier.into();
        validate_name(identifier.name())?;
        if self.entries.contains_key(identifier.name()) {
            return Err(RegistryError::Duplicate(identifier.name().to_string()));
        }
        self.entries
            .insert(identifier.name().to_string(), identifier);
        Ok(())
    }

    /// Creates an alias or replaces the action of an existing one.
    pub fn define_alias(&mut self, name: &str, action: &str) -> Result<(), RegistryError> {
        match self.entries.get_mut(name) {
            Some(Identifier::Alias(alias)) => {
                alias.set_action(action);
                Ok(())
            }
            Some(_) => Err(RegistryError::NotAnAlias(name.to_string())),
            None => self.insert(Alias::new(name, action)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Identifier> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Identifier> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Removes an entry while keeping the order of the remaining ones.
    pub fn remove(&mut self, name: &str) -> Option<Identifier> {
        self.entries.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names starting with `prefix`, sorted, for console completion.
    pub fn complete(&self, prefix: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entries
            .keys()
            .map(String::as_str)
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort_unstable();
        names
    }

    pub fn snapshot(&self, values: &ValueTable) -> Vec<IdentifierInfo> {
        self.iter().map(|identifier| identifier.info(values)).collect()
    }
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    let invalid = name.is_empty()
        || name
            .chars()
            .any(|ch| ch.is_whitespace() || RESERVED.contains(&ch));
    if invalid {
        Err(RegistryError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}
