//! Writes the console state back out as an executable script.

use std::io::{self, Write};

use crate::console::Console;
use crate::identifier::Identifier;

const HEADER: &str = "// written by writecfg, changes made here are overwritten on the next save";

/// Emits a script restoring every persisted variable, key binding and alias.
///
/// Variables come first, then bindings, then aliases, each in registration
/// order. Read-only variables are skipped.
pub fn write_config<W: Write>(console: &Console, out: &mut W) -> io::Result<()> {
    writeln!(out, "{HEADER}")?;
    writeln!(out)?;
    for identifier in console.registry().iter() {
        if let Identifier::Variable(variable) = identifier {
            if variable.persist() && !variable.is_read_only() {
                writeln!(out, "{} {}", variable.name(), variable.value(console.values()))?;
            }
        }
    }
    for (key, action) in console.bindings().iter() {
        writeln!(out, "bind {key} {}", quote(action))?;
    }
    for identifier in console.registry().iter() {
        if let Identifier::Alias(alias) = identifier {
            if alias.persist() {
                writeln!(out, "alias {} {}", alias.name(), quote(alias.action()))?;
            }
        }
    }
    Ok(())
}

/// Wraps text so the tokenizer reads it back as a single word.
fn quote(text: &str) -> String {
    if brackets_balanced(text) {
        format!("[{text}]")
    } else if !text.contains(['"', '\n']) {
        format!("\"{text}\"")
    } else {
        log::warn!("cannot quote {text:?} losslessly, unbalanced brackets dropped");
        format!("[{}]", text.replace(['[', ']'], ""))
    }
}

fn brackets_balanced(text: &str) -> bool {
    let mut depth = 0usize;
    for ch in text.chars() {
        match ch {
            '[' => depth += 1,
            ']' => match depth.checked_sub(1) {
                Some(next) => depth = next,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}
