//! Standard console commands every host gets.

use crate::command::{parse_int, Native};
use crate::console::Console;
use crate::error::{DispatchError, RegistryError};
use crate::keymap::KeyCode;

/// Registers the alias, binding, script, arithmetic and string commands.
pub fn register_all(console: &mut Console) -> Result<(), RegistryError> {
    register_core(console)?;
    register_bindings(console)?;
    register_arithmetic(console)?;
    register_strings(console)?;
    Ok(())
}

fn register_core(console: &mut Console) -> Result<(), RegistryError> {
    console.add_command(
        "alias",
        Native::str2(|console, name, action| {
            if let Err(err) = console.define_alias(name, action) {
                console.report(err.to_string());
            }
        }),
    )?;
    console.add_command(
        "echo",
        Native::vari(|console, args| console.report(args.join(" "))),
    )?;
    // Runs its body on release, as a press so ordinary commands fire.
    console.add_command(
        "onrelease",
        Native::down1(|console, is_down, action| {
            if !is_down {
                if let Err(err) = console.execute_edge(action, true) {
                    log::debug!("onrelease aborted: {err}");
                }
            }
        }),
    )?;
    console.add_command(
        "exec",
        Native::str1(|console, path| {
            if let Err(err) = console.exec_file(path) {
                if err.downcast_ref::<DispatchError>().is_none() {
                    log::warn!("{err:#}");
                    console.report(format!("could not read \"{path}\""));
                }
            }
        }),
    )?;
    console.add_command(
        "writecfg",
        Native::opt_str1(|console, path| {
            let path = path
                .map(str::to_string)
                .unwrap_or_else(|| console.config().default_config_file.clone());
            if let Err(err) = console.write_config_file(&path) {
                log::warn!("{err:#}");
                console.report(format!("could not write \"{path}\""));
            }
        }),
    )?;
    console.add_command(
        "identifiers",
        Native::opt_str1(|console, prefix| {
            let names = console.registry().complete(prefix.unwrap_or("")).join(" ");
            console.report(names);
        }),
    )?;
    Ok(())
}

fn register_bindings(console: &mut Console) -> Result<(), RegistryError> {
    console.add_command(
        "bind",
        Native::str2(|console, key, action| match KeyCode::from_name(key) {
            Some(code) => console.bindings_mut().bind(code, action),
            None => console.report(format!("unknown key \"{key}\"")),
        }),
    )?;
    console.add_command(
        "unbind",
        Native::str1(|console, key| match KeyCode::from_name(key) {
            Some(code) => {
                console.bindings_mut().unbind(code);
            }
            None => console.report(format!("unknown key \"{key}\"")),
        }),
    )?;
    Ok(())
}

fn register_arithmetic(console: &mut Console) -> Result<(), RegistryError> {
    let operators: [(&str, fn(i32, i32) -> i32); 11] = [
        ("+", i32::wrapping_add),
        ("-", i32::wrapping_sub),
        ("*", i32::wrapping_mul),
        ("div", |a, b| a.checked_div(b).unwrap_or(0)),
        ("mod", |a, b| a.checked_rem(b).unwrap_or(0)),
        ("=", |a, b| i32::from(a == b)),
        ("!=", |a, b| i32::from(a != b)),
        ("<", |a, b| i32::from(a < b)),
        (">", |a, b| i32::from(a > b)),
        ("<=", |a, b| i32::from(a <= b)),
        (">=", |a, b| i32::from(a >= b)),
    ];
    for (name, op) in operators {
        console.add_command(name, Native::exp2(move |_, a, b| op(a, b)))?;
    }
    console.add_command("!", Native::exp1(|_, a| i32::from(a == 0)))?;
    Ok(())
}

fn register_strings(console: &mut Console) -> Result<(), RegistryError> {
    console.add_command(
        "strcmp",
        Native::est2(|_, a, b| i32::from(a == b)),
    )?;
    console.add_command(
        "listlen",
        Native::est1(|_, list| list.split_whitespace().count().try_into().unwrap_or(i32::MAX)),
    )?;
    console.add_command(
        "concat",
        Native::vari(|console, args| store_result(console, &args.join(" "))),
    )?;
    console.add_command(
        "concatword",
        Native::vari(|console, args| store_result(console, &args.concat())),
    )?;
    console.add_command(
        "at",
        Native::str2(|console, list, index| {
            let word = usize::try_from(parse_int(index))
                .ok()
                .and_then(|index| list.split_whitespace().nth(index))
                .unwrap_or("")
                .to_string();
            store_result(console, &word);
        }),
    )?;
    Ok(())
}

/// String results are handed back through the alias `s`.
fn store_result(console: &mut Console, value: &str) {
    if let Err(err) = console.define_alias("s", value) {
        console.report(err.to_string());
    }
}
