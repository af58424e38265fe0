use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::console::Console;
use crate::error::DispatchError;

/// Argument signature of a console command.
///
/// The signature is never stored on its own: it is derived from the
/// [`Native`] variant, so a command cannot disagree with its callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signature {
    Int1,
    Int2,
    Int3,
    Int4,
    NoArgs,
    Str1,
    Str2,
    Str3,
    Str5,
    OptStr1,
    OptStr2,
    OptStr3,
    OptStr5,
    Down,
    Down1,
    Exp1,
    Exp2,
    Est1,
    Est2,
    Vari,
}

impl Signature {
    pub const ALL: [Signature; 20] = [
        Signature::Int1,
        Signature::Int2,
        Signature::Int3,
        Signature::Int4,
        Signature::NoArgs,
        Signature::Str1,
        Signature::Str2,
        Signature::Str3,
        Signature::Str5,
        Signature::OptStr1,
        Signature::OptStr2,
        Signature::OptStr3,
        Signature::OptStr5,
        Signature::Down,
        Signature::Down1,
        Signature::Exp1,
        Signature::Exp2,
        Signature::Est1,
        Signature::Est2,
        Signature::Vari,
    ];

    /// Number of positional arguments the callback takes, `None` for variadic commands.
    pub fn arity(self) -> Option<usize> {
        use Signature::*;
        match self {
            NoArgs | Down => Some(0),
            Int1 | Str1 | OptStr1 | Down1 | Exp1 | Est1 => Some(1),
            Int2 | Str2 | OptStr2 | Exp2 | Est2 => Some(2),
            Int3 | Str3 | OptStr3 => Some(3),
            Int4 => Some(4),
            Str5 | OptStr5 => Some(5),
            Vari => None,
        }
    }

    /// Whether the command also runs when a bound key is released.
    pub fn fires_on_release(self) -> bool {
        matches!(self, Signature::Down | Signature::Down1)
    }

    pub fn as_str(self) -> &'static str {
        use Signature::*;
        match self {
            Int1 => "int1",
            Int2 => "int2",
            Int3 => "int3",
            Int4 => "int4",
            NoArgs => "none",
            Str1 => "str1",
            Str2 => "str2",
            Str3 => "str3",
            Str5 => "str5",
            OptStr1 => "opt_str1",
            OptStr2 => "opt_str2",
            OptStr3 => "opt_str3",
            OptStr5 => "opt_str5",
            Down => "down",
            Down1 => "down1",
            Exp1 => "exp1",
            Exp2 => "exp2",
            Est1 => "est1",
            Est2 => "est2",
            Vari => "vari",
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type OptStr<'a> = Option<&'a str>;

/// Strongly typed native callback, one variant per [`Signature`].
///
/// Every callback receives the dispatching [`Console`] first so natives can
/// report output or re-enter the dispatcher.
#[derive(Clone)]
pub enum Native {
    Int1(Arc<dyn Fn(&mut Console, i32) + Send + Sync>),
    Int2(Arc<dyn Fn(&mut Console, i32, i32) + Send + Sync>),
    Int3(Arc<dyn Fn(&mut Console, i32, i32, i32) + Send + Sync>),
    Int4(Arc<dyn Fn(&mut Console, i32, i32, i32, i32) + Send + Sync>),
    NoArgs(Arc<dyn Fn(&mut Console) + Send + Sync>),
    Str1(Arc<dyn Fn(&mut Console, &str) + Send + Sync>),
    Str2(Arc<dyn Fn(&mut Console, &str, &str) + Send + Sync>),
    Str3(Arc<dyn Fn(&mut Console, &str, &str, &str) + Send + Sync>),
    Str5(Arc<dyn Fn(&mut Console, &str, &str, &str, &str, &str) + Send + Sync>),
    OptStr1(Arc<dyn Fn(&mut Console, OptStr<'_>) + Send + Sync>),
    OptStr2(Arc<dyn Fn(&mut Console, OptStr<'_>, OptStr<'_>) + Send + Sync>),
    OptStr3(Arc<dyn Fn(&mut Console, OptStr<'_>, OptStr<'_>, OptStr<'_>) + Send + Sync>),
    OptStr5(
        Arc<
            dyn Fn(&mut Console, OptStr<'_>, OptStr<'_>, OptStr<'_>, OptStr<'_>, OptStr<'_>)
                + Send
                + Sync,
        >,
    ),
    Down(Arc<dyn Fn(&mut Console, bool) + Send + Sync>),
    Down1(Arc<dyn Fn(&mut Console, bool, &str) + Send + Sync>),
    Exp1(Arc<dyn Fn(&mut Console, i32) -> i32 + Send + Sync>),
    Exp2(Arc<dyn Fn(&mut Console, i32, i32) -> i32 + Send + Sync>),
    Est1(Arc<dyn Fn(&mut Console, &str) -> i32 + Send + Sync>),
    Est2(Arc<dyn Fn(&mut Console, &str, &str) -> i32 + Send + Sync>),
    Vari(Arc<dyn Fn(&mut Console, &[String]) + Send + Sync>),
}

impl Native {
    pub fn int1(f: impl Fn(&mut Console, i32) + Send + Sync + 'static) -> Self {
        Self::Int1(Arc::new(f))
    }

    pub fn int2(f: impl Fn(&mut Console, i32, i32) + Send + Sync + 'static) -> Self {
        Self::Int2(Arc::new(f))
    }

    pub fn int3(f: impl Fn(&mut Console, i32, i32, i32) + Send + Sync + 'static) -> Self {
        Self::Int3(Arc::new(f))
    }

    pub fn int4(f: impl Fn(&mut Console, i32, i32, i32, i32) + Send + Sync + 'static) -> Self {
        Self::Int4(Arc::new(f))
    }

    pub fn no_args(f: impl Fn(&mut Console) + Send + Sync + 'static) -> Self {
        Self::NoArgs(Arc::new(f))
    }

    pub fn str1<F>(f: F) -> Self
    where
        F: Fn(&mut Console, &str) + Send + Sync + 'static,
    {
        Self::Str1(Arc::new(f))
    }

    pub fn str2<F>(f: F) -> Self
    where
        F: Fn(&mut Console, &str, &str) + Send + Sync + 'static,
    {
        Self::Str2(Arc::new(f))
    }

    pub fn str3<F>(f: F) -> Self
    where
        F: Fn(&mut Console, &str, &str, &str) + Send + Sync + 'static,
    {
        Self::Str3(Arc::new(f))
    }

    pub fn str5<F>(f: F) -> Self
    where
        F: Fn(&mut Console, &str, &str, &str, &str, &str) + Send + Sync + 'static,
    {
        Self::Str5(Arc::new(f))
    }

    pub fn opt_str1<F>(f: F) -> Self
    where
        F: Fn(&mut Console, Option<&str>) + Send + Sync + 'static,
    {
        Self::OptStr1(Arc::new(f))
    }

    pub fn opt_str2<F>(f: F) -> Self
    where
        F: Fn(&mut Console, Option<&str>, Option<&str>) + Send + Sync + 'static,
    {
        Self::OptStr2(Arc::new(f))
    }

    pub fn opt_str3<F>(f: F) -> Self
    where
        F: Fn(&mut Console, Option<&str>, Option<&str>, Option<&str>) + Send + Sync + 'static,
    {
        Self::OptStr3(Arc::new(f))
    }

    pub fn opt_str5<F>(f: F) -> Self
    where
        F: Fn(
                &mut Console,
                Option<&str>,
                Option<&str>,
                Option<&str>,
                Option<&str>,
                Option<&str>,
            ) + Send
            + Sync
            + 'static,
    {
        Self::OptStr5(Arc::new(f))
    }

    pub fn down(f: impl Fn(&mut Console, bool) + Send + Sync + 'static) -> Self {
        Self::Down(Arc::new(f))
    }

    pub fn down1<F>(f: F) -> Self
    where
        F: Fn(&mut Console, bool, &str) + Send + Sync + 'static,
    {
        Self::Down1(Arc::new(f))
    }

    pub fn exp1(f: impl Fn(&mut Console, i32) -> i32 + Send + Sync + 'static) -> Self {
        Self::Exp1(Arc::new(f))
    }

    pub fn exp2(f: impl Fn(&mut Console, i32, i32) -> i32 + Send + Sync + 'static) -> Self {
        Self::Exp2(Arc::new(f))
    }

    pub fn est1<F>(f: F) -> Self
    where
        F: Fn(&mut Console, &str) -> i32 + Send + Sync + 'static,
    {
        Self::Est1(Arc::new(f))
    }

    pub fn est2<F>(f: F) -> Self
    where
        F: Fn(&mut Console, &str, &str) -> i32 + Send + Sync + 'static,
    {
        Self::Est2(Arc::new(f))
    }

    pub fn vari<F>(f: F) -> Self
    where
        F: Fn(&mut Console, &[String]) + Send + Sync + 'static,
    {
        Self::Vari(Arc::new(f))
    }

    pub fn signature(&self) -> Signature {
        match self {
            Native::Int1(_) => Signature::Int1,
            Native::Int2(_) => Signature::Int2,
            Native::Int3(_) => Signature::Int3,
            Native::Int4(_) => Signature::Int4,
            Native::NoArgs(_) => Signature::NoArgs,
            Native::Str1(_) => Signature::Str1,
            Native::Str2(_) => Signature::Str2,
            Native::Str3(_) => Signature::Str3,
            Native::Str5(_) => Signature::Str5,
            Native::OptStr1(_) => Signature::OptStr1,
            Native::OptStr2(_) => Signature::OptStr2,
            Native::OptStr3(_) => Signature::OptStr3,
            Native::OptStr5(_) => Signature::OptStr5,
            Native::Down(_) => Signature::Down,
            Native::Down1(_) => Signature::Down1,
            Native::Exp1(_) => Signature::Exp1,
            Native::Exp2(_) => Signature::Exp2,
            Native::Est1(_) => Signature::Est1,
            Native::Est2(_) => Signature::Est2,
            Native::Vari(_) => Signature::Vari,
        }
    }

    /// Decodes `args` into the callback's parameter list and calls it.
    ///
    /// Missing trailing arguments take the family default: `0` for integer and
    /// expression arguments, `""` for strings and `None` for optional strings.
    /// Expression arguments are executed through `console` before the call.
    pub fn call(
        &self,
        console: &mut Console,
        args: &[String],
        is_down: bool,
    ) -> Result<i32, DispatchError> {
        let value = match self {
            Native::Int1(f) => {
                f(console, int_arg(args, 0));
                0
            }
            Native::Int2(f) => {
                f(console, int_arg(args, 0), int_arg(args, 1));
                0
            }
            Native::Int3(f) => {
                f(console, int_arg(args, 0), int_arg(args, 1), int_arg(args, 2));
                0
            }
            Native::Int4(f) => {
                f(
                    console,
                    int_arg(args, 0),
                    int_arg(args, 1),
                    int_arg(args, 2),
                    int_arg(args, 3),
                );
                0
            }
            Native::NoArgs(f) => {
                f(console);
                0
            }
            Native::Str1(f) => {
                f(console, str_arg(args, 0));
                0
            }
            Native::Str2(f) => {
                f(console, str_arg(args, 0), str_arg(args, 1));
                0
            }
            Native::Str3(f) => {
                f(console, str_arg(args, 0), str_arg(args, 1), str_arg(args, 2));
                0
            }
            Native::Str5(f) => {
                f(
                    console,
                    str_arg(args, 0),
                    str_arg(args, 1),
                    str_arg(args, 2),
                    str_arg(args, 3),
                    str_arg(args, 4),
                );
                0
            }
            Native::OptStr1(f) => {
                f(console, opt_arg(args, 0));
                0
            }
            Native::OptStr2(f) => {
                f(console, opt_arg(args, 0), opt_arg(args, 1));
                0
            }
            Native::OptStr3(f) => {
                f(console, opt_arg(args, 0), opt_arg(args, 1), opt_arg(args, 2));
                0
            }
            Native::OptStr5(f) => {
                f(
                    console,
                    opt_arg(args, 0),
                    opt_arg(args, 1),
                    opt_arg(args, 2),
                    opt_arg(args, 3),
                    opt_arg(args, 4),
                );
                0
            }
            Native::Down(f) => {
                f(console, is_down);
                0
            }
            Native::Down1(f) => {
                f(console, is_down, str_arg(args, 0));
                0
            }
            Native::Exp1(f) => {
                let a = exp_arg(console, args, 0)?;
                f(console, a)
            }
            Native::Exp2(f) => {
                let a = exp_arg(console, args, 0)?;
                let b = exp_arg(console, args, 1)?;
                f(console, a, b)
            }
            Native::Est1(f) => f(console, str_arg(args, 0)),
            Native::Est2(f) => f(console, str_arg(args, 0), str_arg(args, 1)),
            Native::Vari(f) => {
                f(console, args);
                0
            }
        };
        Ok(value)
    }
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Native::{}", self.signature())
    }
}

/// A named native binding.
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    persist: bool,
    native: Native,
}

impl Command {
    pub fn new(name: impl Into<String>, native: Native) -> Self {
        Self {
            name: name.into(),
            persist: false,
            native,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn persist(&self) -> bool {
        self.persist
    }

    pub fn set_persist(&mut self, persist: bool) {
        self.persist = persist;
    }

    pub fn signature(&self) -> Signature {
        self.native.signature()
    }

    /// Runs the command with its textual arguments.
    ///
    /// Only `Down` and `Down1` commands see the release edge; every other
    /// signature runs on press and returns `0` on release.
    pub fn execute(
        &self,
        console: &mut Console,
        args: &[String],
        is_down: bool,
    ) -> Result<i32, DispatchError> {
        if !is_down && !self.signature().fires_on_release() {
            return Ok(0);
        }
        if let Some(arity) = self.signature().arity() {
            if args.len() > arity {
                log::debug!(
                    "{} takes {arity} argument(s), ignoring {} extra",
                    self.name,
                    args.len() - arity
                );
            }
        }
        self.native.call(console, args, is_down)
    }
}

/// Parses the leading decimal integer of `text`, yielding `0` when there is none.
///
/// Values outside the `i32` range saturate.
pub fn parse_int(text: &str) -> i32 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let limit = i64::from(i32::MAX) + 1;
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            (acc * 10 + i64::from(digit - b'0')).min(limit)
        });
    let value = if negative { -magnitude } else { magnitude };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Like [`parse_int`], but only for text that starts with a number.
///
/// Returns `None` unless the text begins with a digit, optionally preceded by
/// a sign, so words that are not numbers can be told apart from zero.
pub fn parse_leading_int(text: &str) -> Option<i32> {
    let text = text.trim_start();
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    if digits.bytes().next().is_some_and(|byte| byte.is_ascii_digit()) {
        Some(parse_int(text))
    } else {
        None
    }
}

fn int_arg(args: &[String], index: usize) -> i32 {
    args.get(index).map_or(0, |text| parse_int(text))
}

fn str_arg(args: &[String], index: usize) -> &str {
    args.get(index).map_or("", String::as_str)
}

fn opt_arg(args: &[String], index: usize) -> Option<&str> {
    args.get(index).map(String::as_str)
}

fn exp_arg(console: &mut Console, args: &[String], index: usize) -> Result<i32, DispatchError> {
    match args.get(index) {
        Some(text) => console.evaluate(text),
        None => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    fn recorder() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn parse_int_matches_lenient_decimal_rules() {
        assert_eq!(parse_int("42"), 42);
        assert_eq!(parse_int("  -17"), -17);
        assert_eq!(parse_int("+8"), 8);
        assert_eq!(parse_int("12abc"), 12);
        assert_eq!(parse_int("abc"), 0);
        assert_eq!(parse_int(""), 0);
        assert_eq!(parse_int("99999999999"), i32::MAX);
        assert_eq!(parse_int("-99999999999"), i32::MIN);
    }

    #[test]
    fn parse_leading_int_requires_a_digit_first() {
        assert_eq!(parse_leading_int("12abc"), Some(12));
        assert_eq!(parse_leading_int("-5000000000"), Some(i32::MIN));
        assert_eq!(parse_leading_int("+0"), Some(0));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("- 3"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn every_signature_has_a_native_variant() {
        let natives = [
            Native::int1(|_, _| {}),
            Native::int2(|_, _, _| {}),
            Native::int3(|_, _, _, _| {}),
            Native::int4(|_, _, _, _, _| {}),
            Native::no_args(|_| {}),
            Native::str1(|_, _| {}),
            Native::str2(|_, _, _| {}),
            Native::str3(|_, _, _, _| {}),
            Native::str5(|_, _, _, _, _, _| {}),
            Native::opt_str1(|_, _| {}),
            Native::opt_str2(|_, _, _| {}),
            Native::opt_str3(|_, _, _, _| {}),
            Native::opt_str5(|_, _, _, _, _, _| {}),
            Native::down(|_, _| {}),
            Native::down1(|_, _, _| {}),
            Native::exp1(|_, a| a),
            Native::exp2(|_, a, b| a + b),
            Native::est1(|_, _| 0),
            Native::est2(|_, _, _| 0),
            Native::vari(|_, _| {}),
        ];
        let signatures: Vec<Signature> = natives.iter().map(Native::signature).collect();
        assert_eq!(signatures, Signature::ALL.to_vec());
    }

    #[test]
    fn integer_arguments_default_to_zero() {
        let seen = recorder();
        let log = Arc::clone(&seen);
        let native = Native::int4(move |_, a, b, c, d| {
            log.lock().push(format!("{a} {b} {c} {d}"));
        });
        let mut console = Console::new();
        native.call(&mut console, &strings(&["1", "x"]), true).unwrap();
        native.call(&mut console, &[], true).unwrap();
        assert_eq!(*seen.lock(), vec!["1 0 0 0", "0 0 0 0"]);
    }

    #[test]
    fn string_families_differ_in_missing_defaults() {
        let seen = recorder();
        let plain_log = Arc::clone(&seen);
        let plain = Native::str3(move |_, a, b, c| {
            plain_log.lock().push(format!("{a:?} {b:?} {c:?}"));
        });
        let optional_log = Arc::clone(&seen);
        let optional = Native::opt_str3(move |_, a, b, c| {
            optional_log.lock().push(format!("{a:?} {b:?} {c:?}"));
        });
        let mut console = Console::new();
        let args = strings(&["one", ""]);
        plain.call(&mut console, &args, true).unwrap();
        optional.call(&mut console, &args, true).unwrap();
        assert_eq!(
            *seen.lock(),
            vec![
                r#""one" "" """#.to_string(),
                r#"Some("one") Some("") None"#.to_string(),
            ]
        );
    }

    #[test]
    fn five_string_signatures_pad_to_five() {
        let seen = recorder();
        let log = Arc::clone(&seen);
        let plain = Native::str5(move |_, a, b, c, d, e| {
            log.lock().push([a, b, c, d, e].join(","));
        });
        let log = Arc::clone(&seen);
        let optional = Native::opt_str5(move |_, a, b, c, d, e| {
            let count = [a, b, c, d, e].iter().filter(|arg| arg.is_some()).count();
            log.lock().push(count.to_string());
        });
        let mut console = Console::new();
        plain.call(&mut console, &strings(&["a", "b"]), true).unwrap();
        optional.call(&mut console, &strings(&["a", "b"]), true).unwrap();
        assert_eq!(*seen.lock(), vec!["a,b,,,", "2"]);
    }

    #[test]
    fn release_edge_only_reaches_down_commands() {
        let seen = recorder();
        let log = Arc::clone(&seen);
        let fire = Command::new(
            "fire",
            Native::no_args(move |_| log.lock().push("fire".into())),
        );
        let log = Arc::clone(&seen);
        let attack = Command::new(
            "attack",
            Native::down1(move |_, down, weapon| log.lock().push(format!("{down} {weapon}"))),
        );
        let mut console = Console::new();
        fire.execute(&mut console, &[], true).unwrap();
        fire.execute(&mut console, &[], false).unwrap();
        attack.execute(&mut console, &strings(&["rifle"]), true).unwrap();
        attack.execute(&mut console, &[], false).unwrap();
        assert_eq!(*seen.lock(), vec!["fire", "true rifle", "false "]);
    }

    #[test]
    fn expression_arguments_are_executed_first() {
        let native = Native::exp2(|_, a, b| a * b);
        let mut console = Console::new();
        console.define_alias("six", "6").unwrap();
        let literal = native.call(&mut console, &strings(&["6", "7"]), true).unwrap();
        let nested = native
            .call(&mut console, &strings(&["six", "7"]), true)
            .unwrap();
        assert_eq!(literal, 42);
        assert_eq!(nested, literal);
        assert_eq!(native.call(&mut console, &[], true).unwrap(), 0);
    }

    #[test]
    fn variadic_commands_receive_every_argument() {
        let seen = recorder();
        let log = Arc::clone(&seen);
        let native = Native::vari(move |_, args| log.lock().push(format!("{}", args.len())));
        let mut console = Console::new();
        native
            .call(&mut console, &strings(&["a", "b", "c", "d", "e", "f"]), true)
            .unwrap();
        assert_eq!(*seen.lock(), vec!["6"]);
    }
}
