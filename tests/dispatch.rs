use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crystal_console::{
    builtins, BufferedSink, Console, ConsoleConfig, DispatchError, KeyCode, Native, ValueTable,
    Variable,
};

static SHALLOW: Lazy<ConsoleConfig> = Lazy::new(|| {
    ConsoleConfig::from_xml("<console><max-depth>12</max-depth></console>")
        .expect("valid console config")
});

fn console_with(config: ConsoleConfig) -> (Console, Arc<BufferedSink>) {
    let sink = Arc::new(BufferedSink::new());
    let mut console = Console::with_parts(config, ValueTable::new(), sink.clone());
    builtins::register_all(&mut console).expect("builtins register");
    (console, sink)
}

fn console() -> (Console, Arc<BufferedSink>) {
    console_with(ConsoleConfig::default())
}

#[test]
fn bound_alias_forwards_both_edges_to_a_down_command() {
    let (mut console, _) = console();
    let edges = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&edges);
    console
        .add_command("+jump", Native::down(move |_, down| log.lock().push(down)))
        .unwrap();
    console.execute("alias jump [+jump]; bind space jump").unwrap();

    let space = KeyCode::from_name("SPACE").unwrap();
    console.key_event(space, true).unwrap();
    console.key_event(space, false).unwrap();
    assert_eq!(*edges.lock(), vec![true, false]);
}

#[test]
fn redefining_an_alias_does_not_disturb_the_running_body() {
    let (mut console, sink) = console();
    console
        .execute("alias swap [alias swap [echo second]; echo first]")
        .unwrap();
    console.execute("swap").unwrap();
    console.execute("swap").unwrap();
    assert_eq!(sink.take(), vec!["first", "second"]);
}

#[test]
fn expression_arguments_accept_blocks_literals_and_sub_expressions() {
    let (mut console, _) = console();
    console.add_command("double", Native::exp1(|_, a| a * 2)).unwrap();
    console.define_alias("five", "5").unwrap();
    assert_eq!(console.execute("double [five]").unwrap(), 10);
    assert_eq!(console.execute("double 5").unwrap(), 10);
    assert_eq!(console.execute("double (five)").unwrap(), 10);
    assert_eq!(console.execute("double [+ 2 (five)]").unwrap(), 14);
}

#[test]
fn mutual_recursion_hits_the_limit_and_leaves_no_residue() {
    let (mut console, sink) = console_with(SHALLOW.clone());
    console.execute("alias ping [pong]; alias pong [ping]").unwrap();
    let err = console.execute("ping").unwrap_err();
    assert!(matches!(err, DispatchError::RecursionLimit { limit: 12, .. }));
    assert_eq!(console.depth(), 0);
    assert_eq!(sink.take(), vec![err.to_string()]);

    assert_eq!(console.execute("+ 1 1").unwrap(), 2);
    assert!(sink.lines().is_empty());
}

#[test]
fn change_hook_fires_once_per_assignment() {
    let (mut console, sink) = console();
    let fired = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&fired);
    let handle = console.values().allocate(50);
    console
        .register(
            Variable::new("gamma", 30, 300, handle).on_change(move || *counter.lock() += 1),
        )
        .unwrap();

    console.execute("gamma 400").unwrap();
    console.execute("gamma").unwrap();
    console.assign("gamma", Some("120")).unwrap();
    assert_eq!(console.value_of("gamma"), Some(120));
    assert_eq!(*fired.lock(), 2);
    assert_eq!(
        sink.take(),
        vec!["valid range for gamma is 30..300", "gamma = 300"]
    );
}

#[test]
fn written_config_restores_a_fresh_console() {
    let (mut original, _) = console();
    original.add_variable("volume", 0, 80, 100).unwrap();
    let sensitivity = original.values().allocate(3);
    original
        .register(Variable::new("sensitivity", 1, 10, sensitivity).persistent())
        .unwrap();
    original
        .execute("sensitivity 7; bind mouse2 [zoom; echo [scoped in]]; alias zoom [sensitivity 2]")
        .unwrap();

    let mut script = Vec::new();
    original.write_config(&mut script).unwrap();
    let script = String::from_utf8(script).unwrap();

    let (mut restored, _) = console();
    restored.add_variable("volume", 0, 80, 100).unwrap();
    let handle = restored.values().allocate(3);
    restored
        .register(Variable::new("sensitivity", 1, 10, handle).persistent())
        .unwrap();
    restored.execute(&script).unwrap();

    assert_eq!(restored.value_of("sensitivity"), Some(7));
    assert_eq!(restored.lookup("zoom").as_deref(), Some("sensitivity 2"));
    assert_eq!(
        restored.bindings().action(KeyCode::Mouse(1)),
        Some("zoom; echo [scoped in]")
    );

    let mut rewritten = Vec::new();
    restored.write_config(&mut rewritten).unwrap();
    assert_eq!(String::from_utf8(rewritten).unwrap(), script);
}

#[test]
fn direct_invocation_uses_already_split_arguments() {
    let (mut console, sink) = console();
    console.invoke("echo", &["two words", "three"], true).unwrap();
    assert_eq!(console.invoke("+", &["40", "2"], true).unwrap(), 42);
    assert_eq!(sink.take(), vec!["two words three"]);
}

#[test]
fn alias_arguments_stay_single_words() {
    let (mut console, sink) = console();
    let names = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&names);
    console
        .add_command(
            "setname",
            Native::str1(move |_, name| log.lock().push(name.to_string())),
        )
        .unwrap();

    console
        .execute("alias rename [setname $1]; rename \"John Smith\"")
        .unwrap();
    assert_eq!(*names.lock(), vec!["John Smith"]);

    console.execute("alias bindit [bind $1 $2]").unwrap();
    console
        .execute("bindit F1 [echo injected; echo two]")
        .unwrap();
    assert!(sink.lines().is_empty());
    assert_eq!(
        console.bindings().action(KeyCode::Function(1)),
        Some("echo injected; echo two")
    );

    console.key_event(KeyCode::Function(1), true).unwrap();
    assert_eq!(sink.take(), vec!["injected", "two"]);
}

#[test]
fn alias_arguments_feed_expression_parameters() {
    let (mut console, _) = console();
    console.execute("alias twice [* 2 $1]").unwrap();
    assert_eq!(console.execute("twice [+ 3 4]").unwrap(), 14);
    assert_eq!(console.execute("twice (+ 1 1)").unwrap(), 4);
}
