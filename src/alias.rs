use crate::console::Console;
use crate::error::DispatchError;

/// A named macro replayed through the console whenever its name is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    name: String,
    persist: bool,
    action: String,
}

impl Alias {
    /// Creates a persisted alias, as the `alias` console command does.
    pub fn new(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            persist: true,
            action: action.into(),
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

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn set_action(&mut self, action: impl Into<String>) {
        self.action = action.into();
    }

    /// Runs the action through `console` with `args` bound to `$1`, `$2`, ….
    ///
    /// Each argument stays a single word however much text it holds. The
    /// action is read from this alias value, so redefining the alias while it
    /// runs only affects later invocations.
    pub fn execute(
        &self,
        console: &mut Console,
        args: &[String],
        is_down: bool,
    ) -> Result<i32, DispatchError> {
        log::debug!("expanding alias {} with {} argument(s)", self.name, args.len());
        console.execute_alias(&self.name, &self.action, args, is_down)
    }
}
