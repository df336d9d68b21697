use std::collections::HashMap;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::LazyLock;
use std::thread;
use std::time::{Duration, Instant};
use log::{debug, error, info, warn};
use regex::Regex;
use thiserror::Error;
use crate::catalog::Catalog;
use crate::config::LaunchConfig;
use crate::model::{LaunchAttempt, LaunchOutcome};

// Two or more scheme characters, so `C:\...` stays a path.
static URI_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]+:").expect("static regex"));

// sh: 126 not executable, 127 not found. cmd: 9009 not recognized.
const NOT_RUNNABLE_CODES: [i32; 3] = [126, 127, 9009];

#[derive(Debug, Error)]
pub enum OpenError {
    /// The only failure that hands the token over to the shell.
    #[error("`{0}` is not a URI, a path or an executable on PATH")]
    Unresolvable(String),
    #[error("no opener configured")]
    NoOpener,
    #[error("could not start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("no shell configured")]
    NoShell,
    #[error("could not start `{shell}`: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: io::Error,
    },
    #[error("could not wait on `{shell}`: {source}")]
    Wait {
        shell: String,
        #[source]
        source: io::Error,
    },
    #[error("`{shell}` could not run the command ({status})")]
    NotRunnable { shell: String, status: ExitStatus },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Everything a launch can report back to the user. None of these are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("Please select a setting from the list first.")]
    NoSelection,
    #[error("No command is registered for '{0}'.")]
    TokenNotFound(String),
    #[error("The setting could not be launched. (Error: {reason})")]
    LaunchFailed { token: String, reason: String },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl LaunchError {
    pub fn severity(&self) -> Severity {
        match self {
            LaunchError::NoSelection => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            LaunchError::NoSelection => "Warning",
            LaunchError::TokenNotFound(_) => "Error",
            LaunchError::LaunchFailed { .. } => "Launch Error",
            LaunchError::Unexpected(_) => "General Error",
        }
    }
}

/// The two OS facilities the controller needs.
pub trait LaunchSurface {
    /// Open the token the way the desktop shell opens a double-clicked item.
    fn open_as_default_handler(&mut self, token: &str) -> Result<(), OpenError>;
    /// Run the token as a command line through the command interpreter.
    fn run_through_shell(&mut self, token: &str) -> Result<(), ShellError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Uri,
    Executable(PathBuf),
    Path(PathBuf),
}

fn resolve(token: &str) -> Option<Target> {
    if URI_SCHEME.is_match(token) {
        return Some(Target::Uri);
    }
    if !token.chars().any(char::is_whitespace) {
        if let Ok(path) = which::which(token) {
            return Some(Target::Executable(path));
        }
    }
    let path = Path::new(token);
    if path.exists() {
        return Some(Target::Path(path.to_path_buf()));
    }
    None
}

fn is_directly_spawnable(path: &Path) -> bool {
    if cfg!(target_os = "windows") {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("exe") || ext.eq_ignore_ascii_case("com"))
    } else {
        true
    }
}

pub struct SystemLaunchSurface {
    opener: Vec<String>,
    shell: Vec<String>,
    grace: Duration,
    env: HashMap<String, String>,
}

impl SystemLaunchSurface {
    pub fn new(config: &LaunchConfig) -> Self {
        Self {
            opener: config.opener.clone(),
            shell: config.shell.clone(),
            grace: Duration::from_millis(config.shell_grace_ms),
            env: config.env.clone(),
        }
    }

    fn command(&self, program: impl AsRef<std::ffi::OsStr>) -> Command {
        let mut command = Command::new(program);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .envs(&self.env);
        command
    }

    /// Hands the child to a thread that waits on it, so it never lingers as a zombie.
    fn reap(mut child: Child) {
        thread::spawn(move || {
            if let Err(err) = child.wait() {
                warn!("Failed to reap child {}: {}", child.id(), err);
            }
        });
    }

    fn watch(&self, child: &mut Child) -> io::Result<Option<ExitStatus>> {
        let deadline = Instant::now() + self.grace;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Default for SystemLaunchSurface {
    fn default() -> Self {
        Self::new(&LaunchConfig::default())
    }
}

impl LaunchSurface for SystemLaunchSurface {
    fn open_as_default_handler(&mut self, token: &str) -> Result<(), OpenError> {
        let target = resolve(token).ok_or_else(|| OpenError::Unresolvable(token.to_string()))?;
        debug!("Resolved '{}' to {:?}", token, target);

        let (program, mut command) = match &target {
            Target::Executable(path) if is_directly_spawnable(path) => {
                (path.display().to_string(), self.command(path))
            }
            _ => {
                let (opener, flags) = self.opener.split_first().ok_or(OpenError::NoOpener)?;
                let mut command = self.command(opener);
                command.args(flags);
                match &target {
                    Target::Executable(path) | Target::Path(path) => command.arg(path),
                    Target::Uri => command.arg(token),
                };
                (opener.clone(), command)
            }
        };

        let child = command
            .spawn()
            .map_err(|source| OpenError::Spawn { program, source })?;
        Self::reap(child);
        Ok(())
    }

    fn run_through_shell(&mut self, token: &str) -> Result<(), ShellError> {
        let (shell, flags) = self.shell.split_first().ok_or(ShellError::NoShell)?;
        let mut command = self.command(shell);
        command.args(flags).arg(token);

        let mut child = command.spawn().map_err(|source| ShellError::Spawn {
            shell: shell.clone(),
            source,
        })?;

        if self.grace.is_zero() {
            Self::reap(child);
            return Ok(());
        }
        let status = self.watch(&mut child).map_err(|source| ShellError::Wait {
            shell: shell.clone(),
            source,
        })?;
        match status {
            Some(status) if status.code().is_some_and(|c| NOT_RUNNABLE_CODES.contains(&c)) => {
                Err(ShellError::NotRunnable { shell: shell.clone(), status })
            }
            Some(_) => Ok(()),
            None => {
                Self::reap(child);
                Ok(())
            }
        }
    }
}

/// Runs one launch attempt: resolve the label, try the default handler, and
/// fall back to the shell only when the token could not be resolved.
pub struct LaunchController<S = SystemLaunchSurface> {
    surface: S,
}

impl<S: LaunchSurface> LaunchController<S> {
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn launch(&mut self, catalog: &Catalog, selection: Option<&str>) -> Result<LaunchAttempt, LaunchError> {
        let surface = &mut self.surface;
        let result = panic::catch_unwind(AssertUnwindSafe(|| attempt(surface, catalog, selection)))
            .unwrap_or_else(|payload| Err(LaunchError::Unexpected(panic_message(&*payload))));

        match &result {
            Ok(attempt) => info!("Launched '{}' via {:?}", attempt.label, attempt.outcome),
            Err(LaunchError::NoSelection) => debug!("Launch requested without a selection"),
            Err(err) => error!("{}: {}", err.title(), err),
        }
        result
    }
}

fn attempt<S: LaunchSurface>(
    surface: &mut S,
    catalog: &Catalog,
    selection: Option<&str>,
) -> Result<LaunchAttempt, LaunchError> {
    let label = selection.ok_or(LaunchError::NoSelection)?;
    let token = catalog
        .token_for(label)
        .map_err(|_| LaunchError::TokenNotFound(label.to_string()))?;

    info!("Attempting to execute command: '{}'", token);
    let outcome = match surface.open_as_default_handler(token) {
        Ok(()) => LaunchOutcome::Opened,
        Err(OpenError::Unresolvable(_)) => {
            warn!("'{}' is not directly openable, running it through the shell", token);
            surface
                .run_through_shell(token)
                .map_err(|err| LaunchError::LaunchFailed {
                    token: token.to_string(),
                    reason: err.to_string(),
                })?;
            LaunchOutcome::ShellFallback
        }
        Err(err) => return Err(LaunchError::Unexpected(err.to_string())),
    };

    Ok(LaunchAttempt {
        label: label.to_string(),
        token: token.to_string(),
        outcome,
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "launch aborted".to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::fake::{FakeSurface, OpenBehaviour};
    use super::*;
    use crate::model::CatalogEntry;

    fn catalog() -> Catalog {
        Catalog::from_entries([
            CatalogEntry::new("Calculator", "calc"),
            CatalogEntry::new("Notepad", "notepad"),
        ])
    }

    #[test]
    fn no_selection_makes_no_calls() {
        let mut controller = LaunchController::new(FakeSurface::new(OpenBehaviour::Accept, true));
        let result = controller.launch(&catalog(), None);

        assert_eq!(result, Err(LaunchError::NoSelection));
        assert_eq!(result.unwrap_err().severity(), Severity::Warning);
        assert_eq!(controller.surface().calls(), 0);
    }

    #[test]
    fn unknown_label_is_token_not_found() {
        let mut controller = LaunchController::new(FakeSurface::new(OpenBehaviour::Accept, true));
        let result = controller.launch(&catalog(), Some("Paint"));

        assert_eq!(result, Err(LaunchError::TokenNotFound("Paint".to_string())));
        assert_eq!(controller.surface().calls(), 0);
    }

    #[test]
    fn direct_open_success_skips_fallback() {
        let mut controller = LaunchController::new(FakeSurface::new(OpenBehaviour::Accept, true));
        let attempt = controller.launch(&catalog(), Some("Calculator")).unwrap();

        assert_eq!(attempt.outcome, LaunchOutcome::Opened);
        assert_eq!(attempt.token, "calc");
        assert_eq!(controller.surface().opened, ["calc"]);
        assert!(controller.surface().shelled.is_empty());
    }

    #[test]
    fn unresolvable_token_falls_back_once() {
        let mut controller = LaunchController::new(FakeSurface::new(OpenBehaviour::Unresolvable, true));
        let attempt = controller.launch(&catalog(), Some("Notepad")).unwrap();

        assert_eq!(attempt.outcome, LaunchOutcome::ShellFallback);
        assert_eq!(controller.surface().shelled, ["notepad"]);
    }

    #[test]
    fn failed_fallback_keeps_the_reason() {
        let mut controller = LaunchController::new(FakeSurface::new(OpenBehaviour::Unresolvable, false));
        let err = controller.launch(&catalog(), Some("Notepad")).unwrap_err();

        assert_eq!(controller.surface().shelled.len(), 1);
        match &err {
            LaunchError::LaunchFailed { token, reason } => {
                assert_eq!(token, "notepad");
                assert!(reason.contains("sh: not found"), "reason was {reason}");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.to_string().contains("sh: not found"));
        assert_eq!(err.title(), "Launch Error");
    }

    #[test]
    fn other_open_failures_do_not_fall_back() {
        let mut controller = LaunchController::new(FakeSurface::new(OpenBehaviour::SpawnError, true));
        let err = controller.launch(&catalog(), Some("Calculator")).unwrap_err();

        assert!(matches!(err, LaunchError::Unexpected(ref d) if d.contains("permission denied")));
        assert!(controller.surface().shelled.is_empty());
    }

    #[test]
    fn panics_are_reported_not_propagated() {
        let mut controller = LaunchController::new(FakeSurface::new(OpenBehaviour::Panic, true));
        let err = controller.launch(&catalog(), Some("Calculator")).unwrap_err();

        assert_eq!(err, LaunchError::Unexpected("opener blew up".to_string()));
        assert_eq!(err.severity(), Severity::Error);
    }

    #[test]
    fn uri_tokens_resolve_without_lookup() {
        assert_eq!(resolve("ms-settings:display"), Some(Target::Uri));
        assert_eq!(resolve("x-apple.systempreferences:com.apple.Sound"), Some(Target::Uri));
        assert_eq!(resolve("file:///etc"), Some(Target::Uri));
    }

    #[test]
    fn command_lines_and_unknown_names_are_unresolvable() {
        assert_eq!(resolve("control admintools"), None);
        assert_eq!(resolve("definitely-not-a-real-settings-tool"), None);
        assert!(matches!(
            SystemLaunchSurface::default().open_as_default_handler("definitely-not-a-real-settings-tool"),
            Err(OpenError::Unresolvable(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn executables_on_path_resolve() {
        assert!(matches!(resolve("sh"), Some(Target::Executable(_))));
        // PATH lookup runs before the existing-path check.
        assert!(matches!(resolve("/bin/sh"), Some(Target::Executable(_))));
    }

    #[cfg(unix)]
    #[test]
    fn shell_reports_missing_commands() {
        let mut surface = SystemLaunchSurface::new(&LaunchConfig {
            shell_grace_ms: 2000,
            ..LaunchConfig::default()
        });

        assert!(surface.run_through_shell("exit 0").is_ok());
        assert!(matches!(
            surface.run_through_shell("definitely-not-a-real-settings-tool"),
            Err(ShellError::NotRunnable { .. })
        ));
    }

    #[cfg(unix)]
    fn surface_with(opener: &[&str]) -> SystemLaunchSurface {
        SystemLaunchSurface::new(&LaunchConfig {
            opener: opener.iter().map(|s| s.to_string()).collect(),
            shell_grace_ms: 2000,
            ..LaunchConfig::default()
        })
    }

    #[cfg(unix)]
    #[test]
    fn existing_paths_go_to_the_opener() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("with space");
        std::fs::create_dir(&path).unwrap();
        let token = path.to_str().unwrap();

        assert_eq!(resolve(token), Some(Target::Path(path.clone())));
        assert!(surface_with(&["true"]).open_as_default_handler(token).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn uris_go_to_the_opener() {
        let mut surface = surface_with(&["true"]);
        assert!(surface.open_as_default_handler("settings:display").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn missing_opener_is_unexpected_and_skips_the_shell() {
        let catalog = Catalog::from_entries([CatalogEntry::new("Display", "settings:display")]);
        let mut controller = LaunchController::new(surface_with(&["definitely-missing-opener"]));

        let err = controller.launch(&catalog, Some("Display")).unwrap_err();
        assert!(
            matches!(err, LaunchError::Unexpected(ref d) if d.contains("definitely-missing-opener")),
            "got {err:?}"
        );
    }

    #[test]
    fn empty_opener_is_unexpected() {
        let mut controller = LaunchController::new(SystemLaunchSurface::new(&LaunchConfig {
            opener: Vec::new(),
            ..LaunchConfig::default()
        }));
        let catalog = Catalog::from_entries([CatalogEntry::new("Display", "settings:display")]);

        let err = controller.launch(&catalog, Some("Display")).unwrap_err();
        assert_eq!(err, LaunchError::Unexpected("no opener configured".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn launch_env_reaches_the_child() {
        let check = r#"test "$PANEL_LAUNCHER_CHECK" = applied || exit 127"#;
        assert!(matches!(
            surface_with(&["true"]).run_through_shell(check),
            Err(ShellError::NotRunnable { .. })
        ));

        let mut surface = SystemLaunchSurface::new(&LaunchConfig {
            shell_grace_ms: 2000,
            env: HashMap::from([("PANEL_LAUNCHER_CHECK".to_string(), "applied".to_string())]),
            ..LaunchConfig::default()
        });
        assert!(surface.run_through_shell(check).is_ok());
    }

    #[cfg(target_os = "linux")]
    fn zombie_children(comm: &str) -> usize {
        let me = std::process::id().to_string();
        let Ok(procs) = std::fs::read_dir("/proc") else { return 0 };
        procs
            .flatten()
            .filter_map(|entry| std::fs::read_to_string(entry.path().join("stat")).ok())
            .filter(|stat| {
                // pid (comm) state ppid ...
                let Some((head, tail)) = stat.rsplit_once(')') else { return false };
                let mut fields = tail.split_whitespace();
                let state = fields.next();
                let ppid = fields.next();
                head.ends_with(&format!("({comm}")) && state == Some("Z") && ppid == Some(me.as_str())
            })
            .count()
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn launched_children_are_reaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings folder");
        std::fs::create_dir(&path).unwrap();
        let token = path.to_str().unwrap().to_string();
        let mut opener = surface_with(&["true"]);
        let mut quick_shell = SystemLaunchSurface::new(&LaunchConfig {
            shell: vec!["true".to_string()],
            shell_grace_ms: 0,
            ..LaunchConfig::default()
        });

        for _ in 0..5 {
            opener.open_as_default_handler(&token).unwrap();
            quick_shell.run_through_shell("ignored").unwrap();
        }
        thread::sleep(Duration::from_millis(300));

        assert_eq!(zombie_children("true"), 0);
    }

    #[test]
    fn empty_shell_is_an_error() {
        let mut surface = SystemLaunchSurface::new(&LaunchConfig {
            shell: Vec::new(),
            ..LaunchConfig::default()
        });
        assert!(matches!(surface.run_through_shell("calc"), Err(ShellError::NoShell)));
    }
}
