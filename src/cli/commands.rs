//! CLI command implementations
//!
//! Every command resolves snippet names through the repository, works on
//! the typed plugin descriptors and talks to the daemon only through
//! `DaemonControl`. Collaborators are passed in an `Environment` so the
//! commands run unchanged against fakes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::Builder;

use crate::config::{normalize_name, ConfigError, MainConfig, DEFAULT_SNIPPETS};
use crate::console::{Color, Console};
use crate::drbd::{Drbdsetup, StatusSource};
use crate::evict::{EvictReport, EvictSettings, Evictor, InterruptFlag, Sleeper, ThreadSleeper};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::plugin::{template, PluginDescriptor, PluginKind};
use crate::snippets::{self, extension, SnippetError, SnippetListing, SnippetRepository};
use crate::status::{StatusOptions, StatusReporter};
use crate::systemd::{DaemonControl, ServiceManager, Systemctl};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{ask, view_file, write_json, Editor, Prompt, StdinPrompt, SystemEditor};

/// Start entries shown per resource by `ls`
const LS_START_ENTRIES: usize = 3;

/// Leader of the error lines written above an invalid snippet
const EDIT_HEADER: &str = "#|";

/// Collaborators of the commands
#[derive(Debug)]
pub struct Environment<'a> {
    pub console: &'a Console,
    pub manager: &'a dyn ServiceManager,
    pub status: &'a dyn StatusSource,
    pub editor: &'a dyn Editor,
    pub prompt: &'a dyn Prompt,
    pub interrupt: &'a InterruptFlag,
    pub sleeper: &'a dyn Sleeper,
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    Logger::set_threshold(cli.log_level);

    let console = Console::stdout(cli.color.enabled());
    let manager = Systemctl::new(console.colors());
    let interrupt = InterruptFlag::new();
    let env = Environment {
        console: &console,
        manager: &manager,
        status: &Drbdsetup,
        editor: &SystemEditor,
        prompt: &StdinPrompt,
        interrupt: &interrupt,
        sleeper: &ThreadSleeper,
    };

    run_command(&env, &cli.config, cli.command())
}

/// Run the appropriate command based on CLI args
pub fn run_command(env: &Environment<'_>, config_path: &Path, cmd: Command) -> CliResult<()> {
    let config = load_config(env, config_path)?;

    match cmd {
        Command::Status {
            verbose,
            json,
            resources,
            configs,
        } => {
            let options = StatusOptions { verbose, resources };
            status(env, &config, &options, json, &normalized(&configs))
        }
        Command::Ls { disabled, configs } => ls(env, &config, disabled, &normalized(&configs)),
        Command::Cat { configs } => cat(env, &config, &normalized(&configs)),
        Command::Disable { now, configs } => {
            disable(env, &config, now, &normalized(&configs)).map(|_| ())
        }
        Command::Enable { configs } => enable(env, &config, &normalized(&configs)).map(|_| ()),
        Command::Restart {
            with_targets,
            configs,
        } => restart(env, &config, with_targets, &normalized(&configs)).map(|_| ()),
        Command::Edit {
            kind,
            disabled,
            name,
        } => edit(env, &config, kind, disabled, normalize_name(&name)),
        Command::Rm {
            force,
            disabled,
            configs,
        } => remove(env, &config, force, disabled, &normalized(&configs)).map(|_| ()),
        Command::Evict {
            delay,
            force,
            configs,
        } => evict(env, &config, delay, force, &normalized(&configs)).map(|_| ()),
    }
}

/// Load the main config, offering to add a missing `snippets` entry
pub fn load_config(env: &Environment<'_>, path: &Path) -> CliResult<MainConfig> {
    let config = match MainConfig::load(path) {
        Ok(config) => config,
        Err(ConfigError::SnippetsMissing(_)) => {
            env.console.println(&format!(
                "Your config ('{}') does not contain a \"snippets\" entry",
                path.display()
            ));
            let question = format!(
                "Add a 'snippets = \"{}\"' entry to '{}'?",
                DEFAULT_SNIPPETS,
                path.display()
            );
            if !ask(env.prompt, &question, true)? {
                return Err(CliError::config_error(
                    "this tool needs a valid snippets entry in the main config file",
                ));
            }
            MainConfig::add_snippets_entry(path)?;
            MainConfig::load(path)?
        }
        Err(e) => return Err(e.into()),
    };
    config.ensure_snippets_dir()?;
    Ok(config)
}

fn normalized(configs: &[String]) -> Vec<String> {
    configs
        .iter()
        .map(|c| normalize_name(c).to_string())
        .collect()
}

/// Files of `listing`, warning the operator about every missing one
fn present(env: &Environment<'_>, listing: SnippetListing) -> Vec<PathBuf> {
    for path in &listing.missing {
        env.console
            .warn(&format!("{} does not exist, ignoring", path.display()));
    }
    listing.files
}

fn daemon<'a>(env: &'a Environment<'_>) -> DaemonControl<'a> {
    DaemonControl::new(env.manager, env.console)
}

/// Show the status of enabled plugins (and plugins in the main config)
pub fn status(
    env: &Environment<'_>,
    config: &MainConfig,
    options: &StatusOptions,
    json: bool,
    configs: &[String],
) -> CliResult<()> {
    let repo = SnippetRepository::from_config(config);
    let mut files = present(env, repo.enabled(configs)?);
    files.push(config.path.clone());
    let plugins = snippets::load(&files)?;

    let daemon = daemon(env);
    let reporter = StatusReporter::new(env.console, &daemon, env.status, options.clone());
    if json {
        write_json(env.console, &reporter.report(&plugins))
    } else {
        reporter.show(&plugins);
        Ok(())
    }
}

/// List snippets and their plugins
pub fn ls(
    env: &Environment<'_>,
    config: &MainConfig,
    disabled: bool,
    configs: &[String],
) -> CliResult<()> {
    let repo = SnippetRepository::from_config(config);
    let files = if disabled {
        present(env, repo.disabled(configs)?)
    } else {
        let mut files = present(env, repo.enabled(configs)?);
        files.push(config.path.clone());
        files
    };

    let color = if disabled { Color::Red } else { Color::Green };
    for plugin in snippets::load(&files)? {
        env.console
            .println(&plugin.source_file().display().to_string());
        env.console.println_colored(&plugin.header(), color);

        if let Some(promoter) = plugin.as_promoter() {
            for (name, spec) in &promoter.resources {
                let mut start: Vec<&str> = spec
                    .start
                    .iter()
                    .take(LS_START_ENTRIES)
                    .map(|s| s.as_str())
                    .collect();
                if spec.start.len() > LS_START_ENTRIES {
                    start.push("...");
                }
                env.console
                    .println(&format!("  {}: {}", name, start.join(", ")));
            }
        }
    }
    Ok(())
}

/// Print enabled snippets
pub fn cat(env: &Environment<'_>, config: &MainConfig, configs: &[String]) -> CliResult<()> {
    let repo = SnippetRepository::from_config(config);
    for file in present(env, repo.enabled(configs)?) {
        eprintln!("{}:", file.display());
        view_file(&file)?;
    }
    Ok(())
}

/// Disable snippets; with `now` also stop the targets of their promoters
pub fn disable(
    env: &Environment<'_>,
    config: &MainConfig,
    now: bool,
    configs: &[String],
) -> CliResult<usize> {
    let repo = SnippetRepository::from_config(config);
    let files = present(env, repo.enabled(configs)?);

    let mut disabled = Vec::with_capacity(files.len());
    for file in &files {
        disabled.push(repo.disable_file(file)?);
    }
    if disabled.is_empty() {
        return Ok(0);
    }

    // reload first, a stop while the promoter is still loaded starts the target again
    let daemon = daemon(env);
    daemon.reload_unless_autoload()?;

    if now {
        for plugin in snippets::load(&disabled)? {
            for target in plugin.targets() {
                daemon.stop_target(&target)?;
            }
        }
    }
    Ok(disabled.len())
}

/// Enable disabled snippets, never overwriting an enabled one
pub fn enable(env: &Environment<'_>, config: &MainConfig, configs: &[String]) -> CliResult<usize> {
    let repo = SnippetRepository::from_config(config);
    let files = present(env, repo.disabled(configs)?);

    let mut enabled = 0;
    for file in &files {
        match repo.enable_file(file) {
            Ok(_) => enabled += 1,
            Err(e @ SnippetError::AlreadyExists(_)) => {
                env.console.warn(&format!("{}, not enabling '{}'", e, file.display()));
            }
            Err(e) => return Err(e.into()),
        }
    }

    if enabled > 0 {
        daemon(env).reload_unless_autoload()?;
    }
    Ok(enabled)
}

/// Restart the daemon, or the plugins of the given snippets
pub fn restart(
    env: &Environment<'_>,
    config: &MainConfig,
    with_targets: bool,
    configs: &[String],
) -> CliResult<usize> {
    let daemon = daemon(env);
    if configs.is_empty() {
        daemon.restart_service()?;
        return Ok(0);
    }

    let repo = SnippetRepository::from_config(config);
    let files = present(env, repo.enabled(configs)?);
    if files.is_empty() {
        return Ok(0);
    }
    restart_files(env, &repo, &daemon, &files)?;

    if with_targets {
        for plugin in snippets::load(&files)? {
            for target in plugin.targets() {
                daemon.restart_target(&target)?;
            }
        }
    }
    Ok(files.len())
}

/// Disable, reload, enable, reload: the daemon drops and re-creates the plugins
fn restart_files(
    env: &Environment<'_>,
    repo: &SnippetRepository,
    daemon: &DaemonControl<'_>,
    files: &[PathBuf],
) -> CliResult<()> {
    let mut disabled = Vec::with_capacity(files.len());
    for file in files {
        env.console.println(&format!("Restarting {}", file.display()));
        disabled.push(repo.disable_file(file)?);
    }
    daemon.reload_unless_autoload()?;
    repo.enable(&disabled)?;
    daemon.reload_unless_autoload()?;
    Ok(())
}

/// Snippet text below the `#|` error header
fn strip_edit_header(content: &str) -> &str {
    let mut rest = content;
    while rest.starts_with(EDIT_HEADER) {
        rest = match rest.find('\n') {
            Some(end) => &rest[end + 1..],
            None => "",
        };
    }
    rest
}

/// Problem with an edited snippet, if any
fn check_edited(content: &str, expected: Option<PluginKind>, path: &Path) -> Option<String> {
    let plugins = match PluginDescriptor::from_toml(content, path) {
        Ok(plugins) => plugins,
        Err(e) => return Some(e.to_string()),
    };
    if plugins.len() != 1 {
        return Some(format!(
            "expected exactly one plugin, found {}",
            plugins.len()
        ));
    }
    match expected {
        Some(kind) if plugins[0].kind() != kind => Some(format!(
            "expected a {} plugin, found a {} plugin",
            kind,
            plugins[0].kind()
        )),
        _ => None,
    }
}

/// Kind of the single plugin in an existing snippet
fn existing_kind(content: &str, path: &Path) -> Option<PluginKind> {
    match PluginDescriptor::from_toml(content, path) {
        Ok(plugins) if plugins.len() == 1 => Some(plugins[0].kind()),
        _ => None,
    }
}

/// Edit (or create) one snippet
pub fn edit(
    env: &Environment<'_>,
    config: &MainConfig,
    kind: PluginKind,
    disabled: bool,
    name: &str,
) -> CliResult<()> {
    let repo = SnippetRepository::from_config(config);
    let enabled_file = repo.snippet_path(name, false);
    let disabled_file = repo.snippet_path(name, true);
    let final_file = if disabled || (!enabled_file.exists() && disabled_file.exists()) {
        disabled_file
    } else {
        enabled_file
    };

    let existed = final_file.exists();
    let (original, expected) = if existed {
        let content =
            fs::read_to_string(&final_file).map_err(|e| SnippetError::io(&final_file, e))?;
        let expected = existing_kind(&content, &final_file);
        (content, expected)
    } else {
        (template(kind, name), Some(kind))
    };

    let mut scratch = Builder::new()
        .prefix(&format!(".{}.", name))
        .suffix(".edit")
        .tempfile_in(repo.dir())?;
    scratch.write_all(original.as_bytes())?;
    scratch.flush()?;

    let content = loop {
        env.editor.edit(scratch.path())?;
        let edited = fs::read_to_string(scratch.path())?;
        let body = strip_edit_header(&edited);

        if body.trim().is_empty() {
            return Err(CliError::edit_aborted("empty snippet, nothing saved"));
        }
        if body == original {
            env.console.info("No changes, nothing to do");
            return Ok(());
        }

        match check_edited(body, expected, &final_file) {
            None => break body.to_string(),
            Some(problem) => {
                let mut annotated: String = problem
                    .lines()
                    .map(|line| format!("{} {}\n", EDIT_HEADER, line))
                    .collect();
                annotated.push_str(&format!(
                    "{} fix the snippet, or delete everything to abort\n",
                    EDIT_HEADER
                ));
                annotated.push_str(body);
                fs::write(scratch.path(), annotated)?;
            }
        }
    };

    fs::write(scratch.path(), &content)?;
    scratch.persist(&final_file).map_err(|e| e.error)?;
    log_event_with_fields(
        Event::SnippetPersisted,
        &[("path", &final_file.display().to_string())],
    );

    if final_file == repo.snippet_path(name, true) {
        env.console.println(&format!(
            "{} Disabled file ({}) is not enabled automatically, use the \"enable\" subcommand",
            env.console.paint("NOTE:", Color::Yellow),
            final_file.display()
        ));
        return Ok(());
    }

    let daemon = daemon(env);
    if !daemon.autoload_active() {
        if existed {
            restart_files(env, &repo, &daemon, std::slice::from_ref(&final_file))?;
        } else {
            daemon.reload()?;
        }
    }

    env.console.info(&format!(
        "Please make sure to copy '{}' to all other cluster nodes and execute \"systemctl reload drbd-reactor.service\"",
        final_file.display()
    ));
    Ok(())
}

/// Remove snippets after confirmation
pub fn remove(
    env: &Environment<'_>,
    config: &MainConfig,
    force: bool,
    disabled: bool,
    configs: &[String],
) -> CliResult<usize> {
    let repo = SnippetRepository::from_config(config);
    let files = present(env, repo.list_files(configs, &extension(disabled))?);

    let mut removed = 0;
    for file in &files {
        let question = format!("Remove '{}'?", file.display());
        if force || ask(env.prompt, &question, false)? {
            repo.remove(file)?;
            removed += 1;
        }
    }

    if removed > 0 {
        daemon(env).reload_unless_autoload()?;
    }
    Ok(removed)
}

/// Evict the promoter resources of the given snippets
pub fn evict(
    env: &Environment<'_>,
    config: &MainConfig,
    delay: u32,
    force: bool,
    configs: &[String],
) -> CliResult<Vec<EvictReport>> {
    let settings = EvictSettings::new(delay, force)?;
    let repo = SnippetRepository::from_config(config);
    let files = present(env, repo.enabled(configs)?);

    let daemon = daemon(env);
    let evictor = Evictor::new(
        &repo,
        &daemon,
        env.console,
        env.status,
        env.interrupt,
        settings,
    )
    .with_sleeper(env.sleeper);

    Ok(evictor.run(&files)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_edit_header() {
        assert_eq!(strip_edit_header("#| bad\n#| again\n[[umh]]\n"), "[[umh]]\n");
        assert_eq!(strip_edit_header("[[umh]]\n#| kept\n"), "[[umh]]\n#| kept\n");
        assert_eq!(strip_edit_header("#| only"), "");
    }

    #[test]
    fn test_check_edited() {
        let path = Path::new("web.toml");
        assert_eq!(check_edited("[[umh]]\n", Some(PluginKind::Umh), path), None);
        assert_eq!(check_edited("[[umh]]\n", None, path), None);
        assert!(check_edited("[[umh]]\n[[debugger]]\n", None, path)
            .unwrap()
            .contains("exactly one"));
        assert!(check_edited("[[umh]]\n", Some(PluginKind::Promoter), path)
            .unwrap()
            .contains("promoter"));
        assert!(check_edited("[[umh\n", None, path).is_some());
    }

    #[test]
    fn test_normalized() {
        let configs = vec!["a.toml".to_string(), "b.toml.disabled".to_string(), "c".to_string()];
        assert_eq!(normalized(&configs), vec!["a", "b", "c"]);
    }
}
