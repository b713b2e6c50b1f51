//! Command dispatch: every command loads the definitions into a fresh tree

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::Home;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{NodeTree, Value, ValueChanged};
use crate::infrastructure::{load_home, InfraError};
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Tree) => cmd_tree(cli),
        Some(Commands::Leaves) => cmd_leaves(cli),
        Some(Commands::Get { path }) => cmd_get(cli, path),
        Some(Commands::Set { assignments, watch }) => cmd_set(cli, assignments, watch),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "pathtree", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, run with --help for usage".into(),
        )),
    }
}

fn project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) => Ok(dir.clone()),
        None => env::current_dir()
            .map_err(|e| CliError::from(InfraError::io("determine current directory", e))),
    }
}

/// Config file settings with command line overrides applied.
fn load_settings(cli: &Cli, project_dir: &Path) -> CliResult<Settings> {
    let mut settings = Settings::load(Some(project_dir))?;
    if let Some(separator) = cli.separator {
        settings.separator = separator;
    }
    if let Some(definitions) = &cli.definitions {
        settings.definitions = definitions.clone();
    }
    Ok(settings)
}

#[instrument(level = "debug", skip(cli))]
fn open_home(cli: &Cli) -> CliResult<Home> {
    let project_dir = project_dir(cli)?;
    let settings = load_settings(cli, &project_dir)?;
    let definitions = settings.definitions_path(&project_dir);
    debug!(definitions = %definitions.display(), "loading definitions");

    let (home, skipped) = load_home(&definitions, settings.separator)?;
    for path in &skipped {
        output::warning(&format!("skipped '{path}': type not declared"));
    }
    Ok(home)
}

fn parse_assignment(raw: &str) -> CliResult<(String, Value)> {
    let (path, value) = raw
        .split_once('=')
        .ok_or_else(|| CliError::InvalidArgs(format!("expected PATH=VALUE, got '{raw}'")))?;
    // Value parsing is infallible: anything that is not bool or number is text
    let value = value.parse::<Value>().unwrap_or_else(|never| match never {});
    Ok((path.to_string(), value))
}

#[instrument(level = "debug", skip(cli))]
fn cmd_tree(cli: &Cli) -> CliResult<()> {
    let home = open_home(cli)?;
    output::info(&home.tree().to_tree_string());
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn cmd_leaves(cli: &Cli) -> CliResult<()> {
    let home = open_home(cli)?;
    for (path, value) in leaf_entries(home.tree()) {
        match value {
            Some(value) => output::info(&format!("{path} = {value}")),
            None => output::unset(&path),
        }
    }
    Ok(())
}

/// Path and value of every leaf below the root; a bare root lists nothing.
fn leaf_entries(tree: &NodeTree<Value>) -> Vec<(String, Option<&Value>)> {
    tree.leaves(tree.root())
        .filter(|(_, node)| !node.is_root())
        .map(|(idx, node)| (tree.path(idx), node.value()))
        .collect()
}

#[instrument(level = "debug", skip(cli))]
fn cmd_get(cli: &Cli, path: &str) -> CliResult<()> {
    let mut home = open_home(cli)?;
    let node = home
        .get(path)
        .ok_or_else(|| CliError::NotFound(path.to_string()))?;
    match node.value() {
        Some(value) => output::info(value),
        None => output::unset(&node.path()),
    }
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn cmd_set(cli: &Cli, assignments: &[String], watch: &[String]) -> CliResult<()> {
    let assignments = assignments
        .iter()
        .map(|raw| parse_assignment(raw))
        .collect::<CliResult<Vec<_>>>()?;

    let mut home = open_home(cli)?;
    watch_and_apply(&mut home, watch, &assignments, |watcher, event| {
        output::notification(watcher, event)
    })
}

/// Subscribes `report` on every watched node, then applies the assignments
/// in order. Watchers are resolved before any value changes, so a missing
/// watched path leaves the tree untouched.
fn watch_and_apply<F>(
    home: &mut Home,
    watch: &[String],
    assignments: &[(String, Value)],
    report: F,
) -> CliResult<()>
where
    F: Fn(&str, &ValueChanged<Value>) + Clone + 'static,
{
    for path in watch {
        let mut node = home
            .get(path)
            .ok_or_else(|| CliError::NotFound(path.clone()))?;
        let label = node.path();
        let report = report.clone();
        node.subscribe(move |event| report(&label, event))?;
    }

    for (path, value) in assignments {
        let mut node = home
            .get(path)
            .ok_or_else(|| CliError::NotFound(path.clone()))?;
        node.set_value(value.clone())?;
        output::success(&format!("{path} = {value}"));
    }
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    let project_dir = project_dir(cli)?;
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli, &project_dir)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            output::header("Config files");
            match global_config_path() {
                Some(path) => output::detail(&describe_file("global", &path)),
                None => output::detail(&"global: <no config directory>"),
            }
            output::detail(&describe_file("local", &local_config_path(&project_dir)));
        }
    }
    Ok(())
}

fn describe_file(label: &str, path: &Path) -> String {
    let state = if path.exists() { "" } else { " (missing)" };
    format!("{label}: {}{state}", path.display())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::application::TypeInfo;

    fn light_home() -> Home {
        let mut home = Home::new();
        home.deftype("light", TypeInfo::described("Light switches"));
        home.define(["light/kitchen", "light/hall"]).unwrap();
        home
    }

    fn assignments(raw: &[&str]) -> Vec<(String, Value)> {
        raw.iter().map(|r| parse_assignment(r).unwrap()).collect()
    }

    #[test]
    fn given_assignment_when_parsing_then_splits_on_first_equals() {
        let (path, value) = parse_assignment("light/kitchen=true").unwrap();
        assert_eq!(path, "light/kitchen");
        assert_eq!(value, Value::Bool(true));

        let (path, value) = parse_assignment("scene/name=a=b").unwrap();
        assert_eq!(path, "scene/name");
        assert_eq!(value, Value::Text("a=b".into()));
    }

    #[test]
    fn given_assignment_without_equals_when_parsing_then_invalid_args() {
        assert!(matches!(
            parse_assignment("light/kitchen"),
            Err(CliError::InvalidArgs(_))
        ));
    }

    #[test]
    fn given_watched_nodes_when_applying_then_reports_bubbled_changes_nearest_first() {
        let mut home = light_home();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        watch_and_apply(
            &mut home,
            &["light".to_string(), "light/kitchen".to_string()],
            &assignments(&["light/kitchen=true", "light/hall=false"]),
            move |watcher, event| sink.borrow_mut().push(format!("[{watcher}] {event}")),
        )
        .unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                "[light/kitchen] light/kitchen = true",
                "[light] light/kitchen = true",
                "[light] light/hall = false",
            ]
        );
        assert_eq!(
            home.get("light/hall").unwrap().value(),
            Some(&Value::Bool(false))
        );
    }

    #[test]
    fn given_missing_watch_path_when_applying_then_not_found_and_nothing_set() {
        let mut home = light_home();

        let result = watch_and_apply(
            &mut home,
            &["light/attic".to_string()],
            &assignments(&["light/kitchen=1"]),
            |_, _| {},
        );

        assert!(matches!(result, Err(CliError::NotFound(p)) if p == "light/attic"));
        assert_eq!(home.get("light/kitchen").unwrap().value(), None);
    }

    #[test]
    fn given_assignment_to_container_when_applying_then_domain_error() {
        let mut home = light_home();

        let result = watch_and_apply(&mut home, &[], &assignments(&["light=on"]), |_, _| {});

        assert_eq!(result.unwrap_err().exit_code(), crate::exitcode::SOFTWARE);
    }

    #[test]
    fn given_bare_home_when_listing_leaves_then_root_is_skipped() {
        let home = Home::new();
        assert!(leaf_entries(home.tree()).is_empty());
    }

    #[test]
    fn given_defined_leaves_when_listing_then_paths_with_values() {
        let mut home = light_home();
        home.get("light/kitchen")
            .unwrap()
            .set_value(Value::Int(3))
            .unwrap();

        let entries = leaf_entries(home.tree());

        assert_eq!(
            entries,
            vec![
                ("light/kitchen".to_string(), Some(&Value::Int(3))),
                ("light/hall".to_string(), None),
            ]
        );
    }
}
