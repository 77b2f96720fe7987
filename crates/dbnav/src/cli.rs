use dbnav_core::{
    Catalog, CatalogItem, ConfigStore, NavError, NavigatorConfig, NodeId, RevealEvent, TreeView,
    VisibleRow, flatten,
};
use log::info;
use std::path::{Path, PathBuf};

const USAGE: &str = "usage: dbnav <catalog.json> [--config <path>] \
                     [--expand <id>]... [--collapse <id>]... [--toggle <id>]...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Expand,
    Collapse,
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    action: Action,
    id: NodeId,
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    catalog: PathBuf,
    config: Option<PathBuf>,
    steps: Vec<Step>,
}

pub fn run(args: &[String]) -> i32 {
    let args = match parse_args(args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            return 1;
        }
    };

    match execute(&args) {
        Ok(output) => {
            print!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    }
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut catalog = None;
    let mut config = None;
    let mut steps = Vec::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let action = match arg.as_str() {
            "--expand" => Action::Expand,
            "--collapse" => Action::Collapse,
            "--toggle" => Action::Toggle,
            "--config" => {
                let path = iter.next().ok_or("--config requires a path")?;
                config = Some(PathBuf::from(path));
                continue;
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {}", flag)),
            path => {
                if catalog.is_some() {
                    return Err(format!("Unexpected argument: {}", path));
                }
                catalog = Some(PathBuf::from(path));
                continue;
            }
        };

        let value = iter
            .next()
            .ok_or_else(|| format!("{} requires a node id", arg))?;
        let id = value.parse::<NodeId>().map_err(|e| e.to_string())?;
        steps.push(Step { action, id });
    }

    let catalog = catalog.ok_or("Missing catalog path")?;

    Ok(Args {
        catalog,
        config,
        steps,
    })
}

fn load_config(path: Option<&Path>) -> Result<NavigatorConfig, NavError> {
    let store = match path {
        Some(path) => ConfigStore::from_path(path),
        None => ConfigStore::new()?,
    };

    store.load()
}

fn execute(args: &Args) -> Result<String, NavError> {
    let config = load_config(args.config.as_deref())?;
    let catalog = Catalog::load(&args.catalog)?;

    let nodes = catalog.tree_nodes();
    let flat = flatten(&nodes);
    let mut view = TreeView::from_config(&config);

    for step in &args.steps {
        let mut reveals = Vec::new();

        let outcome = match step.action {
            Action::Expand => view.expand(&flat, step.id, |event| reveals.push(event)),
            Action::Toggle => view.toggle(&flat, step.id, |event| reveals.push(event)),
            Action::Collapse => view.collapse(&flat, step.id),
        };

        log::debug!(
            "{:?} {}: {} expanded",
            step.action,
            step.id,
            outcome.expanded.len()
        );

        for event in reveals {
            report_reveal(&catalog, &event, &config)?;
        }
    }

    Ok(render(&view.rows(&flat)))
}

fn report_reveal(
    catalog: &Catalog,
    event: &RevealEvent<'_, CatalogItem>,
    config: &NavigatorConfig,
) -> Result<(), NavError> {
    let origin = if event.restored { " (restored)" } else { "" };

    match catalog.plan_load(event, config.load_policy)? {
        Some(request) => info!(
            "Revealed {} {}{}, loading {}",
            event.id, event.node.name, origin, request
        ),
        None => info!("Revealed {} {}{}", event.id, event.node.name, origin),
    }

    Ok(())
}

fn render(rows: &[VisibleRow<'_, CatalogItem>]) -> String {
    let mut output = String::new();

    for row in rows {
        let marker = match (row.expandable, row.expanded) {
            (false, _) => "  ",
            (true, true) => "v ",
            (true, false) => "> ",
        };

        output.push_str(&format!(
            "{}{}{} [{}]\n",
            " ".repeat(row.indent),
            marker,
            row.name(),
            row.id
        ));

        if row.show_empty_state {
            output.push_str(&format!("{}    (empty)\n", " ".repeat(row.indent)));
        }
    }

    output
}
