//! campus - browse campus hierarchy tables from the command line.
//!
//! Usage: campus <command> <file.csv> [args]
//!
//! Every command loads the CSV file into a fresh store first. Logs go to
//! stderr so command output can be piped.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use campus_hierarchy::{
    Entity, EntityKind, HierarchyConfig, HierarchyStore, HierarchyTree, ImportReport, NodeId,
    SearchResults, Table, TableFormat, ViewScope,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "campus")]
#[command(about = "Browse a department, building, floor and room hierarchy")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a table and report what was loaded
    Import { file: PathBuf },

    /// Convert a table to either format
    Export {
        file: PathBuf,
        /// Output format: standard or simple
        #[arg(long, default_value = "standard")]
        format: TableFormat,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search names, descriptions, room types and facilities
    Search { file: PathBuf, query: String },

    /// Print the hierarchy as an indented tree
    Tree { file: PathBuf },

    /// Print the graph view of one level as JSON
    View {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Scope::Departments)]
        scope: Scope,
        /// Department, building or floor the view is centred on
        #[arg(long)]
        id: Option<String>,
        /// Entity to highlight
        #[arg(long)]
        highlight: Option<String>,
    },

    /// Show one entity with its ancestry, totals and children
    Show {
        file: PathBuf,
        kind: EntityKind,
        id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scope {
    Departments,
    Buildings,
    Floors,
    Rooms,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => HierarchyConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => HierarchyConfig::default(),
    };

    match cli.command {
        Command::Import { file } => {
            let (_, report) = load_store(&file, config)?;
            print!("{}", render_report(&report)?);
        }
        Command::Export {
            file,
            format,
            output,
        } => {
            let (store, _) = load_store(&file, config)?;
            let table = store.export(format);
            match output {
                Some(path) => table
                    .write_path(&path)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => table.write_csv(std::io::stdout().lock())?,
            }
        }
        Command::Search { file, query } => {
            if !config.search.accepts(&query) {
                bail!(
                    "search query must be at least {} characters",
                    config.search.min_query_len
                );
            }
            let (store, _) = load_store(&file, config)?;
            print!("{}", render_search(&store.search(&query), &query)?);
        }
        Command::Tree { file } => {
            let (store, _) = load_store(&file, config)?;
            print!("{}", render_tree(store.tree())?);
        }
        Command::View {
            file,
            scope,
            id,
            highlight,
        } => {
            let scope = view_scope(scope, id)?;
            let (store, _) = load_store(&file, config)?;
            let mut view = store.graph_view(&scope);
            if let Some(selected) = highlight {
                view.highlight(&selected);
            }
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Show { file, kind, id } => {
            let (store, _) = load_store(&file, config)?;
            print!("{}", render_show(&store, kind, &id)?);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_store(file: &Path, config: HierarchyConfig) -> Result<(HierarchyStore, ImportReport)> {
    let table =
        Table::from_path(file).with_context(|| format!("failed to read {}", file.display()))?;
    let mut store = HierarchyStore::with_config(config);
    let report = store
        .import(&table)
        .with_context(|| format!("failed to import {}", file.display()))?;
    debug!("Loaded {} as {} format", file.display(), report.format);
    Ok((store, report))
}

fn view_scope(scope: Scope, id: Option<String>) -> Result<ViewScope> {
    let scope = match (scope, id) {
        (Scope::Departments, _) => ViewScope::Departments,
        (Scope::Buildings, Some(department_id)) => ViewScope::Buildings { department_id },
        (Scope::Floors, Some(building_id)) => ViewScope::Floors { building_id },
        (Scope::Rooms, Some(floor_id)) => ViewScope::Rooms { floor_id },
        (other, None) => bail!("--id is required for the {other:?} scope"),
    };
    Ok(scope)
}

fn render_report(report: &ImportReport) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Imported {} rows ({} format)", report.rows, report.format)?;
    write!(out, "{}", report.stats)?;

    if !report.dangling.is_empty() {
        writeln!(out, "Reattached references:")?;
        for dangling in &report.dangling {
            writeln!(
                out,
                "  row {}: {} {} -> {}",
                dangling.row,
                dangling.kind,
                dangling.id,
                serde_json::to_string(&dangling.attached)?
            )?;
        }
    }
    if !report.skipped.is_empty() {
        writeln!(out, "Skipped rows:")?;
        for skipped in &report.skipped {
            writeln!(out, "  row {}: unknown type '{}'", skipped.row, skipped.entity_type)?;
        }
    }
    Ok(out)
}

fn render_search(results: &SearchResults<'_>, query: &str) -> Result<String> {
    let mut out = String::new();
    if results.is_empty() {
        writeln!(out, "No matches for '{query}'")?;
        return Ok(out);
    }
    for (kind, matches) in results.iter() {
        if matches.is_empty() {
            continue;
        }
        writeln!(out, "{} ({})", kind.plural(), matches.len())?;
        for entity in matches {
            writeln!(out, "  {}  {}", entity.id(), entity.name())?;
        }
    }
    Ok(out)
}

fn render_tree(tree: &HierarchyTree) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Campus")?;
    for child in tree.root().children() {
        render_node(tree, *child, 1, &mut out)?;
    }
    Ok(out)
}

fn render_node(tree: &HierarchyTree, node: NodeId, depth: usize, out: &mut String) -> Result<()> {
    let Some(entity) = tree.entity(node) else {
        return Ok(());
    };
    writeln!(
        out,
        "{}{} {}  {}",
        "  ".repeat(depth),
        entity.kind(),
        entity.id(),
        entity.name()
    )?;
    if let Some(n) = tree.node(node) {
        for child in n.children() {
            render_node(tree, *child, depth + 1, out)?;
        }
    }
    Ok(())
}

fn render_show(store: &HierarchyStore, kind: EntityKind, id: &str) -> Result<String> {
    let entity = store.require(kind, id)?;
    let mut out = String::new();

    let path: Vec<&str> = store
        .ancestry(kind, id)
        .into_iter()
        .map(Entity::name)
        .collect();
    writeln!(out, "{}", path.join(" > "))?;
    writeln!(out, "{}", serde_json::to_string_pretty(entity)?)?;

    let summary = store
        .summary(kind, id)
        .filter(|_| kind != EntityKind::Room);
    if let Some(summary) = summary {
        writeln!(
            out,
            "Contains {} buildings, {} floors, {} rooms (capacity {})",
            summary.buildings, summary.floors, summary.rooms, summary.total_capacity
        )?;
    }

    let children = store.children(kind, id);
    if let Some(child_kind) = kind.child_kind() {
        writeln!(out, "{} ({})", child_kind.plural(), children.len())?;
        for child in children {
            writeln!(out, "  {}  {}", child.id(), child.name())?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_store() -> HierarchyStore {
        let table = Table::from_csv_str(
            "type,id,name,building_id,description,x,y\n\
             department,D1,CS,,,,\n\
             building,B1,Tech Hall,D1,,,\n\
             floor,F1,Floor 1,B1,,,\n\
             room,R1,Lab A,F1,,,\n\
             lift,L1,Lift,F1,,,\n",
        )
        .unwrap();
        let mut store = HierarchyStore::new();
        store.import(&table).unwrap();
        store
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from(["campus", "-v", "search", "campus.csv", "lab"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Search { ref query, .. } if query == "lab"));

        let cli = Cli::try_parse_from(["campus", "show", "campus.csv", "Room", "R1"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Show {
                kind: EntityKind::Room,
                ..
            }
        ));
    }

    #[test]
    fn test_view_scope_requires_id() {
        assert_eq!(
            view_scope(Scope::Departments, None).unwrap(),
            ViewScope::Departments
        );
        assert_eq!(
            view_scope(Scope::Rooms, Some("F1".to_string())).unwrap(),
            ViewScope::Rooms {
                floor_id: "F1".to_string()
            }
        );
        assert!(view_scope(Scope::Floors, None).is_err());
    }

    #[test]
    fn test_render_tree() {
        let store = sample_store();
        assert_eq!(
            render_tree(store.tree()).unwrap(),
            "Campus\n\
             \x20 department D1  CS\n\
             \x20   building B1  Tech Hall\n\
             \x20     floor F1  Floor 1\n\
             \x20       room R1  Lab A\n"
        );
    }

    #[test]
    fn test_render_report_lists_skipped_rows() {
        let table = Table::from_csv_str(
            "type,id,name,building_id,description,x,y\nlift,L1,Lift,,,,\n",
        )
        .unwrap();
        let mut store = HierarchyStore::new();
        let report = store.import(&table).unwrap();
        let rendered = render_report(&report).unwrap();
        assert!(rendered.contains("row 1: unknown type 'lift'"));
    }

    #[test]
    fn test_render_search() {
        let store = sample_store();
        let rendered = render_search(&store.search("lab"), "lab").unwrap();
        assert_eq!(rendered, "rooms (1)\n  R1  Lab A\n");
        let rendered = render_search(&store.search("zzz"), "zzz").unwrap();
        assert_eq!(rendered, "No matches for 'zzz'\n");
    }

    #[test]
    fn test_render_show() {
        let store = sample_store();
        let rendered = render_show(&store, EntityKind::Building, "B1").unwrap();
        assert!(rendered.starts_with("CS > Tech Hall\n"));
        assert!(rendered.contains("Contains 0 buildings, 1 floors, 1 rooms (capacity 40)"));
        assert!(rendered.ends_with("floors (1)\n  F1  Floor 1\n"));
        assert!(render_show(&store, EntityKind::Room, "R9").is_err());
    }
}
