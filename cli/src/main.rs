use std::io::Write;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use console::style;
use fieldline::{Direction, LineageError, LineageGraph, PrintNode, Recipe};

/// Prints column lineage or impact trees for a JSON recipe.
#[derive(Parser, Debug, Clone)]
#[command(name = "lineage")]
struct Args {
    /// Recipe file with `columns` and `steps`.
    recipe: Utf8PathBuf,

    /// `lineage` walks back to the sources, `impact` forward to the effects.
    #[arg(short, long, default_value = "lineage")]
    direction: Direction,

    /// Columns to query, the recipe's final columns when omitted.
    #[arg(short, long, conflicts_with = "all")]
    column: Vec<String>,

    /// Query every column the recipe ever touched.
    #[arg(long)]
    all: bool,

    /// Fail on malformed `all columns` expressions.
    #[arg(long)]
    strict: bool,

    /// Print the whole graph as a mermaid flowchart instead.
    #[arg(long, conflicts_with = "json")]
    mermaid: bool,

    /// Print the recorded chains as JSON instead.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    fieldline::init_logging()?;

    let args = Args::parse();

    let text = std::fs::read_to_string(&args.recipe)
        .with_context(|| format!("Couldn't read recipe {}", args.recipe))?;
    let recipe = Recipe::from_json(&text)?;

    let config = LineageGraph::config().strict_wildcards(args.strict);
    let graph = recipe
        .lineage(config)
        .with_context(|| format!("Couldn't build lineage for {}", args.recipe))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.mermaid {
        write!(out, "{}", graph.mermaid())?;
        return Ok(());
    }

    if args.json {
        writeln!(out, "{}", graph.to_json()?)?;
        return Ok(());
    }

    let trees: Vec<(String, Result<PrintNode, LineageError>)> = if args.all {
        graph
            .trees(args.direction)?
            .into_iter()
            .map(|(column, tree)| (column.to_string(), Ok(tree)))
            .collect()
    } else {
        let columns = match args.column.is_empty() {
            true => graph.end_columns().iter().cloned().collect(),
            false => args.column.clone(),
        };

        columns
            .into_iter()
            .map(|column| {
                let tree = graph.tree(&column, args.direction);
                (column, tree)
            })
            .collect()
    };

    for (column, tree) in trees {
        match tree {
            Ok(tree) => {
                writeln!(out, "{} {}", style(args.direction).cyan(), style(&column).bold())?;
                writeln!(out, "{tree}")?;
            }
            Err(err) => tracing::error!("{}", err),
        }
    }

    Ok(())
}
