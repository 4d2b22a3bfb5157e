//! Koala Selector CLI
//!
//! Runs a selector against a JSON tree fixture and prints what it matched.

mod fixture;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use env_logger::Env;
use koala_dom::{DomTree, NodeId};
use koala_select::{Engine, EngineConfig, FastPath};
use owo_colors::OwoColorize;

use fixture::Fixture;

/// Koala Selector: evaluate selectors against tree fixtures
#[derive(Parser, Debug)]
#[command(name = "koala-select")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Every list item in the document
    koala-select -t page.json 'ul > li'

    # Positional selectors under an element
    koala-select -t page.json -c main 'p:first, li:odd'

    # Does the element #q match?
    koala-select -t page.json -c q --matches 'input:focus'

    # General path only, JSON output, trace logging
    RUST_LOG=koala=trace koala-select -t page.json --config general.json --json 'div p'
"#)]
struct Cli {
    /// Selector to evaluate
    #[arg(value_name = "SELECTOR")]
    selector: String,

    /// JSON tree fixture to load
    #[arg(short, long, value_name = "FILE")]
    tree: PathBuf,

    /// Evaluate under the element with this id instead of the document
    #[arg(short, long, value_name = "ID")]
    context: Option<String>,

    /// Engine configuration as JSON (kebab-case keys)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Test whether the context element itself matches
    #[arg(short, long)]
    matches: bool,

    /// Print matches as a JSON array
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let fixture: Fixture = read_json(&cli.tree)?;
    let tree = fixture.build();
    let config = match &cli.config {
        Some(path) => read_json(path)?,
        None => EngineConfig::default(),
    };
    log::debug!(target: "koala::cli", "loaded {} nodes, {config:?}", tree.len());

    let context = match &cli.context {
        Some(id) => tree
            .get_element_by_id(id)
            .ok_or_else(|| anyhow!("no element with id `{id}`"))?,
        None => tree.root(),
    };

    let engine = Engine::new(&tree)
        .with_config(config)
        .with_native(&FastPath);

    if cli.matches {
        if engine.matches_selector(context, &cli.selector)? {
            println!("{} {}", "match".green().bold(), describe(&tree, context));
            return Ok(());
        }
        println!("{} {}", "no match".red().bold(), describe(&tree, context));
        std::process::exit(1);
    }

    let found = engine.select(&cli.selector, context)?;
    if cli.json {
        let paths: Vec<String> = found.iter().map(|&node| describe(&tree, node)).collect();
        println!("{}", serde_json::to_string_pretty(&paths)?);
        return Ok(());
    }

    for &node in &found {
        println!("{}", describe(&tree, node).green());
    }
    println!("{}", format!("{} match(es)", found.len()).bold());
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let source =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("parsing {}", path.display()))
}

/// `html > body > div#main.box`, or `#document` for the root.
fn describe(tree: &DomTree, node: NodeId) -> String {
    let mut chain: Vec<NodeId> = tree.ancestors(node).collect();
    chain.reverse();
    chain.push(node);

    let steps: Vec<String> = chain
        .into_iter()
        .filter_map(|id| tree.as_element(id))
        .map(|element| {
            let mut step = element.tag_name.clone();
            if let Some(id) = element.id() {
                step.push('#');
                step.push_str(id);
            }
            for class in element.classes() {
                step.push('.');
                step.push_str(class);
            }
            step
        })
        .collect();

    if steps.is_empty() {
        "#document".to_string()
    } else {
        steps.join(" > ")
    }
}
