use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, instrument};

use casetree::{Node, TreeConfig, TreeRoot};
use casetree_casestore::caseservice::from_addr;
use casetree_casestore::Case;

mod args;

use args::Args;

/// Writes the tree below the root depth-first, one node per line.
#[instrument(skip(root, out))]
async fn print_tree(
    root: &TreeRoot,
    max_depth: usize,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut stack: Vec<(Arc<Node>, usize)> = root
        .children()
        .await?
        .iter()
        .rev()
        .map(|n| (n.clone(), 1))
        .collect();

    while let Some((node, depth)) = stack.pop() {
        writeln!(out, "{}{}", "  ".repeat(depth - 1), node.display_name())?;
        if depth < max_depth && !node.is_leaf() {
            for child in node.expand().await?.iter().rev() {
                stack.push((child.clone(), depth + 1));
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let mut tracing_builder = casetree_tracing::TracingBuilder::default().level(args.log_level);
    if args.json_logs {
        tracing_builder = tracing_builder.enable_json();
    }
    tracing_builder.build()?;

    let mut config = match &args.config {
        Some(path) => TreeConfig::load(path).await?,
        None => TreeConfig::default(),
    };
    if let Some(grouping) = args.grouping {
        config.grouping = grouping;
    }

    let service = from_addr(&args.case_addr).await?;
    let case = Case::open(args.case_addr.clone(), service);
    info!(case.addr = %args.case_addr, grouping = ?config.grouping, "opened case");

    let root = TreeRoot::open(case.clone(), config)?;
    print_tree(&root, args.depth, &mut std::io::stdout().lock()).await?;

    case.close();
    Ok(())
}
