//! CLI for skill-tree-gen: generate a skill tree once, serve the HTTP API, or
//! re-linearize a saved tree.
//!
//! Loads API settings via `skill_tree_gen::Config`; node system prompt from
//! `--prompt`, PROMPT_PATH, or the built-in default.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skill_tree::{
    format_tree, linearize, read_tree, write_graph, write_tree, write_typescript, ChatOpenAI,
    LlmClient,
};
use skill_tree_gen::{run_server, Config, ExpandArgs, Pipeline};

#[derive(Parser)]
#[command(name = "skill-tree-gen")]
#[command(about = "Generate a learning skill tree from a broad subject using an LLM (OpenAI)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Expand a subject into a skill tree and write the React Flow graph
    Generate {
        /// Broad course subject (e.g. "Data Structures and Algorithms")
        #[arg(default_value = "Data Structures and Algorithms")]
        subject: String,

        #[command(flatten)]
        expand: ExpandArgs,

        /// Graph output path ({nodes, edges})
        #[arg(short, long, default_value = "react_flow_skill_tree.json")]
        out: PathBuf,

        /// Also write the nested tree here
        #[arg(long)]
        tree_out: Option<PathBuf>,

        /// Also write a TypeScript module with initialNodes / initialEdges here
        #[arg(long)]
        ts_out: Option<PathBuf>,
    },
    /// Serve POST /generate-skill-tree
    Serve {
        #[arg(long, default_value_t = 8000)]
        port: u16,

        #[command(flatten)]
        expand: ExpandArgs,
    },
    /// Linearize a saved tree (no LLM calls)
    Linearize {
        /// Nested tree JSON, as written by --tree-out
        tree: PathBuf,

        #[arg(long, short, default_value_t = skill_tree_gen::config::DEFAULT_DEPTH)]
        depth: u32,

        #[arg(short, long, default_value = "react_flow_skill_tree.json")]
        out: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "skill_tree=info,skill_tree_gen=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_pipeline(cfg: &Config) -> Arc<Pipeline> {
    let llm: Arc<dyn LlmClient> = Arc::new(ChatOpenAI::new(cfg.llm.clone()));
    Arc::new(Pipeline::new(llm, cfg.node_prompt.clone(), cfg.options.clone()))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            subject,
            expand,
            out,
            tree_out,
            ts_out,
        } => {
            let cfg = Config::from_env_and_args(&expand)?;
            let pipeline = build_pipeline(&cfg);
            let output = pipeline.run(&subject).await?;

            println!("Subject: {}", subject);
            println!("Model: {}", cfg.llm.model);
            println!("Starting topic: {}", output.root_topic);
            println!("Depth: {}", cfg.options.depth);
            println!(
                "Nodes: {}  Edges: {}  Oracle calls: {}",
                output.graph.nodes.len(),
                output.graph.edges.len(),
                output.stats.oracle_calls
            );
            println!();
            println!("{}", format_tree(&output.tree));

            write_graph(&out, &output.graph)?;
            println!("\nGraph written to {}", out.display());
            if let Some(path) = tree_out {
                write_tree(&path, &output.tree)?;
                println!("Tree written to {}", path.display());
            }
            if let Some(path) = ts_out {
                write_typescript(&path, &output.graph)?;
                println!("TypeScript written to {}", path.display());
            }
        }
        Command::Serve { port, expand } => {
            let cfg = Config::from_env_and_args(&expand)?;
            let pipeline = build_pipeline(&cfg);
            println!("Starting server on port {}", port);
            run_server(port, pipeline).await?;
        }
        Command::Linearize { tree, depth, out } => {
            let root = read_tree(&tree)?;
            let graph = linearize(&root, depth);
            write_graph(&out, &graph)?;
            println!(
                "Nodes: {}  Edges: {}  written to {}",
                graph.nodes.len(),
                graph.edges.len(),
                out.display()
            );
        }
    }

    Ok(())
}
