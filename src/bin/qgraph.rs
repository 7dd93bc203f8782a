//! qgraph CLI: compile and answer query graphs.
//!
//! Usage:
//!   qgraph compile <question.json> [--config path]
//!   qgraph answer <question.json> --results <fixture.json> [--config path]
//!   qgraph schema --results <fixture.json> [--ontology parents.yaml] [--templates]
//!   qgraph summary --results <fixture.json>
//!   qgraph node <category> <curie> --results <fixture.json>
//!   qgraph hops <source_category> <target_category> <curie> --results <fixture.json>
//!   qgraph run <query> --results <fixture.json>

use clap::{Parser, Subcommand};
use qgraph::{Config, FixtureGateway, QueryGraph, QuestionAnswerer, StaticOntology};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "qgraph",
    version,
    about = "Compile query graphs to Cypher and map results into answers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to YAML config (default: ~/.config/qgraph/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the query text for a question
    Compile {
        /// Question JSON: a query graph, optionally wrapped in message/query_graph
        question: PathBuf,
    },
    /// Answer a question from recorded result sets
    Answer {
        /// Question JSON: a query graph, optionally wrapped in message/query_graph
        question: PathBuf,
        /// Recorded result set(s) to replay
        #[arg(long)]
        results: PathBuf,
    },
    /// Summarise the graph schema from a recorded schema result set
    Schema {
        /// Recorded result set(s) to replay
        #[arg(long)]
        results: PathBuf,
        /// Concept parent table used to collapse labels to leaves
        #[arg(long)]
        ontology: Option<PathBuf>,
        /// Print question templates instead of the schema
        #[arg(long)]
        templates: bool,
    },
    /// Count nodes per label set and edges per target label set
    Summary {
        /// Recorded result set(s) to replay
        #[arg(long)]
        results: PathBuf,
    },
    /// Look up a node by category and identifier
    Node {
        category: String,
        curie: String,
        /// Recorded result set(s) to replay
        #[arg(long)]
        results: PathBuf,
    },
    /// List edges between a node and neighbours of one category
    Hops {
        source_category: String,
        target_category: String,
        curie: String,
        /// Recorded result set(s) to replay
        #[arg(long)]
        results: PathBuf,
    },
    /// Execute query text as given
    Run {
        query: String,
        /// Recorded result set(s) to replay
        #[arg(long)]
        results: PathBuf,
    },
}

/// A lookup run against replayed results
enum Lookup {
    Summary,
    Node { category: String, curie: String },
    Hops { source: String, target: String, curie: String },
    Run { query: String },
}

fn init_logging(config: &Config) -> Result<(), String> {
    let level = config.log_level().map_err(|e| e.to_string())?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn read_question(path: &Path) -> Result<QueryGraph, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    let request: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| format!("'{}' is not JSON: {}", path.display(), e))?;
    QueryGraph::from_request(&request).map_err(|e| e.to_string())
}

fn open_answerer(results: &Path, config: &Config) -> Result<QuestionAnswerer, String> {
    let gateway = FixtureGateway::from_file(results)
        .map_err(|e| format!("cannot load results '{}': {}", results.display(), e))?;
    Ok(QuestionAnswerer::new(Arc::new(gateway), config.answer_options()))
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_compile(question: &Path, config: &Config) -> i32 {
    let graph = match read_question(question) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match qgraph::compile_query(&graph, &config.answer_options().compile) {
        Ok(query) => {
            println!("{}", query);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_answer(question: &Path, results: &Path, config: &Config) -> i32 {
    let graph = match read_question(question) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let answerer = match open_answerer(results, config) {
        Ok(answerer) => answerer,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let code = match answerer.answer(&graph).await {
        Ok(response) => print_json(&response),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };
    if let Err(e) = answerer.shutdown().await {
        eprintln!("Warning: {}", e);
    }
    code
}

async fn cmd_schema(
    results: &Path,
    ontology: Option<&Path>,
    templates: bool,
    config: &Config,
) -> i32 {
    let mut answerer = match open_answerer(results, config) {
        Ok(answerer) => answerer,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if let Some(path) = ontology {
        match StaticOntology::from_file(path) {
            Ok(ontology) => answerer = answerer.with_ontology(Arc::new(ontology)),
            Err(e) => {
                eprintln!("Error: cannot load ontology '{}': {}", path.display(), e);
                return 1;
            }
        }
    }

    let code = if templates {
        match answerer.question_templates().await {
            Ok(templates) => print_json(&templates),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        }
    } else {
        match answerer.schema().await {
            Ok(schema) => print_json(&schema),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        }
    };
    if let Err(e) = answerer.shutdown().await {
        eprintln!("Warning: {}", e);
    }
    code
}

async fn cmd_lookup(lookup: Lookup, results: &Path, config: &Config) -> i32 {
    let answerer = match open_answerer(results, config) {
        Ok(answerer) => answerer,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let printed = match lookup {
        Lookup::Summary => answerer.summary().await.map(|summary| print_json(&summary)),
        Lookup::Node { category, curie } => answerer
            .node(&category, &curie)
            .await
            .map(|nodes| print_json(&nodes)),
        Lookup::Hops {
            source,
            target,
            curie,
        } => answerer
            .one_hops(&source, &target, &curie)
            .await
            .map(|triplets| print_json(&triplets)),
        Lookup::Run { query } => answerer
            .run_query(&query)
            .await
            .map(|rows| print_json(&rows))
            .map_err(Into::into),
    };
    let code = printed.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        1
    });
    if let Err(e) = answerer.shutdown().await {
        eprintln!("Warning: {}", e);
    }
    code
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    if let Err(e) = init_logging(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    let code = match cli.command {
        Commands::Compile { question } => cmd_compile(&question, &config),
        Commands::Answer { question, results } => cmd_answer(&question, &results, &config).await,
        Commands::Schema {
            results,
            ontology,
            templates,
        } => cmd_schema(&results, ontology.as_deref(), templates, &config).await,
        Commands::Summary { results } => cmd_lookup(Lookup::Summary, &results, &config).await,
        Commands::Node {
            category,
            curie,
            results,
        } => cmd_lookup(Lookup::Node { category, curie }, &results, &config).await,
        Commands::Hops {
            source_category,
            target_category,
            curie,
            results,
        } => {
            let lookup = Lookup::Hops {
                source: source_category,
                target: target_category,
                curie,
            };
            cmd_lookup(lookup, &results, &config).await
        }
        Commands::Run { query, results } => {
            cmd_lookup(Lookup::Run { query }, &results, &config).await
        }
    };
    std::process::exit(code);
}
