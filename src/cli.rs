use clap::{Parser, Subcommand, ValueEnum};

/// Knowledge-graph retrieval for immigration guidance documents
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Build a knowledge graph from guidance documents and query it by graph traversal"
)]
pub struct Cli {
    /// Path to the SQLite graph store
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract entities and relationships from documents into the graph
    Extract {
        /// A text file or a directory of .txt/.md files to extract
        input: String,

        /// Skip the LLM-backed semantic extraction pass
        #[arg(long)]
        no_semantic: bool,
    },

    /// Query the graph and rank documents by traversal
    Query {
        /// Natural language query (e.g., "what documents does a Skilled Worker visa need")
        query: String,

        /// Maximum multi-hop traversal depth
        #[arg(long, short = 'd')]
        max_depth: Option<usize>,

        /// Number of ranked documents to return
        #[arg(long, short = 'k')]
        top_k: Option<usize>,

        /// Output format
        #[arg(long, short, default_value = "text")]
        format: OutputFormat,
    },

    /// Show graph statistics
    Stats {
        /// Output format
        #[arg(long, short, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one entity with its relationships
    Entity {
        /// Entity id, e.g. visa_type_1a2b3c4d5e6f
        id: String,
    },

    /// Check graph integrity
    Health,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
