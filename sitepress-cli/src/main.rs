//! # sitepress CLI
//!
//! Command-line interface for managing and building sitepress projects.

mod commands;

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sitepress")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the project registry file
    #[arg(long, global = true, env = "SITEPRESS_REGISTRY")]
    registry: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage registered projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Build a project's static site into its public/ directory
    Build {
        /// Project name
        project: String,
    },

    /// List content files of a project
    Files {
        /// Project name
        project: String,
    },

    /// Print a content file
    Cat {
        /// Project name
        project: String,

        /// Path relative to the content directory
        path: String,
    },

    /// Write a content file from a file or stdin
    Write {
        /// Project name
        project: String,

        /// Path relative to the content directory
        path: String,

        /// Read contents from this file instead of stdin
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Read and save articles
    Article {
        #[command(subcommand)]
        command: ArticleCommands,
    },

    /// Serve the JSON API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: SocketAddr,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a new project and register it
    New {
        /// Project name (also the directory name)
        name: String,

        /// Parent directory (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// List registered projects
    List {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ArticleCommands {
    /// Show a parsed article
    Show {
        /// Project name
        project: String,

        /// Path relative to the content directory
        path: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Save an article; the file name is derived from the title
    Save {
        /// Project name
        project: String,

        /// Article title
        #[arg(long)]
        title: String,

        /// Publish date (RFC 3339 or YYYY-MM-DD); defaults to now
        #[arg(long)]
        date: Option<String>,

        /// Read the markdown body from this file instead of stdin
        #[arg(long)]
        body_file: Option<PathBuf>,

        /// Current path of an existing article
        #[arg(long)]
        original: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let registry = cli
        .registry
        .clone()
        .unwrap_or_else(sitepress_core::default_registry_path);

    match cli.command {
        Commands::Project { command } => match command {
            ProjectCommands::New { name, path } => {
                commands::new_project(&registry, &name, path.as_deref())
            }
            ProjectCommands::List { json } => commands::list_projects(&registry, json),
        },
        Commands::Build { project } => commands::build_project(&registry, &project),
        Commands::Files { project } => commands::list_files(&registry, &project),
        Commands::Cat { project, path } => commands::cat_file(&registry, &project, &path),
        Commands::Write {
            project,
            path,
            from,
        } => commands::write_file(&registry, &project, &path, from.as_deref()),
        Commands::Article { command } => match command {
            ArticleCommands::Show {
                project,
                path,
                json,
            } => commands::show_article(&registry, &project, &path, json),
            ArticleCommands::Save {
                project,
                title,
                date,
                body_file,
                original,
            } => commands::save_article(
                &registry,
                &project,
                commands::SaveArgs {
                    title,
                    date,
                    body_file,
                    original,
                },
            ),
        },
        Commands::Serve { addr } => commands::serve(&registry, addr).await,
    }
}
