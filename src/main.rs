use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use atlasctl::api::{ApiClient, ApiKey, Cluster};
use atlasctl::config::Config;
use atlasctl::identifier::{validate_project_id, ClusterId, ClusterRef};
use atlasctl::topology::TopologyCache;

/// Manage MongoDB Atlas organizations, projects and clusters
#[derive(Parser, Debug)]
#[command(name = "atlasctl", version, about, long_about = None)]
struct Args {
    /// Atlas programmatic public key
    #[arg(long, global = true)]
    public_key: Option<String>,

    /// Atlas programmatic private key
    #[arg(long, global = true)]
    private_key: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the organization, its projects and their clusters
    List,
    /// List the projects in the organization
    Projects,
    /// List clusters, optionally restricted to one project
    Clusters {
        /// 24-character hexadecimal project id
        project_id: Option<String>,
    },
    /// Fetch one cluster document
    Get {
        /// Cluster reference: <project-id>:<name> or a unique bare <name>
        cluster: String,
        /// Write the document to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Create a cluster from a JSON config file
    Create {
        /// Fully qualified reference: <project-id>:<name>
        cluster: String,
        /// Cluster configuration (server-owned fields are stripped)
        #[arg(long)]
        config: PathBuf,
    },
    /// Delete a cluster
    Delete {
        cluster: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Pause clusters (a paused cluster is left alone)
    Pause {
        #[arg(required = true)]
        clusters: Vec<String>,
    },
    /// Resume clusters (a running cluster is left alone)
    Resume {
        #[arg(required = true)]
        clusters: Vec<String>,
    },
    /// Create a project in the organization
    CreateProject { name: String },
    /// Delete a project
    DeleteProject { project_id: String },
    /// Store the API key pair in the config file
    Configure,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) {
    let Some(tracing_level) = level.to_tracing_level() else {
        return;
    };

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.log_level);

    let mut config = Config::load();

    // configure stores keys; it must work before any key pair resolves
    if let Command::Configure = args.command {
        return configure(&mut config, args.public_key, args.private_key);
    }

    let key = config.resolve_keys(args.public_key.clone(), args.private_key.clone())?;
    let client = ApiClient::new(key)?;

    match args.command {
        Command::List => list_summary(&client).await,
        Command::Projects => list_projects(&client).await,
        Command::Clusters { project_id } => list_clusters(&client, project_id).await,
        Command::Get { cluster, output } => get_cluster(&client, &cluster, output).await,
        Command::Create { cluster, config } => create_cluster(&client, &cluster, &config).await,
        Command::Delete { cluster, yes } => delete_cluster(&client, &cluster, yes).await,
        Command::Pause { clusters } => pause_clusters(&client, &clusters).await,
        Command::Resume { clusters } => resume_clusters(&client, &clusters).await,
        Command::CreateProject { name } => create_project(&client, &name).await,
        Command::DeleteProject { project_id } => delete_project(&client, &project_id).await,
        Command::Configure => unreachable!("handled before key resolution"),
    }
}

fn configure(
    config: &mut Config,
    public_key: Option<String>,
    private_key: Option<String>,
) -> Result<()> {
    let (Some(public_key), Some(private_key)) = (public_key, private_key) else {
        bail!("configure needs both --public-key and --private-key");
    };
    config.set_keys(&public_key, &private_key)?;
    println!("Stored API keys: {}", ApiKey::new(public_key, private_key));
    Ok(())
}

fn print_cluster_line(cluster: &Cluster) {
    println!("    Cluster  {:<28} {}", cluster.name, cluster.status_label());
}

async fn list_summary(client: &ApiClient) -> Result<()> {
    let org = client.organization().await?;
    let topology = TopologyCache::populate(client).await?;

    println!("Organization {} {}", org.id, org.name);
    for project in topology.projects() {
        println!("  Project  {} {}", project.id, project.name);
        for cluster in topology.clusters_in(&project.id) {
            print_cluster_line(cluster);
        }
    }
    Ok(())
}

async fn list_projects(client: &ApiClient) -> Result<()> {
    for project in client.projects().await? {
        println!("{} {}", project.id, project.name);
    }
    Ok(())
}

async fn list_clusters(client: &ApiClient, project_id: Option<String>) -> Result<()> {
    match project_id {
        Some(project_id) => {
            validate_project_id(&project_id)?;
            for cluster in client.clusters(&project_id).await? {
                print_cluster_line(&cluster);
            }
        }
        None => {
            let topology = TopologyCache::populate(client).await?;
            for cluster in topology.all_clusters() {
                println!("{:<54} {}", cluster.qualified_name(), cluster.status_label());
            }
        }
    }
    Ok(())
}

/// Parse the reference and, when it is a bare name, resolve it against a
/// fresh topology snapshot. Fully qualified references are still confirmed
/// against the snapshot so typos fail with a named error instead of a 404.
async fn resolve(client: &ApiClient, raw: &str) -> Result<ClusterId> {
    let reference = ClusterRef::parse(raw)?;
    let topology = TopologyCache::populate(client).await?;
    Ok(reference.resolve(&topology)?)
}

async fn get_cluster(client: &ApiClient, raw: &str, output: Option<PathBuf>) -> Result<()> {
    let id = resolve(client, raw).await?;
    let cluster = client.cluster(&id.project_id, &id.name).await?;
    let document = serde_json::to_string_pretty(&cluster)?;

    match output {
        Some(path) => {
            std::fs::write(&path, document)
                .with_context(|| format!("cannot write {}", path.display()))?;
            println!("Cluster config written to '{}'", path.display());
        }
        None => println!("{document}"),
    }
    Ok(())
}

async fn create_cluster(client: &ApiClient, raw: &str, config_path: &PathBuf) -> Result<()> {
    let reference = ClusterRef::parse(raw)?;
    let Some(project_id) = reference.project_id else {
        bail!("create needs a fully qualified reference: <project-id>:<name>");
    };

    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("cannot read {}", config_path.display()))?;
    let document: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", config_path.display()))?;

    let mut config = ApiClient::strip_cluster_config(&document);
    config["name"] = serde_json::Value::String(reference.name.clone());

    println!("Creating cluster {}:{}", project_id, reference.name);
    let cluster = client.create_cluster(&project_id, &config).await?;
    println!("Cluster {} is {}", cluster.qualified_name(), cluster.status_label());
    Ok(())
}

async fn delete_cluster(client: &ApiClient, raw: &str, yes: bool) -> Result<()> {
    let id = resolve(client, raw).await?;

    if !yes && !prompt(&format!("Delete cluster {id}, are you sure: "))? {
        println!("delete aborted");
        return Ok(());
    }

    client.delete_cluster(&id.project_id, &id.name).await?;
    println!("Deleting cluster {id}");
    Ok(())
}

async fn pause_clusters(client: &ApiClient, raws: &[String]) -> Result<()> {
    let topology = TopologyCache::populate(client).await?;
    for raw in raws {
        let id = ClusterRef::resolve_str(raw, &topology)?;
        let cluster = client.cluster(&id.project_id, &id.name).await?;
        if cluster.is_paused() {
            println!("Cluster '{id}' is already paused");
            continue;
        }
        println!("Trying to pause: '{id}'");
        client.pause(&id.project_id, &id.name).await?;
        println!("Paused cluster '{id}' at {}", Local::now().format("%H:%M:%S"));
    }
    Ok(())
}

async fn resume_clusters(client: &ApiClient, raws: &[String]) -> Result<()> {
    let topology = TopologyCache::populate(client).await?;
    for raw in raws {
        let id = ClusterRef::resolve_str(raw, &topology)?;
        let cluster = client.cluster(&id.project_id, &id.name).await?;
        if !cluster.is_paused() {
            println!("Cluster '{id}' is already running");
            continue;
        }
        println!("Trying to resume: '{id}'");
        client.resume(&id.project_id, &id.name).await?;
        println!("Resumed cluster '{id}' at {}", Local::now().format("%H:%M:%S"));
    }
    Ok(())
}

async fn create_project(client: &ApiClient, name: &str) -> Result<()> {
    let org = client.organization().await?;
    let project = client.create_project(&org.id, name).await?;
    println!("Created project {} {}", project.id, project.name);
    Ok(())
}

async fn delete_project(client: &ApiClient, project_id: &str) -> Result<()> {
    validate_project_id(project_id)?;
    client.delete_project(project_id).await?;
    println!("Deleted project {project_id}");
    Ok(())
}

fn prompt(message: &str) -> Result<bool> {
    print!("{message}");
    std::io::stdout().flush()?;
    let mut reply = String::new();
    std::io::stdin().read_line(&mut reply)?;
    Ok(reply.trim().eq_ignore_ascii_case("y"))
}
