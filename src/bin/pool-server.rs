use std::env::current_dir;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use log::{error, info};

use jobpool::{HttpServer, Result, ThreadPool};

const DEFAULT_ADDR: &str = "127.0.0.1:7878";

#[derive(Parser)]
#[command(
    name = "pool-server",
    version,
    about = "An HTTP file server backed by a worker thread pool"
)]
struct Cli {
    /// Server listening address
    #[arg(long, default_value = DEFAULT_ADDR, value_name = "IP-PORT")]
    addr: SocketAddr,

    /// Number of worker threads [default: number of CPUs]
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Directory to serve files from [default: current directory]
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Stop accepting after this many connections and shut down gracefully
    #[arg(long, value_name = "N")]
    max_connections: Option<usize>,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let threads = cli.threads.unwrap_or_else(num_cpus::get);
    let root = match cli.root {
        Some(root) => root.canonicalize()?,
        None => current_dir()?,
    };

    info!("pool-server {}", env!("CARGO_PKG_VERSION"));
    info!("Worker threads: {}", threads);

    let pool = ThreadPool::builder()
        .num_threads(threads)
        .thread_name("http-worker")
        .build()?;
    let server = HttpServer::bind(cli.addr, root, pool)?;
    info!("Listening on {}", server.local_addr()?);
    server.run(cli.max_connections)
}
