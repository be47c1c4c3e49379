use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, error, info};

use crate::thread_pool::ThreadPool;
use crate::Result;

const SLEEP_DELAY: Duration = Duration::from_secs(5);
const NOT_FOUND_BODY: &str = "404 Not Found";
/// Upper bound on the bytes read for the request line and headers.
const MAX_HEAD_LEN: u64 = 8 * 1024;

type Incoming<'a> = Box<dyn Iterator<Item = io::Result<TcpStream>> + 'a>;

/// A minimal HTTP/1.1 file server.
///
/// Every accepted connection is handed to the thread pool as one job,
/// which reads the request line, serves a file from `root` and closes
/// the connection.
pub struct HttpServer {
    listener: TcpListener,
    root: Arc<PathBuf>,
    pool: ThreadPool,
}

impl HttpServer {
    /// Binds a listener on `addr` serving files from `root`.
    pub fn bind(addr: impl ToSocketAddrs, root: PathBuf, pool: ThreadPool) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self {
            listener,
            root: Arc::new(root),
            pool,
        })
    }

    /// The address the listener is actually bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until `max_connections` have been taken (or
    /// forever when `None`), then shuts the pool down, waiting for the
    /// requests still in flight.
    pub fn run(mut self, max_connections: Option<usize>) -> Result<()> {
        info!("Serving {} on {}", self.root.display(), self.local_addr()?);

        let incoming = self.listener.incoming();
        let incoming: Incoming<'_> = match max_connections {
            Some(n) => Box::new(incoming.take(n)),
            None => Box::new(incoming),
        };

        for stream in incoming {
            match stream {
                Ok(stream) => {
                    let root = Arc::clone(&self.root);
                    self.pool.execute(move || {
                        if let Err(e) = handle_connection(&root, stream) {
                            error!("Error handling connection: {}", e);
                        }
                    });
                }
                Err(e) => error!("Connection failed: {}", e),
            }
        }

        info!("Connection limit reached, shutting down");
        self.pool.shutdown();
        Ok(())
    }
}

/// Handles a single client connection.
fn handle_connection(root: &Path, mut stream: TcpStream) -> Result<()> {
    let peer_addr = stream.peer_addr()?;
    let request_line = read_request_line(&stream)?;
    debug!("Request from {}: {}", peer_addr, request_line);

    let (status, body) = respond(root, &request_line);
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\n\r\n",
        status,
        body.len()
    );
    stream.write_all(response.as_bytes())?;
    stream.write_all(&body)?;
    stream.flush()?;
    Ok(())
}

/// Reads the request line and skips the headers, never consuming more
/// than `MAX_HEAD_LEN` bytes.
fn read_request_line(stream: impl Read) -> io::Result<String> {
    let mut reader = BufReader::new(stream.take(MAX_HEAD_LEN));
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    // Drain the headers so closing the socket doesn't reset the connection
    let mut header = String::new();
    while reader.read_line(&mut header)? > 0 && !header.trim_end().is_empty() {
        header.clear();
    }
    request_line.truncate(request_line.trim_end().len());
    Ok(request_line)
}

/// Maps a request line to a status line and body.
fn respond(root: &Path, request_line: &str) -> (&'static str, Vec<u8>) {
    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => (method, target),
        _ => return ("400 Bad Request", b"400 Bad Request".to_vec()),
    };
    if method != "GET" {
        return ("405 Method Not Allowed", b"405 Method Not Allowed".to_vec());
    }

    let file = match target {
        "/" => Some(PathBuf::from("index.html")),
        "/sleep" => {
            thread::sleep(SLEEP_DELAY);
            Some(PathBuf::from("index.html"))
        }
        path => resolve(path),
    };

    match file.and_then(|f| fs::read(root.join(f)).ok()) {
        Some(body) => ("200 OK", body),
        None => {
            let body = fs::read(root.join("404.html"))
                .unwrap_or_else(|_| NOT_FOUND_BODY.as_bytes().to_vec());
            ("404 NOT FOUND", body)
        }
    }
}

/// Turns a request target into a path relative to the server root,
/// rejecting anything that could escape it.
fn resolve(target: &str) -> Option<PathBuf> {
    let path = Path::new(target.split('?').next()?.trim_start_matches('/'));
    if path.as_os_str().is_empty() {
        return None;
    }
    path.components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| path.to_path_buf())
}
