//! Host capabilities: external subsystems the interpreter invokes but does
//! not implement. Each capability is a small trait with a default adapter;
//! embedders swap in their own implementation to route graphics, HTTP,
//! crypto, or filesystem calls somewhere else (a real window, a sandboxed
//! filesystem, a FIPS-validated crypto library, ...).

use std::{
    fs,
    io::{Read as _, Write as _},
    net::{TcpListener, TcpStream},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
};

use log::{debug, warn};
use sha2::{Digest, Sha256};

use crate::error::HostError;

/// Graphics capability: window lifecycle and primitive drawing.
///
/// The shipped [`NullGraphics`] adapter performs no drawing and hands out
/// monotonically increasing window handles; a real windowing backend is an
/// embedder's responsibility.
pub trait Graphics {
    fn open_window(&mut self, title: &str, width: u32, height: u32) -> u64;
    fn clear(&mut self, window: u64, r: u8, g: u8, b: u8);
    fn rect(&mut self, window: u64, x: i32, y: i32, w: i32, h: i32, r: u8, g: u8, b: u8, a: u8);
    fn circle(&mut self, window: u64, cx: i32, cy: i32, radius: i32, r: u8, g: u8, b: u8, a: u8);
    fn present(&mut self, window: u64);
}

#[derive(Debug, Default)]
pub struct NullGraphics {
    next_handle: u64,
}

impl Graphics for NullGraphics {
    fn open_window(&mut self, title: &str, width: u32, height: u32) -> u64 {
        self.next_handle += 1;
        debug!("zen::host::graphics: open_window({title:?}, {width}, {height}) -> #{}", self.next_handle);
        self.next_handle
    }

    fn clear(&mut self, window: u64, r: u8, g: u8, b: u8) {
        debug!("zen::host::graphics: clear(#{window}, {r}, {g}, {b})");
    }

    fn rect(&mut self, window: u64, x: i32, y: i32, w: i32, h: i32, r: u8, g: u8, b: u8, a: u8) {
        debug!("zen::host::graphics: rect(#{window}, {x}, {y}, {w}, {h}, {r}, {g}, {b}, {a})");
    }

    fn circle(&mut self, window: u64, cx: i32, cy: i32, radius: i32, r: u8, g: u8, b: u8, a: u8) {
        debug!("zen::host::graphics: circle(#{window}, {cx}, {cy}, {radius}, {r}, {g}, {b}, {a})");
    }

    fn present(&mut self, window: u64) {
        debug!("zen::host::graphics: present(#{window})");
    }
}

/// Filesystem capability: the `read`/`write`/`delete`/`mkdir`/`exists` forms.
pub trait Fs {
    /// Missing files read back as an empty string (forgiving model, §7).
    fn read(&self, path: &str) -> String;
    fn write(&self, path: &str, content: &str) -> Result<(), HostError>;
    fn delete(&self, path: &str) -> Result<(), HostError>;
    fn mkdir(&self, path: &str) -> Result<(), HostError>;
    fn exists(&self, path: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct StdFs;

impl Fs for StdFs {
    fn read(&self, path: &str) -> String {
        fs::read_to_string(path).unwrap_or_default()
    }

    fn write(&self, path: &str, content: &str) -> Result<(), HostError> {
        fs::write(path, content).map_err(|e| HostError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn delete(&self, path: &str) -> Result<(), HostError> {
        fs::remove_file(path).map_err(|e| HostError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn mkdir(&self, path: &str) -> Result<(), HostError> {
        fs::create_dir_all(path).map_err(|e| HostError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

/// Crypto capability: hashing, a best-effort symmetric cipher, and salt
/// generation. Not bit-compatible with any particular reference
/// implementation; see [`SPEC_FULL.md`] §1 for why this is explicitly out
/// of scope to pin down further.
pub trait Crypto {
    fn hash(&self, data: &str, algorithm: &str) -> String;
    fn encrypt(&self, data: &str, key: &str) -> String;
    fn decrypt(&self, data: &str, key: &str) -> String;
    fn salt(&self, len: usize) -> String;
}

#[derive(Debug, Default)]
pub struct DefaultCrypto;

impl Crypto for DefaultCrypto {
    fn hash(&self, data: &str, algorithm: &str) -> String {
        match algorithm {
            "sha256" | "" => {
                let mut hasher = Sha256::new();
                hasher.update(data.as_bytes());
                hex(&hasher.finalize())
            }
            other => {
                warn!("zen::host::crypto: unknown hash algorithm '{other}', falling back to sha256");
                self.hash(data, "sha256")
            }
        }
    }

    /// XOR stream cipher keyed by repeating the key bytes; not AES, and not
    /// intended to be. Deterministic and its own inverse.
    fn encrypt(&self, data: &str, key: &str) -> String {
        hex(&xor_with_key(data.as_bytes(), key.as_bytes()))
    }

    fn decrypt(&self, data: &str, key: &str) -> String {
        let Some(bytes) = unhex(data) else {
            warn!("zen::host::crypto: decrypt received non-hex input");
            return String::new();
        };
        let plain = xor_with_key(&bytes, key.as_bytes());
        String::from_utf8_lossy(&plain).into_owned()
    }

    fn salt(&self, len: usize) -> String {
        use rand::Rng as _;
        let len = if len == 0 { 32 } else { len };
        let mut rng = rand::thread_rng();
        (0..len)
            .map(|_| rng.sample(rand::distributions::Alphanumeric) as char)
            .collect()
    }
}

fn xor_with_key(data: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return data.to_vec();
    }
    data.iter().enumerate().map(|(i, b)| b ^ key[i % key.len()]).collect()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn unhex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len()).step_by(2).map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok()).collect()
}

/// HTTP file-server capability: a background worker thread serving static
/// files from a root directory, stopped via a shared cancellation flag.
pub trait HttpServer {
    /// Starts serving `root` on `port` in the background. Returns an error if
    /// the listener could not be bound.
    fn start(&mut self, port: u16, root: PathBuf) -> Result<(), HostError>;
    /// Signals the worker to stop and joins it.
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

pub struct ThreadHttpServer {
    stop_flag: Option<Arc<AtomicBool>>,
    handle: Option<JoinHandle<()>>,
}

impl Default for ThreadHttpServer {
    fn default() -> Self {
        Self {
            stop_flag: None,
            handle: None,
        }
    }
}

impl HttpServer for ThreadHttpServer {
    fn start(&mut self, port: u16, root: PathBuf) -> Result<(), HostError> {
        let addr = format!("0.0.0.0:{port}");
        let listener = TcpListener::bind(&addr).map_err(|e| HostError::BindAddress {
            addr: addr.clone(),
            message: e.to_string(),
        })?;
        listener.set_nonblocking(true).map_err(|e| HostError::BindAddress {
            addr,
            message: e.to_string(),
        })?;

        let stop_flag = Arc::new(AtomicBool::new(false));
        let worker_flag = Arc::clone(&stop_flag);
        let handle = std::thread::spawn(move || {
            debug!("zen::host::http: serving {} on port {port}", root.display());
            while !worker_flag.load(Ordering::Relaxed) {
                match listener.accept() {
                    Ok((stream, _)) => serve_one(stream, &root),
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        std::thread::sleep(std::time::Duration::from_millis(50));
                    }
                    Err(e) => {
                        warn!("zen::host::http: accept failed: {e}");
                    }
                }
            }
        });

        self.stop_flag = Some(stop_flag);
        self.handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(flag) = self.stop_flag.take() {
            flag.store(true, Ordering::Relaxed);
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

fn serve_one(mut stream: TcpStream, root: &Path) {
    let mut buf = [0u8; 4096];
    let Ok(n) = stream.read(&mut buf) else { return };
    let request = String::from_utf8_lossy(&buf[..n]);
    let requested = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");
    let relative = requested.trim_start_matches('/');
    let path = if relative.is_empty() {
        root.join("index.html")
    } else {
        root.join(relative)
    };

    let (status, body) = match fs::read(&path) {
        Ok(bytes) => ("200 OK", bytes),
        Err(_) => ("404 Not Found", b"not found".to_vec()),
    };
    let mime = mime_type(&path);
    let header = format!("HTTP/1.1 {status}\r\nContent-Type: {mime}\r\nContent-Length: {}\r\n\r\n", body.len());
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(&body);
}

fn mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Bundles the four host capabilities the interpreter dispatches statements
/// and intrinsic calls to. Embedders construct one with whichever adapters
/// they need and hand it to the `Interpreter`.
pub struct HostCapabilities {
    pub graphics: Box<dyn Graphics>,
    pub fs: Box<dyn Fs>,
    pub crypto: Box<dyn Crypto>,
    pub http: Box<dyn HttpServer>,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            graphics: Box::new(NullGraphics::default()),
            fs: Box::new(StdFs),
            crypto: Box::new(DefaultCrypto),
            http: Box::new(ThreadHttpServer::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let crypto = DefaultCrypto;
        assert_eq!(crypto.hash("abc", "sha256"), crypto.hash("abc", "sha256"));
        assert_ne!(crypto.hash("abc", "sha256"), crypto.hash("abd", "sha256"));
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let crypto = DefaultCrypto;
        let cipher = crypto.encrypt("hello", "key");
        assert_eq!(crypto.decrypt(&cipher, "key"), "hello");
    }

    #[test]
    fn salt_defaults_length_for_nonpositive_input() {
        let crypto = DefaultCrypto;
        assert_eq!(crypto.salt(0).len(), 32);
        assert_eq!(crypto.salt(8).len(), 8);
    }

    #[test]
    fn missing_file_reads_as_empty_string() {
        let fs_adapter = StdFs;
        assert_eq!(fs_adapter.read("/does/not/exist/zen-test"), "");
    }
}
