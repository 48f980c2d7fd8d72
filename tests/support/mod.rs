#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use apd_explorer::UrlChecker;
use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Write `contents` at `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) -> Result<()> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))
}

pub fn descriptor_yaml(title: &str, homepage: &str) -> String {
    format!(
        "title: {title}\nhomepage: {homepage}\ncategory: fixture\ndescription: Fixture dataset {title}.\nkeywords: fixture, test\nimage: none\n"
    )
}

/// Checker that ignores proxy settings so stubs on 127.0.0.1 are hit directly.
pub fn local_checker(timeout: Duration) -> Result<UrlChecker> {
    let client = UrlChecker::client_builder(timeout)
        .no_proxy()
        .build()
        .context("building test HTTP client")?;
    Ok(UrlChecker::from_client(client))
}

/// Serve `response` verbatim to the first connection.
pub fn serve_once(response: &'static str) -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            read_request(&mut stream);
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });
    Ok(addr)
}

/// Accept one connection, read the request, then stay silent for `hold`.
pub fn serve_silent(hold: Duration) -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            read_request(&mut stream);
            thread::sleep(hold);
        }
    });
    Ok(addr)
}

/// Accept and immediately close every connection, counting them.
pub fn serve_hangups() -> Result<(SocketAddr, Arc<AtomicUsize>)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    thread::spawn(move || {
        for stream in listener.incoming() {
            seen.fetch_add(1, Ordering::SeqCst);
            drop(stream);
        }
    });
    Ok((addr, count))
}

/// A loopback port with nothing listening on it.
pub fn refused_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

fn read_request(stream: &mut TcpStream) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut buf = Vec::new();
    let mut chunk = [0u8; 512];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

pub fn run_git(cwd: &Path, args: &[&str]) -> Result<Output> {
    let output = Command::new("git")
        .args(["-c", "user.name=fixture", "-c", "user.email=fixture@example.com"])
        .args(args)
        .current_dir(cwd)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .with_context(|| format!("running git {args:?}"))?;
    if !output.status.success() {
        bail!(
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

/// Initialise a repository at `dir` holding a `core/<category>/<file>` tree
/// and commit it.
pub fn init_metadata_repo(dir: &Path, files: &[(&str, &str)]) -> Result<()> {
    fs::create_dir_all(dir)?;
    run_git(dir, &["init", "--quiet"])?;
    for (rel, contents) in files {
        write_file(dir, &format!("core/{rel}"), contents)?;
    }
    run_git(dir, &["add", "."])?;
    run_git(dir, &["commit", "--quiet", "-m", "fixture"])?;
    Ok(())
}

pub fn commit_file(dir: &Path, rel: &str, contents: &str) -> Result<()> {
    write_file(dir, rel, contents)?;
    run_git(dir, &["add", "."])?;
    run_git(dir, &["commit", "--quiet", "-m", "update"])?;
    Ok(())
}
