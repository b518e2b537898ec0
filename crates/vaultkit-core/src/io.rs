//! Serialization helpers for registry documents and invocation payloads.
//!
//! JSON and CBOR read/write utilities with extension-based
//! auto-detection. Unknown/missing extensions are rejected for reads and
//! default to JSON for writes.

use crate::{Invocation, Registry};
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;

/// Ensure the parent directory for a file exists (no-op if none).
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", display(path)))?;
        }
    }
    Ok(())
}

/// ------------------------------
/// Registry I/O
/// ------------------------------

/// Read a [`Registry`] from **JSON**.
pub fn read_registry_json<P: AsRef<Path>>(path: P) -> Result<Registry> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let rdr = BufReader::new(f);
    let v: Registry =
        serde_json::from_reader(rdr).with_context(|| "deserialize JSON registry")?;
    Ok(v)
}

/// Read a [`Registry`] from **CBOR**.
pub fn read_registry_cbor<P: AsRef<Path>>(path: P) -> Result<Registry> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let mut rdr = BufReader::new(f);
    let v: Registry =
        ciborium::de::from_reader(&mut rdr).with_context(|| "deserialize CBOR registry")?;
    Ok(v)
}

/// Auto-detect read by extension `.json` / `.cbor` (case-insensitive).
pub fn read_registry_auto<P: AsRef<Path>>(path: P) -> Result<Registry> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("json") => read_registry_json(path),
        Some("cbor") => read_registry_cbor(path),
        Some(other) => Err(anyhow!(
            "unsupported registry extension: {other} (supported: .json, .cbor)"
        )),
        None => Err(anyhow!("path has no extension (expected .json or .cbor)")),
    }
}

/// Write a [`Registry`] to **JSON** (pretty).
pub fn write_registry_json<P: AsRef<Path>>(path: P, v: &Registry) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, v).with_context(|| "serialize JSON registry")?;
    w.flush().with_context(|| "flush JSON writer")?;
    Ok(())
}

/// ------------------------------
/// Invocation I/O
/// ------------------------------

/// Write an [`Invocation`] to **JSON** (pretty).
pub fn write_invocation_json<P: AsRef<Path>>(path: P, v: &Invocation) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, v).with_context(|| "serialize JSON invocation")?;
    w.flush().with_context(|| "flush JSON writer")?;
    Ok(())
}

/// Write an [`Invocation`] to **CBOR**.
pub fn write_invocation_cbor<P: AsRef<Path>>(path: P, v: &Invocation) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(v, &mut w).with_context(|| "serialize CBOR invocation")?;
    w.flush().with_context(|| "flush CBOR writer")?;
    Ok(())
}

/// Auto-detect write (defaults to JSON if unknown).
pub fn write_invocation_auto<P: AsRef<Path>>(path: P, v: &Invocation) -> Result<()> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("cbor") => write_invocation_cbor(path, v),
        _ => write_invocation_json(path, v),
    }
}

/// Read an [`Invocation`] from **JSON**.
pub fn read_invocation_json<P: AsRef<Path>>(path: P) -> Result<Invocation> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let rdr = BufReader::new(f);
    let v: Invocation =
        serde_json::from_reader(rdr).with_context(|| "deserialize JSON invocation")?;
    Ok(v)
}

/// ------------------------------
/// In-memory CBOR helpers
/// ------------------------------

/// Serialize any `T: Serialize` to **CBOR bytes**.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf).with_context(|| "serialize CBOR (to_cbor)")?;
    Ok(buf)
}

/// Deserialize any `T: DeserializeOwned` from **CBOR bytes**.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut cur = Cursor::new(bytes);
    let v = ciborium::de::from_reader(&mut cur).with_context(|| "deserialize CBOR (from_cbor)")?;
    Ok(v)
}

/// Return the lowercase extension (without dot) if present.
fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
}

/// Human-friendly path display for error messages.
fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
