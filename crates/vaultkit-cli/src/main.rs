// crates/vaultkit-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vaultkit_compile::{compile_requests, ActionRequest, VaultCompiler};
use vaultkit_core::io::{ensure_parent_dir, read_registry_auto, write_invocation_auto};
use vaultkit_core::Registry;
use vaultkit_merkle::{derive_proof, recombine, validate_registry};

#[derive(Parser, Debug)]
#[command(
    name = "vaultkit-cli",
    about = "vaultkit reference CLI",
    long_about = "vaultkit reference CLI.\n\nUse this tool to inspect committed action registries, derive inclusion proofs, and compile action batches into manager invocations.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print registry metadata and the committed leaf table
    Inspect {
        /// Input path to the registry document (JSON/CBOR)
        #[arg(long)]
        registry: PathBuf,
    },

    /// Recompute every commitment, every layer, and the root
    VerifyRegistry {
        /// Input path to the registry document (JSON/CBOR)
        #[arg(long)]
        registry: PathBuf,
    },

    /// Derive the inclusion proof for one committed leaf
    Prove {
        /// Input path to the registry document (JSON/CBOR)
        #[arg(long)]
        registry: PathBuf,

        /// Leaf index at layer 0
        #[arg(long)]
        leaf: u32,
    },

    /// Compile an action-request batch into one manager invocation
    Compile {
        /// Input path to the registry document (JSON/CBOR)
        #[arg(long)]
        registry: PathBuf,

        /// Input path to the request batch (JSON array of actions)
        #[arg(long)]
        request: PathBuf,

        /// Output path for the invocation payload (JSON/CBOR)
        #[arg(long, default_value = "invocation.json")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Inspect { registry } => inspect(registry),
        Cmd::VerifyRegistry { registry } => verify_registry(registry),
        Cmd::Prove { registry, leaf } => prove(registry, leaf),
        Cmd::Compile {
            registry,
            request,
            out,
        } => compile(registry, request, out),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn load_registry(path: &Path) -> Result<Registry> {
    read_registry_auto(path).with_context(|| format!("reading registry {}", path.display()))
}

fn inspect(registry: PathBuf) -> Result<()> {
    info!(registry=%registry.display(), "inspecting registry");
    let reg = load_registry(&registry)?;
    let md = &reg.metadata;

    println!("manager:          {}", md.manager);
    println!("vault:            {}", md.vault);
    println!("vault allocator:  {}", md.vault_allocator);
    println!("underlying asset: {}", md.underlying_asset);
    println!("committed root:   {}", md.committed_root);
    println!("capacity/used:    {}/{}", md.capacity, md.used);
    println!("tree depth:       {}", reg.tree.depth());
    println!();
    for leaf in &reg.leaves {
        println!(
            "[{:>3}] op {} on {} ({} fixed args): {}",
            leaf.index,
            leaf.op_id,
            leaf.target,
            leaf.fixed_arguments.len(),
            leaf.description
        );
    }
    Ok(())
}

fn verify_registry(registry: PathBuf) -> Result<()> {
    info!(registry=%registry.display(), "verifying registry");
    let reg = load_registry(&registry)?;
    validate_registry(&reg).context("registry does not match its committed root")?;
    println!(
        "OK: {} leaves recombine to root {}",
        reg.leaves.len(),
        reg.metadata.committed_root
    );
    Ok(())
}

fn prove(registry: PathBuf, leaf_index: u32) -> Result<()> {
    info!(registry=%registry.display(), leaf_index, "deriving proof");
    let reg = load_registry(&registry)?;

    let Some(leaf) = reg.leaves.iter().find(|l| l.index == leaf_index) else {
        bail!("no leaf with index {leaf_index} in registry");
    };
    let proof = derive_proof(&reg.tree, leaf.commitment)
        .with_context(|| format!("deriving proof for leaf {leaf_index}"))?;

    println!("leaf {}: {}", leaf.index, leaf.description);
    println!("commitment: {}", leaf.commitment);
    for (i, sibling) in proof.iter().enumerate() {
        println!("  sibling[{i}] = {sibling}");
    }
    let root = recombine(leaf.commitment, &proof);
    if root != reg.metadata.committed_root {
        bail!(
            "proof recombines to {root}, expected committed root {}",
            reg.metadata.committed_root
        );
    }
    println!("recombines to committed root {root}");
    Ok(())
}

fn compile(registry: PathBuf, request: PathBuf, out: PathBuf) -> Result<()> {
    info!(registry=%registry.display(), request=%request.display(), out=%out.display(), "compiling batch");

    let compiler = VaultCompiler::load(&registry)?;

    let f = File::open(&request).with_context(|| format!("open {}", request.display()))?;
    let requests: Vec<ActionRequest> = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("deserialize request batch {}", request.display()))?;

    let invocation = compile_requests(&compiler, &requests)
        .context("compiling request batch into an invocation")?;

    ensure_parent_dir(&out)?;
    write_invocation_auto(&out, &invocation)
        .with_context(|| format!("writing invocation to {}", out.display()))?;

    println!(
        "Compiled {} request(s) → {} ({} calldata slots) → {}",
        requests.len(),
        invocation.contract,
        invocation.calldata.len(),
        out.display()
    );
    Ok(())
}
