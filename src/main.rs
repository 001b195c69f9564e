mod cli;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use cli::{Cli, Commands};
use vodpack::catalog::{Catalog, CatalogEntry, CATALOG_FILE};
use vodpack::config::Config;
use vodpack::encode::ladder::Codec;
use vodpack::encode::EncodeJob;
use vodpack::probe;
use vodpack::tools::ToolRegistry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on the
    // verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vodpack=debug".to_string()
        } else {
            "vodpack=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let mut config = Config::load_or_default(cli.config.as_deref());
    if let Some(dir) = cli.output_path {
        config.storage.output_dir = dir;
    }
    for warning in config.validate() {
        tracing::warn!("config: {warning}");
    }

    match cli.command {
        Commands::Encode {
            input,
            codec,
            overwrite,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(encode(&config, &input, codec, overwrite))
        }
        Commands::List => list(&config),
        Commands::Uri { id_or_path } => uri(&config, &id_or_path),
        Commands::CheckTools => check_tools(&config),
    }
}

fn catalog_path(output_root: &Path) -> PathBuf {
    output_root.join(CATALOG_FILE)
}

async fn encode(config: &Config, input: &Path, codec: Codec, overwrite: bool) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("input file does not exist: {}", input.display());
    }
    let source_path = input
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", input.display()))?;

    let output_root = config.storage.resolved_output_dir();
    let catalog_file = catalog_path(&output_root);

    let catalog = Catalog::load(&catalog_file)?;
    let existing = catalog.find_by_source(&source_path);
    if let Some(entry) = existing {
        if !overwrite {
            return Err(vodpack::Error::Duplicate { path: source_path }.into());
        }
        tracing::info!("replacing existing package {}", entry.id);
    }
    let video_id = existing
        .map(|e| e.id.clone())
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());

    let tools = ToolRegistry::discover(&config.tools);

    let info = probe::probe(&tools, &source_path).await?;
    if let Some(ref name) = info.format_name {
        println!("Video probed as {name}");
    }

    let title = info.title.clone().unwrap_or_else(|| {
        source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| video_id.clone())
    });
    let timestamp = info.creation_time.unwrap_or_else(Utc::now);

    let mut rng = StdRng::from_entropy();
    let job = EncodeJob::new(
        video_id,
        source_path.clone(),
        info.width,
        info.height,
        output_root.clone(),
        codec,
        title.clone(),
        timestamp,
        &mut rng,
    );
    job.run(&tools, &config.encoding, &mut rng).await?;

    // The catalog may have changed while the encoder ran; reload before writing.
    let mut catalog = Catalog::load(&catalog_file)?;
    catalog.remove_id(&job.video_id);
    catalog.push(CatalogEntry {
        id: job.video_id.clone(),
        codec: codec.to_string(),
        date: timestamp,
        key: job.key_hex(),
        title,
        source_path,
    });
    catalog.save(&catalog_file)?;

    println!("Encoding complete. Serve the package with:");
    println!(
        "    cd {}; http-server -p 8080 -a 127.0.0.1 -c 5",
        output_root.display()
    );
    println!(
        "    firefox http://127.0.0.1:8080/{}/index.html#{}",
        job.video_id,
        job.key_hex()
    );

    Ok(())
}

fn list(config: &Config) -> Result<()> {
    let output_root = config.storage.resolved_output_dir();
    let catalog = Catalog::load(&catalog_path(&output_root))?;

    if catalog.entries.is_empty() {
        println!("No packages catalogued under {}", output_root.display());
        return Ok(());
    }

    for entry in &catalog.entries {
        println!(
            "{}  {}  {:<5}  {}",
            entry.id,
            entry.date.format("%Y-%m-%d %H:%M"),
            entry.codec,
            entry.title
        );
    }

    Ok(())
}

fn uri(config: &Config, id_or_path: &str) -> Result<()> {
    let output_root = config.storage.resolved_output_dir();
    let catalog = Catalog::load(&catalog_path(&output_root))?;

    let entry = catalog
        .find_by_id_or_source(id_or_path)
        .with_context(|| format!("no package found for '{id_or_path}'"))?;

    println!("{}/index.html#{}", entry.id, entry.key);

    Ok(())
}

fn check_tools(config: &Config) -> Result<()> {
    println!("Checking external tools...\n");

    let registry = ToolRegistry::discover(&config.tools);
    let mut all_ok = true;

    for tool in registry.check_all() {
        let status = if tool.available {
            "ok"
        } else {
            all_ok = false;
            "missing"
        };

        print!("[{status}] {}", tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({version})");
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available.");
    } else {
        println!("Some tools are missing. Install them to enable encoding.");
    }

    Ok(())
}
