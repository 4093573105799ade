// src/main.rs
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use path_absolutize::Absolutize;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nextjs_vite_converter::{
    render_route_module, ConversionOptions, ConversionReport, Converter, DiskFileSource,
    PackageManifest,
};

const DEFAULT_CONFIG: &str = "next-vite.toml";

#[derive(Parser, Debug)]
#[command(
    name = "nextjs-vite-converter",
    version,
    about = "Converts a Next.js pages-router project to Vite + React Router and prints a JSON report"
)]
struct Cli {
    /// Root of the Next.js project
    #[arg(short = 'r', long = "project-root", value_name = "DIR")]
    project_root: PathBuf,

    /// Options file; defaults to `next-vite.toml` in the project root when present
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write converted files, package.json and src/routes.tsx here
    #[arg(short, long = "out-dir", value_name = "DIR")]
    out_dir: Option<PathBuf>,

    #[arg(long)]
    convert_api_routes: bool,

    /// Apply the regex rules to files that fail to parse
    #[arg(long)]
    regex_fallback: bool,

    /// Leave package.json alone
    #[arg(long)]
    skip_dependencies: bool,

    #[arg(long)]
    strip_comments: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nextjs_vite_converter=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_options(cli: &Cli, project_root: &Path) -> Result<ConversionOptions> {
    let mut options = match &cli.config {
        Some(path) => ConversionOptions::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let default = project_root.join(DEFAULT_CONFIG);
            if default.is_file() {
                ConversionOptions::load(&default)
                    .with_context(|| format!("loading {}", default.display()))?
            } else {
                ConversionOptions::default()
            }
        }
    };

    options.convert_api_routes |= cli.convert_api_routes;
    options.regex_fallback |= cli.regex_fallback;
    if cli.skip_dependencies {
        options.update_dependencies = false;
    }
    if cli.strip_comments {
        options.preserve_comments = false;
    }
    Ok(options)
}

async fn load_manifest(project_root: &Path) -> Result<Option<PackageManifest>> {
    let path = project_root.join("package.json");
    if !path.is_file() {
        warn!(path = %path.display(), "no package.json found");
        return Ok(None);
    }
    let text = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let manifest = PackageManifest::from_json_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(manifest))
}

async fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("writing {}", path.display()))
}

/// Transformed files get their new text; every other file is copied as is.
async fn write_output(
    out_dir: &Path,
    source: &DiskFileSource,
    report: &ConversionReport,
    manifest: Option<&PackageManifest>,
) -> Result<()> {
    for (path, outcome) in &report.files {
        let target = out_dir.join(path);
        match &outcome.result {
            Some(result) => write_file(&target, &result.code).await?,
            None => {
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::copy(source.root().join(path), &target)
                    .await
                    .with_context(|| format!("copying {path}"))?;
            }
        }
    }

    if let Some(manifest) = manifest {
        write_file(&out_dir.join("package.json"), &manifest.to_json_pretty()?).await?;
    }
    write_file(
        &out_dir.join("src").join("routes.tsx"),
        &render_route_module(&report.route_table),
    )
    .await?;
    info!(out_dir = %out_dir.display(), files = report.files.len(), "wrote converted project");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let project_root = cli.project_root.absolutize()?.to_path_buf();
    if !project_root.is_dir() {
        anyhow::bail!("project root {} is not a directory", project_root.display());
    }
    let options = load_options(&cli, &project_root)?;
    let source = DiskFileSource::new(&project_root);
    let mut manifest = load_manifest(&project_root).await?;

    info!(root = %project_root.display(), "converting project");
    let mut converter = Converter::new(options);
    let report = converter.execute(&source, manifest.as_mut()).await;

    let output = json!({ "summary": report.summary(), "report": &report });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if let Some(out_dir) = &cli.out_dir {
        let out_dir = out_dir.absolutize()?.to_path_buf();
        write_output(&out_dir, &source, &report, manifest.as_ref()).await?;
    }

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
