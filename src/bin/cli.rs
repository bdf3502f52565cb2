//! routemap CLI - export the routes of a backend project as API-client collections.
//!
//! Usage:
//!   routemap --path ./my-app                        # Postman collection for dev
//!   routemap -p ./api -o curl -f requests.sh        # curl script
//!   routemap -p ./api -o insomnia -O ./exports      # into another directory
//!   routemap -p ./api --full                        # dev, staging and prod files
//!   routemap -p ./api -F gin --plugins-dir ./rules  # pin a plugin framework
//!   routemap -p ./api --json                        # route inventory on stdout

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use routemap::catalog::scanned_extensions;
use routemap::plugin::plugin_search_dirs;
use routemap::{
    discover_files, load_plugins, render, Config, Environment, ExportContext, ExportFormat,
    FrameworkSelector, RouteExtractor,
};

#[derive(Parser)]
#[command(name = "routemap", version)]
#[command(about = "Generate API-client collections from the routes a backend declares", long_about = None)]
struct Cli {
    /// Project root directory
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Output format: postman, insomnia, httpie, curl, markdown [default: postman]
    #[arg(short, long)]
    output: Option<String>,

    /// Output file name (default: based on the output format)
    #[arg(short, long)]
    file: Option<String>,

    /// Output directory (default: current directory)
    #[arg(short = 'O', long)]
    output_path: Option<PathBuf>,

    /// Framework: auto, a built-in (express, flask, django, spring, laravel) or a plugin name
    #[arg(short = 'F', long)]
    framework: Option<String>,

    /// Generate one file per environment: dev, staging and prod
    #[arg(long)]
    full: bool,

    /// Extra plugin directory (repeatable)
    #[arg(long = "plugins-dir")]
    plugins_dir: Vec<PathBuf>,

    /// Print the extracted routes as JSON instead of writing an export
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "routemap=debug" } else { "routemap=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let root = cli
        .path
        .canonicalize()
        .with_context(|| format!("project path {} not found", cli.path.display()))?;
    let config = Config::load(&root)?;

    let framework: FrameworkSelector = cli
        .framework
        .as_deref()
        .or(config.framework.as_deref())
        .unwrap_or("auto")
        .parse()?;
    let format: ExportFormat = cli
        .output
        .as_deref()
        .or(config.output.as_deref())
        .unwrap_or("postman")
        .parse()?;

    // Human-readable progress stays off stdout when it carries JSON.
    let say = |msg: String| {
        if !cli.json {
            println!("{}", msg);
        }
    };

    say(format!("Scanning project at: {}", root.display()));
    say(format!("Framework detection: {}", framework));
    say(format!("Output format: {}", format));

    let mut explicit_dirs = config.plugin_dirs.clone();
    explicit_dirs.extend(cli.plugins_dir.iter().cloned());
    let executable = std::env::current_exe().ok();
    let search_dirs = plugin_search_dirs(&explicit_dirs, Some(&root), executable.as_deref());
    let loaded = load_plugins(&search_dirs);
    if !loaded.registry.is_empty() {
        say(format!("Loaded {} plugin(s)", loaded.registry.len()));
    }
    if cli.verbose {
        for dir in &loaded.loaded_dirs {
            say(format!("  plugins from {}", dir.display()));
        }
        for (path, reason) in &loaded.skipped {
            say(format!("  skipped {}: {}", path.display(), reason));
        }
    }

    let extensions = scanned_extensions(&loaded.registry);
    let mut extractor = RouteExtractor::new(framework, loaded.registry)?;

    let files = discover_files(&root, &extensions)?;
    say(format!("Found {} files to analyze", files.len()));

    let routes = extractor.extract_all(&files);
    say(format!("Extracted {} routes", routes.len()));
    if cli.verbose {
        let mut mounts: Vec<(&str, &str)> = extractor.base_paths().iter().collect();
        mounts.sort();
        for (file, prefix) in mounts {
            say(format!("  {} mounted at {}", file, prefix));
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&routes)?);
        return Ok(());
    }

    if routes.is_empty() {
        println!("No routes found. Make sure you're pointing to a valid backend project.");
        return Ok(());
    }

    let environments: Vec<Environment> = if cli.full {
        Environment::ALL.to_vec()
    } else {
        vec![Environment::Dev]
    };
    if cli.full {
        let names: Vec<&str> = environments.iter().map(|e| e.as_str()).collect();
        println!("Generating exports for: {}", names.join(", "));
    }

    let output_dir = cli
        .output_path
        .or(config.output_path.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;

    for env in &environments {
        let ctx = ExportContext::new(&root, *env, config.base_urls.resolve(*env));
        let document = render(format, &routes, &ctx)?;

        let file_name = format.file_name(cli.file.as_deref(), cli.full.then_some(*env));
        let path = output_dir.join(file_name);
        write_output(&path, &document, format.is_script())?;
        println!("Successfully generated {}", path.display());
    }

    if cli.full {
        println!(
            "Generated {} environment file(s) for {}",
            environments.len(),
            format.display_name()
        );
    } else {
        println!("You can now use this file with {}", format.display_name());
    }

    Ok(())
}

fn write_output(path: &Path, contents: &str, executable: bool) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    if executable {
        make_executable(path).with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
