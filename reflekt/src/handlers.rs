use clap::ArgMatches;
use colored::Colorize;
use reflekt_scanner::ScanError;
use reflekt_scanner::mutation::{DropDepth, MutationConfig};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

// Re-export stage types and functions from reflekt-core
pub use reflekt_core::crawl::{
    CrawlOptions, CrawlProgressCallback, execute_crawl, extract_url_path, generate_crawl_report,
    read_seed_urls, write_crawl_output,
};
pub use reflekt_core::probe::{
    ProbeOptions, ProbeProgressCallback, REFLECTED_FILE, append_reflected, execute_probe,
    generate_probe_report, read_candidate_urls,
};
pub use reflekt_core::report::{generate_crawl_json, generate_probe_json};

const WORKSPACE_TARGETS: &[&str] = &["reflekt", "reflekt_core", "reflekt_scanner"];

/// Log filter: our own crates at DEBUG when verbose, everything else
/// (hyper, reqwest, ...) held at WARN.
pub fn log_filter(verbose: bool) -> Targets {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    WORKSPACE_TARGETS
        .iter()
        .fold(Targets::new(), |targets, target| targets.with_target(*target, level))
        .with_default(Level::WARN)
}

/// Install the fmt subscriber on stderr.
pub fn init_tracing(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(log_filter(verbose))
        .try_init();
}

/// Expand a leading `~` in a user-supplied path
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

/// Load seeds, reporting an unreadable file and carrying on with none
pub fn load_seed_urls(path: &Path) -> Vec<String> {
    match read_seed_urls(path) {
        Ok(seeds) => seeds,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            Vec::new()
        }
    }
}

fn print_json(json: Result<String, serde_json::Error>) {
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("{} Failed to render JSON summary: {}", "✗".red().bold(), e),
    }
}

fn fail(context: &str, e: ScanError) -> ! {
    eprintln!("{} {}: {}", "✗".red().bold(), context, e);
    std::process::exit(1);
}

pub async fn handle_crawl(sub_matches: &ArgMatches) {
    init_tracing(false);

    let Some(input) = sub_matches.get_one::<PathBuf>("input") else {
        eprintln!("{} --input is required", "✗".red().bold());
        std::process::exit(1);
    };
    let input = expand_path(input);
    let output = sub_matches
        .get_one::<PathBuf>("output")
        .map(|p| expand_path(p))
        .unwrap_or_else(|| PathBuf::from(reflekt_core::crawl::DEFAULT_OUTPUT_FILE));
    let threads = *sub_matches.get_one::<usize>("threads").unwrap_or(&10);
    let timeout_secs = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let drop_level = *sub_matches.get_one::<u8>("drop-depth").unwrap_or(&1);
    let max_urls = sub_matches.get_one::<usize>("max-urls").copied();
    let json = sub_matches.get_flag("json");

    let seeds = load_seed_urls(&input);
    if seeds.is_empty() {
        println!("{} No valid URLs found in input file.", "!".yellow().bold());
        return;
    }

    let mut mutation = MutationConfig {
        drop_depth: DropDepth::from_level(drop_level).unwrap_or_default(),
        ..MutationConfig::default()
    };
    if let Some(max_urls) = max_urls {
        mutation.max_urls = max_urls;
    }

    println!(
        "{} Starting crawl on {} URLs with {} threads (timeout {}s)\n",
        "→".blue(),
        seeds.len().to_string().bright_white(),
        threads,
        timeout_secs
    );

    let options = CrawlOptions {
        seeds,
        threads,
        timeout: Duration::from_secs(timeout_secs),
        mutation,
        show_progress_bars: true,
    };

    let progress_callback: CrawlProgressCallback = Arc::new(|msg: String| {
        println!("{}", msg);
    });

    let summary = match execute_crawl(options, Some(progress_callback)).await {
        Ok(summary) => summary,
        Err(e) => fail("Crawl failed", e),
    };

    match write_crawl_output(&output, &summary.urls) {
        Ok(true) => println!(
            "\n{} Saved {} URLs to {}",
            "✓".green().bold(),
            summary.urls.len(),
            output.display().to_string().bright_white()
        ),
        Ok(false) => println!("\n{} No hidden parameters found.", "!".yellow().bold()),
        Err(e) => fail("Failed to write output", e),
    }

    println!();
    print!("{}", generate_crawl_report(&summary));

    if json {
        print_json(generate_crawl_json(&summary));
    }
}

pub async fn handle_probe(sub_matches: &ArgMatches) {
    let verbose = sub_matches.get_flag("verbose");
    init_tracing(verbose);

    let threads = *sub_matches.get_one::<usize>("threads").unwrap_or(&15);
    let json = sub_matches.get_flag("json");

    let urls = match read_candidate_urls(io::stdin().lock()) {
        Ok(urls) => urls,
        Err(e) => fail("Failed to read stdin", e),
    };

    if urls.is_empty() {
        println!("{} No URLs provided", "✗".red().bold());
        println!("  Usage: cat output.txt | reflekt probe");
        return;
    }

    let started = Instant::now();

    let options = ProbeOptions {
        urls,
        threads,
        show_progress_bars: !verbose,
    };

    let progress_callback: ProbeProgressCallback = Arc::new(|msg: String| {
        println!("{}", msg);
    });

    let summary = match execute_probe(options, Some(progress_callback)).await {
        Ok(summary) => summary,
        Err(e) => fail("Probe failed", e),
    };

    let reflected_path = Path::new(REFLECTED_FILE);
    match append_reflected(reflected_path, &summary.reflected) {
        Ok(true) => println!(
            "\n{} {} reflected URLs appended to {}",
            "✓".green().bold(),
            summary.reflected.len(),
            REFLECTED_FILE.bright_white()
        ),
        Ok(false) => println!("\n{} No reflections found.", "!".yellow().bold()),
        Err(e) => fail("Failed to write results", e),
    }

    if verbose {
        println!(
            "{} Finished in {:.2}s",
            "→".blue(),
            started.elapsed().as_secs_f64()
        );
    }

    println!();
    print!("{}", generate_probe_report(&summary));

    if json {
        print_json(generate_probe_json(&summary));
    }
}
