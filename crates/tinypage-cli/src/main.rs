use anyhow::{Context, Result};
use async_trait::async_trait;
use relative_path::RelativePathBuf;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::{env, io, process};
use tinypage_config::Config;
use tinypage_engine::estimate::{CostRail, EstimatingMeasurer, Usage, format_bytes};
use tinypage_engine::publish::{Consent, ConsentPrompt, Decision, Limits, PageStrategy, decide};
use tinypage_engine::{Document, PageFile, io as pages};

/// Asks split questions on the terminal.
struct StdinConsent;

#[async_trait(?Send)]
impl Consent for StdinConsent {
    async fn confirm(&self, prompt: &ConsentPrompt) -> bool {
        print!("[{}] {} [y/N] ", prompt.message_key(), prompt.message());
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(err) => {
                log::warn!("could not read answer: {err}");
                false
            }
        }
    }
}

fn measurer_from(config: Option<&Config>) -> EstimatingMeasurer {
    let mut measurer = EstimatingMeasurer::default();
    if let Some(config) = config {
        measurer.limits = Limits {
            hard_limit: config.limits.hard_limit,
            soft_threshold: config.limits.soft_threshold,
        };
        measurer.page_overhead = config.estimate.page_overhead;
        measurer.nav_bytes = config.estimate.pagination_nav_bytes;
    }
    measurer
}

fn print_cost_rail(document: &Document, measurer: &EstimatingMeasurer) {
    let rail = CostRail::new(&document.to_source().content);
    for entry in &rail.entries {
        println!("  {:<10} {:>10}", entry.label, format_bytes(entry.bytes));
    }
    let total = rail.total + measurer.page_overhead;
    let flag = match Usage::of(total, measurer.limits.hard_limit) {
        Usage::Normal => "",
        Usage::Warning => " (close to limit)",
        Usage::Over => " (over limit)",
    };
    println!(
        "  {:<10} {:>10} / {}{flag}",
        "total",
        format_bytes(total),
        format_bytes(measurer.limits.hard_limit)
    );
}

/// Prints the plan for one page. Returns false if publishing would abort.
fn check_page(document: &Document, measurer: &EstimatingMeasurer) -> Result<bool> {
    println!("{} ({})", document.title(), document.slug());
    print_cost_rail(document, measurer);

    let decision = pollster::block_on(decide(
        document,
        measurer,
        &StdinConsent,
        &measurer.limits,
    ))?;
    match decision {
        Decision::Proceed(plan) => {
            match plan.strategy {
                PageStrategy::SinglePage { bytes } => {
                    println!("plan: single page, {}", format_bytes(bytes))
                }
                PageStrategy::Paginated { pages, bytes } => {
                    println!("plan: {pages} pages, {}", format_bytes(bytes))
                }
            }
            Ok(true)
        }
        Decision::Aborted(abort) => {
            println!("abort [{}]: {abort}", abort.message_key());
            Ok(false)
        }
    }
}

fn load(file: &PageFile, pages_root: &Path) -> Result<Document> {
    let source = pages::read_source(file.relative_path(), pages_root)
        .with_context(|| format!("loading {}", file.relative_path()))?;
    Ok(Document::from_source(source))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };
    let measurer = measurer_from(config.as_ref());

    // A direct file path wins; otherwise resolve against the configured pages folder.
    let (pages_root, files) = match args.as_slice() {
        [_, target] if Path::new(target).is_file() => {
            let path = PathBuf::from(target);
            let root = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = path
                .file_name()
                .context("page path has no file name")?
                .to_string_lossy()
                .into_owned();
            (root, vec![PageFile::new(RelativePathBuf::from(name))])
        }
        [_, rest @ ..] if rest.len() <= 1 => {
            let Some(config) = config.as_ref() else {
                eprintln!("Error: No page given and no config file found");
                eprintln!("Usage: {} [page.json | slug]", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            };
            if let Err(e) = pages::validate_pages_dir(&config.pages_path) {
                eprintln!(
                    "Error: Pages path '{}' from config file '{}' is invalid: {e}",
                    config.pages_path.display(),
                    config_path.display()
                );
                process::exit(1);
            }
            let files = match rest.first() {
                Some(slug) => vec![PageFile::for_slug(slug)],
                None => pages::scan_sources(&config.pages_path)?,
            };
            (config.pages_path.clone(), files)
        }
        _ => {
            eprintln!("Usage: {} [page.json | slug]", args[0]);
            process::exit(1);
        }
    };

    log::info!("checking {} page(s) in {}", files.len(), pages_root.display());
    let mut all_ok = true;
    for file in &files {
        let document = load(file, &pages_root)?;
        all_ok &= check_page(&document, &measurer)?;
        println!();
    }

    if !all_ok {
        process::exit(2);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinypage_config::{EstimateConfig, LimitsConfig};

    #[test]
    fn config_defaults_match_engine_defaults() {
        let engine = EstimatingMeasurer::default();
        let config = Config::new("/srv/pages");
        assert_eq!(config.limits, LimitsConfig::default());
        assert_eq!(config.estimate, EstimateConfig::default());
        assert_eq!(measurer_from(Some(&config)), engine);
        assert_eq!(measurer_from(None), engine);
    }

    #[test]
    fn config_overrides_reach_the_measurer() {
        let mut config = Config::new("/srv/pages");
        config.limits.hard_limit = 20_000;
        config.estimate.pagination_nav_bytes = 0;
        let measurer = measurer_from(Some(&config));
        assert_eq!(measurer.limits.hard_limit, 20_000);
        assert_eq!(measurer.nav_bytes, 0);
    }
}
