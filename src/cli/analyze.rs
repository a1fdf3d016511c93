//! Local analyze / optimize commands (no server involved)

use anyhow::{bail, Context, Result};
use std::path::Path;

use marvin::config::Config;
use marvin::optimizer;
use marvin::scanner::Scanner;
use marvin::{Language, OptimizationType};

fn detect_language(path: &Path, explicit: Option<&str>) -> Result<Language> {
    if let Some(label) = explicit {
        return Language::from_str(label).with_context(|| format!("Unknown language: {}", label));
    }

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    match Language::detect(name) {
        Some(lang) => Ok(lang),
        None => bail!(
            "Unsupported file type: {}\nAllowed extensions: {}",
            path.display(),
            Language::allowed_extensions()
        ),
    }
}

pub async fn analyze_command(
    config_path: Option<&Path>,
    path: &Path,
    language: Option<&str>,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let language = detect_language(path, language)?;

    let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let report = Scanner::new(&config.analysis).scan(&source, language);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

pub async fn optimize_command(path: &Path, optimization_type: &str, write: bool) -> Result<()> {
    let kind = OptimizationType::from_str(optimization_type)
        .with_context(|| format!("Unknown optimization type: {}", optimization_type))?;
    let language = detect_language(path, None)?;

    let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let result = optimizer::optimize(&source, language, kind);

    if write {
        tokio::fs::write(path, &result.optimized_code)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        for change in &result.changes {
            println!("{}:{}: {}", path.display(), change.line, change.description);
        }
        println!(
            "{} changes, {} -> {} bytes ({:.2}% smaller)",
            result.changes.len(),
            result.original_size,
            result.optimized_size,
            result.size_reduction
        );
    } else {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}
