//! Site commands: each prints JSON on stdout and a short summary on stderr.

use console::style;
use serde::Serialize;

use crate::engine::{derive_extraction_plan, Engine};
use crate::quality::QualityAssessment;
use crate::scrapers::SessionLauncher;

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn summarize_quality(label: &str, quality: &QualityAssessment) {
    let mark = if quality.passed {
        style("✓").green()
    } else {
        style("✗").red()
    };
    eprintln!(
        "{} {}: {} items, score {:.0} (price {:.0}%, description {:.0}%, {} pages)",
        mark,
        label,
        quality.item_count,
        quality.score,
        quality.price_coverage * 100.0,
        quality.description_coverage * 100.0,
        quality.pages_visited
    );
}

pub async fn cmd_detect<L: SessionLauncher>(engine: &Engine<L>, url: &str) -> anyhow::Result<()> {
    let scores = engine.detect_site_type(url).await?;
    eprintln!(
        "{} {:?} (confidence {:.2})",
        style("→").dim(),
        scores.primary_type,
        scores.confidence
    );
    print_json(&scores)
}

pub async fn cmd_plan<L: SessionLauncher>(engine: &Engine<L>, url: &str) -> anyhow::Result<()> {
    let scores = engine.detect_site_type(url).await?;
    let plan = derive_extraction_plan(&scores);
    eprintln!("{} {}", style("→").dim(), plan.rationale);
    print_json(&plan)
}

pub async fn cmd_catalogue<L: SessionLauncher>(
    engine: &Engine<L>,
    url: &str,
) -> anyhow::Result<()> {
    let products = engine.extract_catalogue_items(url).await?;
    eprintln!("{} {} products", style("→").dim(), products.len());
    print_json(&products)
}

pub async fn cmd_menu<L: SessionLauncher>(
    engine: &Engine<L>,
    url: &str,
    max_pages: Option<usize>,
) -> anyhow::Result<()> {
    match max_pages {
        Some(max_pages) => {
            let items = engine.extract_menu_items_multi_page(url, max_pages).await?;
            eprintln!(
                "{} {} menu items (up to {} pages)",
                style("→").dim(),
                items.len(),
                max_pages
            );
            print_json(&items)
        }
        None => {
            let items = engine.extract_menu_items(url).await?;
            eprintln!("{} {} menu items", style("→").dim(), items.len());
            print_json(&items)
        }
    }
}

pub async fn cmd_analyze<L: SessionLauncher>(
    engine: &Engine<L>,
    url: &str,
    min_items: usize,
) -> anyhow::Result<()> {
    let report = engine.analyze_site(url, min_items).await?;

    eprintln!(
        "{} {:?} (confidence {:.2}): {}",
        style("→").dim(),
        report.scores.primary_type,
        report.scores.confidence,
        report.plan.rationale
    );
    if let Some(quality) = &report.catalogue_quality {
        summarize_quality("catalogue", quality);
    }
    if let Some(quality) = &report.menu_quality {
        summarize_quality("menu", quality);
    }

    print_json(&report)
}
