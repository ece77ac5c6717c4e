//! `agora ask` — pose a question to the panel and show the opinion clusters.

use crate::cli::output::{self, Styled};
use crate::cluster::ClusterOutcome;
use crate::survey::Surveyor;
use anyhow::Result;
use indicatif::ProgressBar;
use rand::rngs::StdRng;
use std::time::Duration;

pub async fn run(
    surveyor: &Surveyor,
    question: &str,
    panel: usize,
    clusters: Option<usize>,
    rng: &mut StdRng,
    json: bool,
) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("asking {panel} respondents..."));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outcome = surveyor.ask_panel(question, panel, clusters, rng).await?;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let s = Styled::new();
    output::print_header(&s, &format!("Question: {question}"));
    println!(
        "  {} of {} respondents answered, average intensity {:.2}",
        outcome.total - outcome.failed,
        outcome.total,
        outcome.average_intensity
    );
    if outcome.failed > 0 {
        println!(
            "  {} {} respondent(s) failed to answer",
            s.warn_sym(),
            outcome.failed
        );
    }
    print_clusters(&s, &outcome.clustering);
    Ok(())
}

/// Shared cluster rendering, also used by `agora clusters`.
pub fn print_clusters(s: &Styled, outcome: &ClusterOutcome) {
    println!();
    println!(
        "  {} ({} used)",
        s.bold(&format!("{} opinion cluster(s)", outcome.clusters.len())),
        outcome.k_used
    );

    for cluster in &outcome.clusters {
        println!();
        println!(
            "  {} {}",
            s.cyan(&format!("[{}]", cluster.id)),
            s.bold(&cluster.representative_answer)
        );
        println!(
            "      {} member(s)  {}",
            cluster.count,
            s.intensity_bar(cluster.avg_intensity, 20)
        );
        for answer in &cluster.sample_answers {
            println!("      {}", s.dim(&format!("\u{2022} {answer}")));
        }
    }

    if outcome.outliers.count > 0 {
        println!();
        println!(
            "  {}",
            s.yellow(&format!("{} unique perspective(s)", outcome.outliers.count))
        );
        for answer in &outcome.outliers.answers {
            println!("      {}", s.dim(&format!("\u{2022} {answer}")));
        }
    }
}
