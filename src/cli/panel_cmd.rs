//! `agora panel` / `agora clusters` — inspect the stored panel state.

use crate::cli::ask_cmd::print_clusters;
use crate::cli::output::{self, Styled};
use crate::panel::roster::Roster;
use crate::panel::store::RespondentStore;
use anyhow::Result;

/// Show every respondent's current answer and intensity.
pub async fn run_panel(store: &dyn RespondentStore, roster: &Roster, json: bool) -> Result<()> {
    let respondents = store.list_all().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&respondents)?);
        return Ok(());
    }

    let s = Styled::new();
    let question = store.question().await?;
    output::print_header(&s, "Panel");
    if !question.is_empty() {
        println!("  {}", s.dim(&format!("question: {question}")));
    }

    if respondents.is_empty() {
        println!("  (no respondents yet — run `agora ask` first)");
        return Ok(());
    }

    for r in respondents {
        let name = roster
            .get(r.id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("Respondent {}", r.id));
        let cluster = match r.cluster {
            Some(c) => format!("cluster {c}"),
            None => "outlier".to_string(),
        };
        println!(
            "  {:>4}  {:<24} {:<32} {}  {}",
            r.id,
            s.bold(&name),
            r.short_answer,
            s.dim(&cluster),
            s.intensity_bar(r.intensity, 12)
        );
    }
    Ok(())
}

/// Show the summaries from the latest clustering run.
pub async fn run_clusters(store: &dyn RespondentStore, json: bool) -> Result<()> {
    let outcome = store.latest_clusters().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let s = Styled::new();
    let question = store.question().await?;
    output::print_header(&s, "Opinion clusters");
    if !question.is_empty() {
        println!("  {}", s.dim(&format!("question: {question}")));
    }

    if outcome.clusters.is_empty() && outcome.outliers.count == 0 {
        println!("  (no clustering run recorded yet)");
        return Ok(());
    }
    print_clusters(&s, &outcome);
    Ok(())
}
