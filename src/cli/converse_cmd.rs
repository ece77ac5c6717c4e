//! `agora converse` — run a synthetic conversation, then re-cluster.

use crate::cli::ask_cmd::print_clusters;
use crate::cli::output::{self, Styled};
use crate::dialogue::Moderator;
use anyhow::Result;
use rand::rngs::StdRng;

pub async fn run(moderator: &Moderator, ids: &[u32], rng: &mut StdRng, json: bool) -> Result<()> {
    let outcome = moderator.run_conversation(ids, rng).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let s = Styled::new();
    output::print_header(&s, &format!("Conversation #{}", outcome.conversation_id));
    if !outcome.question.is_empty() {
        println!("  {}", s.dim(&format!("topic: {}", outcome.question)));
    }

    for turn in &outcome.turns {
        println!();
        println!("  {}:", s.bold(&turn.speaker_name));
        println!("  {}", turn.text);
    }

    output::print_header(&s, "Where the panel stands now");
    print_clusters(&s, &outcome.clustering);
    Ok(())
}
