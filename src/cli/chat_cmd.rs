//! `agora chat` — direct one-on-one exchange with a single respondent.

use crate::cli::output::Styled;
use crate::dialogue::Moderator;
use anyhow::Result;

pub async fn run(moderator: &Moderator, id: u32, message: &str, json: bool) -> Result<()> {
    let exchange = moderator.direct_chat(id, message).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&exchange)?);
        return Ok(());
    }

    let s = Styled::new();
    println!();
    println!("  {}:", s.bold(&exchange.respondent_name));
    println!("  {}", exchange.reply);
    Ok(())
}
