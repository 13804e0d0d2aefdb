use anyhow::Result;
use bat::PrettyPrinter;
use clap::Parser;
use cliclack::spinner;
use console::style;
use dotenv::dotenv;
use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::Level;

use chatgpt_tooling::{ChatGPT, Prompt, Tool, ToolArgument, ToolDescriptor};

#[derive(Parser)]
#[command(author, version, about = "Play a coin flipping game through tool calls", long_about = None)]
struct Cli {
    /// Print all the internal steps
    #[arg(long)]
    debug: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct CoinFlipResponse {
    /// Whether the coin flip was heads.
    #[serde(rename = "wasHeads")]
    was_heads: bool,
}

fn coin_flipping_tool() -> Result<Tool<Vec<String>>> {
    let tool = Tool::new(Vec::new()).register(
        ToolDescriptor::new(
            "flip_coin",
            "Flip a coin and save the result. Requires the probability of heads as an argument.",
            vec![ToolArgument::new(
                "probability_of_heads",
                "The probability of heads (between 0 and 1).",
                "float",
            )],
        ),
        |history: &mut Vec<String>, args| {
            let probability: f64 = args.get("probability_of_heads")?;
            anyhow::ensure!(
                (0.0..=1.0).contains(&probability),
                "Probability of heads must be between 0 and 1 but got {}",
                probability
            );
            let result = if rand::thread_rng().gen::<f64>() < probability {
                "heads"
            } else {
                "tails"
            };
            history.push(result.to_string());
            Ok(json!(result))
        },
    )?;
    Ok(tool)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let mut prompt = Prompt::new();
    prompt.add(
        "system",
        "You are a chatbot to facilitate the user playing a coin flipping game.",
    )?;
    prompt.add("user", "Flip a coin that is always heads.")?;

    let mut tool = coin_flipping_tool()?;
    let chatgpt = ChatGPT::from_env()?;

    println!("Coin flipping game {}", style("- asking the model").dim());

    let spin = spinner();
    if !cli.debug {
        spin.start("awaiting reply");
    }
    let response: CoinFlipResponse = chatgpt.ask(&mut prompt, Some(&mut tool))?;
    if !cli.debug {
        spin.stop(format!("flips: {}", tool.state().join(", ")));
    }

    println!("\nRESPONSE:");
    render(&serde_json::to_string_pretty(&response)?)?;
    println!();
    Ok(())
}

fn render(content: &str) -> Result<()> {
    PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("json")
        .print()
        .map_err(|e| anyhow::anyhow!("Failed to render response: {}", e))?;
    Ok(())
}
