use clap::Args;
use owo_colors::OwoColorize;

use crate::chat::client::{ChatClient, DEFAULT_HOST, DEFAULT_MODEL};
use crate::chat::message::build_messages;
use crate::chat::tools::storefront_tools;
use crate::presets::{Preset, refund_analysis_prompt};

/// The scripted walkthrough scenarios: header, preset, prompt.
const SCENARIOS: &[(&str, Preset, &str)] = &[
    ("Testing greeting assistant...", Preset::Greeting, "Hello!"),
    (
        "Testing greeting assistant 2...",
        Preset::Greeting,
        "What is 2+2? Just give me the number. No emojis, no fluff. Just the number.",
    ),
    (
        "Testing greeting assistant 3...",
        Preset::Greeting,
        "Hi there!",
    ),
    (
        "Testing weather assistant...",
        Preset::Weather,
        "What's the weather in Tokyo?",
    ),
];

const TOOL_SCENARIOS: &[(&str, Preset, &str)] = &[
    (
        "Testing customer service agent...",
        Preset::CustomerService,
        "What's the capital of France?",
    ),
    (
        "Testing refund handler...",
        Preset::Refund,
        "I want to return order #12345, it arrived damaged",
    ),
    (
        "Testing purchase handler...",
        Preset::Purchase,
        "I'd like to buy product ABC123, quantity 2",
    ),
];

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Ollama host, e.g. http://localhost:11434.
    #[arg(long)]
    host: Option<String>,

    /// Model identifier, passed through unchanged.
    #[arg(long)]
    model: Option<String>,

    /// Also run the customer-service, refund, and purchase scenarios.
    #[arg(long)]
    all: bool,

    /// Print the outbound requests instead of calling the server.
    #[arg(long)]
    dry_run: bool,
}

pub fn run(args: DemoArgs) -> Result<(), String> {
    let host = args.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let model = args.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let base = ChatClient::new(&host, &model);

    let extra: &[(&str, Preset, &str)] = if args.all { TOOL_SCENARIOS } else { &[] };

    for (header, preset, prompt) in SCENARIOS.iter().chain(extra.iter()) {
        println!("{}", header.bold().cyan());

        let client = if preset.uses_tools() {
            base.bind_tools(storefront_tools())
        } else {
            base.clone()
        };
        let messages = preset.messages(prompt);

        if args.dry_run {
            let payload = client.request_payload(&messages);
            println!(
                "{}\n",
                serde_json::to_string_pretty(&payload).map_err(|err| err.to_string())?
            );
            continue;
        }

        let reply = client.chat(&messages).map_err(|err| err.to_string())?;
        if !reply.content.is_empty() {
            println!("Response: {}", reply.content);
        }
        for call in &reply.tool_calls {
            println!(
                "{} {} {}",
                "tool_call".yellow(),
                call.name,
                serde_json::to_string(&call.args).unwrap_or_else(|_| "{}".to_string()),
            );
        }
        println!();
    }

    if args.all {
        println!("{}", "Testing refund analysis...".bold().cyan());

        // The model is asked for a JSON object; the reply is printed as raw
        // text, unparsed.
        let messages = build_messages(&refund_analysis_prompt("12345", "arrived damaged"), None);
        if args.dry_run {
            let payload = base.request_payload(&messages);
            println!(
                "{}\n",
                serde_json::to_string_pretty(&payload).map_err(|err| err.to_string())?
            );
        } else {
            let verdict = base.chat_text(&messages).map_err(|err| err.to_string())?;
            println!("Response: {verdict}\n");
        }
    }

    Ok(())
}
