use std::env;
use std::fs;
use std::io::Read;
use std::path::Path;

use clap::{Args, ValueEnum};
use owo_colors::OwoColorize;
use serde_json::{Value, json};

use crate::chat::client::{ChatClient, ChatReply, DEFAULT_HOST, DEFAULT_MODEL};
use crate::chat::message::build_messages;
use crate::chat::tools::storefront_tools;
use crate::config;
use crate::presets::Preset;

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Print the assistant message content.
    Text,
    /// Print the raw structured response.
    Json,
}

impl OutputMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }

    fn from_profile(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct AskArgs {
    /// Prompt text; read from stdin when omitted.
    prompt: Option<String>,

    /// Assistant preset: greeting, weather, customer-service, refund, purchase.
    #[arg(long)]
    preset: Option<String>,

    /// Ollama host, e.g. http://localhost:11434.
    #[arg(long)]
    host: Option<String>,

    /// Model identifier, passed through unchanged.
    #[arg(long)]
    model: Option<String>,

    /// System prompt; overrides the preset prompt.
    #[arg(long)]
    system: Option<String>,

    /// Advertise the storefront tool schemas regardless of preset.
    #[arg(long)]
    tools: bool,

    /// Load defaults from a named config profile.
    #[arg(long)]
    profile: Option<String>,

    /// Print the outbound request instead of calling the server.
    #[arg(long)]
    dry_run: bool,

    /// Output mode.
    #[arg(long, value_enum)]
    output: Option<OutputMode>,

    /// Shorthand for --output json.
    #[arg(long)]
    json: bool,

    /// Write the response (or dry-run body) JSON to a file.
    #[arg(long)]
    save: Option<String>,

    /// Print server timing and token counts to stderr.
    #[arg(long)]
    show_stats: bool,

    /// Print resolution details to stderr.
    #[arg(long)]
    verbose: bool,

    /// Suppress all non-fatal stderr output.
    #[arg(long)]
    quiet: bool,

    /// Print version and build metadata.
    #[arg(long)]
    version: bool,
}

struct Resolved {
    host: String,
    model: String,
    preset: Option<Preset>,
    system: Option<String>,
    tools: bool,
    output: OutputMode,
}

pub fn run(args: AskArgs) -> Result<(), String> {
    if args.version {
        println!(
            "ollie {} commit: {} built: {}",
            env!("CARGO_PKG_VERSION"),
            env!("OLLIE_GIT_SHA"),
            env!("OLLIE_BUILD_TS"),
        );
        return Ok(());
    }

    let resolved = resolve(&args)?;
    let prompt = resolve_prompt(args.prompt.as_deref())?;

    let mut client = ChatClient::new(&resolved.host, &resolved.model);
    if resolved.tools {
        client = client.bind_tools(storefront_tools());
    }
    let messages = build_messages(&prompt, resolved.system.as_deref());

    if args.verbose && !args.quiet {
        eprintln!(
            "{} host={} model={} preset={} tools={} prompt_chars={}",
            "resolve:".dimmed(),
            resolved.host,
            resolved.model,
            resolved
                .preset
                .map(|preset| preset.as_str())
                .unwrap_or("none"),
            resolved.tools,
            prompt.chars().count(),
        );
    }

    if args.dry_run {
        let request = client.request_payload(&messages);
        let body = json!({
            "dry_run": true,
            "host": resolved.host,
            "model": resolved.model,
            "preset": resolved.preset.map(|preset| preset.as_str()),
            "output": resolved.output.as_str(),
            "messages": messages,
            "request": request,
        });
        println!("{}", serde_json::to_string_pretty(&body).map_err(stringify)?);
        if let Some(path) = &args.save {
            save_json(path, &body)?;
        }
        if args.show_stats && !args.quiet {
            eprintln!("stats: unavailable (dry-run)");
        }
        return Ok(());
    }

    let reply = client.chat(&messages).map_err(stringify)?;

    match resolved.output {
        OutputMode::Text => print_text(&reply),
        OutputMode::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&reply.raw).map_err(stringify)?
            );
        }
    }

    if let Some(path) = &args.save {
        save_json(path, &reply.raw)?;
    }

    if args.show_stats && !args.quiet {
        print_stats(&reply);
    }

    Ok(())
}

fn resolve(args: &AskArgs) -> Result<Resolved, String> {
    let profile = match &args.profile {
        Some(name) => config::load_profile(name)?,
        None => Default::default(),
    };

    let profile_preset = match &profile.preset {
        Some(name) => Some(Preset::from_name(name).ok_or_else(|| {
            format!(
                "Invalid profile preset '{name}'. Supported values: greeting, weather, customer-service, refund, purchase.",
            )
        })?),
        None => None,
    };

    let profile_output = match &profile.output {
        Some(value) => Some(OutputMode::from_profile(value).ok_or_else(|| {
            format!("Invalid profile output '{value}'. Supported values: text, json.")
        })?),
        None => None,
    };

    let cli_preset = match &args.preset {
        Some(name) => Some(Preset::from_name(name).ok_or_else(|| {
            format!(
                "Invalid preset '{name}'. Supported values: greeting, weather, customer-service, refund, purchase.",
            )
        })?),
        None => None,
    };

    let preset = cli_preset.or(profile_preset);

    let host = args
        .host
        .clone()
        .or_else(|| env_value("OLLIE_HOST"))
        .or(profile.host)
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let model = args
        .model
        .clone()
        .or_else(|| env_value("OLLIE_MODEL"))
        .or(profile.model)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let system = args
        .system
        .clone()
        .or(profile.system)
        .or_else(|| preset.map(|preset| preset.system_prompt().to_string()));

    let tools = args.tools
        || preset.map(Preset::uses_tools).unwrap_or(false)
        || profile.tools.unwrap_or(false);

    let output = if args.json {
        OutputMode::Json
    } else {
        args.output
            .or(profile_output)
            .unwrap_or(OutputMode::Text)
    };

    Ok(Resolved {
        host,
        model,
        preset,
        system,
        tools,
        output,
    })
}

fn resolve_prompt(arg: Option<&str>) -> Result<String, String> {
    if let Some(prompt) = arg {
        return Ok(prompt.to_string());
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("Failed to read prompt from stdin: {err}"))?;

    // Strip the trailing newline a shell pipe appends; everything else is
    // passed through verbatim.
    let prompt = buffer
        .strip_suffix('\n')
        .map(|text| text.strip_suffix('\r').unwrap_or(text))
        .unwrap_or(&buffer);

    if prompt.is_empty() {
        return Err("No prompt provided. Pass it as an argument or on stdin.".to_string());
    }
    Ok(prompt.to_string())
}

fn print_text(reply: &ChatReply) {
    if !reply.content.is_empty() {
        println!("{}", reply.content);
    }
    for call in &reply.tool_calls {
        println!(
            "{} {} {}",
            "tool_call".yellow(),
            call.name,
            serde_json::to_string(&call.args).unwrap_or_else(|_| "{}".to_string()),
        );
    }
}

fn print_stats(reply: &ChatReply) {
    let millis = reply
        .stats
        .total_duration_ns
        .map(|nanos| (nanos / 1_000_000).to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let prompt_tokens = count_or_unknown(reply.stats.prompt_eval_count);
    let eval_tokens = count_or_unknown(reply.stats.eval_count);
    eprintln!("stats: prompt_tokens={prompt_tokens} eval_tokens={eval_tokens} total_ms={millis}");
}

fn count_or_unknown(count: Option<u64>) -> String {
    count
        .map(|value| value.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn save_json(path: &str, body: &Value) -> Result<(), String> {
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    let rendered = serde_json::to_string(body).map_err(stringify)?;
    fs::write(path, rendered)
        .map_err(|err| format!("Failed to write output file '{}': {err}", path.display()))
}

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn stringify(err: impl std::fmt::Display) -> String {
    err.to_string()
}
