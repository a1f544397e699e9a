//! Interactive chat loop with tool calling.
//!
//! A thin REPL over the OpenAI chat-completions API: user input goes out
//! with the tool schemas attached, tool calls the model requests are
//! executed against the [`ToolRegistry`], and the results are fed back
//! until the model produces a plain text answer.

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

use crate::tools::{ToolContext, ToolRegistry};

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions \
about software documentation. Use the available tools to search repository \
docs and fetch web pages before answering. Cite the filenames you drew from.";

/// Bound on tool-call rounds per user message, so a confused model cannot
/// loop forever.
const MAX_TOOL_ROUNDS: usize = 8;

/// OpenAI function-calling schema for every registered tool.
fn tool_schemas(tools: &ToolRegistry) -> Vec<Value> {
    tools
        .tools()
        .iter()
        .map(|t| {
            json!({
                "type": "function",
                "function": {
                    "name": t.name(),
                    "description": t.description(),
                    "parameters": t.parameters_schema(),
                }
            })
        })
        .collect()
}

/// Run the REPL until the user types `quit`/`exit` or closes stdin.
pub async fn run(tools: Arc<ToolRegistry>, ctx: ToolContext) -> Result<()> {
    let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
        anyhow::anyhow!(
            "OPENAI_API_KEY is not set. Export it before running `docdex chat`:\n  \
             export OPENAI_API_KEY=sk-..."
        )
    })?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(ctx.config.chat.timeout_secs))
        .build()?;

    let schemas = tool_schemas(&tools);
    let mut messages = vec![json!({ "role": "system", "content": SYSTEM_PROMPT })];

    println!("docdex chat — model {} (type 'quit' to exit)", ctx.config.chat.model);

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }

        messages.push(json!({ "role": "user", "content": input }));

        let reply = complete_turn(&client, &api_key, &ctx, &tools, &schemas, &mut messages)
            .await
            .unwrap_or_else(|e| format!("Error: {:#}", e));
        println!("{}", reply);
    }

    Ok(())
}

/// Run one user turn to completion, executing tool calls along the way.
/// Returns the model's final text answer.
async fn complete_turn(
    client: &reqwest::Client,
    api_key: &str,
    ctx: &ToolContext,
    tools: &ToolRegistry,
    schemas: &[Value],
    messages: &mut Vec<Value>,
) -> Result<String> {
    for _ in 0..MAX_TOOL_ROUNDS {
        let body = json!({
            "model": ctx.config.chat.model,
            "messages": messages,
            "tools": schemas,
        });

        let response = client
            .post(COMPLETIONS_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .context("chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("chat completion failed with HTTP {}: {}", status, detail);
        }

        let payload: Value = response.json().await?;
        let message = payload["choices"][0]["message"].clone();
        if message.is_null() {
            bail!("chat completion returned no choices");
        }
        messages.push(message.clone());

        let Some(calls) = message["tool_calls"].as_array().filter(|c| !c.is_empty()) else {
            return Ok(message["content"].as_str().unwrap_or("").to_string());
        };

        for call in calls {
            let call_id = call["id"].as_str().unwrap_or("").to_string();
            let name = call["function"]["name"].as_str().unwrap_or("");

            // A parse failure goes back to the model as the tool result,
            // so it can correct its arguments on the next round.
            let content = match parse_arguments(call) {
                Err(e) => format!("could not parse arguments: {}", e),
                Ok(args) => {
                    println!("  [tool] {} {}", name, args);
                    match tools.find(name) {
                        Some(tool) => match tool.execute(args, ctx).await {
                            Ok(result) => serde_json::to_string(&result)?,
                            Err(e) => format!("tool error: {}", e),
                        },
                        None => format!("unknown tool: {}", name),
                    }
                }
            };

            messages.push(json!({
                "role": "tool",
                "tool_call_id": call_id,
                "content": content,
            }));
        }
    }

    bail!("tool-call loop exceeded {} rounds", MAX_TOOL_ROUNDS)
}

/// Parse a tool call's `arguments` JSON string. A missing or empty field
/// is an empty object; malformed JSON is an error.
fn parse_arguments(call: &Value) -> Result<Value, serde_json::Error> {
    match call["function"]["arguments"].as_str() {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw),
        _ => Ok(Value::Object(serde_json::Map::new())),
    }
}
