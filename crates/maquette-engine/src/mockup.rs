use maquette_types::Role;
use serde_json::json;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::engine::{AgentEngine, EngineInput, EngineUpdate};

/// Built-in engine: a fixed two-tool loop that extracts a project brief from
/// the latest human message and renders a static mockup page, then answers
/// with a summary. Stands in for a full LLM-backed loop so the server runs
/// end to end without external credentials.
#[derive(Debug, Clone, Default)]
pub struct MockupEngine;

#[derive(Debug, Clone, PartialEq)]
struct ProjectBrief {
    name: String,
    industry: String,
    audience: String,
    tone: String,
}

impl MockupEngine {
    pub fn new() -> Self {
        Self
    }
}

impl AgentEngine for MockupEngine {
    fn spawn_run(&self, input: EngineInput) -> mpsc::Receiver<EngineUpdate> {
        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            let request = input
                .messages
                .iter()
                .rev()
                .find(|m| m.role() == Role::Human)
                .map(|m| m.content.clone())
                .unwrap_or_default();

            let extract_id = format!("call_{}", Uuid::new_v4().simple());
            let _ = tx
                .send(Ok(json!({
                    "role": "ai",
                    "content": "",
                    "tool_calls": [{
                        "id": extract_id,
                        "name": "extract_project_brief",
                        "args": {"message": request},
                    }],
                })))
                .await;

            let brief = extract_brief(&request);
            let _ = tx
                .send(Ok(json!({
                    "role": "tool",
                    "name": "extract_project_brief",
                    "tool_call_id": extract_id,
                    "content": json!({
                        "name": brief.name,
                        "industry": brief.industry,
                        "audience": brief.audience,
                        "tone": brief.tone,
                    }).to_string(),
                })))
                .await;

            let render_id = format!("call_{}", Uuid::new_v4().simple());
            let _ = tx
                .send(Ok(json!({
                    "role": "ai",
                    "content": "",
                    "tool_calls": [{
                        "id": render_id,
                        "name": "render_mockup",
                        "args": {"name": brief.name, "industry": brief.industry},
                    }],
                })))
                .await;

            let page = render_page(&brief);
            let _ = tx
                .send(Ok(json!({
                    "role": "tool",
                    "name": "render_mockup",
                    "tool_call_id": render_id,
                    "content": format!("rendered index.html ({} bytes)", page.len()),
                })))
                .await;

            let answer = format!(
                "I drafted a {} landing page for {}, aimed at {}, with a {} tone. \
                 The mockup has a hero section, a highlights grid and a contact footer. \
                 Tell me what to adjust and I'll regenerate it.",
                brief.industry, brief.name, brief.audience, brief.tone,
            );
            let _ = tx
                .send(Ok(json!({"role": "ai", "content": answer})))
                .await;
        });

        rx
    }
}

/// Keyword heuristics over the free-text request. Deliberately shallow: the
/// extraction quality is not part of the protocol contract.
fn extract_brief(request: &str) -> ProjectBrief {
    let lower = request.to_lowercase();

    let industry = [
        ("bakery", "bakery"),
        ("boulangerie", "bakery"),
        ("restaurant", "restaurant"),
        ("café", "café"),
        ("cafe", "café"),
        ("portfolio", "portfolio"),
        ("agency", "agency"),
        ("shop", "shop"),
        ("store", "shop"),
    ]
    .iter()
    .find(|(keyword, _)| lower.contains(keyword))
    .map(|(_, label)| *label)
    .unwrap_or("business");

    let audience = if lower.contains("famil") {
        "families"
    } else if lower.contains("professional") {
        "professionals"
    } else if lower.contains("student") {
        "students"
    } else {
        "a general audience"
    };

    let tone = if lower.contains("modern") || lower.contains("minimal") {
        "modern"
    } else if lower.contains("playful") || lower.contains("fun") {
        "playful"
    } else {
        "warm"
    };

    // A quoted phrase names the project; otherwise fall back to a generic one
    let name = request
        .split('"')
        .nth(1)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "Untitled Project".to_string());

    ProjectBrief {
        name,
        industry: industry.to_string(),
        audience: audience.to_string(),
        tone: tone.to_string(),
    }
}

fn render_page(brief: &ProjectBrief) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{name}</title></head>\n\
         <body>\n<header><h1>{name}</h1><p>A {industry} for {audience}</p></header>\n\
         <main><section class=\"highlights\"></section></main>\n\
         <footer><p>Contact us</p></footer>\n</body>\n</html>\n",
        name = brief.name,
        industry = brief.industry,
        audience = brief.audience,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_brief_keywords() {
        let brief = extract_brief("A modern site for my bakery \"Les Délices\" for families");
        assert_eq!(brief.name, "Les Délices");
        assert_eq!(brief.industry, "bakery");
        assert_eq!(brief.audience, "families");
        assert_eq!(brief.tone, "modern");
    }

    #[test]
    fn test_extract_brief_defaults() {
        let brief = extract_brief("make me a website");
        assert_eq!(brief.name, "Untitled Project");
        assert_eq!(brief.industry, "business");
        assert_eq!(brief.audience, "a general audience");
    }

    #[test]
    fn test_render_page_mentions_name() {
        let brief = extract_brief("portfolio site \"Studio K\"");
        let page = render_page(&brief);
        assert!(page.contains("<title>Studio K</title>"));
        assert!(page.starts_with("<!doctype html>"));
    }
}
