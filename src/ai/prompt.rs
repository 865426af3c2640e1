use serde_json::{json, Value};

use crate::logs::models::LogModel;

/// How many recent logs are summarized into the prompt
pub const SUMMARY_LOG_LIMIT: usize = 10;

const TITLE_LIMIT: usize = 80;
const TAG_LIMIT: usize = 40;
const CONTENT_LIMIT: usize = 200;

fn clamp(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// One line per log, most recent first: `#1, title: ..., type: ..., mood: ..., date: YYYY-MM-DD, content: <json>`
pub fn summarize_logs(logs: &[LogModel]) -> String {
    logs.iter()
        .take(SUMMARY_LOG_LIMIT)
        .enumerate()
        .map(|(idx, log)| {
            let mut parts = vec![format!("#{}", idx + 1)];
            if let Some(title) = log.title.as_deref().filter(|t| !t.is_empty()) {
                parts.push(format!("title: {}", clamp(title, TITLE_LIMIT)));
            }
            parts.push(format!("type: {}", clamp(log.log_type(), TAG_LIMIT)));
            if let Some(mood) = log.mood.as_deref().filter(|m| !m.is_empty()) {
                parts.push(format!("mood: {}", clamp(mood, TAG_LIMIT)));
            }
            parts.push(format!("date: {}", log.date.format("%Y-%m-%d")));
            parts.push(format!(
                "content: {}",
                clamp(&log.content.to_value().to_string(), CONTENT_LIMIT)
            ));
            parts.join(", ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wraps the message with the log summary when there is one
pub fn build_prompt(message: &str, summary: &str) -> String {
    if summary.is_empty() {
        return message.to_string();
    }
    format!(
        "You are an assistant for a journaling app. The user is chatting about their logs.\n\n\
         Recent user logs (most recent first):\n{}\n\n\
         User says: {}",
        summary, message
    )
}

/// Upstream payload; keys of an `options` object are merged in at the top level
pub fn build_payload(prompt: &str, options: Option<Value>) -> Value {
    let mut payload = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
    if let (Some(Value::Object(options)), Value::Object(target)) = (options, &mut payload) {
        target.extend(options);
    }
    payload
}

/// First candidate's first text part, if non-empty
pub fn extract_reply(raw: &Value) -> Option<String> {
    raw.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::{
        content::LogContent,
        models::{parse_log_date, LogFields},
    };

    fn log(title: Option<&str>, log_type: &str, content: Value) -> LogModel {
        LogModel::new(
            "u",
            LogFields {
                title: title.map(str::to_string),
                mood: Some("happy".to_string()),
                content: LogContent::parse(log_type, content).unwrap(),
                date: parse_log_date("2024-05-06T12:00:00Z").unwrap(),
            },
        )
    }

    #[test]
    fn test_summary_line_format() {
        let summary = summarize_logs(&[log(Some("Run"), "fitness", json!("5k"))]);
        assert_eq!(
            summary,
            "#1, title: Run, type: fitness, mood: happy, date: 2024-05-06, content: \"5k\""
        );
    }

    #[test]
    fn test_summary_truncates_and_limits() {
        let long_title = "t".repeat(200);
        let long_body = "b".repeat(1000);
        let logs: Vec<LogModel> = (0..15)
            .map(|_| log(Some(&long_title), "journal", json!(long_body)))
            .collect();

        let summary = summarize_logs(&logs);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines[9].starts_with("#10, "));
        assert!(lines[0].contains(&format!("title: {},", "t".repeat(80))));
        assert!(!lines[0].contains(&"t".repeat(81)));

        let content = lines[0].split("content: ").nth(1).unwrap();
        assert_eq!(content.chars().count(), 200);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let summary = summarize_logs(&[log(Some(&"é".repeat(100)), "journal", json!("x"))]);
        assert!(summary.contains(&"é".repeat(80)));
    }

    #[test]
    fn test_prompt_without_summary_is_message() {
        assert_eq!(build_prompt("hello", ""), "hello");
        let prompt = build_prompt("hello", "#1, type: food");
        assert!(prompt.starts_with("You are an assistant for a journaling app."));
        assert!(prompt.contains("#1, type: food"));
        assert!(prompt.ends_with("User says: hello"));
    }

    #[test]
    fn test_payload_merges_options() {
        let payload = build_payload(
            "hi",
            Some(json!({"generationConfig": {"temperature": 0.2}})),
        );
        assert_eq!(payload["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(payload["generationConfig"]["temperature"], 0.2);

        let ignored = build_payload("hi", Some(json!("not an object")));
        assert_eq!(ignored.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_extract_reply() {
        let raw = json!({"candidates": [{"content": {"parts": [{"text": "Hi there"}]}}]});
        assert_eq!(extract_reply(&raw), Some("Hi there".to_string()));
        assert_eq!(extract_reply(&json!({"candidates": []})), None);
        assert_eq!(
            extract_reply(&json!({"candidates": [{"content": {"parts": [{"text": ""}]}}]})),
            None
        );
    }
}
