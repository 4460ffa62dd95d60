//! 结构化回复解析器（纯函数，不依赖网络）
//!
//! 从模型自由文本中用互不重叠的标签捕获正则解出六段式结构化回复；
//! 标签缺失按「优雅降级」处理：缺 <response> 用全文兜底，缺可选段则字段缺席。
//! response_type 无效或缺失时，用基于**原始用户输入**的规则分类器补齐。

use std::sync::OnceLock;

use regex::Regex;

use crate::workflow::types::{ResponseMetadata, ResponseType, StructuredAiResponse};

fn tag_regex(cell: &'static OnceLock<Regex>, tag: &'static str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(&format!(r"(?is)<{tag}>\s*(.*?)\s*</{tag}>")).expect("valid tag regex")
    })
}

fn capture(cell: &'static OnceLock<Regex>, tag: &'static str, text: &str) -> Option<String> {
    tag_regex(cell, tag)
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

static RESPONSE_RE: OnceLock<Regex> = OnceLock::new();
static THINKING_RE: OnceLock<Regex> = OnceLock::new();
static OBJECTIVES_RE: OnceLock<Regex> = OnceLock::new();
static SUMMARY_RE: OnceLock<Regex> = OnceLock::new();
static CONFIDENCE_RE: OnceLock<Regex> = OnceLock::new();
static METADATA_RE: OnceLock<Regex> = OnceLock::new();

const GREETING_WORDS: &[&str] = &[
    "hi", "hello", "hey", "greetings", "howdy", "good morning", "good afternoon", "good evening",
];

const QUESTION_WORDS: &[&str] = &[
    "what", "who", "where", "when", "why", "how", "which", "whose", "whom", "is", "are", "do",
    "does", "did",
];

const TASK_PREFIXES: &[&str] = &[
    "can you", "could you", "would you", "please", "create", "make", "generate", "write", "build",
    "draw", "design", "help me", "i need", "i want",
];

/// 词边界前缀匹配："hi there" 匹配 "hi"，"history" 不匹配
fn starts_with_word(text: &str, word: &str) -> bool {
    match text.strip_prefix(word) {
        Some(rest) => rest.is_empty() || rest.starts_with(|c: char| !c.is_alphanumeric()),
        None => false,
    }
}

/// 基于原始用户输入的规则分类：greeting > question > task > conversation
pub fn classify_response_type(user_input: &str) -> ResponseType {
    let lower = user_input.trim().to_lowercase();

    if GREETING_WORDS.iter().any(|w| starts_with_word(&lower, w)) {
        return ResponseType::Greeting;
    }
    if lower.contains('?') || QUESTION_WORDS.iter().any(|w| starts_with_word(&lower, w)) {
        return ResponseType::Question;
    }
    if TASK_PREFIXES.iter().any(|w| starts_with_word(&lower, w)) {
        return ResponseType::Task;
    }
    ResponseType::Conversation
}

/// <metadata> 段逐行解析：response_type / requires_followup / suggested_actions
fn parse_metadata(block: &str, user_input: &str) -> ResponseMetadata {
    let mut response_type = None;
    let mut requires_followup = false;
    let mut suggested_actions = Vec::new();

    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim().to_lowercase().as_str() {
            "response_type" => response_type = ResponseType::parse(value),
            "requires_followup" => {
                requires_followup = value.trim().eq_ignore_ascii_case("true");
            }
            "suggested_actions" => {
                suggested_actions = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => {}
        }
    }

    ResponseMetadata {
        response_type: response_type.unwrap_or_else(|| classify_response_type(user_input)),
        requires_followup,
        suggested_actions,
    }
}

/// 纯解析函数：模型原始文本 + 原始用户输入 -> 结构化回复
///
/// - 缺 <response> -> response 为整段原始文本
/// - 缺 <thinking> / <objectives> / <summary> / <confidence> -> 对应字段缺席
/// - <objectives> 以分号切分、去空白、丢弃空项
/// - confidence 解析失败则缺席，成功则夹紧到 [0, 1]
pub fn parse_structured_response(raw: &str, user_input: &str) -> StructuredAiResponse {
    let response = capture(&RESPONSE_RE, "response", raw).unwrap_or_else(|| raw.trim().to_string());
    let thinking = capture(&THINKING_RE, "thinking", raw);
    let summary = capture(&SUMMARY_RE, "summary", raw);

    let objectives = capture(&OBJECTIVES_RE, "objectives", raw).map(|block| {
        block
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect::<Vec<_>>()
    });

    let confidence = capture(&CONFIDENCE_RE, "confidence", raw)
        .and_then(|s| s.parse::<f32>().ok())
        .map(|c| c.clamp(0.0, 1.0));

    let metadata = match capture(&METADATA_RE, "metadata", raw) {
        Some(block) => parse_metadata(&block, user_input),
        None => ResponseMetadata {
            response_type: classify_response_type(user_input),
            ..Default::default()
        },
    };

    StructuredAiResponse {
        response,
        thinking,
        objectives,
        summary,
        confidence,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
<thinking>The user greets me.</thinking>
<objectives>acknowledge greeting; offer help; keep it short</objectives>
<response>Hello! How can I help you today?</response>
<summary>Friendly greeting exchange.</summary>
<confidence>0.92</confidence>
<metadata>
response_type: greeting
requires_followup: false
suggested_actions: ask a question, describe a task
</metadata>
"#;

    #[test]
    fn fully_tagged_text_round_trips_all_six_sections() {
        let parsed = parse_structured_response(FULL, "Hi!");
        assert_eq!(parsed.response, "Hello! How can I help you today?");
        assert_eq!(parsed.thinking.as_deref(), Some("The user greets me."));
        assert_eq!(
            parsed.objectives.as_deref(),
            Some(
                &[
                    "acknowledge greeting".to_string(),
                    "offer help".to_string(),
                    "keep it short".to_string()
                ][..]
            )
        );
        assert_eq!(parsed.summary.as_deref(), Some("Friendly greeting exchange."));
        assert_eq!(parsed.confidence, Some(0.92));
        assert_eq!(parsed.metadata.response_type, ResponseType::Greeting);
        assert!(!parsed.metadata.requires_followup);
        assert_eq!(
            parsed.metadata.suggested_actions,
            vec!["ask a question", "describe a task"]
        );
    }

    #[test]
    fn response_only_leaves_optionals_absent() {
        let parsed =
            parse_structured_response("<response>  Just the answer.  </response>", "tell me");
        assert_eq!(parsed.response, "Just the answer.");
        assert!(parsed.thinking.is_none());
        assert!(parsed.objectives.is_none());
        assert!(parsed.summary.is_none());
        assert!(parsed.confidence.is_none());
    }

    #[test]
    fn untagged_text_passes_through_and_classifies_user_input() {
        let parsed = parse_structured_response(
            "A plain model answer without any tags.",
            "What is the capital of France?",
        );
        assert_eq!(parsed.response, "A plain model answer without any tags.");
        // 分类依据是原始用户输入，而非模型文本
        assert_eq!(parsed.metadata.response_type, ResponseType::Question);
    }

    #[test]
    fn invalid_metadata_response_type_falls_back_to_classifier() {
        let raw = "<response>ok</response><metadata>\nresponse_type: banana\n</metadata>";
        let parsed = parse_structured_response(raw, "Please create a logo for me");
        assert_eq!(parsed.metadata.response_type, ResponseType::Task);
    }

    #[test]
    fn confidence_is_clamped_and_bad_values_dropped() {
        let high = parse_structured_response("<confidence>1.7</confidence>", "x");
        assert_eq!(high.confidence, Some(1.0));
        let bad = parse_structured_response("<confidence>very sure</confidence>", "x");
        assert!(bad.confidence.is_none());
    }

    #[test]
    fn classifier_matches_documented_examples() {
        assert_eq!(
            classify_response_type("Hi there, how's it going?"),
            ResponseType::Greeting
        );
        assert_eq!(
            classify_response_type("What is the capital of France?"),
            ResponseType::Question
        );
        assert_eq!(
            classify_response_type("Please create a logo for me"),
            ResponseType::Task
        );
        assert_eq!(
            classify_response_type("I like turtles"),
            ResponseType::Conversation
        );
    }

    #[test]
    fn objectives_drop_empty_entries() {
        let parsed =
            parse_structured_response("<objectives> a ;; b ; </objectives>", "x");
        assert_eq!(parsed.objectives.as_deref(), Some(&["a".to_string(), "b".to_string()][..]));
    }
}
