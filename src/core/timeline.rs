use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::engine::{ProjectionInputs, TimelineConfig, project_wealth};
use super::types::{
    ScenarioRecord, StoredTimeline, TimelinePoint, TimelineSource, WealthTimeline,
    number_from_value,
};

pub trait TimelineParser: Send + Sync {
    fn name(&self) -> &'static str;
    fn parse(&self, raw: &str) -> Option<Value>;
}

pub struct JsonParser;

impl TimelineParser for JsonParser {
    fn name(&self) -> &'static str {
        "json"
    }

    fn parse(&self, raw: &str) -> Option<Value> {
        serde_json::from_str(raw).ok()
    }
}

pub struct PythonLiteralParser;

impl TimelineParser for PythonLiteralParser {
    fn name(&self) -> &'static str {
        "python-literal"
    }

    fn parse(&self, raw: &str) -> Option<Value> {
        serde_json::from_str(&python_literal_to_json(raw)).ok()
    }
}

/// `[{age=30, wealth=100}]` style: bare `key=` becomes `"key":`.
pub struct KeyValueParser {
    assignment: Regex,
}

impl KeyValueParser {
    pub fn new() -> Self {
        Self {
            assignment: Regex::new(r"(\w+)=").expect("valid assignment pattern"),
        }
    }
}

impl Default for KeyValueParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineParser for KeyValueParser {
    fn name(&self) -> &'static str {
        "key-value"
    }

    fn parse(&self, raw: &str) -> Option<Value> {
        let jsonish = self.assignment.replace_all(raw, "\"$1\":");
        serde_json::from_str(&jsonish).ok()
    }
}

pub struct TimelineResolver {
    parsers: Vec<Box<dyn TimelineParser>>,
    config: TimelineConfig,
}

impl TimelineResolver {
    pub fn new(config: TimelineConfig) -> Self {
        Self::with_parsers(
            config,
            vec![
                Box::new(JsonParser),
                Box::new(PythonLiteralParser),
                Box::new(KeyValueParser::new()),
            ],
        )
    }

    pub fn with_parsers(config: TimelineConfig, parsers: Vec<Box<dyn TimelineParser>>) -> Self {
        Self { parsers, config }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn parser_names(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    /// Never fails; the worst case is an unavailable, empty series.
    pub fn resolve(&self, record: &ScenarioRecord) -> WealthTimeline {
        if let Some(points) = record
            .wealth_timeline
            .as_ref()
            .and_then(|stored| self.parse_stored(stored))
        {
            return WealthTimeline {
                source: TimelineSource::Stored,
                points,
            };
        }

        debug!("stored timeline unusable; projecting from midpoints");
        let inputs = ProjectionInputs::from_record(record);
        let points = project_wealth(&inputs, &self.config);
        if points.is_empty() {
            return WealthTimeline::unavailable();
        }
        WealthTimeline {
            source: TimelineSource::Synthesized,
            points,
        }
    }

    pub fn parse_stored(&self, stored: &StoredTimeline) -> Option<Vec<TimelinePoint>> {
        match stored {
            StoredTimeline::Sequence(items) => coerce_points(items, self.config.epoch_year),
            StoredTimeline::Encoded(raw) => self.parse_encoded(raw),
            StoredTimeline::Other(_) => None,
        }
    }

    fn parse_encoded(&self, raw: &str) -> Option<Vec<TimelinePoint>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
            return None;
        }

        for parser in &self.parsers {
            let Some(document) = parser.parse(trimmed) else {
                continue;
            };
            debug!(parser = parser.name(), "stored timeline decoded");
            return match document {
                Value::Array(items) => coerce_points(&items, self.config.epoch_year),
                _ => None,
            };
        }
        None
    }
}

fn coerce_points(items: &[Value], epoch_year: i32) -> Option<Vec<TimelinePoint>> {
    let mut points = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(fields) = item else {
            continue;
        };
        let (Some(age), Some(wealth)) = (
            fields.get("age").and_then(number_from_value),
            fields.get("wealth").and_then(number_from_value),
        ) else {
            continue;
        };
        let year = match fields.get("year") {
            None | Some(Value::Null) => None,
            Some(value) => match number_from_value(value) {
                Some(year) => Some(year.trunc() as i32),
                None => continue,
            },
        };
        points.push(TimelinePoint { age, wealth, year });
    }

    if points.is_empty() {
        return None;
    }

    if points.iter().all(|p| p.year.is_none()) {
        let base_age = points.iter().map(|p| p.age).fold(f64::INFINITY, f64::min);
        for p in &mut points {
            p.year = Some(epoch_year.saturating_add((p.age - base_age).trunc() as i32));
        }
    }
    Some(points)
}

/// Single-quoted strings, Python constants and tuples to JSON.
fn python_literal_to_json(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    let mut word = String::new();

    let flush = |word: &mut String, out: &mut String| {
        match word.as_str() {
            "True" => out.push_str("true"),
            "False" => out.push_str("false"),
            "None" => out.push_str("null"),
            _ => out.push_str(word),
        }
        word.clear();
    };

    while let Some(c) = chars.next() {
        if c.is_alphanumeric() || c == '_' {
            word.push(c);
            continue;
        }
        flush(&mut word, &mut out);

        match c {
            '\'' | '"' => {
                out.push('"');
                while let Some(s) = chars.next() {
                    match s {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                if escaped == '\'' {
                                    out.push('\'');
                                } else {
                                    out.push('\\');
                                    out.push(escaped);
                                }
                            }
                        }
                        '"' if c == '\'' => out.push_str("\\\""),
                        s if s == c => break,
                        s => out.push(s),
                    }
                }
                out.push('"');
            }
            '(' | '[' => out.push('['),
            ')' | ']' => {
                drop_trailing_comma(&mut out);
                out.push(']');
            }
            '}' => {
                drop_trailing_comma(&mut out);
                out.push('}');
            }
            other => out.push(other),
        }
    }
    flush(&mut word, &mut out);
    out
}

fn drop_trailing_comma(out: &mut String) {
    let kept = out.trim_end().len();
    if out[..kept].ends_with(',') {
        out.truncate(kept - 1);
    }
}
