use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Structured log events for a single evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    EvaluationStarted {
        kind: String,
        input_preview: String,
    },
    BackendResponded {
        kind: String,
        model: String,
        duration_secs: f64,
        text_len: usize,
    },
    FallbackApplied {
        kind: String,
        reason: String,
        error: String,
    },
    EvaluationCompleted {
        kind: String,
        source: String,
        score_count: usize,
        duration_secs: f64,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for evaluation events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    console: bool,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            console: true,
            file_writer: None,
        }
    }

    /// Create a logger with JSONL file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            console: true,
            file_writer: Some(Mutex::new(file)),
        })
    }

    /// Suppress console output, keeping only the file sink
    pub fn quiet(mut self) -> Self {
        self.console = false;
        self
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        if !self.console {
            return;
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::EvaluationStarted {
                kind,
                input_preview,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} {} {}",
                    "▶".bright_cyan(),
                    format!("Evaluating {}", kind).bright_cyan().bold(),
                    Self::truncate(input_preview, 60).dimmed()
                );
            }
            LogEvent::BackendResponded {
                model,
                duration_secs,
                text_len,
                ..
            } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} responded ({} chars, {:.1}s)",
                    "✓".bright_green(),
                    model,
                    text_len,
                    duration_secs
                );
            }
            LogEvent::FallbackApplied { reason, error, .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} Using default result ({}): {}",
                    "⚠".bright_yellow(),
                    reason.bright_yellow(),
                    error.dimmed()
                );
            }
            LogEvent::EvaluationCompleted {
                source,
                score_count,
                duration_secs,
                ..
            } => {
                let styled = if source == "backend" {
                    "✓ Done".bright_green().to_string()
                } else {
                    "→ Done (fallback)".bright_yellow().to_string()
                };
                let _ = writeln!(
                    stderr,
                    "  {} {} scores, {:.1}s",
                    styled, score_count, duration_secs
                );
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::EvaluationStarted { kind, .. } => {
                format!("[{}] eval:start:{}", timestamp, kind)
            }
            LogEvent::BackendResponded {
                kind,
                model,
                duration_secs,
                text_len,
            } => format!(
                "[{}] backend:done:{} {} {}c {:.1}s",
                timestamp, kind, model, text_len, duration_secs
            ),
            LogEvent::FallbackApplied { kind, reason, .. } => {
                format!("[{}] fallback:{}:{}", timestamp, kind, reason)
            }
            LogEvent::EvaluationCompleted {
                kind,
                source,
                score_count,
                duration_secs,
            } => format!(
                "[{}] eval:done:{} {} scores={} {:.1}s",
                timestamp, kind, source, score_count, duration_secs
            ),
        };
        let _ = writeln!(stderr, "{}", msg);
    }

    /// Truncate to `max_chars` characters, appending "..." when cut
    fn truncate(s: &str, max_chars: usize) -> String {
        if s.chars().count() > max_chars {
            let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
            format!("{}...", cut)
        } else {
            s.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_output_is_timestamped_jsonl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("events.jsonl");
        let logger = Logger::with_file(LogFormat::Compact, &path).unwrap().quiet();

        logger.log(&LogEvent::EvaluationStarted {
            kind: "proposal".into(),
            input_preview: "Solar".into(),
        });
        logger.log(&LogEvent::FallbackApplied {
            kind: "proposal".into(),
            reason: "unavailable".into(),
            error: "API credential is not configured".into(),
        });

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "evaluation_started");
        assert_eq!(lines[1]["event"], "fallback_applied");
        assert_eq!(lines[1]["reason"], "unavailable");
        assert!(lines[1]["timestamp"].is_string());
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("compact".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(Logger::truncate("héllo", 10), "héllo");
        assert_eq!(Logger::truncate("ééééééé", 5), "éé...");
    }
}
