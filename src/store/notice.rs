//! Hit notices
//!
//! When a call is served from the store a notice is emitted through
//! `tracing` at info level. Its message comes from a user template with
//! `{placeholder}` fields; `{{` and `}}` produce literal braces.

use crate::error::{CheckpointError, CkptResult};
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Template used when none is configured
pub const DEFAULT_NOTICE_TEMPLATE: &str =
    "[{cur_time}] Checkpoint: Loading checkpoint created at {date}. Function: {func}, Args: {args}";

/// Facts about a served entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Computation identifier
    pub func: String,
    /// Logic fingerprint
    pub func_hash: String,
    /// Argument representation
    pub args: String,
    /// Entry file
    pub file_path: PathBuf,
    /// Timestamp parsed from the entry name
    pub created_at: NaiveDateTime,
}

impl Notice {
    /// Entry filename
    pub fn filename(&self) -> String {
        self.file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Render with `template` and log at info level, returning the message
    pub fn emit(&self, template: &NoticeTemplate, now: NaiveDateTime) -> String {
        let message = template.render(self, now);
        info!(
            func = %self.func,
            func_hash = %self.func_hash,
            args = %self.args,
            file_path = %self.file_path.display(),
            year = self.created_at.year(),
            month = self.created_at.month(),
            day = self.created_at.day(),
            hour = self.created_at.hour(),
            minute = self.created_at.minute(),
            second = self.created_at.second(),
            weekday = self.created_at.weekday().num_days_from_monday(),
            "{}",
            message
        );
        message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    CurTime,
    FilePath,
    Filename,
    Date,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Weekday,
    Func,
    FuncHash,
    Args,
}

impl Field {
    const ALL: &'static [(&'static str, Field)] = &[
        ("cur_time", Field::CurTime),
        ("file_path", Field::FilePath),
        ("filename", Field::Filename),
        ("date", Field::Date),
        ("year", Field::Year),
        ("month", Field::Month),
        ("day", Field::Day),
        ("hour", Field::Hour),
        ("minute", Field::Minute),
        ("second", Field::Second),
        ("weekday", Field::Weekday),
        ("func", Field::Func),
        ("func_hash", Field::FuncHash),
        ("args", Field::Args),
    ];

    fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
    }

    fn render(self, notice: &Notice, now: NaiveDateTime) -> String {
        let at = notice.created_at;
        match self {
            Self::CurTime => now.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            Self::FilePath => notice.file_path.display().to_string(),
            Self::Filename => notice.filename(),
            Self::Date => at.format("%Y-%m-%d %H:%M:%S").to_string(),
            Self::Year => at.year().to_string(),
            Self::Month => at.month().to_string(),
            Self::Day => at.day().to_string(),
            Self::Hour => at.hour().to_string(),
            Self::Minute => at.minute().to_string(),
            Self::Second => at.second().to_string(),
            Self::Weekday => at.weekday().num_days_from_monday().to_string(),
            Self::Func => notice.func.clone(),
            Self::FuncHash => notice.func_hash.clone(),
            Self::Args => notice.args.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(Field),
}

/// Parsed notice template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl NoticeTemplate {
    /// Parse a template, rejecting unknown placeholders and stray braces
    pub fn parse(template: &str) -> CkptResult<Self> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    text.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    text.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => name.push(ch),
                            None => {
                                return Err(CheckpointError::Template(format!(
                                    "unclosed placeholder `{{{}`",
                                    name
                                )))
                            }
                        }
                    }
                    let field = Field::parse(&name).ok_or_else(|| {
                        CheckpointError::Template(format!("unknown placeholder `{{{}}}`", name))
                    })?;
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(Segment::Field(field));
                }
                '}' => {
                    return Err(CheckpointError::Template(
                        "single `}` outside a placeholder".to_string(),
                    ))
                }
                other => text.push(other),
            }
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// Template text as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Render for a notice at time `now`
    pub fn render(&self, notice: &Notice, now: NaiveDateTime) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(field) => out.push_str(&field.render(notice, now)),
            }
        }
        out
    }
}

impl Default for NoticeTemplate {
    fn default() -> Self {
        Self::parse(DEFAULT_NOTICE_TEMPLATE).unwrap_or_else(|_| Self {
            source: DEFAULT_NOTICE_TEMPLATE.to_string(),
            segments: vec![Segment::Text(DEFAULT_NOTICE_TEMPLATE.to_string())],
        })
    }
}

impl FromStr for NoticeTemplate {
    type Err = CheckpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NoticeTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
