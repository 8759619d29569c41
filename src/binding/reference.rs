//! Reference grammar for `{{ ... }}` markers
//!
//! ```text
//! args[N]                          positional run input
//! input.<name>                     named run input
//! <task>.output(.<seg>)*           upstream output, optional field path
//! tasks.<task>.output(.<seg>)*     same, explicit prefix
//! parent_output(.<seg>)*           output of the first dependency
//! ```
//!
//! Numeric path segments index into lists.

use std::fmt;

use super::validate::is_id_byte;

/// One parsed template reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Arg(usize),
    Input(String),
    TaskOutput { task_id: String, path: Vec<String> },
    ParentOutput { path: Vec<String> },
}

impl Reference {
    /// Parse the trimmed content of a marker; the error is a human-readable reason
    pub fn parse(content: &str) -> Result<Self, String> {
        if let Some(rest) = content.strip_prefix("args[") {
            let index = rest
                .strip_suffix(']')
                .ok_or_else(|| format!("'{}' is missing the closing ']'", content))?;
            return index
                .trim()
                .parse::<usize>()
                .map(Reference::Arg)
                .map_err(|_| format!("'{}' needs a non-negative integer index", content));
        }

        if let Some(name) = content.strip_prefix("input.") {
            if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
                return Err(format!("'{}' is not a valid input name", name));
            }
            return Ok(Reference::Input(name.to_string()));
        }

        let mut parts = content.split('.');

        if content == "parent_output" || content.starts_with("parent_output.") {
            parts.next();
            return Ok(Reference::ParentOutput {
                path: parse_path(parts)?,
            });
        }

        let mut task_id = parts.next().unwrap_or_default();
        if task_id == "tasks" {
            task_id = parts.next().unwrap_or_default();
        }
        if task_id.is_empty() || !task_id.bytes().all(is_id_byte) {
            return Err(format!("unknown reference '{}'", content));
        }
        if parts.next() != Some("output") {
            return Err(format!(
                "unknown reference '{}' (expected {}.output)",
                content, task_id
            ));
        }

        Ok(Reference::TaskOutput {
            task_id: task_id.to_string(),
            path: parse_path(parts)?,
        })
    }

    /// Field path after `.output`, if any
    pub fn path(&self) -> &[String] {
        match self {
            Reference::TaskOutput { path, .. } | Reference::ParentOutput { path } => path,
            _ => &[],
        }
    }
}

fn parse_path<'a>(segments: impl Iterator<Item = &'a str>) -> Result<Vec<String>, String> {
    segments
        .map(|seg| {
            if seg.is_empty() {
                Err("empty field path segment".to_string())
            } else if !seg.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-') {
                Err(format!("invalid field path segment '{}'", seg))
            } else {
                Ok(seg.to_string())
            }
        })
        .collect()
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Arg(index) => write!(f, "args[{}]", index),
            Reference::Input(name) => write!(f, "input.{}", name),
            Reference::TaskOutput { task_id, path } => {
                write!(f, "{}.output", task_id)?;
                path.iter().try_for_each(|seg| write!(f, ".{}", seg))
            }
            Reference::ParentOutput { path } => {
                write!(f, "parent_output")?;
                path.iter().try_for_each(|seg| write!(f, ".{}", seg))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, path: &[&str]) -> Reference {
        Reference::TaskOutput {
            task_id: id.to_string(),
            path: path.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn parse_inputs() {
        assert_eq!(Reference::parse("args[0]"), Ok(Reference::Arg(0)));
        assert_eq!(Reference::parse("args[ 12 ]"), Ok(Reference::Arg(12)));
        assert_eq!(
            Reference::parse("input.premise"),
            Ok(Reference::Input("premise".to_string()))
        );
    }

    #[test]
    fn parse_task_outputs() {
        assert_eq!(Reference::parse("outline.output"), Ok(task("outline", &[])));
        assert_eq!(
            Reference::parse("outline.output.scenes.0.act"),
            Ok(task("outline", &["scenes", "0", "act"]))
        );
        assert_eq!(
            Reference::parse("tasks.outline.output.title"),
            Ok(task("outline", &["title"]))
        );
    }

    #[test]
    fn parse_parent_output() {
        assert_eq!(
            Reference::parse("parent_output"),
            Ok(Reference::ParentOutput { path: vec![] })
        );
        assert_eq!(
            Reference::parse("parent_output.title"),
            Ok(Reference::ParentOutput {
                path: vec!["title".to_string()]
            })
        );
    }

    #[test]
    fn reject_unknown_forms() {
        for content in [
            "args[-1]",
            "args[x]",
            "args[0",
            "input.",
            "outline",
            "outline.result",
            "outline.output.",
            "outline.output..title",
            "Outline.output",
            "env.HOME",
            "a b.output",
        ] {
            assert!(Reference::parse(content).is_err(), "{}", content);
        }
    }

    #[test]
    fn display_round_trips() {
        for content in [
            "args[3]",
            "input.tone",
            "outline.output",
            "outline.output.scenes.1.description",
            "parent_output.characters",
        ] {
            assert_eq!(Reference::parse(content).unwrap().to_string(), content);
        }
        assert_eq!(
            Reference::parse("tasks.a.output").unwrap().to_string(),
            "a.output"
        );
    }
}
