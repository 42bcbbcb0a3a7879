//! Strict `{{ variable }}` substitution for batch-script templates.
//!
//! Templates are compiled once into literal and variable segments. Rendering fails on the
//! first placeholder without a value, so a partially filled script is never produced.

use std::{collections::BTreeMap, fs, path::Path};

use crate::error::TemplateError;

/// Flat variable set handed to a template.
pub type TemplateParams = BTreeMap<String, String>;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Variable every job-script template must reference.
pub const JOB_NAME_VAR: &str = "job_name";

const BUILTIN_NAME: &str = "spin.sh";
const BUILTIN_SOURCE: &str = include_str!("../templates/spin.sh");

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Var(String),
}

/// A compiled job-script template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTemplate {
    name: String,
    segments: Vec<Segment>,
}

impl ScriptTemplate {
    /// The template shipped with autospin.
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::parse(BUILTIN_NAME, BUILTIN_SOURCE)?.into_job_script()
    }

    /// Load and compile a job-script template file; the file name becomes the template name.
    ///
    /// The template must reference `{{ job_name }}`: a job queued under another name is never
    /// recognised as desired and would be submitted again on every pass.
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let source = fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse(name, &source)?.into_job_script()
    }

    /// Built-in template when `path` is `None`, the file otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, TemplateError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Self::builtin(),
        }
    }

    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self, TemplateError> {
        let name = name.into();
        let mut segments = Vec::new();
        let mut rest = source;
        let mut consumed = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after_open = &rest[start + OPEN.len()..];
            let end = after_open
                .find(CLOSE)
                .ok_or_else(|| TemplateError::Unterminated {
                    template: name.clone(),
                    offset: consumed + start,
                })?;

            let placeholder = after_open[..end].trim();
            if !is_identifier(placeholder) {
                return Err(TemplateError::InvalidPlaceholder {
                    template: name,
                    placeholder: placeholder.to_string(),
                });
            }
            segments.push(Segment::Var(placeholder.to_string()));

            let advance = start + OPEN.len() + end + CLOSE.len();
            consumed += advance;
            rest = &rest[advance..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { name, segments })
    }

    fn into_job_script(self) -> Result<Self, TemplateError> {
        let names_job = self
            .segments
            .iter()
            .any(|s| matches!(s, Segment::Var(v) if v == JOB_NAME_VAR));
        if names_job {
            Ok(self)
        } else {
            Err(TemplateError::NoJobName {
                template: self.name,
            })
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variable names referenced by the template, deduplicated and sorted.
    pub fn variables(&self) -> Vec<&str> {
        let mut vars: Vec<&str> = self
            .segments
            .iter()
            .filter_map(|s| match s {
                Segment::Var(v) => Some(v.as_str()),
                Segment::Literal(_) => None,
            })
            .collect();
        vars.sort_unstable();
        vars.dedup();
        vars
    }

    pub fn render(&self, params: &TemplateParams) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Var(name) => {
                    let value = params.get(name).ok_or_else(|| TemplateError::MissingVariable {
                        template: self.name.clone(),
                        name: name.clone(),
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> TemplateParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_with_and_without_spaces() {
        let t = ScriptTemplate::parse("t", "a={{a}} b={{ b }} a again={{  a }}").unwrap();
        let out = t.render(&params(&[("a", "1"), ("b", "2")])).unwrap();
        assert_eq!(out, "a=1 b=2 a again=1");
        assert_eq!(t.variables(), vec!["a", "b"]);
    }

    #[test]
    fn missing_variable_fails_instead_of_partial_output() {
        let t = ScriptTemplate::parse("t", "x={{ x }} y={{ y }}").unwrap();
        let err = t.render(&params(&[("x", "1")])).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::MissingVariable { ref name, .. } if name == "y"
        ));
    }

    #[test]
    fn unterminated_placeholder_reports_offset() {
        let err = ScriptTemplate::parse("t", "ok {{ ok }} then {{ broken").unwrap_err();
        assert!(matches!(err, TemplateError::Unterminated { offset: 17, .. }));
    }

    #[test]
    fn rejects_expressions() {
        let err = ScriptTemplate::parse("t", "{{ a | upper }}").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidPlaceholder { .. }));
        assert!(ScriptTemplate::parse("t", "{{}}").is_err());
    }

    #[test]
    fn shell_syntax_passes_through() {
        let src = "echo ${HOME} $((1+2)) \\\n  done";
        let t = ScriptTemplate::parse("t", src).unwrap();
        assert_eq!(t.render(&TemplateParams::new()).unwrap(), src);
    }

    #[test]
    fn builtin_template_compiles() {
        let t = ScriptTemplate::builtin().unwrap();
        assert_eq!(t.name(), "spin.sh");
        let vars = t.variables();
        for expected in [
            "account",
            "bootstrap_addr",
            "environment",
            "job_name",
            "model_args",
            "model_path",
            "ocf_version",
            "sub_process",
            "time_limit",
        ] {
            assert!(vars.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn template_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.sh");
        fs::write(&path, "#SBATCH --job-name={{ job_name }}\n").unwrap();

        let t = ScriptTemplate::load(Some(&path)).unwrap();
        assert_eq!(t.name(), "custom.sh");
        let missing = ScriptTemplate::from_file(&dir.path().join("nope.sh")).unwrap_err();
        assert!(matches!(missing, TemplateError::Read { .. }));
    }

    #[test]
    fn template_file_must_name_the_job() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anonymous.sh");
        fs::write(&path, "#SBATCH --time={{ time_limit }}\nsrun {{ model_path }}\n").unwrap();

        let err = ScriptTemplate::load(Some(&path)).unwrap_err();
        assert!(matches!(err, TemplateError::NoJobName { ref template } if template == "anonymous.sh"));
    }
}
