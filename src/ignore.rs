//! `.ormaignore` rules applied while snapshotting the working directory.
//!
//! One pattern per line. `#` starts a comment, a leading `!` re-includes a
//! path excluded by an earlier rule, and a trailing `/` limits the rule to
//! directories. Patterns containing a `/` match the path relative to the
//! working root; all others match the basename. `*` matches any run of
//! characters and `?` matches one. The last matching rule wins.

use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct Rule {
    glob: String,
    negated: bool,
    dir_only: bool,
    anchored: bool,
}

/// Parsed ignore rules. The default value ignores nothing.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: Vec<Rule>,
}

impl IgnoreRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build rules from pattern lines.
    pub fn from_patterns<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut rules = Self::new();
        for line in lines {
            rules.add(line.as_ref());
        }
        rules
    }

    /// Load `file` if it exists; a missing file yields empty rules.
    pub fn load(file: &Path) -> Result<Self> {
        match std::fs::read_to_string(file) {
            Ok(text) => {
                let lines: Vec<&str> = text.lines().collect();
                let rules = Self::from_patterns(&lines);
                log::debug!("loaded {} ignore rules from {}", rules.len(), file.display());
                Ok(rules)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(Error::io(file, e)),
        }
    }

    /// Parse and append a single pattern line.
    pub fn add(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }

        let (negated, rest) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let (dir_only, rest) = match rest.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        let anchored = rest.contains('/');
        let glob = rest.trim_start_matches('/');
        if glob.is_empty() {
            return;
        }

        self.rules.push(Rule {
            glob: glob.to_string(),
            negated,
            dir_only,
            anchored,
        });
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether the slash-separated relative path `rel` is ignored.
    pub fn is_ignored(&self, rel: &str, is_dir: bool) -> bool {
        let basename = rel.rsplit('/').next().unwrap_or(rel);
        let mut ignored = false;
        for rule in &self.rules {
            if rule.dir_only && !is_dir {
                continue;
            }
            let subject = if rule.anchored { rel } else { basename };
            if fnmatch(rule.glob.as_bytes(), subject.as_bytes()) {
                ignored = !rule.negated;
            }
        }
        ignored
    }
}

/// `*` matches any run of bytes, `?` exactly one; everything else literally.
fn fnmatch(pat: &[u8], name: &[u8]) -> bool {
    let (mut pi, mut ni) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ni < name.len() {
        match pat.get(pi).copied() {
            Some(b'*') => {
                backtrack = Some((pi, ni));
                pi += 1;
            }
            Some(c) if c == b'?' || c == name[ni] => {
                pi += 1;
                ni += 1;
            }
            _ => match backtrack {
                Some((star_pi, star_ni)) => {
                    pi = star_pi + 1;
                    ni = star_ni + 1;
                    backtrack = Some((star_pi, star_ni + 1));
                }
                None => return false,
            },
        }
    }

    pat[pi..].iter().all(|&c| c == b'*')
}
