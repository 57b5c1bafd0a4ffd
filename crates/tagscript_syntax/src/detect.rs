//! Dialect detection for files.
//!
//! The extension decides dialect, flavor and program kind. `.cfc` files can be written either as a script class or
//! as a template `<cfcomponent>`, so their content is sniffed.
//!
//! ## Examples
//! ```rust
//! use std::path::Path;
//! use tagscript_core::Flavor;
//! use tagscript_syntax::config::{Dialect, ProgramKind};
//! use tagscript_syntax::detect::detect;
//!
//! let detection = detect(Path::new("Widget.cfc"), "<cfcomponent>\n</cfcomponent>");
//! assert_eq!(detection.source_type.dialect, Dialect::Template);
//! assert_eq!(detection.source_type.flavor, Flavor::Cf);
//! assert_eq!(detection.program_kind, ProgramKind::Declaration);
//! ```

use std::path::Path;

use crate::config::{Dialect, ProgramKind, SourceType};
use tagscript_core::Flavor;

/// Extensions the detector recognises, for directory walks.
pub const KNOWN_EXTENSIONS: &[&str] = &["cfs", "cfm", "cfml", "cfc", "bxm", "bxs", "bx"];

/// What a file is and how it should be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Detection {
    pub source_type: SourceType,
    pub program_kind: ProgramKind,
}

impl Detection {
    const fn new(dialect: Dialect, flavor: Flavor, program_kind: ProgramKind) -> Self {
        Self {
            source_type: SourceType::new(dialect, flavor),
            program_kind,
        }
    }
}

/// Detect the source type and program kind of `path`; `text` is only read for `.cfc` files.
pub fn detect(path: &Path, text: &str) -> Detection {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let detection = match extension.as_str() {
        "cfs" => Detection::new(Dialect::Script, Flavor::Cf, ProgramKind::Document),
        "cfc" => Detection::new(sniff(text), Flavor::Cf, ProgramKind::Declaration),
        "bxm" => Detection::new(Dialect::Template, Flavor::Box, ProgramKind::Document),
        "bxs" => Detection::new(Dialect::Script, Flavor::Box, ProgramKind::Document),
        "bx" => Detection::new(Dialect::Script, Flavor::Box, ProgramKind::Declaration),
        // `cfm`, `cfml` and anything unknown
        _ => Detection::new(Dialect::Template, Flavor::Cf, ProgramKind::Document),
    };
    tracing::trace!(path = %path.display(), ?detection, "detected source type");
    detection
}

/// Whether `path` has an extension [`detect`] knows.
pub fn is_known(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| KNOWN_EXTENSIONS.iter().any(|k| k.eq_ignore_ascii_case(e)))
}

/// Guess whether a component file is written in the script or the template dialect.
///
/// Blank lines, `//` lines and `/* */` or `<!--- --->` comments are skipped. Other lines are scanned in order
/// until one carries a script or template signal; lines with neither are passed over. Script is the default.
pub fn sniff(text: &str) -> Dialect {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut closer: Option<&str> = None;
    for line in text.lines() {
        let line = line.trim().to_ascii_lowercase();
        if let Some(end) = closer {
            if let Some(at) = line.find(end) {
                closer = None;
                let rest = line[at + end.len()..].trim();
                if let Some(dialect) = decide(rest) {
                    return dialect;
                }
            }
            continue;
        }
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if let Some((open, close)) = [("/*", "*/"), ("<!---", "--->")]
            .into_iter()
            .find(|(open, _)| line.starts_with(open))
        {
            match line[open.len()..].find(close) {
                Some(at) => {
                    let rest = line[open.len() + at + close.len()..].trim();
                    if let Some(dialect) = decide(rest) {
                        return dialect;
                    }
                }
                None => closer = Some(close),
            }
            continue;
        }
        if let Some(dialect) = decide(&line) {
            return dialect;
        }
    }
    Dialect::Script
}

/// The dialect a lower-cased, trimmed line gives away, if any.
fn decide(line: &str) -> Option<Dialect> {
    if line.starts_with("component")
        || line.starts_with("interface")
        || ((line.starts_with("abstract") || line.starts_with("final")) && line.contains("component"))
    {
        return Some(Dialect::Script);
    }
    if line.starts_with("<cfcomponent") || line.starts_with("<cfinterface") || line.starts_with("<cfscript") {
        return Some(Dialect::Template);
    }
    None
}
