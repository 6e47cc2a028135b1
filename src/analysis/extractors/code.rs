use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::ContentExtractor;
use crate::analysis::{string_list, truncate_chars, Category, ExtractOptions, ExtractedContent, Metadata};
use crate::error::ExtractError;

const METHOD: &str = "code_extractor";

const MAX_SYMBOLS: usize = 5;
const MAX_COMMENTS: usize = 2;
const MAX_COMMENT_CHARS: usize = 200;

static FUNCTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\bdef\s+(\w+)",
        r"\bfunction\s+(\w+)",
        r"\bfunc\s+(\w+)",
        r"\bfn\s+(\w+)",
        r"(\w+)\s*\([^)]*\)\s*\{",
    ])
});

static TYPE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\bclass\s+(\w+)",
        r"\bstruct\s+(\w+)",
        r"\binterface\s+(\w+)",
        r"\btrait\s+(\w+)",
    ])
});

static IMPORT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\bimport\s+([^\n;]+)",
        r"\bfrom\s+(\w+)",
        r#"\brequire\s*\(["']([^"']+)["']"#,
        r"\buse\s+([^\n;]+)",
        r#"#include\s*[<"]([^>"]+)[>"]"#,
    ])
});

static COMMENT_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"(?s)/\*.*?\*/", r"//.*", r"#.*"]));

/// Control-flow keywords the generic call-with-brace pattern picks up
const NOT_FUNCTIONS: &[&str] = &["if", "for", "while", "switch", "catch", "return", "else"];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("static code pattern"))
        .collect()
}

/// Source files: symbols, imports, comments, language
pub struct CodeExtractor;

impl CodeExtractor {
    /// First capture group of every match, deduplicated in order of appearance
    fn collect_captures(patterns: &[Regex], content: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for re in patterns {
            for caps in re.captures_iter(content) {
                if let Some(m) = caps.get(1) {
                    let value = m.as_str().trim().to_string();
                    if !value.is_empty() && !found.contains(&value) {
                        found.push(value);
                    }
                }
            }
        }
        found
    }

    pub fn find_functions(content: &str) -> Vec<String> {
        Self::collect_captures(&FUNCTION_PATTERNS, content)
            .into_iter()
            .filter(|name| !NOT_FUNCTIONS.contains(&name.as_str()))
            .collect()
    }

    pub fn find_types(content: &str) -> Vec<String> {
        Self::collect_captures(&TYPE_PATTERNS, content)
    }

    pub fn find_imports(content: &str) -> Vec<String> {
        Self::collect_captures(&IMPORT_PATTERNS, content)
    }

    pub fn find_comments(content: &str) -> Vec<String> {
        COMMENT_PATTERNS
            .iter()
            .flat_map(|re| re.find_iter(content))
            .map(|m| truncate_chars(m.as_str().trim(), MAX_COMMENT_CHARS))
            .collect()
    }

    /// Language from extension, then from keyword pairs in the content
    pub fn guess_language(path: &Path, content: &str) -> &'static str {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase());

        let by_ext = match ext.as_deref() {
            Some("py") => Some("Python"),
            Some("js") => Some("JavaScript"),
            Some("ts") => Some("TypeScript"),
            Some("java") => Some("Java"),
            Some("cpp") => Some("C++"),
            Some("c") => Some("C"),
            Some("go") => Some("Go"),
            Some("rs") => Some("Rust"),
            Some("rb") => Some("Ruby"),
            Some("php") => Some("PHP"),
            Some("swift") => Some("Swift"),
            Some("kt") => Some("Kotlin"),
            Some("scala") => Some("Scala"),
            Some("hs") => Some("Haskell"),
            Some("ml") => Some("OCaml"),
            Some("fs") => Some("F#"),
            Some("clj") => Some("Clojure"),
            Some("r") => Some("R"),
            _ => None,
        };
        if let Some(language) = by_ext {
            return language;
        }

        if content.contains("def ") && content.contains("import ") {
            "Python"
        } else if content.contains("function") && content.contains("var ") {
            "JavaScript"
        } else if content.contains("func ") && content.contains("package ") {
            "Go"
        } else if content.contains("fn ") && content.contains("use ") {
            "Rust"
        } else {
            "Unknown"
        }
    }
}

impl ContentExtractor for CodeExtractor {
    fn method(&self) -> &'static str {
        METHOD
    }

    fn label(&self) -> &'static str {
        "code file"
    }

    fn category(&self) -> Category {
        Category::SourceCode
    }

    fn accepts(&self, category: Category) -> bool {
        category == Category::SourceCode
    }

    fn try_extract(
        &self,
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<ExtractedContent, ExtractError> {
        let content = fs::read_to_string(path)?;

        let functions = Self::find_functions(&content);
        let types = Self::find_types(&content);
        let imports = Self::find_imports(&content);
        let comments = Self::find_comments(&content);
        let language = Self::guess_language(path, &content);

        tracing::debug!(
            "[CodeExtractor] {}: {} functions, {} types, {} imports ({})",
            path.display(),
            functions.len(),
            types.len(),
            imports.len(),
            language
        );

        let mut metadata = Metadata::new();
        metadata.insert("functions".into(), string_list(functions.into_iter().take(MAX_SYMBOLS)));
        metadata.insert("classes".into(), string_list(types.into_iter().take(MAX_SYMBOLS)));
        metadata.insert("imports".into(), string_list(imports.into_iter().take(MAX_SYMBOLS)));
        metadata.insert("comments".into(), string_list(comments.into_iter().take(MAX_COMMENTS)));
        metadata.insert("language".into(), Value::String(language.to_string()));
        metadata.insert("line_count".into(), Value::from(content.lines().count()));

        Ok(ExtractedContent::new(
            truncate_chars(&content, options.max_chars),
            metadata,
            Category::SourceCode,
            0.8,
            METHOD,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PYTHON: &str = r#"
import os
from pathlib import Path

# Entry point helpers
def hello_world():
    print("Hello, World!")

class TestClass:
    def __init__(self):
        self.value = 42
"#;

    #[test]
    fn test_python_symbols() {
        let mut file = NamedTempFile::with_suffix(".py").unwrap();
        file.write_all(PYTHON.as_bytes()).unwrap();

        let options = ExtractOptions::for_category(Category::SourceCode);
        let content = CodeExtractor.extract(file.path(), &options);

        assert_eq!(content.confidence, 0.8);
        assert_eq!(content.method, "code_extractor");
        let functions = content.meta_list("functions");
        assert!(functions.contains(&"hello_world"));
        assert!(functions.contains(&"__init__"));
        assert_eq!(content.meta_list("classes"), vec!["TestClass"]);
        assert!(content.meta_list("imports").contains(&"os"));
        assert_eq!(content.meta_str("language"), Some("Python"));
        assert_eq!(content.meta_list("comments"), vec!["# Entry point helpers"]);
    }

    #[test]
    fn test_excerpt_truncated() {
        let mut file = NamedTempFile::with_suffix(".py").unwrap();
        file.write_all(PYTHON.as_bytes()).unwrap();

        let options = ExtractOptions::for_category(Category::SourceCode).with_max_chars(10);
        let content = CodeExtractor.extract(file.path(), &options);
        assert_eq!(content.excerpt.chars().count(), 10);
    }

    #[test]
    fn test_generic_pattern_skips_control_flow() {
        let js = "function load(url) {\n  if (url) {\n    return fetch(url);\n  }\n}\n";
        assert_eq!(CodeExtractor::find_functions(js), vec!["load"]);
    }

    #[test]
    fn test_symbol_lists_capped() {
        let src: String = (0..8).map(|i| format!("fn f{}() {{}}\n", i)).collect();
        let mut file = NamedTempFile::with_suffix(".rs").unwrap();
        file.write_all(src.as_bytes()).unwrap();

        let content = CodeExtractor.extract(file.path(), &ExtractOptions::for_category(Category::SourceCode));
        assert_eq!(content.meta_list("functions").len(), 5);
    }

    #[test]
    fn test_language_from_content() {
        let path = Path::new("script");
        assert_eq!(CodeExtractor::guess_language(path, "package main\nfunc main() {}"), "Go");
        assert_eq!(CodeExtractor::guess_language(path, "use std::fs;\nfn main() {}"), "Rust");
        assert_eq!(CodeExtractor::guess_language(path, "plain"), "Unknown");
        assert_eq!(CodeExtractor::guess_language(Path::new("a.KT"), ""), "Kotlin");
    }

    #[test]
    fn test_c_include() {
        assert_eq!(CodeExtractor::find_imports("#include <stdio.h>\n"), vec!["stdio.h"]);
    }
}
