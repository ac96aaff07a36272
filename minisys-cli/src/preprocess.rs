//! Textual `#include` substitution (spec.md §1's "external collaborator"):
//! a line-oriented pass that inlines the referenced file's contents before
//! the source ever reaches the lexer. Purely textual, no macro expansion,
//! no conditional compilation — matching the minimal preprocessor the
//! core's Non-goals keep out of scope.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("could not read included file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("circular #include of '{}'", .0.display())]
    Circular(PathBuf),
    #[error("malformed #include directive: '{0}'")]
    Malformed(String),
}

pub fn preprocess(source: &str, base_dir: &Path) -> Result<String, PreprocessError> {
    let mut stack = HashSet::new();
    expand(source, base_dir, &mut stack)
}

fn expand(source: &str, base_dir: &Path, stack: &mut HashSet<PathBuf>) -> Result<String, PreprocessError> {
    let mut out = String::with_capacity(source.len());
    for line in source.lines() {
        match line.trim_start().strip_prefix("#include") {
            Some(rest) => {
                let target = parse_include_target(rest)?;
                let path = base_dir.join(&target);
                let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
                if !stack.insert(canonical.clone()) {
                    return Err(PreprocessError::Circular(path));
                }
                let contents = fs::read_to_string(&path).map_err(|source| PreprocessError::Read {
                    path: path.clone(),
                    source,
                })?;
                let included_dir = path.parent().unwrap_or(base_dir).to_path_buf();
                out.push_str(&expand(&contents, &included_dir, stack)?);
                out.push('\n');
                stack.remove(&canonical);
            }
            None => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    Ok(out)
}

fn parse_include_target(rest: &str) -> Result<String, PreprocessError> {
    let rest = rest.trim();
    let close = match rest.chars().next() {
        Some('"') => '"',
        Some('<') => '>',
        _ => return Err(PreprocessError::Malformed(rest.to_string())),
    };
    let body = &rest[1..];
    let end = body
        .find(close)
        .ok_or_else(|| PreprocessError::Malformed(rest.to_string()))?;
    Ok(body[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn inlines_a_quoted_include() {
        let dir = tempfile::tempdir().unwrap();
        let header_path = dir.path().join("globals.mc");
        std::fs::File::create(&header_path).unwrap().write_all(b"int g;\n").unwrap();

        let source = "#include \"globals.mc\"\nint main() { return g; }\n";
        let result = preprocess(source, dir.path()).unwrap();
        assert!(result.contains("int g;"));
        assert!(result.contains("int main()"));
    }

    #[test]
    fn detects_circular_includes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.mc");
        let b = dir.path().join("b.mc");
        std::fs::File::create(&a).unwrap().write_all(b"#include \"b.mc\"\n").unwrap();
        std::fs::File::create(&b).unwrap().write_all(b"#include \"a.mc\"\n").unwrap();

        let source = "#include \"a.mc\"\n";
        let result = preprocess(source, dir.path());
        assert!(matches!(result, Err(PreprocessError::Circular(_))));
    }

    #[test]
    fn leaves_plain_source_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let source = "int main() { return 0; }\n";
        assert_eq!(preprocess(source, dir.path()).unwrap(), source);
    }
}
