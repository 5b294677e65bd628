//! # Error Suggestions
//!
//! Errors raised by the CLI say what went wrong and how to fix it. Each
//! helper returns an `anyhow::Error` whose message ends in `hint:` lines.

use std::path::Path;

use crate::arch::Arch;
use crate::defaults::DEFAULT_CONFIG_FILENAME;

/// The configuration file given explicitly does not exist.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a {default} file in your project root\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set the DISTPACK_CONFIG environment variable",
        path = path.display(),
        default = DEFAULT_CONFIG_FILENAME,
    )
}

/// The architecture argument is not one of the supported values.
pub fn unknown_arch(value: &str) -> anyhow::Error {
    let names: Vec<&str> = Arch::ALL.iter().map(|a| a.name()).collect();
    let did_you_mean = find_similar(&value.to_lowercase(), &names)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Unknown architecture: {value}{did_you_mean}\n\n\
         Supported architectures are: {names}",
        names = names.join(", ")
    )
}

/// The bytecode compiler cannot be started.
pub fn interpreter_unavailable(interpreter: &Path, error: &dyn std::fmt::Display) -> anyhow::Error {
    anyhow::anyhow!(
        "Python interpreter is not usable: {interpreter}\n\
         error: {error}\n\n\
         hint: Use --python to point at a working interpreter\n\
         hint: Use --no-compile to copy sources without compiling them",
        interpreter = interpreter.display()
    )
}

/// A `--pattern` filter is not a valid glob.
pub fn invalid_glob(pattern: &str, error: &glob::PatternError) -> anyhow::Error {
    anyhow::anyhow!(
        "Invalid glob pattern: {pattern}\n\
         error: {error}\n\n\
         hint: Use * for single path component, ** for recursive matching\n\
         hint: Use [abc] for character classes, [!abc] to negate"
    )
}

/// Closest candidate within edit distance 2, if any.
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|&candidate| (candidate, edit_distance(input, candidate)))
        .filter(|&(_, distance)| distance <= 2 && distance < input.len())
        .min_by_key(|&(_, distance)| distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein distance, single-row variant.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != *cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(row[j + 1] + 1);
        }
    }

    row[b.len()]
}
