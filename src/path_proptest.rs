//! Property-based tests for path manipulation functions.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{archive_name, join_subpath, replace_extension, split_recursive};
    use proptest::prelude::*;
    use std::path::{Path, PathBuf};

    fn segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_-]{1,12}"
    }

    fn relative_dirs() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(segment(), 0..5)
    }

    // ============================================================================
    // replace_extension property tests
    // ============================================================================

    proptest! {
        /// Property: compiling an entry only changes its final extension
        #[test]
        fn replace_extension_keeps_directories(dirs in relative_dirs(), stem in segment()) {
            let mut source = dirs.iter().collect::<PathBuf>();
            source.push(format!("{}.py", stem));

            let artifact = replace_extension(&source, "pyc");

            prop_assert_eq!(artifact.parent(), source.parent());
            prop_assert_eq!(artifact.file_stem(), source.file_stem());
            prop_assert_eq!(artifact.extension().and_then(|e| e.to_str()), Some("pyc"));
        }
    }

    // ============================================================================
    // archive_name property tests
    // ============================================================================

    proptest! {
        /// Property: archive names use forward slashes and keep every segment
        #[test]
        fn archive_name_joins_segments(dirs in relative_dirs(), name in segment()) {
            let mut segments = dirs.clone();
            segments.push(name);
            let relative: PathBuf = segments.iter().collect();

            let entry = archive_name(&relative).unwrap();

            prop_assert_eq!(entry, segments.join("/"));
        }

        /// Property: archive names never start with a separator
        #[test]
        fn archive_name_is_relative(dirs in relative_dirs(), name in segment()) {
            let mut relative: PathBuf = dirs.iter().collect();
            relative.push(name);

            let entry = archive_name(&relative).unwrap();

            prop_assert!(!entry.starts_with('/'));
            prop_assert!(!entry.contains('\\'));
        }
    }

    // ============================================================================
    // split_recursive / join_subpath property tests
    // ============================================================================

    proptest! {
        /// Property: a recursive marker is stripped exactly once
        #[test]
        fn split_recursive_strips_marker(rest in "[a-z*?.]{1,10}") {
            let pattern = format!("**/{}", rest);
            let (recursive, remainder) = split_recursive(&pattern);
            prop_assert!(recursive);
            prop_assert_eq!(remainder, rest.as_str());
        }

        /// Property: patterns without a marker pass through untouched
        #[test]
        fn split_recursive_passthrough(pattern in "[a-z?.][a-z*?.]{0,10}") {
            let (recursive, remainder) = split_recursive(&pattern);
            prop_assert!(!recursive);
            prop_assert_eq!(remainder, pattern.as_str());
        }

        /// Property: both separators produce the same joined path
        #[test]
        fn join_subpath_separator_agnostic(dirs in relative_dirs()) {
            let base = Path::new("base");
            let forward = join_subpath(base, &dirs.join("/"));
            let backward = join_subpath(base, &dirs.join("\\"));
            prop_assert_eq!(&forward, &backward);
            prop_assert!(forward.starts_with(base));
            prop_assert_eq!(forward.components().count(), dirs.len() + 1);
        }
    }
}
