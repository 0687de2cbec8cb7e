//! Test harness for the indentation engine against fixture files.
//!
//! Fixtures live in the top-level test/ directory:
//!
//! - `test/newline/*.py`: source typed so far; the cursor is at the end.
//!   The matching `.indent` file holds the expected indentation of the new
//!   line.
//! - `test/align/*.py`: source whose last character was just typed. The
//!   matching `.indent` file holds the column the last line is realigned
//!   to, or `none` when it must be left alone.
//! - `test/filter/*.txt`: lines to filter, compared line by line with the
//!   matching `.out` file (trailing whitespace ignored).
//!
//! The final newline of every fixture file is not part of the fixture.

use std::fs;
use std::path::{Path, PathBuf};

use libpyindent::{
    apply_edits, deindent_edit, filter_line, indent_width, new_line_indent, Buffer, LastCommand,
    Selection, Settings, TextBuffer,
};

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// All fixture files matching `pattern` under the test root, sorted.
fn fixture_files(pattern: &str) -> Vec<PathBuf> {
    let pattern = test_root().join(pattern);
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .expect("fixture pattern should be valid")
        .flatten()
        .collect();
    files.sort();
    files
}

/// Read a fixture, dropping the final newline.
fn read_fixture(path: &Path) -> Result<String, String> {
    let mut content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    if content.ends_with('\n') {
        content.pop();
    }
    Ok(content)
}

fn read_expected(path: &Path, ext: &str) -> Result<String, String> {
    let expected = path.with_extension(ext);
    Ok(read_fixture(&expected)?.trim().to_string())
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

/// Run a single new-line fixture.
fn run_newline_test(path: &Path) -> Result<(), String> {
    let source = read_fixture(path)?;
    let expected: usize = read_expected(path, "indent")?
        .parse()
        .map_err(|e| format!("{}: Bad .indent file: {}", file_name(path), e))?;

    let buffer = TextBuffer::new(source);
    let actual = new_line_indent(&buffer, buffer.len(), &Settings::default())
        .map_err(|e| format!("{}: Unexpected error: {}", file_name(path), e))?;

    if actual != expected {
        return Err(format!(
            "{}: Indent mismatch\n    expected: {}\n    actual:   {}",
            file_name(path),
            expected,
            actual
        ));
    }
    println!("  {} => {}", file_name(path), actual);
    Ok(())
}

/// Run a single alignment fixture through the deindent command.
fn run_align_test(path: &Path) -> Result<(), String> {
    let source = read_fixture(path)?;
    let expected = read_expected(path, "indent")?;
    let typed = source
        .chars()
        .last()
        .ok_or_else(|| format!("{}: Empty fixture", file_name(path)))?;

    let buffer = TextBuffer::new(source);
    let last = LastCommand::Insert {
        characters: typed.to_string(),
    };
    let edit = deindent_edit(
        &buffer,
        Selection::cursor(buffer.len()),
        &last,
        &Settings::default(),
    )
    .map_err(|e| format!("{}: Unexpected error: {}", file_name(path), e))?;

    let actual = match edit {
        None => "none".to_string(),
        Some(edit) => {
            let (text, _) = apply_edits(&buffer, &[edit])
                .map_err(|e| format!("{}: Failed to apply edit: {}", file_name(path), e))?;
            let last_line = text.rsplit('\n').next().unwrap_or("");
            indent_width(last_line, Settings::default().tab_size).to_string()
        }
    };

    if actual != expected {
        return Err(format!(
            "{}: Alignment mismatch\n    expected: {}\n    actual:   {}",
            file_name(path),
            expected,
            actual
        ));
    }
    println!("  {} => {}", file_name(path), actual);
    Ok(())
}

/// Run a single filter fixture.
fn run_filter_test(path: &Path) -> Result<(), String> {
    let input = read_fixture(path)?;
    let expected = read_fixture(&path.with_extension("out"))?;

    let inputs: Vec<&str> = input.lines().collect();
    let outputs: Vec<&str> = expected.lines().collect();
    if inputs.len() != outputs.len() {
        return Err(format!(
            "{}: {} input lines but {} expected lines",
            file_name(path),
            inputs.len(),
            outputs.len()
        ));
    }

    for (line, want) in inputs.iter().zip(outputs) {
        let got = filter_line(line);
        if got.trim_end() != want.trim_end() {
            return Err(format!(
                "{}: Filter mismatch for {:?}\n    expected: {:?}\n    actual:   {:?}",
                file_name(path),
                line,
                want,
                got
            ));
        }
    }
    println!("  {} => {} lines", file_name(path), inputs.len());
    Ok(())
}

/// Run every fixture matching `pattern` and fail with a summary on errors.
fn run_all(pattern: &str, run: fn(&Path) -> Result<(), String>) {
    let files = fixture_files(pattern);
    assert!(!files.is_empty(), "No fixtures found for {}", pattern);

    println!("\nRunning {} {} fixtures:", files.len(), pattern);

    let mut passed = 0;
    let mut errors: Vec<String> = Vec::new();
    for file in &files {
        match run(file) {
            Ok(()) => passed += 1,
            Err(e) => errors.push(e),
        }
    }

    println!("\nResults: {} passed, {} failed", passed, errors.len());
    if !errors.is_empty() {
        println!("\nErrors:");
        for error in &errors {
            println!("  - {}", error);
        }
    }

    assert!(errors.is_empty(), "{} {} fixtures failed", errors.len(), pattern);
}

#[test]
fn test_all_newline_fixtures() {
    run_all("newline/*.py", run_newline_test);
}

#[test]
fn test_all_align_fixtures() {
    run_all("align/*.py", run_align_test);
}

#[test]
fn test_all_filter_fixtures() {
    run_all("filter/*.txt", run_filter_test);
}

#[test]
fn test_not_found_never_edits() {
    for path in fixture_files("align/*.py") {
        if read_expected(&path, "indent").unwrap() != "none" {
            continue;
        }
        let source = read_fixture(&path).unwrap();
        let buffer = TextBuffer::new(source.clone());
        let typed = source.chars().last().unwrap().to_string();
        let edit = deindent_edit(
            &buffer,
            Selection::cursor(buffer.len()),
            &LastCommand::Insert { characters: typed },
            &Settings::default(),
        )
        .unwrap();
        assert!(edit.is_none(), "{} produced an edit", file_name(&path));
        assert_eq!(buffer.text(), source);
    }
}
