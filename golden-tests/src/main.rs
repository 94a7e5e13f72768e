use anyhow::{Context, anyhow, bail};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const CASES_ROOT: &str = "golden-tests/tests";
const EXPECTED_REPORT_FILE: &str = "expected-report";
const REPORT_OUTPUT_PATH: &str = "rate-trace.tsv";

/// A directory holding the workbench arguments and, once recorded, the expected report
struct GoldenCase {
    dir: PathBuf,
    args: Vec<String>,
    expected_report: Option<String>,
}

enum Outcome {
    Passed,
    Recorded,
    Mismatch(String),
}

fn main() -> anyhow::Result<()> {
    let cases = discover_cases(Path::new(CASES_ROOT))?;

    let mut failures = 0;
    for case in &cases {
        let label = case.dir.display();
        match case.run() {
            Ok(Outcome::Passed) => println!("{label}: ✅"),
            Ok(Outcome::Recorded) => println!("{label}: recorded a new expected report"),
            Ok(Outcome::Mismatch(diff)) => {
                failures += 1;
                println!("{label}: report differs from the expected one\n{diff}");
            }
            Err(e) => {
                failures += 1;
                println!("{label}: could not run\n{e:?}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} golden tests failed", cases.len());
    }

    Ok(())
}

fn discover_cases(root: &Path) -> anyhow::Result<Vec<GoldenCase>> {
    let entries = fs::read_dir(root)
        .with_context(|| format!("golden tests directory `{}` not found", root.display()))?;

    let mut cases = Vec::new();
    for entry in entries {
        let dir = entry?.path();
        if !dir.is_dir() {
            println!("ignoring `{}`: not a directory", dir.display());
            continue;
        }

        cases.push(GoldenCase::load(dir)?);
    }

    cases.sort_by(|a, b| a.dir.cmp(&b.dir));
    Ok(cases)
}

impl GoldenCase {
    fn load(dir: PathBuf) -> anyhow::Result<Self> {
        let args_path = dir.join("args");
        let args = fs::read_to_string(&args_path)
            .with_context(|| format!("missing `args` file in `{}`", dir.display()))?
            .split_whitespace()
            .map(str::to_owned)
            .collect();

        let report_path = dir.join(EXPECTED_REPORT_FILE);
        let expected_report = report_path
            .is_file()
            .then(|| fs::read_to_string(&report_path))
            .transpose()
            .with_context(|| format!("unreadable expected report `{}`", report_path.display()))?;

        Ok(Self {
            dir,
            args,
            expected_report,
        })
    }

    fn run(&self) -> anyhow::Result<Outcome> {
        let output = Command::new("cargo")
            .args(["run", "--release", "--bin", "rate-workbench", "--"])
            .args(["--output", REPORT_OUTPUT_PATH])
            .args(&self.args)
            .output()
            .context("failed to launch rate-workbench")?;

        if !output.status.success() {
            return Err(anyhow!(
                "rate-workbench exited with {}:\n{}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        let report = fs::read_to_string(REPORT_OUTPUT_PATH)
            .with_context(|| format!("rate-workbench produced no `{REPORT_OUTPUT_PATH}`"))?;

        let Some(expected) = &self.expected_report else {
            fs::write(self.dir.join(EXPECTED_REPORT_FILE), &report)
                .context("failed to record expected report")?;
            return Ok(Outcome::Recorded);
        };

        if *expected == report {
            Ok(Outcome::Passed)
        } else {
            Ok(Outcome::Mismatch(diff::render(expected, &report)))
        }
    }
}

mod diff {
    use console::{Style, style};
    use similar::{ChangeTag, InlineChange, TextDiff};
    use std::fmt::Write;

    const CONTEXT_LINES: usize = 2;

    fn gutter(index: Option<usize>) -> String {
        index.map_or_else(|| " ".repeat(4), |i| format!("{:<4}", i + 1))
    }

    /// Renders a line diff of two reports, underlining the cells that changed
    pub fn render(expected: &str, actual: &str) -> String {
        let diff = TextDiff::from_lines(expected, actual);
        let mut rendered = String::new();

        for (hunk, ops) in diff.grouped_ops(CONTEXT_LINES).iter().enumerate() {
            if hunk > 0 {
                let _ = writeln!(rendered, "{}", "-".repeat(80));
            }

            for change in ops.iter().flat_map(|op| diff.iter_inline_changes(op)) {
                render_change(&mut rendered, &change);
            }
        }

        rendered
    }

    fn render_change(out: &mut String, change: &InlineChange<'_, str>) {
        let (marker, colour) = match change.tag() {
            ChangeTag::Delete => ('-', Style::new().red()),
            ChangeTag::Insert => ('+', Style::new().green()),
            ChangeTag::Equal => (' ', Style::new().dim()),
        };

        let _ = write!(
            out,
            "{}{} |{}",
            style(gutter(change.old_index())).dim(),
            style(gutter(change.new_index())).dim(),
            colour.apply_to(marker).bold()
        );

        for (emphasized, text) in change.iter_strings_lossy() {
            // Column separators
            let text = text.replace('\t', "⇥");
            let styled = if emphasized {
                colour.apply_to(text).underlined()
            } else {
                colour.apply_to(text)
            };
            let _ = write!(out, "{styled}");
        }

        if change.missing_newline() {
            out.push('\n');
        }
    }
}
