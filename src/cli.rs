//! Command-line interface
//!
//! Supports:
//! - Compiling mnemonic names into chords
//! - Decoding raw key codes
//! - Checking a shortcut file against an in-memory keymap

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::host::{KeymapId, MemoryHost};
use crate::keymap::{
    compile, decode, human_readable, load_shortcuts_file, to_letter, to_letter_verbose,
    KeymapError, LoadedShortcut, MenuItem, Outcome, RawEvent, Registrar, SHORTCUTS_FILE_NAME,
};

/// Mnemonic keyboard shortcuts
#[derive(Parser, Debug)]
#[command(name = "mnemokeys", version, about = "Mnemonic keyboard shortcuts")]
pub struct CliArgs {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Compile shortcut names into key chords
    Compile {
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
    },
    /// Decode raw key codes
    Decode {
        #[arg(value_name = "CODE", required = true, allow_negative_numbers = true)]
        codes: Vec<i64>,
    },
    /// Normalize raw key codes to the letters they were typed with
    Letter {
        #[arg(value_name = "CODE", required = true)]
        codes: Vec<i64>,
        /// Keep the C-/M- modifier
        #[arg(short, long)]
        verbose: bool,
    },
    /// Spell out the chords of a name ("enter_yank" → "Control-E Control-Y")
    Human {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Register a shortcut file into an empty keymap and report conflicts
    Check {
        /// Defaults to shortcuts.yaml in the current directory
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
struct CompiledReport {
    name: String,
    letters: String,
    chords: String,
    keymap: String,
    menu_item: Option<MenuItem>,
}

#[derive(Debug, Serialize)]
struct DecodedReport {
    code: i64,
    key: Option<String>,
    character: Option<char>,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    file: PathBuf,
    outcomes: Vec<LoadedShortcut>,
    errors: Vec<String>,
    menu: Vec<MenuItem>,
}

impl CheckReport {
    fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.outcomes.iter().all(|s| s.outcome.is_bound())
    }
}

/// Output of a CLI run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOutput {
    pub text: String,
    /// False when `check` found dropped shortcuts or malformed entries
    pub success: bool,
}

impl CliArgs {
    /// Run the selected command and render its output
    pub fn run(&self) -> Result<CliOutput, KeymapError> {
        match &self.command {
            CliCommand::Compile { names } => {
                let reports = names
                    .iter()
                    .map(|name| compile_report(name))
                    .collect::<Result<Vec<_>, _>>()?;
                self.render(&reports, |out| {
                    for r in &reports {
                        let _ = writeln!(out, "{}\t{}\t{}", r.name, r.chords, r.keymap);
                    }
                })
            }
            CliCommand::Decode { codes } => {
                let reports: Vec<DecodedReport> = codes
                    .iter()
                    .map(|&code| {
                        let event = decode(&RawEvent::Code(code));
                        DecodedReport {
                            code,
                            key: event.key.map(|k| k.to_string()),
                            character: event.character(),
                        }
                    })
                    .collect();
                self.render(&reports, |out| {
                    for r in &reports {
                        let shown = r
                            .key
                            .clone()
                            .or_else(|| r.character.map(String::from))
                            .unwrap_or_else(|| "unknown".to_string());
                        let _ = writeln!(out, "{}\t{}", r.code, shown);
                    }
                })
            }
            CliCommand::Letter { codes, verbose } => {
                let letters: Vec<Option<String>> = codes
                    .iter()
                    .map(|&code| {
                        if *verbose {
                            to_letter_verbose(code)
                        } else {
                            to_letter(code).map(String::from)
                        }
                    })
                    .collect();
                self.render(&letters, |out| {
                    for letter in &letters {
                        let _ = writeln!(out, "{}", letter.as_deref().unwrap_or(""));
                    }
                })
            }
            CliCommand::Human { name } => {
                let words = human_readable(name);
                self.render(&words, |out| {
                    let _ = writeln!(out, "{}", words);
                })
            }
            CliCommand::Check { file } => {
                let file = file
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(SHORTCUTS_FILE_NAME));
                let report = check_file(file)?;
                let success = report.is_clean();
                let mut output = self.render(&report, |out| render_check(out, &report))?;
                output.success = success;
                Ok(output)
            }
        }
    }

    fn render<T: Serialize>(
        &self,
        value: &T,
        text: impl FnOnce(&mut String),
    ) -> Result<CliOutput, KeymapError> {
        let text = if self.json {
            let mut json = serde_json::to_string_pretty(value)
                .map_err(|e| KeymapError::Parse(e.to_string()))?;
            json.push('\n');
            json
        } else {
            let mut out = String::new();
            text(&mut out);
            out
        };
        Ok(CliOutput {
            text,
            success: true,
        })
    }
}

fn compile_report(name: &str) -> Result<CompiledReport, KeymapError> {
    let compiled = compile(name)?;
    let keymap = if compiled.search {
        KeymapId::Isearch
    } else {
        KeymapId::Global
    };
    Ok(CompiledReport {
        letters: compiled.letters,
        chords: compiled.chords.to_string(),
        keymap: keymap.to_string(),
        menu_item: compiled.menu_item,
        name: compiled.name,
    })
}

fn check_file(file: PathBuf) -> Result<CheckReport, KeymapError> {
    let entries = load_shortcuts_file(&file)?;
    let mut host = MemoryHost::new();
    let mut registrar = Registrar::new();

    let report = registrar.define_all(&mut host, entries, &file);

    Ok(CheckReport {
        file,
        outcomes: report.outcomes,
        errors: report.errors.iter().map(ToString::to_string).collect(),
        menu: registrar.drain_menu_items(),
    })
}

fn render_check(out: &mut String, report: &CheckReport) {
    for checked in &report.outcomes {
        let origin = checked
            .origin
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        let _ = match &checked.outcome {
            Outcome::Bound { keymap, chords } => {
                writeln!(out, "ok       {:<8} {:<16} {}", keymap, chords, origin)
            }
            Outcome::Rebound {
                keymap,
                chords,
                unbound_prefix,
            } => writeln!(
                out,
                "rebound  {:<8} {:<16} {} (unbound {})",
                keymap, chords, origin, unbound_prefix
            ),
            Outcome::Dropped {
                keymap,
                chords,
                reason,
            } => writeln!(
                out,
                "dropped  {:<8} {:<16} {} ({})",
                keymap, chords, origin, reason
            ),
        };
    }
    for error in &report.errors {
        let _ = writeln!(out, "error    {}", error);
    }
    if !report.menu.is_empty() {
        let _ = writeln!(out, "menu:");
        for item in &report.menu {
            let _ = writeln!(out, "  {} > {}", item.category, item.label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> CliOutput {
        let args = CliArgs::try_parse_from(std::iter::once("mnemokeys").chain(args.iter().copied()))
            .unwrap();
        args.run().unwrap()
    }

    #[test]
    fn test_compile_text() {
        let output = run(&["compile", "enter_yank", "search_copy"]);
        assert_eq!(
            output.text,
            "enter_yank\tC-e C-y\tglobal\nsearch_copy\tC-c\tisearch\n"
        );
    }

    #[test]
    fn test_compile_json() {
        let output = run(&["--json", "compile", "enter_yank"]);
        let value: serde_json::Value = serde_json::from_str(&output.text).unwrap();
        assert_eq!(value[0]["chords"], "C-e C-y");
        assert_eq!(value[0]["menu_item"]["category"], "Enter");
    }

    #[test]
    fn test_compile_malformed_name_fails() {
        let args = CliArgs::try_parse_from(["mnemokeys", "compile", "enter-yank"]).unwrap();
        assert!(matches!(
            args.run(),
            Err(KeymapError::MalformedMnemonic { .. })
        ));
    }

    #[test]
    fn test_decode_and_letter() {
        assert_eq!(run(&["decode", "134217825"]).text, "134217825\tmeta_a\n");
        assert_eq!(run(&["letter", "5", "32"]).text, "e\n \n");
        assert_eq!(run(&["letter", "-v", "5"]).text, "C-e\n");
    }

    #[test]
    fn test_human() {
        assert_eq!(
            run(&["human", "enter_yank"]).text,
            "Control-E Control-Y\n"
        );
    }

    #[test]
    fn test_compile_requires_names() {
        assert!(CliArgs::try_parse_from(["mnemokeys", "compile"]).is_err());
    }
}
