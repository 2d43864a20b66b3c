//! Command-line argument parsing.
//!
//! Usage:
//!   confex [-z<offset>] [-c<context.json>] [-d<depth>] [-v] -e<script>
//!   confex [-z<offset>] [-c<context.json>] [-d<depth>] [-v] -f<file>
//!   confex [-z<offset>] [-c<context.json>] [-d<depth>] [-v] <script>
//!
//! Option values may be embedded (`-z+02:00`) or separate (`-z +02:00`).

use std::path::{Path, PathBuf};

use crate::config::{parse_timezone, EvalOptions};
use crate::script::Context;

pub const USAGE: &str =
    "Usage: confex [-z<offset>] [-c<context.json>] [-d<depth>] [-v] (-e<script> | -f<file> | <script>)";

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Timezone, nesting limit (`-z`, `-d`).
    pub options: EvalOptions,
    /// JSON context file (`-c<file>`).
    pub context: Option<PathBuf>,
    /// Debug logging (`-v`).
    pub verbose: bool,
    /// The script to evaluate.
    pub script: ScriptSource,
}

/// Where the script text comes from.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum ScriptSource {
    /// No script given.
    #[default]
    Missing,
    /// `-e<script>` or a positional argument.
    Inline(String),
    /// `-f<file>`; `-` reads stdin.
    File(PathBuf),
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Value of the option at `chars[j]`: the rest of this argument if
/// non-empty, otherwise the next argument.
fn option_value(
    flag: char,
    chars: &[char],
    j: &mut usize,
    argv: &[String],
    i: &mut usize,
) -> Result<String, String> {
    if *j + 1 < chars.len() {
        let s: String = chars[*j + 1..].iter().collect();
        *j = chars.len();
        Ok(s)
    } else if *i + 1 < argv.len() {
        *i += 1;
        Ok(argv[*i].clone())
    } else {
        Err(format!("-{flag} requires an argument"))
    }
}

fn set_script(args: &mut CliArgs, source: ScriptSource) -> Result<(), String> {
    if args.script != ScriptSource::Missing {
        return Err("only one script may be given".to_owned());
    }
    args.script = source;
    Ok(())
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            for rest in &argv[i + 1..] {
                set_script(&mut args, ScriptSource::Inline(rest.clone()))?;
            }
            break;
        }

        // Non-flag argument: the script itself.  A leading `-` followed by
        // a digit is a negative number, not a flag.
        let is_number = arg
            .strip_prefix('-')
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()));
        if !arg.starts_with('-') || arg == "-" || is_number {
            set_script(&mut args, ScriptSource::Inline(arg.to_owned()))?;
            i += 1;
            continue;
        }

        // Flag argument: iterate over characters after the leading `-`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'v' => args.verbose = true,

                // -z<offset>
                'z' => {
                    let tz = option_value('z', &chars, &mut j, argv, &mut i)?;
                    args.options.timezone = parse_timezone(&tz)?;
                }

                // -d<depth>
                'd' => {
                    let depth = option_value('d', &chars, &mut j, argv, &mut i)?;
                    args.options.max_depth = depth
                        .parse()
                        .map_err(|_| format!("invalid nesting depth: {depth}"))?;
                }

                // -c<context.json>
                'c' => {
                    let file = option_value('c', &chars, &mut j, argv, &mut i)?;
                    args.context = Some(PathBuf::from(file));
                }

                // -e<script>
                'e' => {
                    let script = option_value('e', &chars, &mut j, argv, &mut i)?;
                    set_script(&mut args, ScriptSource::Inline(script))?;
                }

                // -f<file>
                'f' => {
                    let file = option_value('f', &chars, &mut j, argv, &mut i)?;
                    set_script(&mut args, ScriptSource::File(PathBuf::from(file)))?;
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    if args.script == ScriptSource::Missing {
        return Err("no script given".to_owned());
    }
    Ok(args)
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Read the script text named by `source`.
pub fn load_script(source: &ScriptSource) -> Result<String, String> {
    match source {
        ScriptSource::Missing => Err("no script given".to_owned()),
        ScriptSource::Inline(s) => Ok(s.clone()),
        ScriptSource::File(path) if path.as_os_str() == "-" => {
            std::io::read_to_string(std::io::stdin()).map_err(|e| format!("stdin: {e}"))
        }
        ScriptSource::File(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("{}: {e}", path.display())),
    }
}

/// Load the evaluation context; no file means an empty context.
pub fn load_context(path: Option<&Path>) -> Result<Context, String> {
    let Some(path) = path else {
        return Ok(Context::new());
    };
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    Context::from_json_str(&text).map_err(|e| format!("{}: {e}", path.display()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
