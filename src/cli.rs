use clap::Parser;

use crate::zip::{ExtractOptions, NameEncoding, UnsupportedPolicy};

#[derive(Parser, Debug)]
#[command(name = "memzip")]
#[command(version)]
#[command(about = "Extract ZIP archives in memory and verify their contents", long_about = None)]
#[command(after_help = "Examples:\n  \
  memzip data1.zip -x joe        test all files except joe in data1.zip\n  \
  memzip -p foo.zip | more       send contents of foo.zip via pipe into more\n  \
  memzip -l https://example.com/archive.zip   list files of a remote ZIP")]
pub struct Cli {
    /// ZIP file path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Files to extract (default: all)
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Decode contents as UTF-8 text, failing on invalid data
    #[arg(short = 't')]
    pub text: bool,

    /// Exclude files that follow
    #[arg(short = 'x', value_name = "FILE", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Encoding of names not flagged as UTF-8 (utf8, cp437, latin1)
    #[arg(short = 'O', value_name = "ENCODING", default_value = "utf8")]
    pub name_encoding: NameEncoding,

    /// Skip entries with unsupported compression instead of failing
    #[arg(short = 's')]
    pub skip_unsupported: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Print debug logs to stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Extraction options selected on the command line
    pub fn extract_options(&self) -> ExtractOptions {
        let options = ExtractOptions::new().name_encoding(self.name_encoding);
        let options = if self.text { options.text() } else { options };
        if self.skip_unsupported {
            options.on_unsupported(UnsupportedPolicy::Skip)
        } else {
            options
        }
    }

    /// Whether an entry name is selected by the FILES arguments and not excluded by `-x`
    pub fn selects(&self, name: &str) -> bool {
        if !self.files.is_empty() {
            let matches = self.files.iter().any(|f| {
                if has_glob_chars(f) {
                    glob_match(f, name)
                } else {
                    // No wildcards: exact match on the full path or the base name
                    let basename = name.rsplit(['/', '\\']).next().unwrap_or(name);
                    name == f.as_str() || basename == f.as_str()
                }
            });
            if !matches {
                return false;
            }
        }

        !self
            .exclude
            .iter()
            .any(|x| name.contains(x.as_str()) || glob_match(x, name))
    }
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            (None, None) => true,
            (Some('*'), _) => {
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::ContentMode;

    #[test]
    fn glob() {
        assert!(glob_match("*.txt", "readme.txt"));
        assert!(glob_match("file?.dat", "file1.dat"));
        assert!(glob_match("docs/*", "docs/a/b.md"));
        assert!(!glob_match("*.txt", "readme.md"));
        assert!(!glob_match("file?.dat", "file.dat"));
    }

    #[test]
    fn selection() {
        let cli = Cli::parse_from(["memzip", "a.zip", "*.txt", "logo.png", "-x", "secret"]);
        assert!(cli.selects("notes.txt"));
        assert!(cli.selects("img/logo.png"));
        assert!(!cli.selects("secret.txt"));
        assert!(!cli.selects("data.bin"));

        let all = Cli::parse_from(["memzip", "a.zip"]);
        assert!(all.selects("anything/at/all"));
    }

    #[test]
    fn options_from_flags() {
        let cli = Cli::parse_from(["memzip", "-t", "-s", "-O", "cp437", "a.zip"]);
        let options = cli.extract_options();
        assert!(matches!(options.content, ContentMode::Text(_)));
        assert_eq!(options.on_unsupported, UnsupportedPolicy::Skip);
        assert_eq!(options.name_encoding, NameEncoding::Cp437);

        let cli = Cli::parse_from(["memzip", "a.zip"]);
        assert_eq!(cli.name_encoding, NameEncoding::Utf8Lossy);
        assert!(Cli::try_parse_from(["memzip", "-O", "ebcdic", "a.zip"]).is_err());
    }
}
