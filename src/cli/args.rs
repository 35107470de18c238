//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `inspect`: List extractable string literals without changing anything
//! - `extract`: Rewrite call sites and update the translation store
//! - `check`: Validate locales against the default locale
//! - `new-locale`: Scaffold a locale from the default locale's records
//! - `init`: Write a starter configuration file

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Inspect(cmd)) => cmd.common.verbose,
            Some(Command::Extract(cmd)) => cmd.common.verbose,
            Some(Command::Check(cmd)) => cmd.common.verbose,
            Some(Command::NewLocale(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Default locale (overrides config file)
    #[arg(long, env = "TSLOC_DEFAULT_LOCALE")]
    pub default_locale: Option<String>,

    /// Translation records directory (overrides config file)
    #[arg(long, env = "TSLOC_TRANSLATIONS_ROOT")]
    pub translations_root: Option<String>,

    /// Plain message function names, comma separated (overrides config file)
    #[arg(long, value_delimiter = ',')]
    pub funcs: Vec<String>,

    /// Format message function names, comma separated (overrides config file)
    #[arg(long, value_delimiter = ',')]
    pub fmtfuncs: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct InspectCommand {
    /// Files or directories to inspect
    #[arg(required = true)]
    pub inputs: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    /// Files or directories to extract from
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Rewrite sources and records in place (default is a dry run)
    #[arg(long)]
    pub apply: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Check a single locale instead of all of them
    #[arg(long)]
    pub locale: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct NewLocaleCommand {
    /// Locale tag to create, e.g. "de" or "pt-BR"
    pub locale: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List extractable string literals with provisional tags
    Inspect(InspectCommand),
    /// Move string literals into the translation store and rewrite call sites
    Extract(ExtractCommand),
    /// Validate locales for consistency with the default locale
    Check(CheckCommand),
    /// Create a new locale seeded from the default locale's records
    NewLocale(NewLocaleCommand),
    /// Initialize a new .tslocrc.json configuration file
    Init,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_extract_args() {
        let args =
            Arguments::parse_from(["tsloc", "extract", "src", "--apply", "--funcs", "send,reply"]);
        let Some(Command::Extract(cmd)) = args.command else {
            panic!("expected extract");
        };
        assert_eq!(cmd.inputs, vec!["src"]);
        assert!(cmd.apply);
        assert_eq!(cmd.common.funcs, vec!["send", "reply"]);
    }

    #[test]
    fn test_check_single_locale() {
        let args = Arguments::parse_from(["tsloc", "check", "--locale", "fr", "--verbose"]);
        assert!(args.verbose());
        let Some(Command::Check(cmd)) = args.command else {
            panic!("expected check");
        };
        assert_eq!(cmd.locale.as_deref(), Some("fr"));
    }

    #[test]
    fn test_inputs_are_required() {
        assert!(Arguments::try_parse_from(["tsloc", "inspect"]).is_err());
    }
}
