use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "pckedit")]
#[command(version)]
#[command(about = "Extract, list, repack and replace sounds in PCK archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  pckedit bgm.pck extract-all                  extract every sound into output_bgm/\n  \
  pckedit bgm.pck extract title.ogg            extract one sound into the current directory\n  \
  pckedit bgm.pck repack sounds/ order.txt     build bgm.pck from sounds/ in the listed order\n  \
  pckedit bgm.pck replace title.ogg new.ogg    write output_bgm/bgm.pck with title.ogg swapped\n  \
  pckedit bgm.pck list-all                     write the sound names to bgm.txt")]
pub struct Cli {
    /// PCK archive path (input, or output for repack)
    #[arg(value_name = "PCK")]
    pub archive: PathBuf,

    #[command(subcommand)]
    pub mode: Mode,

    /// Write output into DIR instead of the default location
    #[arg(short = 'd', long = "output-dir", value_name = "DIR", global = true)]
    pub output_dir: Option<PathBuf>,

    /// Also write all log messages, per-entry lines included, to FILE
    #[arg(long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Show every entry as it is processed
    #[arg(short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Extract every sound
    #[command(short_flag = 'E', long_flag = "ExtractAll")]
    ExtractAll,

    /// Build a new archive from a folder and an ordered list of sound names
    #[command(short_flag = 'R', long_flag = "RepackAll")]
    Repack {
        /// Folder holding the sounds
        #[arg(value_name = "SOUNDS_DIR")]
        source_dir: PathBuf,
        /// Text file with one sound name per line, in archive order
        #[arg(value_name = "NAMES_TXT")]
        names_file: PathBuf,
    },

    /// Extract a single sound
    #[command(short_flag = 'e', long_flag = "Extract", visible_alias = "extract-one")]
    Extract {
        #[arg(value_name = "SOUND_NAME")]
        name: String,
    },

    /// Replace a sound with another file; the entry takes the new file's name
    #[command(short_flag = 'r', long_flag = "Replace")]
    Replace {
        #[arg(value_name = "SOUND_NAME")]
        name: String,
        #[arg(value_name = "NEW_SOUND")]
        new_file: PathBuf,
    },

    /// Write the names of all sounds to a text file
    #[command(short_flag = 'L', long_flag = "ListAll")]
    ListAll,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Console log level: `-v` shows every entry, `-q` only warnings and
    /// `-qq` only errors. `-v` wins over `-q`.
    pub fn console_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.is_very_quiet() {
            Level::ERROR
        } else if self.is_quiet() {
            Level::WARN
        } else {
            Level::INFO
        }
    }

    /// Archive file name without its extension, as used for default outputs.
    pub fn archive_stem(&self) -> String {
        self.archive
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// `output_<stem>` unless a directory was given.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("output_{}", self.archive_stem())))
    }

    /// Only the default output directory is wiped before writing.
    pub fn cleans_output_dir(&self) -> bool {
        self.output_dir.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommand_names() {
        let cli = Cli::try_parse_from(["pckedit", "bgm.pck", "extract", "a.ogg"]).unwrap();
        assert_eq!(cli.mode, Mode::Extract { name: "a.ogg".into() });
        assert_eq!(cli.output_dir(), PathBuf::from("output_bgm"));
        assert!(cli.cleans_output_dir());
    }

    #[test]
    fn parses_original_mode_flags() {
        let cli = Cli::try_parse_from(["pckedit", "bgm.pck", "-E"]).unwrap();
        assert_eq!(cli.mode, Mode::ExtractAll);

        let cli = Cli::try_parse_from(["pckedit", "bgm.pck", "--Replace", "a.ogg", "b.ogg"]).unwrap();
        assert_eq!(
            cli.mode,
            Mode::Replace {
                name: "a.ogg".into(),
                new_file: "b.ogg".into()
            }
        );

        let cli = Cli::try_parse_from(["pckedit", "bgm.pck", "-R", "dir", "order.txt"]).unwrap();
        assert!(matches!(cli.mode, Mode::Repack { .. }));
    }

    #[test]
    fn output_dir_override_disables_cleanup() {
        let cli = Cli::try_parse_from(["pckedit", "bgm.pck", "list-all", "-d", "out"]).unwrap();
        assert_eq!(cli.output_dir(), PathBuf::from("out"));
        assert!(!cli.cleans_output_dir());
    }

    #[test]
    fn log_file_keeps_console_level() {
        let cli = Cli::try_parse_from(["pckedit", "bgm.pck", "list-all", "--log-file", "pck.log"])
            .unwrap();
        assert_eq!(cli.log_file, Some(PathBuf::from("pck.log")));
        assert_eq!(cli.console_level(), Level::INFO);
    }

    #[test]
    fn verbosity_flags_pick_console_level() {
        let level = |args: &[&str]| {
            let mut argv = vec!["pckedit", "bgm.pck", "-L"];
            argv.extend_from_slice(args);
            Cli::try_parse_from(argv).unwrap().console_level()
        };
        assert_eq!(level(&[]), Level::INFO);
        assert_eq!(level(&["-q"]), Level::WARN);
        assert_eq!(level(&["-qq"]), Level::ERROR);
        assert_eq!(level(&["-v"]), Level::DEBUG);
        assert_eq!(level(&["-v", "-q"]), Level::DEBUG);
    }

    #[test]
    fn missing_mode_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["pckedit", "bgm.pck", "replace", "a.ogg"]).is_err());
        assert!(Cli::try_parse_from(["pckedit", "bgm.pck"]).is_err());
    }
}
