use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{CliOverrides, Config};
use crate::logging::{self, LogConfig};
use crate::output::OutputMode;

pub(crate) mod commands;

#[derive(Parser)]
#[command(name = "drawio-batch")]
#[command(version)]
#[command(about = "Batch-convert draw.io diagrams, skipping files that haven't changed")]
#[command(long_about = "drawio-batch walks a directory for draw.io diagrams and exports them with \
    the draw.io desktop app in headless mode. A content-hash cache in the input directory \
    makes repeated runs only touch changed files.\n\n\
    Examples:\n  \
    drawio-batch convert -d docs -o dist          # PDFs for every diagram\n  \
    drawio-batch convert --png -w 400 -w 800      # PDFs, PNGs and two width variants\n  \
    drawio-batch normalize -d docs --in-place     # Uncompress and format diagram XML")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase output verbosity (-v, -vv for more)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write log messages to this file instead of stderr
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert diagrams to PDF (and optionally PNG / JPEG)
    #[command(visible_alias = "c")]
    Convert {
        /// Directory to search for diagrams
        #[arg(short = 'd', long = "input-directory", default_value = ".", value_name = "DIR")]
        input_directory: PathBuf,

        /// Directory the exports are written to [default: dist]
        #[arg(short = 'o', long = "output-directory", value_name = "DIR")]
        output_directory: Option<PathBuf>,

        /// draw.io executable (path or program name on PATH)
        #[arg(short = 'D', long = "draw-io", value_name = "PATH")]
        draw_io: Option<PathBuf>,

        /// Also export PNG / JPEG at this pixel width (repeatable)
        #[arg(short = 'w', long = "width", value_name = "PIXELS")]
        widths: Vec<u32>,

        /// Also convert *.xml files
        #[arg(short = 'X', long)]
        include_xml: bool,

        /// Export PNG
        #[arg(long)]
        png: bool,

        /// Export JPEG
        #[arg(long)]
        jpeg: bool,

        /// Don't export PDF
        #[arg(long)]
        skip_pdf: bool,

        /// Convert every file, even unchanged ones
        #[arg(long)]
        ignore_cache: bool,
    },

    /// Rewrite diagrams as uncompressed, indented XML
    #[command(visible_alias = "n")]
    Normalize {
        /// Directory to search for diagrams
        #[arg(short = 'd', long = "input-directory", default_value = ".", value_name = "DIR")]
        input_directory: PathBuf,

        /// draw.io executable (path or program name on PATH)
        #[arg(short = 'D', long = "draw-io", value_name = "PATH")]
        draw_io: Option<PathBuf>,

        /// Also normalize *.xml files
        #[arg(short = 'X', long)]
        include_xml: bool,

        /// Overwrite the diagrams instead of writing <file>.cleaned
        #[arg(short = 'i', long)]
        in_place: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    fn input_directory(&self) -> &Path {
        match &self.command {
            Commands::Convert { input_directory, .. } => input_directory,
            Commands::Normalize { input_directory, .. } => input_directory,
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let output_mode = OutputMode::from_flags(self.quiet, self.verbose);

        let input_directory = self.input_directory().to_path_buf();
        if !input_directory.is_dir() {
            return Err(anyhow::anyhow!(
                "Input directory does not exist: {}",
                input_directory.display()
            ));
        }

        let mut config = Config::load(&input_directory)?;
        let log_config = LogConfig::from_verbosity(self.verbose, self.quiet)
            .with_file(self.log_file.clone().or_else(|| config.log_file.clone()));
        logging::init(&log_config)?;

        match self.command {
            Commands::Convert {
                input_directory,
                output_directory,
                draw_io,
                widths,
                include_xml,
                png,
                jpeg,
                skip_pdf,
                ignore_cache,
            } => {
                config.apply_cli_overrides(CliOverrides {
                    renderer: draw_io,
                    output_directory,
                    widths,
                    png,
                    jpeg,
                    skip_pdf,
                    include_xml,
                    log_file: None,
                });
                commands::convert_command::handle_convert(
                    &input_directory,
                    &config,
                    ignore_cache,
                    output_mode,
                )
            }
            Commands::Normalize {
                input_directory,
                draw_io,
                include_xml,
                in_place,
            } => {
                config.apply_cli_overrides(CliOverrides {
                    renderer: draw_io,
                    include_xml,
                    ..CliOverrides::default()
                });
                commands::normalize_command::handle_normalize(
                    &input_directory,
                    &config,
                    in_place,
                    output_mode,
                )
            }
        }
    }
}
