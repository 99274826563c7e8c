use clap::{Parser, Subcommand, ValueEnum};
use pagecap_lib::{ImageType, Viewport};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pagecap")]
#[command(
    version,
    about = "Render web pages to PDF or screenshot through a headless browser",
    long_about = "pagecap\n\nRenders a URL or a local HTML file to PDF or screenshot by driving\nPuppeteer through a node subprocess. Engine binaries, proxy, and sandbox\nsettings come from a TOML config file; flags override per invocation."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Config file (TOML) for engine binaries, proxy, sandbox, temp dir; defaults to ~/.config/pagecap/config.toml"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a page to PDF
    Pdf {
        #[arg(help = "URL to render", required_unless_present = "html_file")]
        target: Option<String>,

        #[arg(
            long,
            value_name = "PATH",
            conflicts_with = "target",
            help = "Render a local HTML file instead of a URL"
        )]
        html_file: Option<PathBuf>,

        #[arg(long, short, help = "Output file path")]
        output: PathBuf,

        #[arg(long, help = "Paper format (A4, Letter, ...)")]
        paper_format: Option<String>,

        #[arg(long, help = "Landscape orientation")]
        landscape: bool,

        #[arg(long, help = "Print CSS backgrounds")]
        show_background: bool,

        #[arg(
            long,
            value_name = "T,R,B,L",
            help = "Page margins in millimeters (top,right,bottom,left)"
        )]
        margins: Option<String>,

        #[arg(long, help = "Page ranges to print, e.g. 1-3,5")]
        pages: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Render a page to a screenshot
    Screenshot {
        #[arg(help = "URL to render", required_unless_present = "html_file")]
        target: Option<String>,

        #[arg(
            long,
            value_name = "PATH",
            conflicts_with = "target",
            help = "Render a local HTML file instead of a URL"
        )]
        html_file: Option<PathBuf>,

        #[arg(long, short, help = "Output file path")]
        output: PathBuf,

        #[arg(long, help = "Capture the full scrollable page")]
        full_page: bool,

        #[arg(long, value_enum, help = "Image encoding (defaults to png)")]
        image_type: Option<CliImageType>,

        #[arg(long, help = "JPEG/WebP quality (0-100)")]
        quality: Option<u8>,

        #[arg(long, help = "Omit the default white background")]
        transparent: bool,

        #[command(flatten)]
        page: PageArgs,
    },
}

/// Flags shared by both output formats.
#[derive(Debug, clap::Args)]
pub struct PageArgs {
    #[arg(long, value_name = "WxH", help = "Viewport dimensions (WIDTHxHEIGHT)")]
    pub viewport: Option<Viewport>,

    #[arg(long, help = "Navigation timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Wait for the network to go idle before rendering")]
    pub wait_network_idle: bool,

    #[arg(long, value_name = "MS", help = "Extra delay after load, in milliseconds")]
    pub delay: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliImageType {
    Png,
    Jpeg,
    Webp,
}

impl From<CliImageType> for ImageType {
    fn from(value: CliImageType) -> Self {
        match value {
            CliImageType::Png => ImageType::Png,
            CliImageType::Jpeg => ImageType::Jpeg,
            CliImageType::Webp => ImageType::Webp,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
