mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use cli::{Commands, PageArgs};
use pagecap_lib::{Capture, Config, PagecapError, ShutdownSweeper};

#[tokio::main]
async fn main() -> ExitCode {
    // Backstop for temp artifacts: anything still registered when this guard
    // drops at the end of main is swept.
    let _sweeper = ShutdownSweeper::new();
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return fail(err),
    };

    let result = match args.command {
        Commands::Pdf {
            target,
            html_file,
            output,
            paper_format,
            landscape,
            show_background,
            margins,
            pages,
            page,
        } => {
            let capture = match build_pdf_capture(
                target,
                html_file,
                &config,
                paper_format,
                landscape,
                show_background,
                margins,
                pages,
                page,
            ) {
                Ok(capture) => capture,
                Err(err) => return fail(err),
            };
            render(capture, &output, args.verbose).await
        }
        Commands::Screenshot {
            target,
            html_file,
            output,
            full_page,
            image_type,
            quality,
            transparent,
            page,
        } => {
            let capture = match build_screenshot_capture(
                target,
                html_file,
                &config,
                full_page,
                image_type,
                quality,
                transparent,
                page,
            ) {
                Ok(capture) => capture,
                Err(err) => return fail(err),
            };
            render(capture, &output, args.verbose).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(err),
    }
}

fn fail(err: PagecapError) -> ExitCode {
    eprintln!("pagecap: {}", err);
    ExitCode::FAILURE
}

fn target_capture(
    target: Option<String>,
    html_file: Option<PathBuf>,
    pdf: bool,
) -> Result<Capture, PagecapError> {
    match (target, html_file) {
        (Some(url), None) => {
            if pdf {
                Capture::pdf(&url)
            } else {
                Capture::screenshot(&url)
            }
        }
        (None, Some(file)) => {
            let html = std::fs::read_to_string(&file)?;
            Ok(if pdf {
                Capture::pdf_from_html(html)
            } else {
                Capture::screenshot_from_html(html)
            })
        }
        // clap enforces exactly one of the two.
        _ => Err(PagecapError::Config(
            "exactly one of a URL or --html-file is required".to_string(),
        )),
    }
}

fn apply_page_args(mut capture: Capture, page: PageArgs) -> Capture {
    if let Some(viewport) = page.viewport {
        capture = capture.window_size(viewport.width, viewport.height);
    }
    if let Some(secs) = page.timeout {
        capture = capture.timeout(Duration::from_secs(secs));
    }
    if page.wait_network_idle {
        capture = capture.wait_until_network_idle();
    }
    if let Some(millis) = page.delay {
        capture = capture.delay(Duration::from_millis(millis));
    }
    capture
}

#[allow(clippy::too_many_arguments)]
fn build_pdf_capture(
    target: Option<String>,
    html_file: Option<PathBuf>,
    config: &Config,
    paper_format: Option<String>,
    landscape: bool,
    show_background: bool,
    margins: Option<String>,
    pages: Option<String>,
    page: PageArgs,
) -> Result<Capture, PagecapError> {
    let mut capture = target_capture(target, html_file, true)?.configured(config);

    if let Some(format) = paper_format {
        capture = capture.paper_format(format);
    }
    if landscape {
        capture = capture.landscape();
    }
    if show_background {
        capture = capture.show_background();
    }
    if let Some(spec) = margins {
        let (top, right, bottom, left) = parse_margins(&spec)?;
        capture = capture.margins(top, right, bottom, left);
    }
    if let Some(ranges) = pages {
        capture = capture.pages(ranges);
    }

    Ok(apply_page_args(capture, page))
}

#[allow(clippy::too_many_arguments)]
fn build_screenshot_capture(
    target: Option<String>,
    html_file: Option<PathBuf>,
    config: &Config,
    full_page: bool,
    image_type: Option<cli::CliImageType>,
    quality: Option<u8>,
    transparent: bool,
    page: PageArgs,
) -> Result<Capture, PagecapError> {
    let mut capture = target_capture(target, html_file, false)?.configured(config);

    if full_page {
        capture = capture.full_page();
    }
    if let Some(kind) = image_type {
        capture = capture.screenshot_type(kind.into());
    }
    if let Some(quality) = quality {
        capture = capture.quality(quality);
    }
    if transparent {
        capture = capture.transparent_background();
    }

    Ok(apply_page_args(capture, page))
}

fn parse_margins(spec: &str) -> Result<(f64, f64, f64, f64), PagecapError> {
    let parts: Vec<f64> = spec
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| {
            PagecapError::Config(format!(
                "Invalid margins {:?}: expected four numbers (top,right,bottom,left)",
                spec
            ))
        })?;
    if parts.len() != 4 {
        return Err(PagecapError::Config(format!(
            "Invalid margins {:?}: expected four numbers (top,right,bottom,left)",
            spec
        )));
    }
    Ok((parts[0], parts[1], parts[2], parts[3]))
}

async fn render(mut capture: Capture, output: &Path, verbose: bool) -> Result<(), PagecapError> {
    if verbose {
        eprintln!("Rendering {} output to {}…", capture.format(), output.display());
    }
    capture.save_to(output).await?;
    if verbose {
        let size = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        eprintln!("Wrote {} ({} bytes)", output.display(), size);
    }
    println!("{}", output.display());
    Ok(())
}
