//! pagecap library
//!
//! Renders a URL or raw HTML to a PDF or screenshot by delegating to a
//! headless browser engine (Puppeteer driven through a `node` subprocess).
//! The rendered artifact lands in a uniquely named temp file owned by the
//! capture; accessors expose the bytes and cleanup is guaranteed when the
//! capture is dropped, with a process-exit backstop for leaked files.
//!
//! # Module Overview
//!
//! - [`capture`] - The capture adapter: configuration, render-once accessors
//! - [`engine`] - The engine subprocess invocation and option forwarding
//! - [`temp`] - Temp file allocation, tracking, and guaranteed cleanup
//! - [`output`] - Output formats and the HTTP response descriptor
//! - [`storage`] - The injected storage collaborator seam
//! - [`config`] - TOML configuration for binaries, proxy, sandbox, temp dir
//!
//! # Example
//!
//! ```no_run
//! use pagecap_lib::{Capture, Config};
//!
//! # async fn example() -> pagecap_lib::Result<()> {
//! let config = Config::load(None)?;
//! let bytes = Capture::pdf("https://example.com/invoice")?
//!     .configured(&config)
//!     .paper_format("A4")
//!     .show_background()
//!     .bytes()
//!     .await?;
//! # let _ = bytes;
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod storage;
pub mod temp;

pub use capture::Capture;
pub use config::Config;
pub use engine::{Engine, EngineOptions, RenderTarget, Viewport};
pub use error::{PagecapError, Result};
pub use output::{ImageType, OutputFormat, ResponseDescriptor};
pub use storage::{ArtifactStorage, DiskStorage, Visibility};
pub use temp::{sweep_all, ShutdownSweeper, TempFileManager};
