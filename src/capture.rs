//! The capture adapter: owns a render target, the engine invocation state,
//! and the temp file holding the rendered output.
//!
//! Configuration methods consume and return `self` so calls chain; any
//! configuration change after a render drops the stale temp file and the
//! next accessor renders again. Accessors render lazily, at most once per
//! configuration state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use crate::config::Config;
use crate::engine::{Engine, EngineOptions, RenderTarget};
use crate::error::{PagecapError, Result};
use crate::output::{ImageType, OutputFormat, ResponseDescriptor};
use crate::storage::{ArtifactStorage, Visibility};
use crate::temp::TempFileManager;

const DEFAULT_DOWNLOAD_NAME: &str = "download";

#[derive(Debug)]
pub struct Capture {
    target: RenderTarget,
    format: OutputFormat,
    image_type: Option<ImageType>,
    file_name: Option<String>,
    engine: Engine,
    temp: TempFileManager,
    rendered: Option<PathBuf>,
}

impl Capture {
    fn new(target: RenderTarget, format: OutputFormat) -> Self {
        Self {
            target,
            format,
            image_type: None,
            file_name: None,
            engine: Engine::new(EngineOptions::default()),
            temp: TempFileManager::new(),
            rendered: None,
        }
    }

    /// PDF capture of a URL.
    pub fn pdf(url: &str) -> Result<Self> {
        Ok(Self::new(RenderTarget::url(url)?, OutputFormat::Pdf))
    }

    /// PDF capture of raw HTML content.
    pub fn pdf_from_html(html: impl Into<String>) -> Self {
        Self::new(RenderTarget::html(html), OutputFormat::Pdf)
    }

    /// Screenshot capture of a URL.
    pub fn screenshot(url: &str) -> Result<Self> {
        Ok(Self::new(RenderTarget::url(url)?, OutputFormat::Screenshot))
    }

    /// Screenshot capture of raw HTML content.
    pub fn screenshot_from_html(html: impl Into<String>) -> Self {
        Self::new(RenderTarget::html(html), OutputFormat::Screenshot)
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// File extension of the output, accounting for a configured screenshot
    /// image type.
    pub fn extension(&self) -> &'static str {
        match (self.format, self.image_type) {
            (OutputFormat::Screenshot, Some(image_type)) => image_type.extension(),
            _ => self.format.extension(),
        }
    }

    /// MIME type of the output, accounting for a configured screenshot image
    /// type.
    pub fn mime_type(&self) -> &'static str {
        match (self.format, self.image_type) {
            (OutputFormat::Screenshot, Some(image_type)) => image_type.mime_type(),
            _ => self.format.mime_type(),
        }
    }

    fn adapter_name(&self) -> &'static str {
        self.format.adapter_label()
    }

    // ---- configuration -------------------------------------------------

    /// Applies application configuration: engine binaries, proxy, sandbox
    /// flag, temp directory, navigation timeout, and the open-ended
    /// additional options.
    pub fn configured(mut self, config: &Config) -> Self {
        self.invalidate();
        self.engine.set_launch_options(config.engine_options());
        self.engine.set_navigation_timeout(config.navigation_timeout());
        if let Some(dir) = &config.temp_dir {
            self.temp.set_directory(dir);
        }
        for (key, value) in config.additional_options() {
            self.engine.set_option(key, value);
        }
        self
    }

    pub fn with_engine_options(mut self, options: EngineOptions) -> Self {
        self.invalidate();
        self.engine.set_launch_options(options);
        self
    }

    /// Overrides the directory temp files are allocated in.
    pub fn temp_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.invalidate();
        self.temp.set_directory(dir);
        self
    }

    /// File name reported in the HTTP response descriptor.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.invalidate();
        self.engine.set_window_size(width, height);
        self
    }

    pub fn device_scale_factor(mut self, factor: f64) -> Self {
        self.invalidate();
        self.engine.set_device_scale_factor(factor);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.invalidate();
        self.engine.set_user_agent(agent);
        self
    }

    pub fn emulate_media(mut self, media: impl Into<String>) -> Self {
        self.invalidate();
        self.engine.set_emulate_media(media);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.invalidate();
        self.engine.set_navigation_timeout(timeout);
        self
    }

    pub fn wait_until_network_idle(mut self) -> Self {
        self.invalidate();
        self.engine.set_wait_until_network_idle();
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.invalidate();
        self.engine.set_delay(delay);
        self
    }

    pub fn full_page(mut self) -> Self {
        self.invalidate();
        self.engine.set_option("fullPage", Value::Bool(true));
        self
    }

    pub fn landscape(mut self) -> Self {
        self.invalidate();
        self.engine.set_option("landscape", Value::Bool(true));
        self
    }

    /// Paper format name for PDFs (A4, Letter, ...).
    pub fn paper_format(mut self, format: impl Into<String>) -> Self {
        self.invalidate();
        self.engine
            .set_option("format", Value::String(format.into()));
        self
    }

    /// Page margins in millimeters.
    pub fn margins(mut self, top: f64, right: f64, bottom: f64, left: f64) -> Self {
        self.invalidate();
        self.engine.set_option(
            "margin",
            serde_json::json!({
                "top": format!("{}mm", top),
                "right": format!("{}mm", right),
                "bottom": format!("{}mm", bottom),
                "left": format!("{}mm", left),
            }),
        );
        self
    }

    /// Prints CSS backgrounds in PDF output.
    pub fn show_background(mut self) -> Self {
        self.invalidate();
        self.engine.set_option("printBackground", Value::Bool(true));
        self
    }

    pub fn transparent_background(mut self) -> Self {
        self.invalidate();
        self.engine.set_option("omitBackground", Value::Bool(true));
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.invalidate();
        self.engine.set_option("scale", serde_json::json!(scale));
        self
    }

    /// Page ranges for PDF output, e.g. "1-3,5".
    pub fn pages(mut self, ranges: impl Into<String>) -> Self {
        self.invalidate();
        self.engine
            .set_option("pageRanges", Value::String(ranges.into()));
        self
    }

    /// Screenshot image encoding; also switches the output extension and
    /// MIME type.
    pub fn screenshot_type(mut self, image_type: ImageType) -> Self {
        self.invalidate();
        self.image_type = Some(image_type);
        self.engine
            .set_option("type", Value::String(image_type.extension().to_string()));
        self
    }

    /// JPEG/WebP quality (0-100).
    pub fn quality(mut self, quality: u8) -> Self {
        self.invalidate();
        self.engine
            .set_option("quality", serde_json::json!(quality));
        self
    }

    /// Open-ended engine option, passed to the engine verbatim.
    pub fn set_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.invalidate();
        self.engine.set_option(key, value);
        self
    }

    /// String-keyed forwarding for callers driving the adapter from dynamic
    /// input. A method name the engine surface does not recognize fails with
    /// [`PagecapError::UnsupportedOperation`] naming this adapter and the
    /// method.
    pub fn call(mut self, method: &str, args: &[Value]) -> Result<Self> {
        self.invalidate();
        if !self.engine.dispatch(method, args)? {
            return Err(PagecapError::UnsupportedOperation {
                adapter: self.adapter_name(),
                method: method.to_string(),
            });
        }
        if method == "setScreenshotType" {
            if let Some(kind) = args.first().and_then(|v| v.as_str()) {
                self.image_type = Some(kind.parse().map_err(PagecapError::Config)?);
            }
        }
        Ok(self)
    }

    // ---- output accessors ----------------------------------------------

    fn invalidate(&mut self) {
        if let Some(path) = self.rendered.take() {
            self.temp.release(&path);
        }
    }

    async fn ensure_rendered(&mut self) -> Result<PathBuf> {
        if let Some(path) = &self.rendered {
            return Ok(path.clone());
        }
        let path = self.temp.allocate(self.extension())?;
        self.engine
            .render_to_file(&self.target, self.format, &path)
            .await?;
        self.rendered = Some(path.clone());
        Ok(path)
    }

    /// Path of the rendered temp file, rendering first if needed. The path
    /// stays stable until configuration changes or the capture is dropped.
    pub async fn path(&mut self) -> Result<PathBuf> {
        self.ensure_rendered().await
    }

    /// The rendered output bytes.
    pub async fn bytes(&mut self) -> Result<Vec<u8>> {
        let path = self.ensure_rendered().await?;
        std::fs::read(&path).map_err(|source| PagecapError::Read { path, source })
    }

    /// Renders directly to a caller-supplied path, bypassing the temp file.
    pub async fn save_to(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.engine
            .render_to_file(&self.target, self.format, path)
            .await
    }

    /// Writes the rendered bytes to a storage collaborator under `key`, or a
    /// random `<uuid>.<ext>` name when no key is given. Returns the key used.
    pub async fn persist<S: ArtifactStorage + ?Sized>(
        &mut self,
        store: &S,
        key: Option<&str>,
        visibility: Visibility,
    ) -> Result<String> {
        let bytes = self.bytes().await?;
        let key = match key {
            Some(key) => key.to_string(),
            None => self.random_file_name(),
        };
        store
            .put(&key, &bytes, visibility)
            .map_err(PagecapError::Storage)?;
        Ok(key)
    }

    /// Packages the rendered bytes, MIME type, and file name for a consuming
    /// framework. Never touches a socket.
    pub async fn response(&mut self) -> Result<ResponseDescriptor> {
        let bytes = self.bytes().await?;
        let file_name = match &self.file_name {
            Some(name) => name.clone(),
            None => format!("{}.{}", DEFAULT_DOWNLOAD_NAME, self.extension()),
        };
        Ok(ResponseDescriptor {
            bytes,
            mime_type: self.mime_type().to_string(),
            file_name,
        })
    }

    /// Explicit disposal: deletes every temp file this capture created.
    /// Dropping the capture does the same.
    pub fn release(&mut self) {
        self.rendered = None;
        self.temp.release_all();
    }

    fn random_file_name(&self) -> String {
        format!("{}.{}", Uuid::new_v4().simple(), self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pdf_capture_reports_pdf_shape() {
        let capture = Capture::pdf("https://example.com").unwrap();
        assert_eq!(capture.format(), OutputFormat::Pdf);
        assert_eq!(capture.extension(), "pdf");
        assert_eq!(capture.mime_type(), "application/pdf");
    }

    #[test]
    fn screenshot_capture_defaults_to_png() {
        let capture = Capture::screenshot_from_html("<p>hi</p>");
        assert_eq!(capture.extension(), "png");
        assert_eq!(capture.mime_type(), "image/png");
    }

    #[test]
    fn screenshot_type_switches_extension_and_mime() {
        let capture = Capture::screenshot_from_html("<p>hi</p>").screenshot_type(ImageType::Jpeg);
        assert_eq!(capture.extension(), "jpeg");
        assert_eq!(capture.mime_type(), "image/jpeg");
    }

    #[test]
    fn invalid_url_is_rejected_at_construction() {
        assert!(Capture::pdf("not a url").is_err());
    }

    #[test]
    fn call_with_unknown_method_names_adapter_and_method() {
        let err = Capture::pdf("https://example.com")
            .unwrap()
            .call("nonexistentMethod", &[])
            .unwrap_err();

        match &err {
            PagecapError::UnsupportedOperation { adapter, method } => {
                assert_eq!(*adapter, "PdfCapture");
                assert_eq!(method, "nonexistentMethod");
            }
            other => panic!("expected UnsupportedOperation, got {:?}", other),
        }
        let rendered = format!("{}", err);
        assert!(rendered.contains("PdfCapture"));
        assert!(rendered.contains("nonexistentMethod"));
    }

    #[test]
    fn call_on_screenshot_names_screenshot_adapter() {
        let err = Capture::screenshot_from_html("<p>hi</p>")
            .call("nonexistentMethod", &[])
            .unwrap_err();

        assert!(format!("{}", err).contains("ScreenshotCapture"));
    }

    #[test]
    fn call_forwards_known_methods_and_chains() {
        let capture = Capture::pdf("https://example.com")
            .unwrap()
            .call("landscape", &[])
            .unwrap()
            .call("format", &[json!("A4")])
            .unwrap();

        assert_eq!(capture.engine.option("landscape"), Some(&json!(true)));
        assert_eq!(capture.engine.option("format"), Some(&json!("A4")));
    }

    #[test]
    fn call_set_screenshot_type_updates_output_shape() {
        let capture = Capture::screenshot_from_html("<p>hi</p>")
            .call("setScreenshotType", &[json!("jpeg"), json!(80)])
            .unwrap();

        assert_eq!(capture.extension(), "jpeg");
        assert_eq!(capture.engine.option("quality"), Some(&json!(80.0)));
    }

    #[test]
    fn call_set_screenshot_type_rejects_unknown_encoding() {
        let err = Capture::screenshot_from_html("<p>hi</p>")
            .call("setScreenshotType", &[json!("tiff")])
            .unwrap_err();

        assert!(matches!(err, PagecapError::Config(_)));
    }

    #[test]
    fn typed_setters_chain() {
        let capture = Capture::pdf_from_html("<h1>report</h1>")
            .paper_format("A4")
            .landscape()
            .margins(10.0, 5.0, 10.0, 5.0)
            .show_background()
            .window_size(1920, 1080);

        assert_eq!(capture.engine.option("format"), Some(&json!("A4")));
        assert_eq!(capture.engine.option("printBackground"), Some(&json!(true)));
        assert!(capture.engine.option("margin").is_some());
    }

    #[test]
    fn random_file_name_carries_extension() {
        let capture = Capture::pdf_from_html("<p>hi</p>");
        let name = capture.random_file_name();
        assert!(name.ends_with(".pdf"));
        assert!(name.len() > ".pdf".len() + 10);
    }
}
