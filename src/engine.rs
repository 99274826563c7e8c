//! External rendering engine invocation.
//!
//! The engine is Puppeteer, driven through a `node` subprocess: an embedded
//! helper script receives a JSON payload plus the output path on argv,
//! navigates the page, writes the PDF/screenshot, and reports a JSON status
//! line on stdout. Nothing here parses HTML or encodes output; the engine is
//! an opaque collaborator.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{PagecapError, Result};
use crate::output::OutputFormat;

const PUPPETEER_SCRIPT: &str = r#"
const [, , payloadJson, outputPath] = process.argv;

async function run() {
  let browser;
  try {
    const payload = JSON.parse(payloadJson);
    const puppeteer = require('puppeteer');

    const launch = { headless: true, args: payload.launch.args };
    if (payload.launch.executablePath) {
      launch.executablePath = payload.launch.executablePath;
    }

    browser = await puppeteer.launch(launch);
    const page = await browser.newPage();
    await page.setViewport({
      width: payload.viewport.width,
      height: payload.viewport.height,
      deviceScaleFactor: payload.viewport.deviceScaleFactor
    });

    if (payload.userAgent) {
      await page.setUserAgent(payload.userAgent);
    }
    if (payload.emulateMedia) {
      await page.emulateMediaType(payload.emulateMedia);
    }

    const nav = { timeout: payload.timeoutMs };
    if (payload.waitUntil) {
      nav.waitUntil = payload.waitUntil;
    }
    if (payload.target.url) {
      await page.goto(payload.target.url, nav);
    } else {
      await page.setContent(payload.target.html, nav);
    }

    if (payload.delayMs) {
      await new Promise(resolve => setTimeout(resolve, payload.delayMs));
    }

    const options = Object.assign({ path: outputPath }, payload.options);
    if (payload.action === 'pdf') {
      await page.pdf(options);
    } else {
      await page.screenshot(options);
    }

    console.log(JSON.stringify({ status: 'ok' }));
  } catch (err) {
    const message = err && err.message ? err.message : String(err);
    console.error(JSON.stringify({ status: 'error', message }));
    process.exitCode = 1;
  } finally {
    if (browser) {
      await browser.close();
    }
  }
}

run();
"#;

const NODE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// What the engine renders: a URL to navigate to, or raw HTML set as page
/// content.
#[derive(Debug, Clone)]
pub enum RenderTarget {
    Url(url::Url),
    Html(String),
}

impl RenderTarget {
    pub fn url(raw: &str) -> Result<Self> {
        Ok(RenderTarget::Url(url::Url::parse(raw)?))
    }

    pub fn html(content: impl Into<String>) -> Self {
        RenderTarget::Html(content.into())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            device_scale_factor: 1.0,
        }
    }
}

impl std::str::FromStr for Viewport {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            return Err("expected WIDTHxHEIGHT (e.g., 1280x800)".to_string());
        }
        let width: u32 = parts[0]
            .trim()
            .parse()
            .map_err(|_| format!("invalid width: {}", parts[0]))?;
        let height: u32 = parts[1]
            .trim()
            .parse()
            .map_err(|_| format!("invalid height: {}", parts[1]))?;
        if width == 0 || height == 0 {
            return Err("viewport dimensions must be positive".to_string());
        }
        Ok(Viewport {
            width,
            height,
            device_scale_factor: 1.0,
        })
    }
}

/// Launch-level engine configuration, typically populated from
/// [`Config`](crate::config::Config). Absent values leave engine defaults
/// untouched.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub node_command: String,
    pub npm_command: String,
    pub proxy_server: Option<String>,
    pub chrome_path: Option<PathBuf>,
    pub no_sandbox: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            node_command: "node".to_string(),
            npm_command: "npm".to_string(),
            proxy_server: None,
            chrome_path: None,
            no_sandbox: false,
        }
    }
}

impl EngineOptions {
    fn launch_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(proxy) = &self.proxy_server {
            args.push(format!("--proxy-server={}", proxy));
        }
        if self.no_sandbox {
            args.push("--no-sandbox".to_string());
            args.push("--disable-setuid-sandbox".to_string());
        }
        args
    }
}

/// One engine invocation in the making: launch options plus the page and
/// render options accumulated before [`Engine::render_to_file`] spawns the
/// subprocess.
#[derive(Debug, Clone)]
pub struct Engine {
    options: EngineOptions,
    viewport: Viewport,
    page_options: Map<String, Value>,
    user_agent: Option<String>,
    emulate_media: Option<String>,
    wait_until: Option<String>,
    navigation_timeout: Duration,
    delay: Option<Duration>,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            viewport: Viewport::default(),
            page_options: Map::new(),
            user_agent: None,
            emulate_media: None,
            wait_until: None,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            delay: None,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Replaces the launch-level options; accumulated page options are kept.
    pub fn set_launch_options(&mut self, options: EngineOptions) {
        self.options = options;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    pub fn set_device_scale_factor(&mut self, factor: f64) {
        self.viewport.device_scale_factor = factor;
    }

    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = Some(user_agent.into());
    }

    pub fn set_emulate_media(&mut self, media: impl Into<String>) {
        self.emulate_media = Some(media.into());
    }

    pub fn set_navigation_timeout(&mut self, timeout: Duration) {
        self.navigation_timeout = timeout;
    }

    pub fn set_wait_until_network_idle(&mut self) {
        self.wait_until = Some("networkidle0".to_string());
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = Some(delay);
    }

    /// Open-ended channel for render options the typed surface does not
    /// cover; keys are passed to the engine verbatim.
    pub fn set_option(&mut self, key: impl Into<String>, value: Value) {
        self.page_options.insert(key.into(), value);
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.page_options.get(key)
    }

    /// String-keyed equivalent of the typed setters for callers driving the
    /// engine from dynamic input. Returns `Ok(false)` when the method name is
    /// not part of the recognized surface; malformed arguments for a
    /// recognized method are a configuration error.
    pub fn dispatch(&mut self, method: &str, args: &[Value]) -> Result<bool> {
        match method {
            "fullPage" => {
                self.set_option("fullPage", Value::Bool(bool_arg_or(args, 0, true)));
            }
            "landscape" => {
                self.set_option("landscape", Value::Bool(bool_arg_or(args, 0, true)));
            }
            "showBackground" => {
                self.set_option("printBackground", Value::Bool(true));
            }
            "transparentBackground" => {
                self.set_option("omitBackground", Value::Bool(true));
            }
            "format" => {
                let format = str_arg(method, args, 0)?;
                self.set_option("format", Value::String(format.to_string()));
            }
            "paperSize" => {
                let width = num_arg(method, args, 0)?;
                let height = num_arg(method, args, 1)?;
                let unit = opt_str_arg(args, 2).unwrap_or("mm");
                self.set_option("width", Value::String(format!("{}{}", width, unit)));
                self.set_option("height", Value::String(format!("{}{}", height, unit)));
            }
            "margins" => {
                let top = num_arg(method, args, 0)?;
                let right = num_arg(method, args, 1)?;
                let bottom = num_arg(method, args, 2)?;
                let left = num_arg(method, args, 3)?;
                let unit = opt_str_arg(args, 4).unwrap_or("mm");
                self.set_option(
                    "margin",
                    json!({
                        "top": format!("{}{}", top, unit),
                        "right": format!("{}{}", right, unit),
                        "bottom": format!("{}{}", bottom, unit),
                        "left": format!("{}{}", left, unit),
                    }),
                );
            }
            "scale" => {
                let scale = num_arg(method, args, 0)?;
                self.set_option("scale", json!(scale));
            }
            "pages" => {
                let ranges = str_arg(method, args, 0)?;
                self.set_option("pageRanges", Value::String(ranges.to_string()));
            }
            "quality" => {
                let quality = num_arg(method, args, 0)?;
                self.set_option("quality", json!(quality));
            }
            "setScreenshotType" => {
                let kind = str_arg(method, args, 0)?;
                self.set_option("type", Value::String(kind.to_string()));
                if let Some(quality) = args.get(1) {
                    let quality = quality.as_f64().ok_or_else(|| invalid_args(method))?;
                    self.set_option("quality", json!(quality));
                }
            }
            "windowSize" => {
                let width = num_arg(method, args, 0)? as u32;
                let height = num_arg(method, args, 1)? as u32;
                self.set_window_size(width, height);
            }
            "deviceScaleFactor" => {
                let factor = num_arg(method, args, 0)?;
                self.set_device_scale_factor(factor);
            }
            "userAgent" => {
                let agent = str_arg(method, args, 0)?;
                self.set_user_agent(agent);
            }
            "emulateMedia" => {
                let media = str_arg(method, args, 0)?;
                self.set_emulate_media(media);
            }
            "timeout" => {
                let millis = num_arg(method, args, 0)?;
                self.set_navigation_timeout(Duration::from_millis(millis as u64));
            }
            "waitUntilNetworkIdle" => {
                self.set_wait_until_network_idle();
            }
            "delay" => {
                let millis = num_arg(method, args, 0)?;
                self.set_delay(Duration::from_millis(millis as u64));
            }
            "setOption" => {
                let key = str_arg(method, args, 0)?.to_string();
                let value = args.get(1).cloned().ok_or_else(|| invalid_args(method))?;
                self.set_option(key, value);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn payload(&self, target: &RenderTarget, format: OutputFormat) -> EnginePayload<'_> {
        let target = match target {
            RenderTarget::Url(url) => TargetPayload {
                url: Some(url.as_str().to_string()),
                html: None,
            },
            RenderTarget::Html(html) => TargetPayload {
                url: None,
                html: Some(html.clone()),
            },
        };

        EnginePayload {
            action: match format {
                OutputFormat::Pdf => "pdf",
                OutputFormat::Screenshot => "screenshot",
            },
            target,
            viewport: self.viewport,
            user_agent: self.user_agent.clone(),
            emulate_media: self.emulate_media.clone(),
            wait_until: self.wait_until.clone(),
            timeout_ms: self.navigation_timeout.as_millis() as u64,
            delay_ms: self.delay.map(|d| d.as_millis() as u64),
            options: &self.page_options,
            launch: LaunchPayload {
                args: self.options.launch_args(),
                executable_path: self
                    .options
                    .chrome_path
                    .as_ref()
                    .map(|p| p.to_string_lossy().to_string()),
            },
        }
    }

    /// Renders the target and writes the output bytes to `path`, blocking
    /// until the engine subprocess exits. Navigation timeout is the engine's
    /// own, forwarded in the payload; no outer deadline is imposed here.
    pub async fn render_to_file(
        &self,
        target: &RenderTarget,
        format: OutputFormat,
        path: &Path,
    ) -> Result<()> {
        self.ensure_node_available().await?;

        let payload = serde_json::to_string(&self.payload(target, format))
            .map_err(|err| PagecapError::Engine(format!("failed to encode payload: {}", err)))?;

        let mut cmd = Command::new(&self.options.node_command);
        cmd.arg("-e")
            .arg(PUPPETEER_SCRIPT)
            .arg(payload)
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(node_path) = self.node_modules_path().await {
            cmd.env("NODE_PATH", node_path);
        }

        let mut child = cmd
            .spawn()
            .map_err(|err| map_spawn_error(err, &self.options.node_command))?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut out) = stdout_pipe {
                let _ = out.read_to_end(&mut buf).await;
            }
            buf
        });

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut err) = stderr_pipe {
                let _ = err.read_to_end(&mut buf).await;
            }
            buf
        });

        let status = child.wait().await.map_err(PagecapError::Io)?;

        let stdout = stdout_task.await.unwrap_or_else(|_| Vec::new());
        let stderr = stderr_task.await.unwrap_or_else(|_| Vec::new());

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(map_engine_error(status.to_string(), &stderr));
        }

        let stdout = String::from_utf8_lossy(&stdout);
        match serde_json::from_str::<EngineStatus>(stdout.trim()) {
            Ok(report) if report.status == "ok" => {}
            Ok(report) => {
                let detail = report.message.as_deref().unwrap_or("no additional details");
                return Err(PagecapError::Engine(format!(
                    "engine returned non-ok status {}: {}",
                    report.status, detail
                )));
            }
            Err(_) => {
                return Err(PagecapError::Engine(format!(
                    "unexpected engine output: {}",
                    stdout.trim()
                )));
            }
        }

        if !path.exists() {
            return Err(PagecapError::Engine(format!(
                "engine reported success but produced no output at {}",
                path.display()
            )));
        }

        Ok(())
    }

    /// Resolves the node_modules directory through the configured package
    /// manager so `require('puppeteer')` works regardless of the process cwd.
    /// Best-effort: a missing or failing npm falls back to node's own module
    /// resolution.
    async fn node_modules_path(&self) -> Option<String> {
        let mut cmd = Command::new(&self.options.npm_command);
        cmd.arg("root").stderr(Stdio::null());

        let output = match timeout(NODE_CHECK_TIMEOUT, cmd.output()).await {
            Ok(Ok(output)) if output.status.success() => output,
            Ok(_) | Err(_) => {
                log::warn!(
                    "could not resolve node_modules via {:?}; relying on node module resolution",
                    self.options.npm_command
                );
                return None;
            }
        };

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if root.is_empty() {
            None
        } else {
            Some(root)
        }
    }

    /// Fails fast when the node binary is missing so a render failure names
    /// the actual problem instead of a cryptic spawn error mid-flight.
    async fn ensure_node_available(&self) -> Result<()> {
        let mut cmd = Command::new(&self.options.node_command);
        cmd.arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let status = timeout(NODE_CHECK_TIMEOUT, cmd.status())
            .await
            .map_err(|_| {
                PagecapError::Engine(format!(
                    "timed out checking node availability after {:?}",
                    NODE_CHECK_TIMEOUT
                ))
            })?
            .map_err(|err| map_spawn_error(err, &self.options.node_command))?;

        if !status.success() {
            return Err(PagecapError::Engine(format!(
                "node command {:?} is not available (exit {})",
                self.options.node_command, status
            )));
        }

        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnginePayload<'a> {
    action: &'static str,
    target: TargetPayload,
    viewport: Viewport,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emulate_media: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_until: Option<String>,
    timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    delay_ms: Option<u64>,
    options: &'a Map<String, Value>,
    launch: LaunchPayload,
}

#[derive(Serialize)]
struct TargetPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LaunchPayload {
    args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    executable_path: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct EngineStatus {
    status: String,
    message: Option<String>,
}

fn map_spawn_error(err: io::Error, command: &str) -> PagecapError {
    if err.kind() == io::ErrorKind::NotFound {
        PagecapError::Engine(format!(
            "unable to spawn the render engine; '{}' was not found on PATH",
            command
        ))
    } else {
        PagecapError::Io(err)
    }
}

fn map_engine_error(status_text: impl Into<String>, stderr: &str) -> PagecapError {
    if let Ok(report) = serde_json::from_str::<EngineStatus>(stderr.trim()) {
        let message = report.message.unwrap_or_default();
        return map_engine_status_error(&report.status, message);
    }

    if stderr
        .to_ascii_lowercase()
        .contains("cannot find module 'puppeteer'")
    {
        return PagecapError::Engine(
            "puppeteer npm package is missing; install with `npm install puppeteer`".to_string(),
        );
    }

    PagecapError::Engine(format!(
        "engine exited with status {}: {}",
        status_text.into(),
        stderr.trim()
    ))
}

fn map_engine_status_error(status: &str, message: String) -> PagecapError {
    if message
        .to_ascii_lowercase()
        .contains("cannot find module 'puppeteer'")
    {
        PagecapError::Engine(
            "puppeteer npm package is missing; install with `npm install puppeteer`".to_string(),
        )
    } else {
        PagecapError::Engine(format!("engine error (status {}): {}", status, message))
    }
}

fn invalid_args(method: &str) -> PagecapError {
    PagecapError::Config(format!("Invalid arguments for engine method '{}'", method))
}

fn str_arg<'a>(method: &str, args: &'a [Value], index: usize) -> Result<&'a str> {
    args.get(index)
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid_args(method))
}

fn opt_str_arg<'a>(args: &'a [Value], index: usize) -> Option<&'a str> {
    args.get(index).and_then(|v| v.as_str())
}

fn num_arg(method: &str, args: &[Value], index: usize) -> Result<f64> {
    args.get(index)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| invalid_args(method))
}

fn bool_arg_or(args: &[Value], index: usize, default: bool) -> bool {
    args.get(index).and_then(|v| v.as_bool()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_args_include_proxy_and_sandbox_flags() {
        let options = EngineOptions {
            proxy_server: Some("socks5://127.0.0.1:9050".to_string()),
            no_sandbox: true,
            ..EngineOptions::default()
        };

        let args = options.launch_args();
        assert!(args.contains(&"--proxy-server=socks5://127.0.0.1:9050".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--disable-setuid-sandbox".to_string()));
    }

    #[test]
    fn launch_args_empty_by_default() {
        assert!(EngineOptions::default().launch_args().is_empty());
    }

    #[test]
    fn dispatch_rejects_unknown_method() {
        let mut engine = Engine::new(EngineOptions::default());
        assert!(!engine.dispatch("nonexistentMethod", &[]).unwrap());
    }

    #[test]
    fn dispatch_full_page_defaults_to_true() {
        let mut engine = Engine::new(EngineOptions::default());
        assert!(engine.dispatch("fullPage", &[]).unwrap());
        assert_eq!(engine.option("fullPage"), Some(&Value::Bool(true)));
    }

    #[test]
    fn dispatch_margins_builds_margin_object() {
        let mut engine = Engine::new(EngineOptions::default());
        let args = vec![json!(10), json!(5), json!(10), json!(5)];
        assert!(engine.dispatch("margins", &args).unwrap());

        let margin = engine.option("margin").unwrap();
        assert_eq!(margin["top"], json!("10mm"));
        assert_eq!(margin["left"], json!("5mm"));
    }

    #[test]
    fn dispatch_window_size_updates_viewport() {
        let mut engine = Engine::new(EngineOptions::default());
        let args = vec![json!(1920), json!(1080)];
        assert!(engine.dispatch("windowSize", &args).unwrap());
        assert_eq!(engine.viewport.width, 1920);
        assert_eq!(engine.viewport.height, 1080);
    }

    #[test]
    fn dispatch_timeout_updates_navigation_timeout() {
        let mut engine = Engine::new(EngineOptions::default());
        assert!(engine.dispatch("timeout", &[json!(5000)]).unwrap());
        assert_eq!(engine.navigation_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn dispatch_set_option_is_generic() {
        let mut engine = Engine::new(EngineOptions::default());
        let args = vec![json!("preferCSSPageSize"), json!(true)];
        assert!(engine.dispatch("setOption", &args).unwrap());
        assert_eq!(engine.option("preferCSSPageSize"), Some(&Value::Bool(true)));
    }

    #[test]
    fn dispatch_with_bad_arguments_is_config_error() {
        let mut engine = Engine::new(EngineOptions::default());
        let err = engine.dispatch("format", &[json!(42)]).unwrap_err();
        assert!(matches!(err, PagecapError::Config(_)));
        assert!(format!("{}", err).contains("format"));
    }

    #[test]
    fn payload_serializes_url_target_and_options() {
        let mut engine = Engine::new(EngineOptions::default());
        engine.set_option("landscape", Value::Bool(true));
        engine.set_user_agent("pagecap-test");

        let target = RenderTarget::url("https://example.com/report").unwrap();
        let payload = engine.payload(&target, OutputFormat::Pdf);
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["action"], json!("pdf"));
        assert_eq!(value["target"]["url"], json!("https://example.com/report"));
        assert_eq!(value["options"]["landscape"], json!(true));
        assert_eq!(value["userAgent"], json!("pagecap-test"));
        assert_eq!(value["viewport"]["width"], json!(1280));
        assert!(value["target"].get("html").is_none());
    }

    #[test]
    fn payload_serializes_html_target() {
        let engine = Engine::new(EngineOptions::default());
        let target = RenderTarget::html("<h1>hello</h1>");
        let value =
            serde_json::to_value(engine.payload(&target, OutputFormat::Screenshot)).unwrap();

        assert_eq!(value["action"], json!("screenshot"));
        assert_eq!(value["target"]["html"], json!("<h1>hello</h1>"));
        assert!(value["target"].get("url").is_none());
    }

    #[test]
    fn map_spawn_error_names_missing_command() {
        let err = map_spawn_error(io::Error::from(io::ErrorKind::NotFound), "node");
        let message = format!("{}", err);
        assert!(message.contains("'node'"));
        assert!(message.contains("not found on PATH"));
    }

    #[test]
    fn map_engine_error_detects_missing_puppeteer_module() {
        let err = map_engine_error(
            "1",
            r#"{"status":"error","message":"Cannot find module 'puppeteer'"}"#,
        );
        assert!(format!("{}", err).contains("npm install puppeteer"));
    }

    #[test]
    fn map_engine_error_preserves_other_messages() {
        let err = map_engine_error(
            "1",
            r#"{"status":"error","message":"Navigation timeout of 30000 ms exceeded"}"#,
        );
        let message = format!("{}", err);
        assert!(message.contains("Navigation timeout"));
    }

    #[test]
    fn map_engine_error_handles_plain_stderr() {
        let err = map_engine_error("1", "Error: Cannot find module 'puppeteer'\n    at require");
        assert!(format!("{}", err).contains("npm install puppeteer"));
    }

    #[test]
    fn viewport_parses_width_by_height() {
        let viewport: Viewport = "1920x1080".parse().unwrap();
        assert_eq!(viewport.width, 1920);
        assert_eq!(viewport.height, 1080);
        assert!("1920".parse::<Viewport>().is_err());
        assert!("0x100".parse::<Viewport>().is_err());
    }

    #[tokio::test]
    async fn ensure_node_available_fails_for_missing_binary() {
        let engine = Engine::new(EngineOptions {
            node_command: "definitely-not-a-binary".to_string(),
            ..EngineOptions::default()
        });

        let result = engine.ensure_node_available().await;
        assert!(result.is_err());
    }
}
