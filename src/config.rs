//! Layered configuration.
//!
//! Sources, lowest priority first: built-in defaults, the YAML config file
//! (`./novel-ssr.yaml`, or the path given by `--config` / `CONFIG_FILE`),
//! `NOVEL_SSR_` prefixed environment variables (`__` separates sections),
//! and finally explicit CLI flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::app::head::SiteMeta;
use crate::template::SlotMode;

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "novel-ssr.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Serving mode
    #[arg(long, value_enum)]
    pub mode: Option<ServeMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServeMode {
    /// Re-read the shell and manifest per request.
    Dev,
    /// Serve the built client and render at the edge handler.
    Production,
}

impl ServeMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevHostKind {
    /// Read the shell and manifest from disk.
    Fs,
    /// Fetch the transformed shell from a running asset dev server.
    Proxy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub dev: DevConfig,
    pub render: RenderConfig,
    pub template: TemplateConfig,
    pub site: SiteConfig,
    #[serde(default)]
    pub edge: EdgeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub mode: ServeMode,
    /// Emit logs as JSON lines.
    pub json_logs: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    pub index_html: PathBuf,
    pub manifest: PathBuf,
    pub client_dir: PathBuf,
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DevConfig {
    pub host: DevHostKind,
    pub proxy_url: String,
    /// Client runtime script injected into the shell by the fs dev host.
    pub client_script: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    /// Render deadline in milliseconds; absent means no deadline.
    pub timeout_ms: Option<u64>,
    /// URL substring that turns edge render failures into 500 responses
    /// with the error detail.
    pub debug_marker: String,
}

impl RenderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TemplateConfig {
    pub strict: bool,
}

impl TemplateConfig {
    pub fn slot_mode(&self) -> SlotMode {
        if self.strict {
            SlotMode::Strict
        } else {
            SlotMode::Lenient
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    pub title: String,
    pub base_url: String,
    pub keywords: String,
    pub description: String,
    pub image: String,
}

impl From<SiteConfig> for SiteMeta {
    fn from(c: SiteConfig) -> Self {
        Self {
            title: c.title,
            base_url: c.base_url,
            keywords: c.keywords,
            description: c.description,
            image: c.image,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EdgeConfig {
    /// Platform bindings exposed to renders.
    #[serde(default)]
    pub env: std::collections::HashMap<String, String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.mode", "production")?
            .set_default("server.json_logs", false)?
            .set_default("paths.index_html", "dist/client/index.html")?
            .set_default("paths.manifest", "dist/client/ssr-manifest.json")?
            .set_default("paths.client_dir", "dist/client")?
            .set_default("dev.host", "fs")?
            .set_default("dev.proxy_url", "http://127.0.0.1:5173")?
            .set_default("dev.client_script", "/@vite/client")?
            .set_default("render.debug_marker", "debug")?
            .set_default("template.strict", false)?
            .set_default("site.title", "兽人控小说站")?
            .set_default("site.base_url", "http://localhost:3000")?
            .set_default("site.keywords", "")?
            .set_default("site.description", "")?
            .set_default("site.image", "/favicon.png")?;

        // An explicit path must exist; the default file is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::new(path, FileFormat::Yaml)),
            None => builder.add_source(
                File::from(Path::new(DEFAULT_CONFIG_FILE))
                    .format(FileFormat::Yaml)
                    .required(false),
            ),
        };

        // E.g. NOVEL_SSR_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("NOVEL_SSR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(mode) = cli.mode {
            builder = builder.set_override("server.mode", mode.as_str())?;
        }

        builder.build()?.try_deserialize()
    }
}
