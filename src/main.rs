use anyhow::{bail, Context};
use base64::Engine as _;
use clap::Parser;
use pageshell::{DetailView, ShellConfig, ShellHandle, Viewport};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Minimal multi-page browser shell driven from stdin.
///
/// Commands: `open <url>`, `list`, `select <n>`, `close`, `snapshot [path]`,
/// `quit`.
#[derive(Parser, Debug)]
#[command(name = "pageshell", version, about)]
struct Args {
    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page to open at startup (repeatable); replaces the default pages
    #[arg(long = "page")]
    pages: Vec<String>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    #[arg(long)]
    user_agent: Option<String>,

    /// Document fetch timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log filter, e.g. `info` or `pageshell=debug` (falls back to RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn shell_config(&self) -> anyhow::Result<ShellConfig> {
        let mut config = match &self.config {
            Some(path) => ShellConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ShellConfig::default(),
        };
        if !self.pages.is_empty() {
            config.initial_pages = self.pages.clone();
        }
        config.viewport = Viewport {
            width: self.width.unwrap_or(config.viewport.width),
            height: self.height.unwrap_or(config.viewport.height),
        };
        if let Some(ua) = &self.user_agent {
            config.user_agent = ua.clone();
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout_ms = ms;
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn init_logging(level: Option<&str>) {
    use tracing_subscriber::EnvFilter;

    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

async fn print_pages(shell: &ShellHandle, out: &mut impl Write) -> anyhow::Result<()> {
    let selected = match shell.detail().await? {
        DetailView::Page { page, .. } => Some(page.id),
        DetailView::NoPageSelected => None,
    };
    for (i, page) in shell.pages().await?.iter().enumerate() {
        let mark = if Some(page.id) == selected { '*' } else { ' ' };
        writeln!(out, "{} {:>2}  {}", mark, i, page.label())?;
    }
    Ok(())
}

async fn run_command(shell: &ShellHandle, line: &str, out: &mut impl Write) -> anyhow::Result<bool> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Ok(true);
    };
    let arg = parts.next();

    match (cmd, arg) {
        ("open", Some(text)) => match shell.open(text).await? {
            Some(id) => writeln!(out, "opened {}", id)?,
            None => writeln!(out, "ignored: not a URL")?,
        },
        ("list", _) => print_pages(shell, out).await?,
        ("select", Some(n)) => {
            let index: usize = n.parse().with_context(|| format!("bad index {:?}", n))?;
            if shell.select_index(index).await?.is_none() {
                writeln!(out, "no page at {}", index)?;
            }
        }
        ("close", _) => shell.deselect().await?,
        ("snapshot", path) => match shell.snapshot().await? {
            None => writeln!(out, "no snapshot")?,
            Some(bitmap) => {
                let png = bitmap.to_png()?;
                match path {
                    Some(path) => {
                        std::fs::write(path, &png).with_context(|| format!("writing {}", path))?;
                        writeln!(out, "wrote {}x{} to {}", bitmap.width, bitmap.height, path)?;
                    }
                    None => writeln!(
                        out,
                        "data:image/png;base64,{}",
                        base64::engine::general_purpose::STANDARD.encode(&png)
                    )?,
                }
            }
        },
        ("open", None) | ("select", None) => bail!("{} needs an argument", cmd),
        ("quit", _) | ("exit", _) => return Ok(false),
        (other, _) => bail!("unknown command {:?}", other),
    }
    Ok(true)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());
    let config = args.shell_config()?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;
    let shell = rt.block_on(ShellHandle::headless(config))?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in stdin.lock().lines() {
        let line = line?;
        match rt.block_on(run_command(&shell, line.trim(), &mut out)) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => writeln!(out, "error: {:#}", e)?,
        }
        out.flush()?;
    }

    rt.block_on(shell.close())?;
    Ok(())
}
