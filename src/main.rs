//! rsnapsearch 命令行：读取 JSON 请求描述，输出拦截 URL 或 false

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rsnapsearch::{ConfigManager, DetectOutcome, Detector, Request};

#[derive(Parser, Debug)]
#[command(name = "rsnapsearch", version, about = "判断请求是否需要转发到预渲染服务")]
struct Cli {
    /// 请求描述 JSON 文件（CGI/WSGI 风格的扁平键值对象）
    #[arg(short, long)]
    request: PathBuf,

    /// 校验请求路径的文件扩展名
    #[arg(long)]
    check_file_extensions: bool,

    /// 自定义 robots.json
    #[arg(long)]
    robots_json: Option<PathBuf>,

    /// 自定义 extensions.json（需同时开启 --check-file-extensions）
    #[arg(long)]
    extensions_json: Option<PathBuf>,

    /// 忽略路由正则，可重复
    #[arg(long = "ignored-route")]
    ignored_routes: Vec<String>,

    /// 白名单路由正则，可重复
    #[arg(long = "matched-route")]
    matched_routes: Vec<String>,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<DetectOutcome> {
    let mut builder = ConfigManager::custom()
        .check_file_extensions(cli.check_file_extensions)
        .ignored_routes(cli.ignored_routes)
        .matched_routes(cli.matched_routes);
    if let Some(path) = cli.robots_json {
        builder = builder.robots_json(path);
    }
    if let Some(path) = cli.extensions_json {
        builder = builder.extensions_json(path);
    }

    let detector = Detector::with_config(builder.build()).context("检测器初始化失败")?;

    let content = fs::read_to_string(&cli.request)
        .with_context(|| format!("读取请求描述失败：{}", cli.request.display()))?;
    let request: Request = serde_json::from_str(&content)
        .with_context(|| format!("请求描述不是合法的 JSON 对象：{}", cli.request.display()))?;

    Ok(detector.detect(&request)?)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(DetectOutcome::Intercept { url }) => {
            println!("{}", url);
            ExitCode::SUCCESS
        }
        Ok(DetectOutcome::Skip(reason)) => {
            tracing::info!("不拦截：{}", reason);
            println!("false");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("错误：{:#}", e);
            ExitCode::FAILURE
        }
    }
}
