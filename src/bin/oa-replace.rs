//! oa-replace -- standalone MCP find-and-replace server.
//!
//! Usage: oa-replace [--workspace <path>] [--max-file-size <bytes>]

use anyhow::Context;

/// Value following `flag` in the process arguments, if any.
fn arg_value(flag: &str) -> Option<String> {
    std::env::args().skip_while(|a| a != flag).nth(1)
}

fn main() -> anyhow::Result<()> {
    // Log to stderr so stdout carries only JSON-RPC.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = oa_replace::ServerConfig::default();

    if let Some(workspace) = arg_value("--workspace") {
        config.workspace = workspace.into();
    }
    config.workspace = config
        .workspace
        .canonicalize()
        .with_context(|| format!("invalid workspace {}", config.workspace.display()))?;

    if let Some(max) = arg_value("--max-file-size") {
        config.max_file_bytes = max
            .parse()
            .with_context(|| format!("invalid --max-file-size {max:?}"))?;
    }

    oa_replace::run_mcp_server(config)
}
