use anyhow::Context;
use hyperliquid_provider::config::{Config, TransportKind};
use hyperliquid_provider::trading::redact::mask_address;

/// Transport and port chosen on the command line
#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    transport: Option<TransportKind>,
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cli = match parse_args(&args) {
        Ok(Some(cli)) => cli,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(message) => {
            eprintln!("{}", message);
            print_usage();
            std::process::exit(1);
        }
    };

    init_tracing();

    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(transport) = cli.transport {
        config.server.transport = transport;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    tracing::info!(
        transport = %config.server.transport,
        network = config.network.name(),
        "Starting Hyperliquid Provider"
    );
    if let Some(account) = &config.credentials.account_address {
        tracing::info!(account = %mask_address(account), "Agent mode enabled");
    }
    tracing::info!(
        max_order_size = %config.trading.max_order_size,
        max_order_notional = %config.trading.max_order_notional,
        min_notional = %config.trading.min_notional,
        "Trading limits"
    );

    run(config).await
}

/// Logs go to stderr; stdout carries the stdio MCP protocol
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(feature = "mcp_server")]
async fn run(config: Config) -> anyhow::Result<()> {
    use hyperliquid_provider::mcp::HyperliquidServer;

    let server = HyperliquidServer::from_config(&config).context("failed to create client")?;

    match config.server.transport {
        TransportKind::Stdio => {
            hyperliquid_provider::transport::stdio::run_stdio_server(server).await
        }
        TransportKind::Sse => run_sse(server, &config).await,
        TransportKind::Http => run_http(server.context, &config).await,
    }
}

#[cfg(not(feature = "mcp_server"))]
async fn run(config: Config) -> anyhow::Result<()> {
    use hyperliquid_provider::hyperliquid::HyperliquidClient;
    use hyperliquid_provider::tools::ToolContext;
    use std::sync::Arc;

    match config.server.transport {
        TransportKind::Http => {
            let client = Arc::new(HyperliquidClient::from_config(&config)?);
            let context = Arc::new(ToolContext::new(client, config.trading.clone()));
            run_http(context, &config).await
        }
        other => anyhow::bail!("{} transport requires the 'mcp_server' feature", other),
    }
}

#[cfg(feature = "sse")]
async fn run_sse(
    server: hyperliquid_provider::mcp::HyperliquidServer,
    config: &Config,
) -> anyhow::Result<()> {
    let addr = config.server.bind_addr()?;
    hyperliquid_provider::transport::sse::run_sse_server(server, addr).await
}

#[cfg(all(feature = "mcp_server", not(feature = "sse")))]
async fn run_sse(
    _server: hyperliquid_provider::mcp::HyperliquidServer,
    _config: &Config,
) -> anyhow::Result<()> {
    anyhow::bail!("SSE transport not available - build with the 'sse' feature")
}

#[cfg(feature = "http_transport")]
async fn run_http(
    context: std::sync::Arc<hyperliquid_provider::tools::ToolContext>,
    config: &Config,
) -> anyhow::Result<()> {
    hyperliquid_provider::transport::http::start_http_server(&config.server, context).await
}

#[cfg(not(feature = "http_transport"))]
async fn run_http(
    _context: std::sync::Arc<hyperliquid_provider::tools::ToolContext>,
    _config: &Config,
) -> anyhow::Result<()> {
    anyhow::bail!("HTTP transport not available - build with the 'http_transport' feature")
}

/// Parses command-line arguments; `Ok(None)` means help was requested
fn parse_args(args: &[String]) -> Result<Option<CliArgs>, String> {
    let mut cli = CliArgs::default();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--mode" => {
                let mode = iter.next().ok_or("--mode requires a value")?;
                cli.transport = Some(mode.parse()?);
            }
            "--stdio" => cli.transport = Some(TransportKind::Stdio),
            "--http" => cli.transport = Some(TransportKind::Http),
            "--sse" => cli.transport = Some(TransportKind::Sse),
            "--port" => {
                let port = iter.next().ok_or("--port requires a value")?;
                let port = port
                    .parse::<u16>()
                    .map_err(|_| format!("Invalid port: {}", port))?;
                cli.port = Some(port);
            }
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }

    Ok(Some(cli))
}

fn print_usage() {
    println!("Hyperliquid Provider - MCP server for Hyperliquid perpetuals trading");
    println!();
    println!("USAGE:");
    println!("    hyperliquid-provider [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --mode <MODE>       Transport: stdio, http or sse (default: MCP_TRANSPORT or stdio)");
    println!("    --stdio             Shortcut for --mode stdio");
    println!("    --http              Shortcut for --mode http");
    println!("    --sse               Shortcut for --mode sse");
    println!("    --port <PORT>       Port for http/sse (default: MCP_PORT or 8000)");
    println!("    --help, -h          Print this help message");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    HYPERLIQUID_PRIVATE_KEY       Signing key (required)");
    println!("    HYPERLIQUID_ACCOUNT_ADDRESS   Account traded in agent mode");
    println!("    HYPERLIQUID_VAULT_ADDRESS     Vault sub-account");
    println!("    HYPERLIQUID_TESTNET           'true' selects testnet");
    println!("    HYPERLIQUID_BASE_URL          API base URL override");
    println!("    MAX_ORDER_SIZE                Max size per order (default: 1000000)");
    println!("    MAX_ORDER_NOTIONAL            Max notional per order in USD, 0 disables (default: 100000)");
    println!("    MIN_NOTIONAL_USD              Minimum order notional (default: 10)");
    println!("    LEG_TIMEOUT_MS                Per-leg submission timeout (default: 10000)");
    println!("    NETWORK_RETRY_DELAY_MS        Delay before the network retry (default: 500)");
    println!("    MARKET_SLIPPAGE               Market entry slippage fraction (default: 0.05)");
    println!("    MCP_HOST / MCP_PORT           HTTP/SSE bind address (default: 0.0.0.0:8000)");
    println!("    MCP_TRANSPORT                 stdio, http or sse");
    println!("    MCP_BEARER_TOKEN              Bearer token required by the HTTP transport");
    println!("    RUST_LOG                      Logging level (default: info)");
    println!("    LOG_FORMAT                    'json' for JSON logs");
    println!();
    println!("EXAMPLES:");
    println!("    # Local MCP client (Claude Desktop)");
    println!("    hyperliquid-provider --stdio");
    println!();
    println!("    # HTTP JSON-RPC on a custom port");
    println!("    hyperliquid-provider --mode http --port 8080");
}
