use clap::Parser;
use hickory_proto::op::Message;
use hickory_proto::rr::RecordType;
use plain_upstream_domain::CliOverrides;
use plain_upstream_infrastructure::dns::upstream::upstream_from_spec;
use plain_upstream_infrastructure::dns::{MessageBuilder, Upstream, UpstreamOptions};
use std::str::FromStr;
use std::time::Instant;
use tracing::{error, info};

mod bootstrap;

#[derive(Parser)]
#[command(name = "plain-upstream")]
#[command(version)]
#[command(about = "Send one DNS query to a plain DNS upstream (UDP with TCP fallback)")]
struct Cli {
    /// Domain name to query
    #[arg(default_value = "example.com.")]
    name: String,

    /// Record type (A, AAAA, MX, TXT, ...)
    #[arg(short = 'q', long = "type", default_value = "A")]
    record_type: String,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Upstream address (host:port, udp://host:port or tcp://host:port)
    #[arg(short = 'u', long)]
    upstream: Option<String>,

    /// Per-attempt timeout in milliseconds
    #[arg(short = 't', long)]
    timeout_ms: Option<u64>,

    /// Query over TCP only
    #[arg(long)]
    tcp: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        upstream: cli.upstream.clone(),
        timeout_ms: cli.timeout_ms,
        prefer_tcp: cli.tcp,
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config.logging);

    let spec = config.upstream.to_spec()?;
    let options = UpstreamOptions::new(config.upstream.timeout());
    let upstream = upstream_from_spec(&spec, &options);

    info!(
        upstream = %upstream.address(),
        timeout_ms = config.upstream.timeout_ms,
        "Upstream ready"
    );

    let record_type = RecordType::from_str(&cli.record_type.to_ascii_uppercase())?;
    let query = MessageBuilder::build_query(&cli.name, record_type)?;

    let start = Instant::now();
    let reply = upstream.exchange(&query).await.map_err(|e| {
        error!(upstream = %upstream.address(), error = %e, "Exchange failed");
        anyhow::anyhow!(e)
    })?;

    print_reply(&reply, upstream.address(), start.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}

fn print_reply(reply: &Message, server: String, elapsed_ms: f64) {
    println!(
        ";; id: {}, status: {:?}, truncated: {}",
        reply.id(),
        reply.response_code(),
        reply.truncated()
    );

    println!(";; QUESTION:");
    for query in reply.queries() {
        println!("{}", query);
    }

    println!(";; ANSWER:");
    for record in reply.answers() {
        println!("{}", record);
    }

    println!(";; SERVER: {} ({:.3} ms)", server, elapsed_ms);
}
