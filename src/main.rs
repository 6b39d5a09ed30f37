use ferrum_modules::{ConnectionTarget, ModuleClient, ModuleOptions, NodeConfig, Param};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: ferrum-modules [--raw] [--debug] [--no-raise] HOST:PORT COMMAND [ARGS...]";

#[tokio::main]
async fn main() {
    let (options, positional) = parse_args(std::env::args().skip(1));

    // Initialize logging (RUST_LOG controls the level, --debug forces DEBUG for command traces)
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(options.show_debug_logs))
        .init();

    if positional.len() < 2 {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    let node = match NodeConfig::parse(&positional[0]) {
        Ok(node) => node,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    let mut client = ModuleClient::new("Redis", ConnectionTarget::Single(node), options);
    if let Err(e) = client.connect().await {
        error!("{}", e);
        std::process::exit(1);
    }

    let command = positional[1].clone();
    let args: Vec<Param> = positional[2..].iter().map(Param::from).collect();

    let exit_code = match client.execute_normalized(&command, args).await {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                error!("Failed to render result: {}", e);
                1
            }
        },
        Err(e) => {
            error!("{}", e);
            1
        }
    };

    if let Err(e) = client.disconnect().await {
        error!("{}", e);
    }
    info!("Done");
    std::process::exit(exit_code);
}

/// Split leading flags from positional arguments; everything after the first positional is kept verbatim
fn parse_args(args: impl IntoIterator<Item = String>) -> (ModuleOptions, Vec<String>) {
    let mut options = ModuleOptions::default();
    let mut positional = Vec::new();
    for arg in args {
        if !positional.is_empty() {
            positional.push(arg);
            continue;
        }
        match arg.as_str() {
            "--raw" => options.return_raw_response = true,
            "--debug" => options.show_debug_logs = true,
            "--no-raise" => options.handle_errors = false,
            _ => positional.push(arg),
        }
    }
    (options, positional)
}

fn log_filter(debug: bool) -> EnvFilter {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if debug {
        filter.add_directive(tracing::Level::DEBUG.into())
    } else {
        filter
    }
}
