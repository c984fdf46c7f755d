use std::collections::HashMap;

use clap::Parser;

use fixtrader::cli::{self, CommonArgs};
use fixtrader::decimal::Decimal;
use fixtrader::engine::{self, Session};
use fixtrader::log_info;
use fixtrader::profiler::Profiler;
use fixtrader::risk::{AbortLatch, PositionRisk};
use fixtrader::strategies::triangular::{self, BtcHitter, BtcTriangularConfig};

const PP: u32 = 4;
const VP: u32 = 0;

/// BTC/USDT, BTC/USDC, USDC/USDT cycle.
#[derive(Parser, Debug)]
#[command(name = "triangular-btc-eth", about = "BTC/stablecoin triangular cycle")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// BTC/USDT, BTC/USDC, USDC/USDT, in that order.
    #[arg(long, num_args = 3)]
    instrument: Vec<String>,

    #[arg(long, default_value = "1")]
    volume_size: String,

    #[arg(long, default_value_t = 1.0)]
    contract_size: f64,
}

fn main() -> anyhow::Result<()> {
    cli::load_env();
    let args = Args::parse();
    cli::init_tracing();
    anyhow::ensure!(args.instrument.len() == 3, "exactly three --instrument values are required");
    args.common.pin_to_core();

    let abort = AbortLatch::new();
    let mut logger = args.common.start_logger(abort.clone())?;
    let profiler = Profiler::new(args.common.profiled);

    let instrument_list: [String; 3] = args.instrument.clone().try_into().expect("validated above");
    let instrument_map: HashMap<String, usize> = triangular::instrument_map(&instrument_list);

    let config: BtcTriangularConfig<PP, VP> = BtcTriangularConfig {
        instrument_list,
        instrument_map,
        host: args.common.host.clone(),
        port: args.common.port.clone(),
        colo: args.common.colo,
        sender_comp_id: args.common.client.clone(),
        username: args.common.auth_username.clone(),
        secret: args.common.auth_secret.clone(),
        heartbeat_secs: args.common.heartbeat_secs,
        volume_size: Decimal::parse(&args.volume_size),
        contract_size: args.contract_size,
    };

    let mut session = Session::connect(
        &config.host,
        &config.port,
        config.colo,
        &config.sender_comp_id,
        &config.instrument_list[0],
        std::time::Duration::from_secs(1),
        5,
    )?;
    session.login(&config.username, &config.secret, config.heartbeat_secs)?;
    log_info!(logger, "triangular-btc-eth session established on {:?}", config.instrument_list);

    let mut strategy = BtcHitter::new(config, PositionRisk::new(abort.clone()));
    engine::run(&mut session, &mut strategy, &abort, &mut logger, &profiler)
}
