use clap::Parser;

use fixtrader::cli::{self, CommonArgs};
use fixtrader::decimal::Decimal;
use fixtrader::engine::{self, Session};
use fixtrader::log_info;
use fixtrader::profiler::Profiler;
use fixtrader::risk::{AbortLatch, PositionRisk};
use fixtrader::strategies::convergence::{ConvergenceConfig, ConvergenceQuoter};

const PP: u32 = 4;
const VP: u32 = 0;

#[derive(Parser, Debug)]
#[command(name = "convergence-usd", about = "Two-sided USDC/USDT convergence quoter")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[arg(long)]
    instrument: String,

    #[arg(long, default_value = "0.0001")]
    tick_size: String,

    #[arg(long, default_value = "10")]
    lot_size: String,

    #[arg(long, default_value = "0.0010")]
    quote_reset_threshold: String,

    #[arg(long, default_value_t = false)]
    aggressive: bool,
}

fn main() -> anyhow::Result<()> {
    cli::load_env();
    let args = Args::parse();
    cli::init_tracing();
    args.common.pin_to_core();

    let abort = AbortLatch::new();
    let mut logger = args.common.start_logger(abort.clone())?;
    let profiler = Profiler::new(args.common.profiled);

    let config: ConvergenceConfig<PP, VP> = ConvergenceConfig {
        instrument: args.instrument.clone(),
        host: args.common.host.clone(),
        port: args.common.port.clone(),
        colo: args.common.colo,
        sender_comp_id: args.common.client.clone(),
        username: args.common.auth_username.clone(),
        secret: args.common.auth_secret.clone(),
        heartbeat_secs: args.common.heartbeat_secs,
        tick_size: Decimal::parse(&args.tick_size),
        lot_size: Decimal::parse(&args.lot_size),
        quote_reset_threshold: Decimal::parse(&args.quote_reset_threshold),
        aggressive: args.aggressive,
    };

    let mut session = Session::connect(
        &config.host,
        &config.port,
        config.colo,
        &config.sender_comp_id,
        &config.instrument,
        std::time::Duration::from_millis(200),
        5,
    )?;
    session.login(&config.username, &config.secret, config.heartbeat_secs)?;
    log_info!(logger, "convergence-usd session established on {}", config.instrument);

    let mut strategy = ConvergenceQuoter::new(config, PositionRisk::new(abort.clone()));
    engine::run(&mut session, &mut strategy, &abort, &mut logger, &profiler)
}
