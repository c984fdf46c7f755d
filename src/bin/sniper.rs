use clap::Parser;

use fixtrader::cli::{self, CommonArgs};
use fixtrader::decimal::Decimal;
use fixtrader::engine::{self, Session};
use fixtrader::log_info;
use fixtrader::profiler::Profiler;
use fixtrader::risk::{AbortLatch, PositionRisk};
use fixtrader::strategies::sniper::{SniperConfig, SniperHitter};

const PP: u32 = 1;
const VP: u32 = 0;

#[derive(Parser, Debug)]
#[command(name = "sniper", about = "Index pickoff against the touch")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[arg(long)]
    instrument: String,

    #[arg(long, default_value = "0.5")]
    tick_size: String,

    #[arg(long, default_value = "10")]
    lots: String,
}

fn main() -> anyhow::Result<()> {
    cli::load_env();
    let args = Args::parse();
    cli::init_tracing();
    args.common.pin_to_core();

    let abort = AbortLatch::new();
    let mut logger = args.common.start_logger(abort.clone())?;
    let profiler = Profiler::new(args.common.profiled);

    let config: SniperConfig<PP, VP> = SniperConfig {
        instrument: args.instrument.clone(),
        host: args.common.host.clone(),
        port: args.common.port.clone(),
        colo: args.common.colo,
        sender_comp_id: args.common.client.clone(),
        username: args.common.auth_username.clone(),
        secret: args.common.auth_secret.clone(),
        heartbeat_secs: args.common.heartbeat_secs,
        tick_size: Decimal::parse(&args.tick_size),
        lots: Decimal::parse(&args.lots),
    };

    let mut session = Session::connect(
        &config.host,
        &config.port,
        config.colo,
        &config.sender_comp_id,
        &config.instrument,
        std::time::Duration::from_secs(1),
        5,
    )?;
    session.login(&config.username, &config.secret, config.heartbeat_secs)?;
    log_info!(logger, "sniper session established on {}", config.instrument);

    let mut strategy = SniperHitter::new(config, PositionRisk::new(abort.clone()));
    engine::run(&mut session, &mut strategy, &abort, &mut logger, &profiler)
}
