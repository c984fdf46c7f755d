use clap::Parser;

use fixtrader::cli::{self, CommonArgs};
use fixtrader::engine::{self, Session};
use fixtrader::log_info;
use fixtrader::profiler::Profiler;
use fixtrader::risk::AbortLatch;
use fixtrader::strategies::DataCaptureStrategy;

const PP: u32 = 4;
const VP: u32 = 4;

#[derive(Parser, Debug)]
#[command(name = "data-capture", about = "Logs top-of-book updates for one instrument, no order flow")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[arg(long)]
    instrument: String,
}

fn main() -> anyhow::Result<()> {
    cli::load_env();
    let args = Args::parse();
    cli::init_tracing();
    args.common.pin_to_core();

    let abort = AbortLatch::new();
    let mut logger = args.common.start_logger(abort.clone())?;
    let profiler = Profiler::new(args.common.profiled);

    let mut session = Session::connect(
        &args.common.host,
        &args.common.port,
        args.common.colo,
        &args.common.client,
        &args.instrument,
        std::time::Duration::from_secs(1),
        5,
    )?;
    session.login(&args.common.auth_username, &args.common.auth_secret, args.common.heartbeat_secs)?;
    log_info!(logger, "data-capture session established on {}", args.instrument);

    let mut strategy = DataCaptureStrategy::<PP, VP>::new(args.instrument.clone());
    engine::run(&mut session, &mut strategy, &abort, &mut logger, &profiler)
}
