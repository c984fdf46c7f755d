//! End-to-end scenario test driven over a real loopback socket: a fake
//! venue thread plays the other side of the wire while the library code
//! runs its actual `Session`/strategy logic against it.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use fixtrader::decimal::Decimal;
use fixtrader::engine::{Session, Strategy};
use fixtrader::logger::{LogLevel, Logger, LoggerConfig};
use fixtrader::risk::{AbortLatch, PositionRisk};
use fixtrader::strategies::convergence::{ConvergenceConfig, ConvergenceQuoter};
use fixtrader::wire::FixReader;

const SOH: char = '\u{1}';

fn test_logger(dir: &std::path::Path) -> Logger {
    Logger::start(
        LoggerConfig {
            log_folder: dir.to_path_buf(),
            log_prefix: "scenario".to_string(),
            min_level: LogLevel::Debug,
            print_logs: false,
            csv: false,
            single_threaded: true,
        },
        AbortLatch::new(),
    )
    .unwrap()
}

fn fix(body: String) -> String {
    format!("8=FIX.4.4{SOH}9={}{SOH}{body}10=000{SOH}", body.len())
}

/// S1 (logon) + S2 (top-of-book quote): the client logs on, requests the
/// top of book, and the quoter reacts to a snapshot by posting both sides
/// of the touch.
#[test]
fn logon_round_trip_and_top_of_book_quote() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let venue = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();

        let mut buf = [0u8; 4096];
        let n = stream.read(&mut buf).unwrap();
        let logon = String::from_utf8_lossy(&buf[..n]).into_owned();
        let reader = FixReader::parse(&logon);
        assert!(reader.is_message_type("A"), "expected Logon, got {}", reader.message_type());
        assert_eq!(reader.get_string(553, 0), "scenario-user");

        let ack = fix(format!("35=A{SOH}108=30{SOH}"));
        stream.write_all(ack.as_bytes()).unwrap();

        // market data request
        let mut buf = [0u8; 4096];
        let n = stream.read(&mut buf).unwrap();
        let reader = FixReader::parse(&String::from_utf8_lossy(&buf[..n]));
        assert!(reader.is_message_type("V"), "expected MarketDataRequest, got {}", reader.message_type());

        let mut orders = Vec::new();
        for _ in 0..2 {
            let mut buf = [0u8; 4096];
            let n = stream.read(&mut buf).unwrap();
            orders.push(String::from_utf8_lossy(&buf[..n]).into_owned());
        }
        orders
    });

    let dir = tempfile::tempdir().unwrap();
    let mut logger = test_logger(dir.path());
    let abort = AbortLatch::new();

    let mut session = Session::connect(
        "127.0.0.1",
        &addr.port().to_string(),
        false,
        "CLIENT",
        "BTC_USDC-PERPETUAL",
        std::time::Duration::from_millis(200),
        5,
    )
    .unwrap();

    session.login("scenario-user", "scenario-secret", 30).unwrap();

    let config: ConvergenceConfig<4, 0> = ConvergenceConfig {
        instrument: "BTC_USDC-PERPETUAL".to_string(),
        host: "127.0.0.1".to_string(),
        port: addr.port().to_string(),
        colo: false,
        sender_comp_id: "CLIENT".to_string(),
        username: "scenario-user".to_string(),
        secret: "scenario-secret".to_string(),
        heartbeat_secs: 30,
        tick_size: Decimal::parse("0.0001"),
        lot_size: Decimal::parse("10"),
        quote_reset_threshold: Decimal::parse("0.0010"),
        aggressive: false,
    };
    let mut strategy = ConvergenceQuoter::new(config, PositionRisk::new(abort.clone()));

    strategy.before_receive(&mut session, &mut logger).unwrap();

    let snapshot = fix(format!("35=W{SOH}269=0{SOH}270=0.9990{SOH}269=1{SOH}270=1.0010{SOH}"));
    let reader = FixReader::parse(&snapshot);
    strategy.on_market_data(&mut session, &reader, &mut logger).unwrap();

    let orders = venue.join().unwrap();
    assert_eq!(orders.len(), 2, "expected one bid and one ask NewOrderSingle");

    let bid = FixReader::parse(&orders[0]);
    assert!(bid.is_message_type("D"));
    assert_eq!(bid.get_number::<u32>(54, 0), 1);
    let bid_price: Decimal<4> = bid.get_decimal(44, 0);
    assert_eq!(bid_price.to_display_string(), "0.999");
    let bid_qty: Decimal<0> = bid.get_decimal(38, 0);
    assert_eq!(bid_qty.to_display_string(), "10");

    let ask = FixReader::parse(&orders[1]);
    assert!(ask.is_message_type("D"));
    assert_eq!(ask.get_number::<u32>(54, 0), 2);
    let ask_price: Decimal<4> = ask.get_decimal(44, 0);
    assert_eq!(ask_price.to_display_string(), "1.001");

    logger.stop();
}
