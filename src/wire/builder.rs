use crate::decimal::Decimal;
use crate::orders::{Order, Side, SingleQuote};
use crate::wire::{logon_password, logon_raw_data, SOH};

const PREFIX_CAPACITY: usize = 32;
const TARGET_COMP_ID: &str = "DERIBITSERVER";

fn write_u64(buf: &mut Vec<u8>, value: u64) {
    let mut digits = [0u8; 20];
    let mut i = digits.len();
    let mut v = value;
    if v == 0 {
        buf.push(b'0');
        return;
    }
    while v > 0 {
        i -= 1;
        digits[i] = b'0' + (v % 10) as u8;
        v /= 10;
    }
    buf.extend_from_slice(&digits[i..]);
}

/// Writes `value` as decimal digits into `scratch` starting at `*cursor`,
/// advancing it. Used for the header, which must not grow the main buffer.
fn write_u64_into(scratch: &mut [u8; PREFIX_CAPACITY], cursor: &mut usize, value: u64) {
    let mut digits = [0u8; 20];
    let mut i = digits.len();
    let mut v = value;
    if v == 0 {
        scratch[*cursor] = b'0';
        *cursor += 1;
        return;
    }
    while v > 0 {
        i -= 1;
        digits[i] = b'0' + (v % 10) as u8;
        v /= 10;
    }
    let n = digits.len() - i;
    scratch[*cursor..*cursor + n].copy_from_slice(&digits[i..]);
    *cursor += n;
}

fn append_field(buf: &mut Vec<u8>, tag: u32, value: &str) {
    write_u64(buf, tag as u64);
    buf.push(b'=');
    buf.extend_from_slice(value.as_bytes());
    buf.push(SOH);
}

fn append_u64_field(buf: &mut Vec<u8>, tag: u32, value: u64) {
    write_u64(buf, tag as u64);
    buf.push(b'=');
    write_u64(buf, value);
    buf.push(SOH);
}

fn append_decimal_field<const P: u32>(buf: &mut Vec<u8>, tag: u32, value: Decimal<P>) {
    append_field(buf, tag, &value.to_display_string());
}

fn append_bool_field(buf: &mut Vec<u8>, tag: u32, value: bool) {
    append_field(buf, tag, if value { "Y" } else { "N" });
}

fn append_char_field(buf: &mut Vec<u8>, tag: u32, value: char) {
    let mut tmp = [0u8; 4];
    append_field(buf, tag, value.encode_utf8(&mut tmp));
}

fn checksum_of(body: &[u8]) -> u32 {
    body.iter().map(|&b| b as u32).sum::<u32>() % 256
}

/// Stateful, reusable encoder: one instance per session. Every `*_message`
/// method clears and rebuilds the internal buffer, writes the header into
/// a reserved 32-byte prefix after the body is assembled, and returns the
/// fully framed message slice. No per-field heap allocation.
pub struct FixMessageBuilder {
    sender_comp_id: String,
    buffer: Vec<u8>,
}

impl FixMessageBuilder {
    pub fn new(sender_comp_id: impl Into<String>) -> Self {
        FixMessageBuilder {
            sender_comp_id: sender_comp_id.into(),
            buffer: Vec::with_capacity(512),
        }
    }

    fn begin(&mut self, msg_type: &str, seq_num: u64) {
        self.buffer.clear();
        self.buffer.resize(PREFIX_CAPACITY, 0);
        append_field(&mut self.buffer, 35, msg_type);
        append_field(&mut self.buffer, 49, &self.sender_comp_id);
        append_field(&mut self.buffer, 56, TARGET_COMP_ID);
        append_u64_field(&mut self.buffer, 34, seq_num);
    }

    fn finish(&mut self) -> &str {
        let body_len = self.buffer.len() - PREFIX_CAPACITY;
        let checksum = checksum_of(&self.buffer[PREFIX_CAPACITY..]);
        append_field(&mut self.buffer, 10, &format!("{checksum:03}"));

        let mut scratch = [0u8; PREFIX_CAPACITY];
        let mut cursor = 0usize;
        scratch[cursor..cursor + 9].copy_from_slice(b"8=FIX.4.4");
        cursor += 9;
        scratch[cursor] = SOH;
        cursor += 1;
        scratch[cursor] = b'9';
        cursor += 1;
        scratch[cursor] = b'=';
        cursor += 1;
        write_u64_into(&mut scratch, &mut cursor, body_len as u64);
        scratch[cursor] = SOH;
        cursor += 1;

        let header_start = PREFIX_CAPACITY - cursor;
        self.buffer[header_start..PREFIX_CAPACITY].copy_from_slice(&scratch[..cursor]);

        std::str::from_utf8(&self.buffer[header_start..]).expect("FIX buffer is ASCII-only by construction")
    }

    pub fn login(&mut self, seq_num: u64, username: &str, secret: &str, heartbeat_secs: u32, now_ms: u64) -> &str {
        self.begin("A", seq_num);
        append_u64_field(&mut self.buffer, 108, heartbeat_secs as u64);
        let raw_data = logon_raw_data(now_ms);
        let password = logon_password(&raw_data, secret);
        append_field(&mut self.buffer, 96, &raw_data);
        append_field(&mut self.buffer, 553, username);
        append_field(&mut self.buffer, 554, &password);
        append_bool_field(&mut self.buffer, 9001, true);
        self.finish()
    }

    pub fn logout(&mut self, seq_num: u64) -> &str {
        self.begin("5", seq_num);
        self.finish()
    }

    pub fn heartbeat(&mut self, seq_num: u64, test_req_id: Option<&str>) -> &str {
        self.begin("0", seq_num);
        if let Some(id) = test_req_id {
            append_field(&mut self.buffer, 112, id);
        }
        self.finish()
    }

    pub fn market_data_request_top_level(&mut self, seq_num: u64, symbol: &str) -> &str {
        self.begin("V", seq_num);
        append_u64_field(&mut self.buffer, 263, 0);
        append_u64_field(&mut self.buffer, 264, 1);
        append_field(&mut self.buffer, 55, symbol);
        append_u64_field(&mut self.buffer, 267, 2);
        append_u64_field(&mut self.buffer, 269, 0);
        append_u64_field(&mut self.buffer, 269, 1);
        self.finish()
    }

    pub fn market_data_refresh_single(&mut self, seq_num: u64, symbol: &str) -> &str {
        self.begin("V", seq_num);
        append_u64_field(&mut self.buffer, 263, 1);
        append_u64_field(&mut self.buffer, 265, 1);
        append_field(&mut self.buffer, 55, symbol);
        append_u64_field(&mut self.buffer, 267, 2);
        append_u64_field(&mut self.buffer, 269, 0);
        append_u64_field(&mut self.buffer, 269, 1);
        self.finish()
    }

    pub fn new_order_single<const PP: u32, const VP: u32>(
        &mut self,
        seq_num: u64,
        symbol: &str,
        quote: &SingleQuote<PP, VP>,
    ) -> &str {
        self.begin("D", seq_num);
        let cl_ord_id = if quote.take_profit {
            format!("t{seq_num}")
        } else {
            seq_num.to_string()
        };
        append_field(&mut self.buffer, 11, &cl_ord_id);
        append_u64_field(&mut self.buffer, 54, quote.side as u64);
        append_decimal_field(&mut self.buffer, 38, quote.volume);
        append_decimal_field(&mut self.buffer, 44, quote.price);
        append_field(&mut self.buffer, 55, symbol);
        self.finish()
    }

    pub fn new_order_single_from_order<const PP: u32, const VP: u32>(
        &mut self,
        seq_num: u64,
        order: &Order<PP, VP>,
    ) -> &str {
        self.begin("D", seq_num);
        let side = order.side.expect("order must have a side before being sent");
        let cl_ord_id = if order.take_profit {
            format!("t{seq_num}")
        } else {
            seq_num.to_string()
        };
        append_field(&mut self.buffer, 11, &cl_ord_id);
        append_u64_field(&mut self.buffer, 54, side as u64);
        append_decimal_field(&mut self.buffer, 38, order.volume);
        append_decimal_field(&mut self.buffer, 44, order.price);
        append_field(&mut self.buffer, 55, &order.symbol);
        self.finish()
    }

    /// FOK market order: `40=1` (Market), `59=4` (FillOrKill).
    pub fn new_market_order_single<const PP: u32, const VP: u32>(
        &mut self,
        seq_num: u64,
        order: &Order<PP, VP>,
    ) -> &str {
        self.begin("D", seq_num);
        let side = order.side.expect("order must have a side before being sent");
        append_field(&mut self.buffer, 11, &seq_num.to_string());
        append_u64_field(&mut self.buffer, 40, 1);
        append_u64_field(&mut self.buffer, 59, 4);
        append_decimal_field(&mut self.buffer, 44, order.price);
        append_decimal_field(&mut self.buffer, 38, order.volume);
        append_u64_field(&mut self.buffer, 54, side as u64);
        append_field(&mut self.buffer, 55, &order.symbol);
        self.finish()
    }

    pub fn order_cancel_request(&mut self, seq_num: u64, symbol: &str, orig_cl_ord_id: &str) -> &str {
        self.begin("F", seq_num);
        append_field(&mut self.buffer, 41, orig_cl_ord_id);
        append_field(&mut self.buffer, 55, symbol);
        self.finish()
    }

    pub fn request_for_positions(&mut self, seq_num: u64, req_id: &str) -> &str {
        self.begin("AN", seq_num);
        append_field(&mut self.buffer, 710, req_id);
        append_u64_field(&mut self.buffer, 724, 0);
        append_u64_field(&mut self.buffer, 263, 1);
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::FixReader;

    #[test]
    fn logon_round_trip_has_valid_checksum_and_length() {
        let mut builder = FixMessageBuilder::new("CLIENT1");
        let msg = builder
            .login(1, "u", "s", 30, 1_700_000_000_000)
            .to_string();

        let soh = SOH as char;

        // locate "9=<len>" header field and verify it matches the body span
        let parts: Vec<&str> = msg.split(soh).collect();
        assert!(parts[0].starts_with("8=FIX.4.4"));
        let len_field = parts[1];
        assert!(len_field.starts_with("9="));
        let declared_len: usize = len_field[2..].parse().unwrap();

        let header_len = parts[0].len() + 1 + len_field.len() + 1;
        // body excludes the trailing 10=NNN field per the length definition
        let checksum_tag_pos = msg.rfind("10=").unwrap();
        let body_for_len = &msg.as_bytes()[header_len..checksum_tag_pos];
        assert_eq!(body_for_len.len(), declared_len);

        let checksum: u32 = msg[checksum_tag_pos + 3..checksum_tag_pos + 6].parse().unwrap();
        assert_eq!(checksum, checksum_of(body_for_len));

        let reader = FixReader::parse(&msg);
        assert!(reader.is_message_type("A"));
        assert_eq!(reader.get_string(553, 0), "u");
        assert!(reader.get_string(96, 0).starts_with("1700000000000."));
        assert_eq!(reader.get_string(9001, 0), "Y");
    }

    #[test]
    fn new_order_single_marks_take_profit_clordid() {
        let mut builder = FixMessageBuilder::new("C");
        let quote = SingleQuote {
            price: Decimal::<4>::parse("0.9990"),
            volume: Decimal::<2>::parse("10"),
            side: Side::Bid,
            take_profit: true,
        };
        let msg = builder.new_order_single(7, "BTC-PERP", &quote).to_string();
        let reader = FixReader::parse(&msg);
        assert_eq!(reader.get_string(11, 0), "t7");
        assert_eq!(reader.get_number::<u32>(54, 0), 1);
    }
}
