use std::collections::HashMap;
use std::str::FromStr;

use crate::decimal::Decimal;
use crate::wire::SOH;

const UNKNOWN: &str = "UNKNOWN";

/// Zero-copy parser over a single framed message. Holds borrowed slices
/// into the caller's buffer; nothing here allocates except the tag index
/// itself.
pub struct FixReader<'a> {
    fields: HashMap<u32, Vec<&'a str>>,
    message_type: &'a str,
}

impl<'a> FixReader<'a> {
    /// Scans `data` for `tag=value\x01` fields. A field missing its `=` or
    /// its trailing `\x01` stops the scan silently rather than erroring —
    /// callers rely on whatever fields were found before the truncation.
    pub fn parse(data: &'a str) -> Self {
        let bytes = data.as_bytes();
        let mut fields: HashMap<u32, Vec<&'a str>> = HashMap::new();
        let mut pos = 0usize;

        while pos < bytes.len() {
            let Some(eq_offset) = bytes[pos..].iter().position(|&b| b == b'=') else {
                break;
            };
            let tag_end = pos + eq_offset;

            let Some(soh_offset) = bytes[tag_end + 1..].iter().position(|&b| b == SOH) else {
                break;
            };
            let value_end = tag_end + 1 + soh_offset;

            let tag_str = &data[pos..tag_end];
            let Ok(tag) = tag_str.parse::<u32>() else {
                break;
            };
            let value = &data[tag_end + 1..value_end];

            fields.entry(tag).or_default().push(value);
            pos = value_end + 1;
        }

        let message_type = fields.get(&35).and_then(|v| v.first()).copied().unwrap_or(UNKNOWN);

        FixReader { fields, message_type }
    }

    pub fn message_type(&self) -> &str {
        self.message_type
    }

    pub fn is_message_type(&self, msg_type: &str) -> bool {
        self.message_type == msg_type
    }

    pub fn contains(&self, tag: u32, index: usize) -> bool {
        self.fields.get(&tag).is_some_and(|v| index < v.len())
    }

    pub fn field_count(&self, tag: u32) -> usize {
        self.fields.get(&tag).map_or(0, Vec::len)
    }

    pub fn get_string(&self, tag: u32, index: usize) -> &str {
        self.fields
            .get(&tag)
            .and_then(|v| v.get(index))
            .copied()
            .unwrap_or(UNKNOWN)
    }

    pub fn get_string_view(&self, tag: u32, index: usize) -> &str {
        self.get_string(tag, index)
    }

    pub fn get_number<T: FromStr + Default>(&self, tag: u32, index: usize) -> T {
        self.fields
            .get(&tag)
            .and_then(|v| v.get(index))
            .and_then(|s| s.parse::<T>().ok())
            .unwrap_or_default()
    }

    pub fn get_bool(&self, tag: u32, index: usize) -> bool {
        self.get_string(tag, index) == "Y"
    }

    pub fn get_decimal<const P: u32>(&self, tag: u32, index: usize) -> Decimal<P> {
        match self.fields.get(&tag).and_then(|v| v.get(index)) {
            Some(value) => Decimal::parse(value),
            None => Decimal::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(body: &str) -> String {
        body.replace('|', "\u{1}")
    }

    #[test]
    fn parses_fields_and_caches_message_type() {
        let raw = msg("35=W|269=0|270=0.9990|269=1|270=1.0010|");
        let reader = FixReader::parse(&raw);
        assert_eq!(reader.message_type(), "W");
        assert!(reader.is_message_type("W"));
        assert_eq!(reader.field_count(269), 2);
        assert_eq!(reader.get_string(269, 0), "0");
        assert_eq!(reader.get_string(269, 1), "1");
        let bid: Decimal<4> = reader.get_decimal(270, 0);
        assert_eq!(bid.raw(), 9990);
    }

    #[test]
    fn missing_tag_returns_sentinels() {
        let raw = msg("35=0|");
        let reader = FixReader::parse(&raw);
        assert_eq!(reader.get_string(999, 0), "UNKNOWN");
        assert_eq!(reader.get_number::<u32>(999, 0), 0u32);
        assert!(!reader.get_bool(999, 0));
        assert!(!reader.contains(999, 0));
    }

    #[test]
    fn stops_scanning_on_truncated_field() {
        let raw = msg("35=0|11=abc");
        let reader = FixReader::parse(&raw);
        assert!(reader.is_message_type("0"));
        assert_eq!(reader.get_string(11, 0), "UNKNOWN");
    }
}
