//! Line tokenizer
//!
//! Walks the trace once, line by line, and pairs every header line with the
//! data block that follows it (if any). Header lines look like
//!
//! ```text
//! 2025/10/03 14:47:38.125000,[Core:Receive],Message=S6F11:'EventReportSend' ...
//! <L [3]
//!   <U4 [1] 1>
//!   <U4 [1] 141>
//! >
//! .
//! ```
//!
//! Lines that do not match the header grammar are skipped.

use crate::config::DecoderConfig;
use crate::types::{DataBlock, Direction, HeaderRecord, Timestamp};
use chrono::NaiveDateTime;
use regex::Regex;
use std::iter::{Enumerate, Peekable};
use std::str::Lines;
use std::sync::OnceLock;

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.f";

static HEADER_REGEX: OnceLock<Regex> = OnceLock::new();
static MESSAGE_REGEX: OnceLock<Regex> = OnceLock::new();
static MESSAGE_NAME_REGEX: OnceLock<Regex> = OnceLock::new();

/// A header line and the data block attached to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub header: HeaderRecord,
    pub block: Option<DataBlock>,
}

/// Iterator over the tokens of a trace
///
/// Reads strictly forward; block lines are consumed together with their header.
pub struct LineTokenizer<'a> {
    lines: Peekable<Enumerate<Lines<'a>>>,
    config: &'a DecoderConfig,
}

impl<'a> LineTokenizer<'a> {
    pub fn new(text: &'a str, config: &'a DecoderConfig) -> Self {
        Self {
            lines: text.lines().enumerate().peekable(),
            config,
        }
    }

    /// Collect block lines up to the terminator, or to end of input
    fn collect_block(&mut self) -> DataBlock {
        let mut lines = Vec::new();
        let mut first_line = 0;
        let mut terminated = false;

        while let Some((index, line)) = self.lines.next() {
            let line = line.trim();
            if line == self.config.terminator {
                terminated = true;
                break;
            }
            if lines.is_empty() {
                first_line = index + 1;
            }
            lines.push(line);
        }

        if !terminated {
            log::warn!(
                "Data block starting at line {} has no terminator, taking it to end of input",
                first_line
            );
        }

        DataBlock {
            text: lines.join("\n"),
            first_line,
            terminated,
        }
    }

    fn next_starts_block(&mut self) -> bool {
        let open_marker = self.config.open_marker.as_str();
        self.lines
            .peek()
            .is_some_and(|(_, line)| line.trim_start().starts_with(open_marker))
    }
}

impl<'a> Iterator for LineTokenizer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, line) = self.lines.next()?;
            let Some(header) = parse_header(line.trim(), index + 1, self.config) else {
                log::trace!("Skipping line {}: not a header", index + 1);
                continue;
            };

            let block = if header.direction.carries_data() && self.next_starts_block() {
                Some(self.collect_block())
            } else {
                None
            };

            return Some(Token { header, block });
        }
    }
}

/// Parse one trimmed line into a header record
///
/// Returns `None` for lines that do not follow
/// `YYYY/MM/DD HH:MM:SS.ffffff,[LogType],Rest` or carry an impossible date.
pub fn parse_header(line: &str, line_no: usize, config: &DecoderConfig) -> Option<HeaderRecord> {
    let header_re = HEADER_REGEX.get_or_init(|| {
        Regex::new(r"^(\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}\.\d+),\[([^\]]+)\],(.*)$")
            .expect("Invalid header regex")
    });

    let caps = header_re.captures(line)?;
    let timestamp = parse_timestamp(&caps[1])?;
    let log_type = &caps[2];
    let rest = &caps[3];

    let direction = if log_type.contains(config.send_marker.as_str()) {
        Direction::Outbound
    } else if log_type.contains(config.receive_marker.as_str()) {
        Direction::Inbound
    } else {
        Direction::None
    };

    let message_name = if direction.carries_data() {
        parse_message_name(rest)
    } else {
        None
    };

    Some(HeaderRecord {
        timestamp,
        direction,
        message_name,
        line: line_no,
    })
}

/// Parse a trace timestamp (`2025/10/03 14:47:38.125000`)
pub fn parse_timestamp(text: &str) -> Option<Timestamp> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()
}

/// Extract the message name from the remainder of a header line
///
/// `Message=...:'Name'` wins over `MessageName=Name`.
fn parse_message_name(rest: &str) -> Option<String> {
    let message_re = MESSAGE_REGEX
        .get_or_init(|| Regex::new(r"Message=.*?:'(\w+)'").expect("Invalid message regex"));
    let message_name_re = MESSAGE_NAME_REGEX
        .get_or_init(|| Regex::new(r"MessageName=(\w+)").expect("Invalid message name regex"));

    message_re
        .captures(rest)
        .or_else(|| message_name_re.captures(rest))
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACE: &str = "\
2025/10/03 14:47:38.125000,[Core:Receive],Message=S6F11:'S6F11' W
<L [3]
  <U4 [1] 1>
  <U4 [1] 141>
>
.
2025/10/03 14:47:38.130000,[Core:Send],MessageName=S6F12
<B [1] 0>
.
2025/10/03 14:47:38.200000,[Core:Info],Connection state changed
garbage line
2025/10/03 14:47:39.000000,[Core:Send],MessageName=S1F1
";

    fn tokens(text: &str) -> Vec<Token> {
        let config = DecoderConfig::default();
        LineTokenizer::new(text, &config).collect()
    }

    #[test]
    fn test_tokenize_headers_and_blocks() {
        let tokens = tokens(TRACE);
        assert_eq!(tokens.len(), 4);

        let first = &tokens[0];
        assert_eq!(first.header.direction, Direction::Inbound);
        assert_eq!(first.header.message_name.as_deref(), Some("S6F11"));
        assert_eq!(first.header.line, 1);
        let block = first.block.as_ref().unwrap();
        assert_eq!(block.text, "<L [3]\n<U4 [1] 1>\n<U4 [1] 141>\n>");
        assert_eq!(block.first_line, 2);
        assert!(block.terminated);

        assert_eq!(tokens[1].header.direction, Direction::Outbound);
        assert_eq!(tokens[1].header.message_name.as_deref(), Some("S6F12"));
        assert_eq!(tokens[1].block.as_ref().unwrap().text, "<B [1] 0>");

        assert_eq!(tokens[2].header.direction, Direction::None);
        assert!(tokens[2].header.message_name.is_none());
        assert!(tokens[2].block.is_none());

        // Header with no block following
        assert_eq!(tokens[3].header.line, 12);
        assert!(tokens[3].block.is_none());
    }

    #[test]
    fn test_unterminated_block_runs_to_end() {
        let text = "2025/10/03 14:47:38.125000,[Core:Receive],MessageName=S6F11\n<L [1]\n<U4 [1] 181>\n>";
        let tokens = tokens(text);
        assert_eq!(tokens.len(), 1);
        let block = tokens[0].block.as_ref().unwrap();
        assert!(!block.terminated);
        assert_eq!(block.text, "<L [1]\n<U4 [1] 181>\n>");
    }

    #[test]
    fn test_block_lines_are_not_reparsed_as_headers() {
        // A header-shaped line inside a block belongs to the block
        let text = "\
2025/10/03 14:47:38.125000,[Core:Receive],MessageName=S6F11
<A [10] 'x'>
2025/10/03 14:47:39.000000,[Core:Send],MessageName=S6F12
.
2025/10/03 14:47:40.000000,[Core:Send],MessageName=S1F1
";
        let tokens = tokens(text);
        assert_eq!(tokens.len(), 2);
        assert!(tokens[0].block.as_ref().unwrap().text.contains("MessageName=S6F12"));
        assert_eq!(tokens[1].header.line, 5);
    }

    #[test]
    fn test_line_numbers_only_move_forward() {
        let tokens = tokens(TRACE);
        let lines: Vec<usize> = tokens.iter().map(|t| t.header.line).collect();
        assert!(lines.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_message_name_patterns() {
        assert_eq!(
            parse_message_name("Message=S6F11:'EventReportSend' SystemBytes=12"),
            Some("EventReportSend".to_string())
        );
        assert_eq!(parse_message_name("MessageName=S2F49 Len=40"), Some("S2F49".to_string()));
        assert_eq!(parse_message_name("no label at all"), None);
    }

    #[test]
    fn test_invalid_calendar_time_is_skipped() {
        let config = DecoderConfig::default();
        assert!(parse_header("2025/13/03 14:47:38.125000,[Core:Send],x", 1, &config).is_none());
        assert!(parse_header("2025/10/03 14:47:38,[Core:Send],x", 1, &config).is_none());
        let header = parse_header("2025/10/03 14:47:38.5,[Core:Send],x", 1, &config).unwrap();
        assert_eq!(header.timestamp.and_utc().timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_custom_markers() {
        let config = DecoderConfig::new()
            .with_send_marker("HSMS:Tx")
            .with_receive_marker("HSMS:Rx");
        let header = parse_header("2025/10/03 14:47:38.125000,[HSMS:Rx],MessageName=S6F11", 3, &config).unwrap();
        assert_eq!(header.direction, Direction::Inbound);
        let header = parse_header("2025/10/03 14:47:38.125000,[Core:Send],MessageName=S6F11", 3, &config).unwrap();
        assert_eq!(header.direction, Direction::None);
    }
}
