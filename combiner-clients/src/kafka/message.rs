//! The `FTMSG/1.0` envelope: a version line, `Name: value` header lines, a
//! blank line, then the body.

use combiner_core::model::{Headers, QueueMessage};

const VERSION_LINE: &str = "FTMSG/1.0";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("message does not start with {VERSION_LINE}")]
    UnknownVersion,
    #[error("malformed header line {0:?}")]
    MalformedHeader(String),
    #[error("message has no header terminator")]
    Unterminated,
}

pub fn encode(message: &QueueMessage) -> String {
    let mut headers: Vec<_> = message.headers.iter().collect();
    headers.sort();

    let mut encoded = String::with_capacity(message.body.len() + 64 * (headers.len() + 1));
    encoded.push_str(VERSION_LINE);
    encoded.push('\n');
    for (name, value) in headers {
        encoded.push_str(name);
        encoded.push_str(": ");
        encoded.push_str(value);
        encoded.push('\n');
    }
    encoded.push('\n');
    encoded.push_str(&message.body);
    encoded
}

pub fn decode(raw: &str) -> Result<QueueMessage, DecodeError> {
    let mut rest = raw;
    let version = next_line(&mut rest).ok_or(DecodeError::Unterminated)?;
    if version.trim() != VERSION_LINE {
        return Err(DecodeError::UnknownVersion);
    }

    let mut headers = Headers::new();
    loop {
        let line = next_line(&mut rest).ok_or(DecodeError::Unterminated)?;
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| DecodeError::MalformedHeader(line.to_string()))?;
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }

    Ok(QueueMessage::new(headers, rest))
}

/// Splits off one line, accepting `\n` or `\r\n`. `None` when no terminator remains.
fn next_line<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let (line, tail) = rest.split_once('\n')?;
    *rest = tail;
    Some(line.strip_suffix('\r').unwrap_or(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_sorted_headers() {
        let message = QueueMessage::new(
            Headers::from([
                ("X-Request-Id".to_string(), "tid_1".to_string()),
                ("Message-Type".to_string(), "cms-combined-content-published".to_string()),
            ]),
            r#"{"uuid":"x"}"#,
        );

        assert_eq!(
            "FTMSG/1.0\nMessage-Type: cms-combined-content-published\nX-Request-Id: tid_1\n\n{\"uuid\":\"x\"}",
            encode(&message)
        );
    }

    #[test]
    fn decodes_crlf_messages() {
        let raw = "FTMSG/1.0\r\nMessage-Id: 1\r\nOrigin-System-Id: http://cmdb.ft.com/systems/pac\r\n\r\n{\"a\":1}\r\n";

        let message = decode(raw).unwrap();

        assert_eq!("1", message.header("Message-Id"));
        assert_eq!("http://cmdb.ft.com/systems/pac", message.header("Origin-System-Id"));
        assert_eq!("{\"a\":1}\r\n", message.body);
    }

    #[test]
    fn header_values_may_contain_colons() {
        let message = decode("FTMSG/1.0\nMessage-Timestamp: 2017-03-30T13:09:06.480Z\n\n").unwrap();

        assert_eq!("2017-03-30T13:09:06.480Z", message.header("Message-Timestamp"));
        assert_eq!("", message.body);
    }

    #[test]
    fn decode_reverses_encode() {
        let message = QueueMessage::new(
            Headers::from([("Content-Type".to_string(), "application/json".to_string())]),
            "line one\nline two",
        );

        assert_eq!(message, decode(&encode(&message)).unwrap());
    }

    #[test]
    fn rejects_other_formats() {
        assert_eq!(Err(DecodeError::UnknownVersion), decode("{\"uuid\":\"x\"}\n"));
        assert_eq!(Err(DecodeError::Unterminated), decode("FTMSG/1.0\nA: b"));
        assert_eq!(
            Err(DecodeError::MalformedHeader("nonsense".to_string())),
            decode("FTMSG/1.0\nnonsense\n\nbody")
        );
    }
}
