use bytes::BytesMut;
use tlmsync_frame::{encode_stream, RecordSpec};

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::print_raw;

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    if args.frames == 0 {
        return Err(CliError::new(USAGE, "frames must be greater than zero"));
    }

    let records = args
        .records
        .iter()
        .map(String::as_str)
        .map(parse_record)
        .collect::<CliResult<Vec<_>>>()?;
    let frames: Vec<&[RecordSpec]> = std::iter::repeat(records.as_slice())
        .take(args.frames)
        .collect();

    let mut wire = BytesMut::new();
    encode_stream(&frames, &mut wire).map_err(|err| frame_error("encode failed", err))?;
    print_raw(&wire);

    Ok(SUCCESS)
}

fn parse_record(spec: &str) -> CliResult<RecordSpec> {
    let parts: Vec<&str> = spec.split(':').collect();
    let [id_hi, id_lo, function, value] = parts.as_slice() else {
        return Err(CliError::new(
            USAGE,
            format!("record must be ID_HI:ID_LO:FUNCTION:VALUE, got {spec}"),
        ));
    };

    let value: f32 = value
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid float value in record: {spec}")))?;

    Ok(RecordSpec::float(
        parse_byte(id_hi, spec)?,
        parse_byte(id_lo, spec)?,
        parse_byte(function, spec)?,
        value,
    ))
}

fn parse_byte(text: &str, spec: &str) -> CliResult<u8> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|_| CliError::new(USAGE, format!("invalid byte {text:?} in record: {spec}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_and_hex() {
        let record = parse_record("0:0x01:0:3.7").unwrap();
        assert_eq!(record, RecordSpec::float(0, 1, 0, 3.7));
    }

    #[test]
    fn rejects_malformed_records() {
        assert!(parse_record("0:1:0").is_err());
        assert!(parse_record("0:1:0:abc").is_err());
        assert!(parse_record("256:1:0:1.0").is_err());
        assert!(parse_record("0:1:0:1.0:9").is_err());
    }
}
