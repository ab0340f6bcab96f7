//! ATCL command catalog.
//!
//! Every command the mount uses is one [`CommandSpec`] entry: an opcode,
//! how its argument is written, and what shape its reply takes. A single
//! [`execute`] function drives any entry over a [`Framer`] and hands back a
//! tagged [`Value`].
//!
//! Opcodes are four letters. The first letter names the subsystem:
//! `A`lignment, `C`oordinates, `G`oto, `H`ardware, `K` (keypad), `N`
//! (navigation limits and model), `P`ointing, `Q` (protocol), `R`ate,
//! `S`ite, `T`ime, `X` (stop).

use atcs_atcl::io::Framer;
use atcs_atcl::protocol::{encode_command, encode_enter};
use atcs_core::angle::{hours_to_sexagesimal, signed_degrees};
use atcs_core::{Error, Result};

// ---------------------------------------------------------------
// Catalog types
// ---------------------------------------------------------------

/// How a command is put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// The raw ENTER handshake byte.
    Enter,
    /// `!<opcode><args>;`
    Atcl(&'static str),
}

/// How the argument is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgFormat {
    None,
    /// A constant suffix that is always sent, e.g. `Now` or `100`.
    Fixed(&'static str),
    /// A keyword picked by the caller, e.g. `Sidereal`.
    Word,
    /// Decimal hours as `HH:MM:SS.t`.
    Hours,
    /// Decimal degrees as `+DD:MM:SS` / `-DD:MM:SS`.
    SignedDegrees,
    /// A rate with two decimals.
    Rate,
    /// An unsigned index.
    Index,
    /// Text formatted by the caller.
    Text,
    /// `Yes` or `No`.
    YesNo,
}

/// What the reply is decoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    /// Content is ignored.
    Ack,
    YesNo,
    Text,
    Number,
    Integer,
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub opcode: Opcode,
    pub args: ArgFormat,
    pub reply: ReplyShape,
}

/// Argument supplied to [`execute`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg<'a> {
    None,
    Word(&'a str),
    Hours(f64),
    Degrees(f64),
    Number(f64),
    Index(u32),
    Text(&'a str),
    Flag(bool),
}

/// Decoded reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Flag(bool),
    Number(f64),
    Integer(i64),
    Text(String),
}

impl Value {
    pub fn into_flag(self) -> Result<bool> {
        match self {
            Value::Flag(b) => Ok(b),
            other => Err(Error::Parse(format!("expected Yes/No, got {other:?}"))),
        }
    }

    pub fn into_number(self) -> Result<f64> {
        match self {
            Value::Number(n) => Ok(n),
            Value::Integer(i) => Ok(i as f64),
            other => Err(Error::Parse(format!("expected a number, got {other:?}"))),
        }
    }

    pub fn into_integer(self) -> Result<i64> {
        match self {
            Value::Integer(i) => Ok(i),
            other => Err(Error::Parse(format!("expected an integer, got {other:?}"))),
        }
    }

    pub fn into_text(self) -> Result<String> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(Error::Parse(format!("expected text, got {other:?}"))),
        }
    }
}

const fn cmd(name: &'static str, opcode: &'static str, args: ArgFormat, reply: ReplyShape) -> CommandSpec {
    CommandSpec {
        name,
        opcode: Opcode::Atcl(opcode),
        args,
        reply,
    }
}

use ArgFormat as A;
use ReplyShape as R;

// ---------------------------------------------------------------
// Handshake / protocol
// ---------------------------------------------------------------

pub const ENTER: CommandSpec = CommandSpec {
    name: "enter",
    opcode: Opcode::Enter,
    args: A::None,
    reply: R::Ack,
};
pub const DISABLE_CHANGE_NOTIFICATIONS: CommandSpec =
    cmd("disable change notifications", "QDcn", A::None, R::Ack);
pub const DISABLE_PACKET_SEQUENCING: CommandSpec =
    cmd("disable packet sequence checking", "QDps", A::None, R::Ack);
pub const SET_ASYNC_UPDATES: CommandSpec = cmd("set async updates", "QSau", A::YesNo, R::Ack);
pub const SET_EPOCH_NOW: CommandSpec = cmd("set epoch of entry", "PSep", A::Fixed("Now"), R::Ack);

// ---------------------------------------------------------------
// Hardware info
// ---------------------------------------------------------------

pub const FIRMWARE_VERSION: CommandSpec = cmd("firmware version", "HGfv", A::None, R::Text);
pub const MODEL: CommandSpec = cmd("hardware model", "HGsm", A::None, R::Text);
pub const TOP_ACTIVE_FAULT: CommandSpec = cmd("top active fault", "HGtf", A::None, R::Text);

// ---------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------

pub const GET_RA: CommandSpec = cmd("get RA", "CGra", A::None, R::Text);
pub const GET_DEC: CommandSpec = cmd("get Dec", "CGde", A::None, R::Text);
pub const SET_TARGET_RA: CommandSpec = cmd("set target RA", "CStr", A::Hours, R::Ack);
pub const SET_TARGET_DEC: CommandSpec = cmd("set target Dec", "CStd", A::SignedDegrees, R::Ack);

// ---------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------

pub const ALIGNMENT_STATUS: CommandSpec = cmd("alignment status", "AGas", A::None, R::Text);
/// Align on the current target, controller picks the side, JNOW.
pub const ALIGN_FROM_TARGET_NOW: CommandSpec =
    cmd("align from target (epoch now)", "AFcn", A::None, R::Ack);
pub const ALIGN_FROM_TARGET: CommandSpec = cmd("align from target", "AFcs", A::None, R::Ack);
pub const ALIGN_FROM_LAST_POSITION: CommandSpec =
    cmd("align from last position", "AFlp", A::None, R::Ack);
/// Refine an existing model on the current target, JNOW.
pub const CALIBRATE_NOW: CommandSpec = cmd("calibrate (epoch now)", "ACrn", A::None, R::Ack);
pub const CALIBRATE: CommandSpec = cmd("calibrate", "ACrd", A::None, R::Ack);
pub const GET_ALIGNMENT_TYPE: CommandSpec = cmd("get alignment type", "NGat", A::None, R::Text);
pub const SET_ALIGNMENT_TYPE: CommandSpec = cmd("set alignment type", "NSat", A::Word, R::Ack);
pub const SET_MERIDIAN_POLICY: CommandSpec = cmd("set meridian policy", "NSmp", A::Word, R::Ack);
pub const SITE_TIME_SET_ONCE: CommandSpec = cmd("site time set once", "ACst", A::None, R::YesNo);

// ---------------------------------------------------------------
// Tracking
// ---------------------------------------------------------------

pub const GET_TRACKING_MODE: CommandSpec = cmd("get tracking mode", "RGtr", A::None, R::Text);
pub const SET_TRACKING_MODE: CommandSpec = cmd("set tracking mode", "RStr", A::Word, R::Ack);
pub const GET_RA_OFFSET: CommandSpec = cmd("get RA rate offset", "RGor", A::None, R::Number);
pub const SET_RA_OFFSET: CommandSpec = cmd("set RA rate offset", "RSor", A::Rate, R::Ack);
pub const GET_DEC_OFFSET: CommandSpec = cmd("get Dec rate offset", "RGod", A::None, R::Number);
pub const SET_DEC_OFFSET: CommandSpec = cmd("set Dec rate offset", "RSod", A::Rate, R::Ack);

// ---------------------------------------------------------------
// Slew and open-loop moves
// ---------------------------------------------------------------

pub const GOTO_TARGET: CommandSpec = cmd("goto target", "GTrn", A::None, R::Ack);
/// Percent of the slew still to go.
pub const SLEW_PROGRESS: CommandSpec = cmd("slew progress", "GGgr", A::None, R::Integer);
pub const SELECT_SLEW_RATE: CommandSpec = cmd("select slew rate", "KSsl", A::None, R::Ack);
pub const CLEAR_SLEW_RATE: CommandSpec = cmd("clear slew rate", "KCsl", A::None, R::Ack);
pub const SELECT_VIEW_VELOCITY: CommandSpec = cmd("select view velocity", "KScv", A::Index, R::Ack);
pub const MOVE_NORTH: CommandSpec = cmd("move north", "KSpu", A::Fixed("100"), R::Ack);
pub const MOVE_SOUTH: CommandSpec = cmd("move south", "KSpd", A::Fixed("100"), R::Ack);
pub const MOVE_EAST: CommandSpec = cmd("move east", "KSpl", A::Fixed("100"), R::Ack);
pub const MOVE_WEST: CommandSpec = cmd("move west", "KSsr", A::Fixed("100"), R::Ack);
pub const STOP_DEC_AXIS: CommandSpec = cmd("stop Dec axis", "XXud", A::None, R::Ack);
pub const STOP_RA_AXIS: CommandSpec = cmd("stop RA axis", "XXlr", A::None, R::Ack);
pub const ABORT: CommandSpec = cmd("abort all motion", "XXxx", A::None, R::Ack);

// ---------------------------------------------------------------
// Park
// ---------------------------------------------------------------

pub const GOTO_PARK: CommandSpec = cmd("goto park", "GTop", A::None, R::Ack);
pub const MARK_PARK: CommandSpec = cmd("mark park position", "AMpp", A::None, R::Ack);
pub const AT_PARK: CommandSpec = cmd("at park", "AGak", A::None, R::YesNo);

// ---------------------------------------------------------------
// Site and time
// ---------------------------------------------------------------

pub const SITE_NUMBER: CommandSpec = cmd("site number in use", "SGuu", A::None, R::Integer);
pub const SITE_NAME: CommandSpec = cmd("site name", "SGun", A::Index, R::Text);
/// Argument is `<site><DD:MM:SS><E|W>`.
pub const SET_SITE_LONGITUDE: CommandSpec = cmd("set site longitude", "SSo", A::Text, R::Ack);
/// Argument is `<site><DD:MM:SS><N|S>`.
pub const SET_SITE_LATITUDE: CommandSpec = cmd("set site latitude", "SSa", A::Text, R::Ack);
/// Argument is `<site><HH:MM><E|W>`, or `<site>00:00` for UTC.
pub const SET_SITE_TIMEZONE: CommandSpec = cmd("set site time zone", "SSz", A::Text, R::Ack);
pub const LOCAL_TIME_FORMAT: CommandSpec = cmd("local time format", "TGlf", A::None, R::Text);
pub const DATE_FORMAT: CommandSpec = cmd("date format", "TGdf", A::None, R::Text);
pub const STANDARD_TIME: CommandSpec = cmd("standard time", "TGst", A::None, R::Text);
pub const STANDARD_DATE: CommandSpec = cmd("standard date", "TGsd", A::None, R::Text);
pub const SET_STANDARD_TIME: CommandSpec = cmd("set standard time", "TSst", A::Text, R::Ack);
pub const SET_STANDARD_DATE: CommandSpec = cmd("set standard date", "TSsd", A::Text, R::Ack);

// ---------------------------------------------------------------
// Refraction and limits
// ---------------------------------------------------------------

pub const REFRACTION: CommandSpec = cmd("refraction correction", "PGre", A::None, R::YesNo);
pub const SET_REFRACTION: CommandSpec = cmd("set refraction correction", "PSre", A::YesNo, R::Ack);
pub const EAST_LIMIT: CommandSpec = cmd("east soft limit", "NGle", A::None, R::Number);
pub const WEST_LIMIT: CommandSpec = cmd("west soft limit", "NGlw", A::None, R::Number);

/// Every entry, for lookup by opcode.
pub const CATALOG: &[CommandSpec] = &[
    ENTER,
    DISABLE_CHANGE_NOTIFICATIONS,
    DISABLE_PACKET_SEQUENCING,
    SET_ASYNC_UPDATES,
    SET_EPOCH_NOW,
    FIRMWARE_VERSION,
    MODEL,
    TOP_ACTIVE_FAULT,
    GET_RA,
    GET_DEC,
    SET_TARGET_RA,
    SET_TARGET_DEC,
    ALIGNMENT_STATUS,
    ALIGN_FROM_TARGET_NOW,
    ALIGN_FROM_TARGET,
    ALIGN_FROM_LAST_POSITION,
    CALIBRATE_NOW,
    CALIBRATE,
    GET_ALIGNMENT_TYPE,
    SET_ALIGNMENT_TYPE,
    SET_MERIDIAN_POLICY,
    SITE_TIME_SET_ONCE,
    GET_TRACKING_MODE,
    SET_TRACKING_MODE,
    GET_RA_OFFSET,
    SET_RA_OFFSET,
    GET_DEC_OFFSET,
    SET_DEC_OFFSET,
    GOTO_TARGET,
    SLEW_PROGRESS,
    SELECT_SLEW_RATE,
    CLEAR_SLEW_RATE,
    SELECT_VIEW_VELOCITY,
    MOVE_NORTH,
    MOVE_SOUTH,
    MOVE_EAST,
    MOVE_WEST,
    STOP_DEC_AXIS,
    STOP_RA_AXIS,
    ABORT,
    GOTO_PARK,
    MARK_PARK,
    AT_PARK,
    SITE_NUMBER,
    SITE_NAME,
    SET_SITE_LONGITUDE,
    SET_SITE_LATITUDE,
    SET_SITE_TIMEZONE,
    LOCAL_TIME_FORMAT,
    DATE_FORMAT,
    STANDARD_TIME,
    STANDARD_DATE,
    SET_STANDARD_TIME,
    SET_STANDARD_DATE,
    REFRACTION,
    SET_REFRACTION,
    EAST_LIMIT,
    WEST_LIMIT,
];

/// Find a catalog entry by its four-letter opcode.
pub fn lookup(opcode: &str) -> Option<&'static CommandSpec> {
    CATALOG
        .iter()
        .find(|spec| matches!(spec.opcode, Opcode::Atcl(op) if op == opcode))
}

// ---------------------------------------------------------------
// Encoding / decoding
// ---------------------------------------------------------------

fn mismatch(spec: &CommandSpec, arg: &Arg<'_>) -> Error {
    Error::InvalidParameter(format!(
        "{} takes {:?}, got {:?}",
        spec.name, spec.args, arg
    ))
}

fn finite(spec: &CommandSpec, v: f64) -> Result<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(Error::InvalidParameter(format!("{}: {v} is not a finite value", spec.name)))
    }
}

/// Build the wire bytes for `spec` with `arg`.
pub fn encode(spec: &CommandSpec, arg: Arg<'_>) -> Result<Vec<u8>> {
    let op = match spec.opcode {
        Opcode::Enter => {
            return match arg {
                Arg::None => Ok(encode_enter()),
                other => Err(mismatch(spec, &other)),
            };
        }
        Opcode::Atcl(op) => op,
    };

    let args = match (spec.args, arg) {
        (A::None, Arg::None) => String::new(),
        (A::Fixed(s), Arg::None) => s.to_string(),
        (A::Word, Arg::Word(w)) => w.to_string(),
        (A::Hours, Arg::Hours(h)) => hours_to_sexagesimal(finite(spec, h)?),
        (A::SignedDegrees, Arg::Degrees(d)) => signed_degrees(finite(spec, d)?),
        (A::Rate, Arg::Number(n)) => format!("{:.2}", finite(spec, n)?),
        (A::Index, Arg::Index(i)) => i.to_string(),
        (A::Text, Arg::Text(t)) => t.to_string(),
        (A::YesNo, Arg::Flag(b)) => yes_no(b).to_string(),
        (_, other) => return Err(mismatch(spec, &other)),
    };

    if args.contains(';') {
        return Err(Error::InvalidParameter(format!(
            "{}: argument {args:?} contains a terminator",
            spec.name
        )));
    }

    Ok(encode_command(op, &args))
}

fn yes_no(b: bool) -> &'static str {
    if b { "Yes" } else { "No" }
}

/// Decode reply text according to `shape`.
pub fn decode(spec: &CommandSpec, text: &str) -> Result<Value> {
    let text = text.trim();
    match spec.reply {
        R::Ack => Ok(Value::None),
        R::Text => Ok(Value::Text(text.to_string())),
        R::YesNo => match text {
            "Yes" => Ok(Value::Flag(true)),
            "No" => Ok(Value::Flag(false)),
            other => Err(Error::Parse(format!("{}: expected Yes/No, got {other:?}", spec.name))),
        },
        R::Number => text
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| Error::Parse(format!("{}: expected a number, got {text:?}", spec.name))),
        R::Integer => text
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| Error::Parse(format!("{}: expected an integer, got {text:?}", spec.name))),
    }
}

/// Run one catalog command: encode, exchange, decode.
pub async fn execute(framer: &mut Framer, spec: &CommandSpec, arg: Arg<'_>) -> Result<Value> {
    let bytes = encode(spec, arg)?;
    let reply = framer.execute(&bytes).await?;
    decode(spec, reply.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atcs_atcl::io::FramerConfig;
    use atcs_test_harness::MockTransport;

    fn enc(spec: &CommandSpec, arg: Arg<'_>) -> String {
        String::from_utf8(encode(spec, arg).unwrap()).unwrap()
    }

    #[test]
    fn encode_fixed_and_word() {
        assert_eq!(enc(&SET_EPOCH_NOW, Arg::None), "!PSepNow;");
        assert_eq!(enc(&MOVE_WEST, Arg::None), "!KSsr100;");
        assert_eq!(enc(&SET_TRACKING_MODE, Arg::Word("Sidereal")), "!RStrSidereal;");
    }

    #[test]
    fn encode_angles() {
        assert_eq!(enc(&SET_TARGET_RA, Arg::Hours(12.5)), "!CStr12:30:00.0;");
        assert_eq!(enc(&SET_TARGET_DEC, Arg::Degrees(-0.5)), "!CStd-00:30:00;");
        assert_eq!(enc(&SET_TARGET_DEC, Arg::Degrees(45.25)), "!CStd+45:15:00;");
    }

    #[test]
    fn encode_rate_two_decimals() {
        assert_eq!(enc(&SET_RA_OFFSET, Arg::Number(15.041)), "!RSor15.04;");
        assert_eq!(enc(&SET_DEC_OFFSET, Arg::Number(-2.0)), "!RSod-2.00;");
    }

    #[test]
    fn encode_index_and_flag() {
        assert_eq!(enc(&SELECT_VIEW_VELOCITY, Arg::Index(3)), "!KScv3;");
        assert_eq!(enc(&SET_REFRACTION, Arg::Flag(false)), "!PSreNo;");
        assert_eq!(enc(&SET_ASYNC_UPDATES, Arg::Flag(true)), "!QSauYes;");
    }

    #[test]
    fn encode_enter_raw() {
        assert_eq!(encode(&ENTER, Arg::None).unwrap(), vec![0xB1]);
    }

    #[test]
    fn encode_rejects_wrong_arg() {
        let err = encode(&SET_TARGET_RA, Arg::Degrees(1.0)).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
        let err = encode(&GET_RA, Arg::Flag(true)).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn encode_rejects_nan_and_terminator() {
        assert!(encode(&SET_TARGET_RA, Arg::Hours(f64::NAN)).is_err());
        assert!(encode(&SET_STANDARD_TIME, Arg::Text("10:00;")).is_err());
    }

    #[test]
    fn decode_shapes() {
        assert_eq!(decode(&AT_PARK, "Yes").unwrap(), Value::Flag(true));
        assert_eq!(decode(&SLEW_PROGRESS, "35").unwrap(), Value::Integer(35));
        assert_eq!(decode(&EAST_LIMIT, "-95.5").unwrap(), Value::Number(-95.5));
        assert_eq!(decode(&GOTO_TARGET, "anything").unwrap(), Value::None);
        assert!(matches!(decode(&AT_PARK, "Maybe"), Err(Error::Parse(_))));
        assert!(matches!(decode(&SLEW_PROGRESS, "x"), Err(Error::Parse(_))));
    }

    #[test]
    fn value_conversions() {
        assert_eq!(Value::Integer(4).into_number().unwrap(), 4.0);
        assert!(Value::Text("x".into()).into_flag().is_err());
        assert_eq!(Value::Text("x".into()).into_text().unwrap(), "x");
    }

    #[test]
    fn lookup_by_opcode() {
        assert_eq!(lookup("GGgr"), Some(&SLEW_PROGRESS));
        assert_eq!(lookup("ZZzz"), None);
    }

    #[test]
    fn catalog_opcodes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for spec in CATALOG {
            assert!(seen.insert(spec.opcode), "duplicate opcode {:?}", spec.opcode);
        }
    }

    #[tokio::test]
    async fn execute_round_trip() {
        let mut mock = MockTransport::new();
        mock.expect(b"!GGgr;", b"35%;");
        let mut framer = Framer::new(Box::new(mock), FramerConfig::default());

        let value = execute(&mut framer, &SLEW_PROGRESS, Arg::None).await.unwrap();
        assert_eq!(value, Value::Integer(35));
    }
}
