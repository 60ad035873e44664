use std::{
    cmp::Ordering,
    error,
    fmt::Display,
    fs::File,
    io::{BufRead, BufReader},
    mem,
    path::{Path, PathBuf},
    slice,
};

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Debug)]
pub enum Error {
    InvalidChar(char),
    IntOverflow(String),
    EmptyPacket,
    UnexpectedToken(Token),
    UnexpectedEnd,
    MissingRightBracket,
    TrailingToken(Token),
    DividerNotFound(Value),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidChar(c) => write!(f, "Invalid character({}) in packet text.", c),
            Error::IntOverflow(s) => write!(f, "Integer({}) in packet is out of range.", s),
            Error::EmptyPacket => write!(f, "Given empty packet text."),
            Error::UnexpectedToken(t) => write!(f, "Unexpected token({}) in packet.", t),
            Error::UnexpectedEnd => write!(f, "Packet text ends before a complete value."),
            Error::MissingRightBracket => write!(f, "Expect a right bracket to close a list."),
            Error::TrailingToken(t) => {
                write!(f, "Found token({}) after a complete packet value.", t)
            }
            Error::DividerNotFound(v) => write!(
                f,
                "Can't find divider packet({}) in sorted packets, the packet order is broken.",
                v
            ),
        }
    }
}

impl error::Error for Error {}

#[derive(Debug, Parser)]
pub struct CLIArgs {
    #[arg(default_value = "inputs.txt")]
    pub input_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Int(i64),
    LeftBracket,
    RightBracket,
    Comma,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Int(n) => write!(f, "{}", n),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
        }
    }
}

struct TokenStream {
    tokens: Vec<Token>,
    ind: usize,
}

impl TryFrom<&str> for TokenStream {
    type Error = Error;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        let mut tokens = Vec::new();
        let mut number = String::new();
        for c in value.chars() {
            if c.is_ascii_digit() || (c == '-' && number.is_empty()) {
                number.push(c);
                continue;
            }

            if !number.is_empty() {
                tokens.push(Token::Int(parse_int(&number)?));
                number.clear();
            }

            match c {
                '[' => tokens.push(Token::LeftBracket),
                ']' => tokens.push(Token::RightBracket),
                ',' => tokens.push(Token::Comma),
                c if c.is_whitespace() => (),
                other => return Err(Error::InvalidChar(other)),
            }
        }

        // The packet may be a bare integer.
        if !number.is_empty() {
            tokens.push(Token::Int(parse_int(&number)?));
        }

        Ok(Self { tokens, ind: 0 })
    }
}

impl TokenStream {
    pub fn pop(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.ind).copied();
        if token.is_some() {
            self.ind += 1;
        }

        token
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.ind)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn parse_int(text: &str) -> Result<i64, Error> {
    if text == "-" {
        return Err(Error::InvalidChar('-'));
    }

    text.parse::<i64>()
        .map_err(|_| Error::IntOverflow(text.to_string()))
}

/// One packet, or one element of a packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    List(Vec<Value>),
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::List(values) => {
                write!(f, "[")?;
                for (ind, value) in values.iter().enumerate() {
                    if ind > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl TryFrom<&str> for Value {
    type Error = Error;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        let mut tokens = TokenStream::try_from(value)?;
        if tokens.is_empty() {
            return Err(Error::EmptyPacket);
        }

        let value = parse_value(&mut tokens)?;
        if let Some(token) = tokens.pop() {
            return Err(Error::TrailingToken(token));
        }

        Ok(value)
    }
}

// Dropping a deeply nested packet would otherwise recurse once per level.
impl Drop for Value {
    fn drop(&mut self) {
        if let Value::List(values) = self {
            let mut dropping = mem::take(values);
            while let Some(mut value) = dropping.pop() {
                if let Value::List(inner) = &mut value {
                    dropping.append(inner);
                }
            }
        }
    }
}

impl Value {
    /// Order of two packets. An integer compared with a list is handled as
    /// a list holding only that integer.
    pub fn compare(&self, other: &Value) -> Ordering {
        if let (Value::Int(left), Value::Int(right)) = (self, other) {
            return left.cmp(right);
        }

        // (left list, right list, index of the next pair to compare)
        let mut frames: Vec<(&[Value], &[Value], usize)> =
            vec![(self.as_list(), other.as_list(), 0)];
        while let Some(frame) = frames.last_mut() {
            let (left, right, ind) = *frame;
            frame.2 += 1;
            match (left.get(ind), right.get(ind)) {
                (Some(Value::Int(l)), Some(Value::Int(r))) => {
                    let ord = l.cmp(r);
                    if ord.is_ne() {
                        return ord;
                    }
                }
                (Some(l), Some(r)) => frames.push((l.as_list(), r.as_list(), 0)),
                _ => {
                    let ord = left.len().cmp(&right.len());
                    if ord.is_ne() {
                        return ord;
                    }
                    frames.pop();
                }
            }
        }

        Ordering::Equal
    }

    /// `[[n]]`
    pub fn divider(n: i64) -> Self {
        Value::List(vec![Value::List(vec![Value::Int(n)])])
    }

    fn as_list(&self) -> &[Value] {
        match self {
            Value::Int(_) => slice::from_ref(self),
            Value::List(values) => values,
        }
    }
}

fn parse_value(tokens: &mut TokenStream) -> Result<Value, Error> {
    let mut open_lists: Vec<Vec<Value>> = Vec::new();
    loop {
        let mut value = match tokens.pop() {
            Some(Token::Int(n)) => Value::Int(n),
            Some(Token::LeftBracket) => match tokens.peek() {
                Some(Token::RightBracket) => {
                    tokens.pop();
                    Value::List(Vec::new())
                }
                Some(_) => {
                    open_lists.push(Vec::new());
                    continue;
                }
                None => return Err(Error::MissingRightBracket),
            },
            Some(other) => return Err(Error::UnexpectedToken(other)),
            None if open_lists.is_empty() => return Err(Error::UnexpectedEnd),
            None => return Err(Error::MissingRightBracket),
        };

        // Close every list the value completes, stop at the next element.
        loop {
            let Some(values) = open_lists.last_mut() else {
                return Ok(value);
            };
            values.push(value);
            match tokens.pop() {
                Some(Token::Comma) if tokens.peek().is_some() => break,
                Some(Token::RightBracket) => {
                    value = Value::List(open_lists.pop().unwrap_or_default());
                }
                Some(Token::Comma) | None => return Err(Error::MissingRightBracket),
                Some(other) => return Err(Error::UnexpectedToken(other)),
            }
        }
    }
}

pub const DIVIDER_NUMBERS: [i64; 2] = [2, 6];

/// Sum of 1-based indices of the pairs already in the right order.
pub fn sum_of_ordered_pair_indices(packets: &[Value]) -> usize {
    packets
        .chunks_exact(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].compare(&pair[1]).is_lt())
        .map(|(ind, _)| ind + 1)
        .sum()
}

/// 1-based positions of both divider packets after sorting them in with the
/// given packets.
pub fn divider_positions(packets: &[Value]) -> Result<[usize; 2], Error> {
    let dividers = DIVIDER_NUMBERS.map(Value::divider);
    let mut sorted_packets = packets
        .iter()
        .chain(dividers.iter())
        .collect::<Vec<_>>();
    sorted_packets.sort_by(|l, r| l.compare(r));

    let mut positions = [0; 2];
    for (pos, divider) in positions.iter_mut().zip(dividers.iter()) {
        *pos = sorted_packets
            .iter()
            .position(|packet| *packet == divider)
            .map(|ind| ind + 1)
            .ok_or_else(|| Error::DividerNotFound(divider.clone()))?;
    }

    Ok(positions)
}

pub fn decoder_key(packets: &[Value]) -> Result<usize, Error> {
    Ok(divider_positions(packets)?.iter().product())
}

pub fn read_packets<P: AsRef<Path>>(path: P) -> Result<Vec<Value>> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open given file({}).", path.as_ref().display()))?;
    let reader = BufReader::new(file);
    let mut packets = Vec::new();
    for (ind, line) in reader.lines().enumerate() {
        let line = line.with_context(|| {
            format!(
                "Failed to read line {} of given file({}).",
                ind + 1,
                path.as_ref().display()
            )
        })?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        packets.push(Value::try_from(text).with_context(|| {
            format!("Failed to parse packet in line {}({}).", ind + 1, text)
        })?);
    }

    Ok(packets)
}

#[cfg(test)]
const SAMPLE_PACKETS: [&str; 16] = [
    "[1,1,3,1,1]",
    "[1,1,5,1,1]",
    "[[1],[2,3,4]]",
    "[[1],4]",
    "[9]",
    "[[8,7,6]]",
    "[[4,4],4,4]",
    "[[4,4],4,4,4]",
    "[7,7,7,7]",
    "[7,7,7]",
    "[]",
    "[3]",
    "[[[]]]",
    "[[]]",
    "[1,[2,[3,[4,[5,6,7]]]],8,9]",
    "[1,[2,[3,[4,[5,6,0]]]],8,9]",
];

#[cfg(test)]
fn packet(text: &str) -> Value {
    Value::try_from(text).unwrap()
}

#[cfg(test)]
fn sample_packets() -> Vec<Value> {
    SAMPLE_PACKETS.iter().map(|text| packet(text)).collect()
}

#[cfg(test)]
fn nested_packet(depth: usize, n: i64) -> String {
    format!("{}{}{}", "[".repeat(depth), n, "]".repeat(depth))
}

#[test]
fn test_parse_nested_lists() {
    assert_eq!(
        packet("[1,[2,[]],3]"),
        Value::List(vec![
            Value::Int(1),
            Value::List(vec![Value::Int(2), Value::List(vec![])]),
            Value::Int(3),
        ])
    );
    assert_eq!(packet(" [ 10 , -2 ] "), packet("[10,-2]"));
    assert_eq!(packet("42"), Value::Int(42));
}

#[test]
fn test_parse_deep_nesting() {
    let depth = 10_000;
    let deep = packet(&nested_packet(depth, 7));
    let mut value = &deep;
    for _ in 0..depth {
        value = match value {
            Value::List(values) if values.len() == 1 => &values[0],
            _ => panic!("Expect a single element list at every level."),
        };
    }

    assert!(matches!(value, Value::Int(7)));
}

#[test]
fn test_compare_deep_nesting() {
    let depth = 10_000;
    let packets = [
        packet(&nested_packet(depth, 4)),
        packet(&nested_packet(depth, 8)),
    ];
    let [low, high] = &packets;

    assert_eq!(low.compare(high), Ordering::Less);
    assert_eq!(high.compare(low), Ordering::Greater);
    assert_eq!(low.compare(&packet(&nested_packet(depth, 4))), Ordering::Equal);
    assert_eq!(low.compare(&Value::Int(4)), Ordering::Equal);
    assert_eq!(sum_of_ordered_pair_indices(&packets), 1);
    assert_eq!(divider_positions(&packets).unwrap(), [1, 3]);
}

#[test]
fn test_unclosed_deep_nesting() {
    let text = "[".repeat(10_000);

    assert!(matches!(
        Value::try_from(text.as_str()),
        Err(Error::MissingRightBracket)
    ));
}

#[test]
fn test_display_gives_back_packet_text() {
    for text in SAMPLE_PACKETS {
        assert_eq!(packet(text).to_string(), text);
    }
}

#[test]
fn test_reject_malformed_packets() {
    assert!(matches!(Value::try_from(""), Err(Error::EmptyPacket)));
    assert!(matches!(Value::try_from("  "), Err(Error::EmptyPacket)));
    assert!(matches!(Value::try_from("["), Err(Error::MissingRightBracket)));
    assert!(matches!(
        Value::try_from("[[1],[2"),
        Err(Error::MissingRightBracket)
    ));
    assert!(matches!(
        Value::try_from("[1,"),
        Err(Error::MissingRightBracket)
    ));
    assert!(matches!(
        Value::try_from("[1,]"),
        Err(Error::UnexpectedToken(Token::RightBracket))
    ));
    assert!(matches!(
        Value::try_from("[1 2]"),
        Err(Error::UnexpectedToken(Token::Int(2)))
    ));
    assert!(matches!(
        Value::try_from("[,1]"),
        Err(Error::UnexpectedToken(Token::Comma))
    ));
    assert!(matches!(Value::try_from("]"), Err(Error::UnexpectedToken(_))));
    assert!(matches!(
        Value::try_from("[1]]"),
        Err(Error::TrailingToken(Token::RightBracket))
    ));
    assert!(matches!(Value::try_from("[a]"), Err(Error::InvalidChar('a'))));
    assert!(matches!(
        Value::try_from("__import__('os')"),
        Err(Error::InvalidChar('_'))
    ));
    assert!(matches!(Value::try_from("[-]"), Err(Error::InvalidChar('-'))));
    assert!(matches!(
        Value::try_from("[99999999999999999999]"),
        Err(Error::IntOverflow(_))
    ));
}

#[test]
fn test_compare_sample_pairs() {
    let expect_orders = [
        Ordering::Less,
        Ordering::Less,
        Ordering::Greater,
        Ordering::Less,
        Ordering::Greater,
        Ordering::Less,
        Ordering::Greater,
        Ordering::Greater,
    ];
    let packets = sample_packets();
    for (pair, expect) in packets.chunks_exact(2).zip(expect_orders) {
        assert_eq!(
            pair[0].compare(&pair[1]),
            expect,
            "{} vs {}",
            pair[0],
            pair[1]
        );
        assert_eq!(pair[1].compare(&pair[0]), expect.reverse());
    }
}

#[test]
fn test_integer_is_wrapped_before_comparing_with_list() {
    assert_eq!(packet("[[1],[2,3,4]]").compare(&packet("[[1],4]")), Ordering::Less);
    assert_eq!(packet("[9]").compare(&packet("[[8,7,6]]")), Ordering::Greater);
    assert_eq!(packet("3").compare(&packet("[3]")), Ordering::Equal);
    assert_eq!(packet("3").compare(&packet("[3,0]")), Ordering::Less);
    assert_eq!(packet("[[2]]").compare(&packet("2")), Ordering::Equal);
    assert_eq!(packet("[[]]").compare(&packet("3")), Ordering::Less);
}

#[test]
fn test_shorter_prefix_list_comes_first() {
    assert_eq!(packet("[]").compare(&packet("[0]")), Ordering::Less);
    assert_eq!(packet("[1,2]").compare(&packet("[1,2,0]")), Ordering::Less);
    assert_eq!(packet("[1,2]").compare(&packet("[1,2]")), Ordering::Equal);
    assert_eq!(packet("[[1],2]").compare(&packet("[[1,0],1]")), Ordering::Less);
}

#[test]
fn test_sum_of_ordered_pair_indices() {
    assert_eq!(sum_of_ordered_pair_indices(&sample_packets()), 13);

    let mut packets = sample_packets();
    packets.push(packet("[0]"));
    assert_eq!(sum_of_ordered_pair_indices(&packets), 13);
}

#[test]
fn test_decoder_key() {
    let packets = sample_packets();

    assert_eq!(divider_positions(&packets).unwrap(), [10, 14]);
    assert_eq!(decoder_key(&packets).unwrap(), 140);
    assert_eq!(divider_positions(&[]).unwrap(), [1, 2]);
    assert_eq!(decoder_key(&[]).unwrap(), 2);
}

#[cfg(test)]
fn random_value(rng: &mut rand::rngs::StdRng, depth: usize) -> Value {
    use rand::Rng;

    if depth == 0 || rng.gen_bool(0.4) {
        Value::Int(rng.gen_range(0..4))
    } else {
        let len = rng.gen_range(0..4);
        Value::List((0..len).map(|_| random_value(rng, depth - 1)).collect())
    }
}

#[test]
fn test_compare_is_transitive() {
    use rand::{rngs::StdRng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(13);
    let mut checked_n = 0;
    for _ in 0..20000 {
        let values = [
            random_value(&mut rng, 3),
            random_value(&mut rng, 3),
            random_value(&mut rng, 3),
        ];
        let [a, b, c] = &values;
        if a.compare(b).is_lt() && b.compare(c).is_lt() {
            checked_n += 1;
            assert_eq!(a.compare(c), Ordering::Less, "{} < {} < {}", a, b, c);
        }
        if a.compare(b).is_eq() && b.compare(c).is_eq() {
            assert_eq!(a.compare(c), Ordering::Equal, "{} = {} = {}", a, b, c);
        }
        assert_eq!(a.compare(b), b.compare(a).reverse());
    }

    assert!(checked_n > 0);
}

#[test]
fn test_sorted_order_is_independent_of_input_order() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(1313);
    let packets = sample_packets();
    let expect = divider_positions(&packets).unwrap();
    for _ in 0..50 {
        let mut shuffled = packets.clone();
        for ind in (1..shuffled.len()).rev() {
            shuffled.swap(ind, rng.gen_range(0..=ind));
        }

        assert_eq!(divider_positions(&shuffled).unwrap(), expect);
    }
}
