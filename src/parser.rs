//! Text parsers for builder input, using nom.
//!
//! These accept the small pieces of syntax a command line or config file
//! can carry: interval tokens (`90m`), select expressions
//! (`sum(count(a)) as total`), literals and `key=value` filters.

use std::time::Duration;

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{map, opt, recognize},
    multi::separated_list1,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::error::{QueryError, QueryResult};
use crate::functions::{Arg, Expr, Function, FunctionKind};
use crate::value::Literal;

/// Run `parser` over the whole of `input`.
fn complete<'a, T>(
    input: &'a str,
    what: &str,
    parser: impl FnOnce(&'a str) -> IResult<&'a str, T>,
) -> QueryResult<T> {
    match parser(input) {
        Ok(("", value)) => Ok(value),
        Ok((remaining, _)) => Err(QueryError::parse(
            input.len() - remaining.len(),
            format!("Unexpected trailing content in {}: '{}'", what, remaining),
        )),
        Err(e) => Err(QueryError::parse(0, format!("Invalid {} '{}': {:?}", what, input, e))),
    }
}

/// Parse an interval token such as `1h`, `90m` or `250ms`.
pub fn parse_interval(input: &str) -> QueryResult<Duration> {
    let input = input.trim();
    let (scalar, unit) = complete(input, "interval", interval_token)?;
    let scalar: u64 = scalar
        .parse()
        .map_err(|_| QueryError::parse(0, format!("Interval out of range: '{}'", input)))?;

    let secs_per_unit = match unit {
        "us" => return Ok(Duration::from_micros(scalar)),
        "ms" => return Ok(Duration::from_millis(scalar)),
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86_400,
        _ => 604_800,
    };
    scalar
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| QueryError::parse(0, format!("Interval out of range: '{}'", input)))
}

fn interval_token(input: &str) -> IResult<&str, (&str, &str)> {
    pair(
        digit1,
        alt((
            tag("us"),
            tag("ms"),
            tag("s"),
            tag("m"),
            tag("h"),
            tag("d"),
            tag("w"),
        )),
    )(input)
}

/// Parse a select expression.
///
/// Function calls are checked against the function registry, so
/// `percentile(a, 200)` fails with the same error the builder would give.
/// Anything that is not a call is kept as raw text. A trailing `as name`
/// sets the alias.
pub fn parse_expr(input: &str) -> QueryResult<Expr> {
    let input = input.trim();
    let (body, alias) = split_alias(input);

    let expr = if looks_like_call(body) {
        let call = complete(body, "expression", parse_call)?;
        Expr::Function(call.build()?)
    } else {
        Expr::Raw(body.to_string())
    };

    Ok(match alias {
        Some(alias) => expr.alias(alias),
        None => expr,
    })
}

/// Split `body as alias` into its parts.
fn split_alias(input: &str) -> (&str, Option<&str>) {
    fn alias_suffix(input: &str) -> IResult<&str, &str> {
        preceded(
            tuple((multispace1, tag_no_case("as"), multispace1)),
            identifier,
        )(input)
    }

    // Try each whitespace boundary from the right; the alias is the last word.
    for (idx, _) in input.char_indices().rev().filter(|(_, c)| c.is_whitespace()) {
        let start = input[..idx].trim_end().len();
        if let Ok(("", alias)) = alias_suffix(&input[start..]) {
            let body = input[..start].trim_end();
            if !body.is_empty() {
                return (body, Some(alias));
            }
        }
    }
    (input, None)
}

fn looks_like_call(input: &str) -> bool {
    matches!(identifier(input), Ok((rest, _)) if rest.trim_start().starts_with('('))
}

/// A function call before validation.
struct Call<'a> {
    name: &'a str,
    args: Vec<CallArg<'a>>,
}

enum CallArg<'a> {
    Call(Call<'a>),
    Int(i64),
    Float(f64),
    Field(&'a str),
}

impl Call<'_> {
    fn build(self) -> QueryResult<Function> {
        let kind = self.name.parse::<FunctionKind>()?;
        let args = self
            .args
            .into_iter()
            .map(|arg| {
                Ok(match arg {
                    CallArg::Call(call) => Arg::from(call.build()?),
                    CallArg::Int(n) => Arg::Int(n),
                    CallArg::Float(n) => Arg::Float(n),
                    CallArg::Field(s) => Arg::Field(s.to_string()),
                })
            })
            .collect::<QueryResult<Vec<_>>>()?;
        Function::new(kind, args)
    }
}

fn parse_call(input: &str) -> IResult<&str, Call<'_>> {
    let (input, name) = identifier(input)?;
    let (input, _) = multispace0(input)?;
    let (input, args) = delimited(
        char('('),
        separated_list1(char(','), delimited(multispace0, parse_call_arg, multispace0)),
        char(')'),
    )(input)?;
    Ok((input, Call { name, args }))
}

fn parse_call_arg(input: &str) -> IResult<&str, CallArg<'_>> {
    alt((
        map(parse_call, CallArg::Call),
        map(number, |s: &str| match s.parse::<i64>() {
            Ok(n) => CallArg::Int(n),
            Err(_) => CallArg::Float(s.parse().unwrap_or(0.0)),
        }),
        map(field_name, CallArg::Field),
    ))(input)
}

/// Parse an identifier (function name, alias, filter key).
fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

/// Field references may be dotted, starred or double-quoted.
fn field_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || matches!(c, '_' | '.' | '*' | '"'))(input)
}

/// Recognize a number (integer or float).
fn number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(input)
}

/// Parse a number (integer or float).
fn parse_number(input: &str) -> IResult<&str, Literal> {
    let (input, num_str) = number(input)?;

    if num_str.contains('.') {
        Ok((input, Literal::Float(num_str.parse().unwrap_or(0.0))))
    } else {
        match num_str.parse() {
            Ok(n) => Ok((input, Literal::Int(n))),
            Err(_) => Ok((input, Literal::Float(num_str.parse().unwrap_or(0.0)))),
        }
    }
}

/// Parse a quoted string.
fn parse_quoted_string(input: &str) -> IResult<&str, Literal> {
    let (input, _) = char('\'')(input)?;
    let (input, content) = take_while(|c: char| c != '\'')(input)?;
    let (input, _) = char('\'')(input)?;

    Ok((input, Literal::Text(content.to_string())))
}

/// Parse a `/regex/`.
fn parse_regex(input: &str) -> IResult<&str, Literal> {
    let (input, _) = char('/')(input)?;
    let (input, pattern) = take_while1(|c: char| c != '/')(input)?;
    let (input, _) = char('/')(input)?;

    Ok((input, Literal::Regex(pattern.to_string())))
}

/// Parse a literal value.
///
/// Accepts `true`/`false`, numbers, `'quoted text'`, `/regex/` and RFC 3339
/// timestamps; any other text is taken as an unquoted string.
pub fn parse_literal(input: &str) -> QueryResult<Literal> {
    let input = input.trim();

    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(input) {
        return Ok(ts.into());
    }

    let parsed: IResult<&str, Literal> = alt((
        map(tag("true"), |_| Literal::Bool(true)),
        map(tag("false"), |_| Literal::Bool(false)),
        parse_number,
        parse_quoted_string,
        parse_regex,
    ))(input);

    match parsed {
        Ok(("", literal)) => Ok(literal),
        _ => Ok(Literal::Text(input.to_string())),
    }
}

/// Parse a `key=value` filter argument.
pub fn parse_filter(input: &str) -> QueryResult<(String, Literal)> {
    let input = input.trim();
    let (key, value) = complete(input, "filter", |i| {
        let (i, key) = identifier(i)?;
        let (i, _) = delimited(multispace0, char('='), multispace0)(i)?;
        let (rest, value) = nom::combinator::rest(i)?;
        Ok((rest, (key, value)))
    })?;
    Ok((key.to_string(), parse_literal(value)?))
}
