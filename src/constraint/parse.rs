use nom::{
    Finish, IResult, Parser,
    branch::alt,
    bytes::complete::is_not,
    character::complete::{char, multispace0, multispace1},
    combinator::{eof, recognize},
    multi::separated_list1,
    sequence::delimited,
};

use super::{Clause, Constraint, Group, Operator};
use crate::{ConstraintParseError, WildcardVersion, error};

/// Parse a full constraint: `||`-separated groups of clauses.
#[tracing::instrument]
pub(super) fn constraint(input: &str) -> Result<Constraint, ConstraintParseError> {
    if input.trim().is_empty() {
        return Ok(Constraint::default());
    }

    input
        .split("||")
        .map(|text| group(input, text))
        .collect::<Result<Vec<_>, _>>()
        .map(Constraint::from)
}

/// Parse the clauses of a single OR-group.
///
/// `text` is a slice of `input`, which is used for error reporting.
fn group(input: &str, text: &str) -> Result<Group, ConstraintParseError> {
    if text.trim().is_empty() {
        return Err(ConstraintParseError::EmptyGroup {
            input: input.to_string(),
            span: error::span(input, text),
        });
    }

    let mut tokens = tokens(text)
        .map_err(|rest| ConstraintParseError::Syntax {
            input: input.to_string(),
            span: error::span(input, first_char(rest)),
        })?
        .into_iter()
        .peekable();

    let mut clauses = Vec::new();
    while let Some(token) = tokens.next() {
        let (operator_text, body) = split_operator(token);

        let operator = if operator_text.is_empty() {
            None
        } else {
            let operator = operator_text.parse::<Operator>().map_err(|err| {
                ConstraintParseError::UnknownOperator {
                    operator: operator_text.to_string(),
                    input: input.to_string(),
                    error: err,
                    span: error::span(input, operator_text),
                }
            })?;
            Some(operator)
        };

        // The version may be separated from its operator by whitespace, as in `>= 1.2.3`.
        let body = match (body.is_empty(), tokens.next_if(|_| body.is_empty())) {
            (false, _) => body,
            (true, Some(next)) => next,
            (true, None) => return Err(missing_version(input, operator_text)),
        };
        let lower = version(input, body)?;

        // Hyphen ranges are only recognized between two bare versions.
        if operator.is_none() && tokens.next_if_eq(&"-").is_some() {
            let upper = match tokens.next() {
                Some(upper) => version(input, upper)?,
                None => return Err(missing_version(input, hyphen(token, text))),
            };
            clauses.push(Clause::GreaterOrEqual(lower));
            clauses.push(Clause::LessOrEqual(upper));
            continue;
        }

        clauses.push(Clause::new(operator, lower));
    }

    Ok(Group::from(clauses))
}

/// Split a group into clause tokens, separated by whitespace and/or commas.
///
/// On failure, returns the unparsed remainder of the text.
fn tokens(text: &str) -> Result<Vec<&str>, &str> {
    fn separator(input: &str) -> IResult<&str, &str> {
        alt((
            recognize((multispace0, char(','), multispace0)),
            multispace1,
        ))
        .parse(input)
    }

    fn clauses(input: &str) -> IResult<&str, Vec<&str>> {
        delimited(
            multispace0,
            separated_list1(separator, is_not(" \t\r\n,")),
            (multispace0, eof),
        )
        .parse(input)
    }

    clauses(text)
        .finish()
        .map(|(_, tokens)| tokens)
        .map_err(|err| err.input)
}

/// Split the leading operator characters off a clause token.
fn split_operator(token: &str) -> (&str, &str) {
    let at = token
        .find(|c: char| !matches!(c, '<' | '>' | '=' | '!' | '~' | '^'))
        .unwrap_or(token.len());
    token.split_at(at)
}

fn version(input: &str, text: &str) -> Result<WildcardVersion, ConstraintParseError> {
    WildcardVersion::parse(text).map_err(|err| ConstraintParseError::Version {
        version: text.to_string(),
        input: input.to_string(),
        error: err,
        span: error::span(input, text),
    })
}

fn missing_version(input: &str, operator: &str) -> ConstraintParseError {
    ConstraintParseError::MissingVersion {
        operator: operator.to_string(),
        input: input.to_string(),
        span: error::span(input, operator),
    }
}

/// Locate the `-` token following `token` inside `text`, for error reporting.
fn hyphen<'a>(token: &str, text: &'a str) -> &'a str {
    let start = error::span(text, token).offset() + token.len();
    let rest = &text[start..];
    rest.find('-').map_or(rest, |at| &rest[at..at + 1])
}

/// The first character of `text`, or `text` itself if it's empty.
fn first_char(text: &str) -> &str {
    let len = text.chars().next().map_or(0, char::len_utf8);
    &text[..len]
}
