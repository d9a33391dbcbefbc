use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while, take_while1},
    character::complete::{anychar, char, multispace0, multispace1, space0},
    combinator::{all_consuming, map, opt, recognize},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};

use super::error::AuthError;
use super::types::*;

/// Decode the value of a single `WWW-Authenticate` challenge, eg.
/// `Basic realm="WebDAV"` or `NTLM TlRMTVNTUAACAAAA...`
pub fn challenge(input: &str) -> Result<Challenge, AuthError> {
    match all_consuming(delimited(multispace0, challenge_inner, multispace0))(input) {
        Ok((_, chal)) => Ok(chal),
        Err(err) => {
            tracing::debug!(err=%err, "unable to decode the challenge");
            Err(AuthError::Challenge(input.to_string()))
        }
    }
}

// ---------------------

enum ChallengeData {
    Token68(String),
    Params(Vec<(String, String)>),
}

fn challenge_inner(input: &str) -> IResult<&str, Challenge> {
    let (input, scheme) = token(input)?;
    let (input, data) = opt(preceded(
        multispace1,
        alt((
            map(auth_params, ChallengeData::Params),
            map(token68, |t| ChallengeData::Token68(t.to_string())),
        )),
    ))(input)?;

    let mut chal = Challenge {
        scheme: scheme.to_string(),
        ..Challenge::default()
    };
    match data {
        Some(ChallengeData::Token68(t)) => chal.token68 = Some(t),
        Some(ChallengeData::Params(params)) => chal.params.extend(params),
        None => (),
    }
    Ok((input, chal))
}

fn auth_params(input: &str) -> IResult<&str, Vec<(String, String)>> {
    terminated(
        separated_list1(tuple((multispace0, char(','), multispace0)), auth_param),
        opt(preceded(multispace0, char(','))),
    )(input)
}

fn auth_param(input: &str) -> IResult<&str, (String, String)> {
    map(
        separated_pair(
            token,
            tuple((space0, char('='), space0)),
            alt((quoted_string, map(token, str::to_string))),
        ),
        |(name, value)| (name.to_ascii_lowercase(), value),
    )(input)
}

fn quoted_string(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            many0(alt((is_not("\\\""), preceded(char('\\'), recognize(anychar))))),
            |parts: Vec<&str>| parts.concat(),
        ),
        char('"'),
    )(input)
}

fn token(input: &str) -> IResult<&str, &str> {
    take_while1(is_tchar)(input)
}

fn token68(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '+' | '/')
        }),
        take_while(|c: char| c == '='),
    ))(input)
}

fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~'
        )
}
