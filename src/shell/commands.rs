use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{multispace0, multispace1},
    combinator::{all_consuming, map, value},
    sequence::{delimited, preceded},
    IResult,
};

/// Shell commands that are handled without going through SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    Help,
    Exit,
    ListTables,
    Describe(String),
    Clear,
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn table_name(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| c.is_alphanumeric() || c == '_'),
        |s: &str| s.to_string(),
    )(input)
}

fn help(input: &str) -> IResult<&str, MetaCommand> {
    value(MetaCommand::Help, alt((tag_no_case("help"), tag("\\h"))))(input)
}

fn exit(input: &str) -> IResult<&str, MetaCommand> {
    value(
        MetaCommand::Exit,
        alt((tag_no_case("exit"), tag_no_case("quit"), tag("\\q"))),
    )(input)
}

fn list_tables(input: &str) -> IResult<&str, MetaCommand> {
    value(MetaCommand::ListTables, alt((tag_no_case("tables"), tag("\\dt"))))(input)
}

fn describe(input: &str) -> IResult<&str, MetaCommand> {
    map(
        preceded(
            alt((tag_no_case("describe"), tag("\\d"))),
            preceded(multispace1, table_name),
        ),
        MetaCommand::Describe,
    )(input)
}

fn clear(input: &str) -> IResult<&str, MetaCommand> {
    value(MetaCommand::Clear, alt((tag_no_case("clear"), tag("\\c"))))(input)
}

/// Recognizes a whole input line as a meta-command. Anything else is SQL.
#[must_use]
pub fn parse_meta_command(line: &str) -> Option<MetaCommand> {
    // describe before list_tables so `\d t` is not cut at `\d`; `\dt` has no
    // whitespace after `\d` so describe rejects it
    all_consuming(ws(alt((help, exit, describe, list_tables, clear))))(line)
        .ok()
        .map(|(_, cmd)| cmd)
}
