#![warn(clippy::uninlined_format_args)]

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_till, take_until, take_while1},
    character::complete::{char, multispace1, u64},
    combinator::{opt, recognize, verify},
    multi::{many0, separated_list1},
    sequence::delimited,
};

#[derive(Debug, Clone, PartialEq)]
pub struct MemberDecl<'a> {
    pub name: &'a str,
    pub display_name: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shares<'a> {
    /// `for a, b, c`: the total is divided evenly.
    Even(Vec<&'a str>),
    /// `for a=200, b=300`: every share is stated.
    Explicit(Vec<(&'a str, u64)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expense<'a> {
    pub payer: &'a str,
    pub amount: u64,
    pub shares: Shares<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementState {
    Pending,
    Completed,
    Confirmed,
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settlement<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub amount: u64,
    /// `None` when the line carries no `(state)` suffix.
    pub state: Option<SettlementState>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'a> {
    Member(MemberDecl<'a>),
    Scope(&'a str),
    Expense(Expense<'a>),
    Settlement(Settlement<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatementWithLine<'a> {
    pub line: usize,
    pub statement: Statement<'a>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program<'a> {
    pub statements: Vec<StatementWithLine<'a>>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Syntax error at line {line}: {detail}")]
    SyntaxError { line: usize, detail: String },
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')(input)
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input| verify(identifier, |found: &str| found.eq_ignore_ascii_case(word)).parse(input)
}

fn sp(input: &str) -> IResult<&str, &str> {
    fn fullwidth_space(input: &str) -> IResult<&str, &str> {
        take_while1(|c: char| c == '\u{3000}')(input)
    }

    fn block_comment(input: &str) -> IResult<&str, &str> {
        delimited(tag("/*"), take_until("*/"), tag("*/")).parse(input)
    }

    fn line_comment(input: &str) -> IResult<&str, &str> {
        recognize((tag("//"), take_till(|c| c == '\n'))).parse(input)
    }

    recognize(many0(alt((
        multispace1,
        fullwidth_space,
        block_comment,
        line_comment,
    ))))
    .parse(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c| c == '"'), char('"')).parse(input)
}

fn list_separator(input: &str) -> IResult<&str, &str> {
    (sp, alt((tag(","), tag("，"))), sp)
        .map(|(_, separator, _)| separator)
        .parse(input)
}

// member alice "Alice Liddell"
fn member_decl(input: &str) -> IResult<&str, MemberDecl<'_>> {
    (keyword("member"), sp, identifier, opt((sp, quoted)))
        .map(|(_, _, name, display)| MemberDecl {
            name,
            display_name: display.map(|(_, display_name)| display_name),
        })
        .parse(input)
}

// scope tokyo-trip
fn scope_decl(input: &str) -> IResult<&str, &str> {
    (keyword("scope"), sp, identifier)
        .map(|(_, _, name)| name)
        .parse(input)
}

fn explicit_share(input: &str) -> IResult<&str, (&str, u64)> {
    (identifier, sp, char('='), sp, u64)
        .map(|(name, _, _, _, amount)| (name, amount))
        .parse(input)
}

fn shares(input: &str) -> IResult<&str, Shares<'_>> {
    alt((
        separated_list1(list_separator, explicit_share).map(Shares::Explicit),
        separated_list1(list_separator, identifier).map(Shares::Even),
    ))
    .parse(input)
}

// {payer} paid {amount} for {shares}
fn expense(input: &str) -> IResult<&str, Expense<'_>> {
    (
        identifier,
        sp,
        keyword("paid"),
        sp,
        u64,
        sp,
        keyword("for"),
        sp,
        shares,
    )
        .map(|(payer, _, _, _, amount, _, _, _, shares)| Expense {
            payer,
            amount,
            shares,
        })
        .parse(input)
}

fn settlement_state(input: &str) -> IResult<&str, SettlementState> {
    delimited(
        (char('('), sp),
        alt((
            keyword("pending").map(|_| SettlementState::Pending),
            keyword("completed").map(|_| SettlementState::Completed),
            keyword("confirmed").map(|_| SettlementState::Confirmed),
            keyword("rejected").map(|_| SettlementState::Rejected),
        )),
        (sp, char(')')),
    )
    .parse(input)
}

// {from} settled {amount} to {to} [(state)]
fn settlement(input: &str) -> IResult<&str, Settlement<'_>> {
    (
        identifier,
        sp,
        keyword("settled"),
        sp,
        u64,
        sp,
        keyword("to"),
        sp,
        identifier,
        opt((sp, settlement_state)),
    )
        .map(|(from, _, _, _, amount, _, _, _, to, state)| Settlement {
            from,
            to,
            amount,
            state: state.map(|(_, state)| state),
        })
        .parse(input)
}

fn statement(input: &str) -> IResult<&str, Statement<'_>> {
    // Verbs first, so a member literally named `member` or `scope` still parses.
    alt((
        expense.map(Statement::Expense),
        settlement.map(Statement::Settlement),
        member_decl.map(Statement::Member),
        scope_decl.map(Statement::Scope),
    ))
    .parse(input)
}

fn statement_with_sp(input: &str) -> IResult<&str, Statement<'_>> {
    (sp, statement, sp).map(|(_, stmt, _)| stmt).parse(input)
}

fn syntax_error_detail(err: nom::Err<nom::error::Error<&str>>) -> String {
    match err {
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let near: String = e.input.chars().take(24).collect();
            if near.is_empty() {
                "unexpected end of line".to_string()
            } else {
                format!("unexpected input near '{near}'")
            }
        }
    }
}

/// Parses ledger text one line at a time. Line numbers are 1-based.
pub fn parse_program(input: &str) -> Result<Program<'_>, ParseError> {
    let mut statements = Vec::new();

    for (idx, line) in input.lines().enumerate() {
        let (rest, _) = sp(line).map_err(|e| ParseError::SyntaxError {
            line: idx + 1,
            detail: syntax_error_detail(e),
        })?;
        if rest.trim().is_empty() {
            continue;
        }
        match statement_with_sp(rest) {
            Ok((rest, stmt)) => {
                if !rest.trim().is_empty() {
                    return Err(ParseError::SyntaxError {
                        line: idx + 1,
                        detail: format!("unparsed input '{}'", rest.trim()),
                    });
                }
                statements.push(StatementWithLine {
                    line: idx + 1,
                    statement: stmt,
                });
            }
            Err(e) => {
                return Err(ParseError::SyntaxError {
                    line: idx + 1,
                    detail: syntax_error_detail(e),
                });
            }
        }
    }

    Ok(Program { statements })
}
