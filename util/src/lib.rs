use std::{
    io::{self, Read},
    path::Path,
};

use miette::GraphicalReportHandler;
use nom::{
    character::complete::{char, digit1},
    combinator::{map_res, opt, recognize},
    error::{FromExternalError, ParseError},
    sequence::tuple,
    IResult,
};
use nom_locate::LocatedSpan;
use nom_supreme::{
    error::{BaseErrorKind, ErrorTree, GenericErrorTree},
    final_parser::final_parser,
};
use tracing::warn;

pub type Span<'a> = LocatedSpan<&'a str>;

type ErrorKind = BaseErrorKind<&'static str, Box<dyn std::error::Error + Send + Sync + 'static>>;

#[derive(thiserror::Error, Debug, miette::Diagnostic)]
#[error("bad input")]
struct BadInput<'a> {
    #[source_code]
    src: &'a str,

    #[label("{kind}")]
    bad_bit: miette::SourceSpan,

    kind: ErrorKind,
}

/// A line that did not parse, located by its 1-based column.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at column {column}")]
pub struct LineError {
    pub column: usize,
    pub message: String,
}

pub fn parse_number<'a, E>(i: Span<'a>) -> IResult<Span<'a>, i64, E>
where
    E: ParseError<Span<'a>> + FromExternalError<Span<'a>, std::num::ParseIntError>,
{
    map_res(recognize(tuple((opt(char('-')), digit1))), |i: Span<'a>| {
        i.fragment().parse::<i64>()
    })(i)
}

fn innermost(tree: ErrorTree<Span<'_>>) -> Option<(Span<'_>, ErrorKind)> {
    match tree {
        GenericErrorTree::Base { location, kind } => Some((location, kind)),
        GenericErrorTree::Stack { base, .. } => innermost(*base),
        GenericErrorTree::Alt(alts) => alts.into_iter().find_map(innermost),
    }
}

/// Runs `parse_fun` over the whole line. On failure the offending spot is
/// rendered as a miette snippet to the `warn` log and returned as a
/// [`LineError`].
pub fn parse_line<'a, T, F>(l: &'a str, parse_fun: F) -> Result<T, LineError>
where
    F: FnMut(Span<'a>) -> IResult<Span<'a>, T, ErrorTree<Span<'a>>>,
{
    let line_span = Span::new(l);
    let line: Result<_, ErrorTree<Span>> = final_parser(parse_fun)(line_span);

    line.map_err(|tree| match innermost(tree) {
        Some((location, kind)) => {
            let offset = location.location_offset();
            let message = kind.to_string();
            let err = BadInput {
                src: l,
                bad_bit: miette::SourceSpan::new(offset.into(), 0.into()),
                kind,
            };
            let mut s = String::new();
            if GraphicalReportHandler::new()
                .render_report(&mut s, &err)
                .is_ok()
            {
                warn!("{s}");
            }
            LineError {
                column: offset + 1,
                message,
            }
        }
        None => LineError {
            column: 1,
            message: "unrecognised input".to_string(),
        },
    })
}

/// Reads the whole input file, or stdin when `path` is `-`.
pub fn read_input(path: &Path) -> io::Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        io::stdin().lock().read_to_string(&mut input)?;
        Ok(input)
    } else {
        std::fs::read_to_string(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::{character::complete::space1, multi::separated_list0};
    use rstest::rstest;

    fn numbers(i: Span) -> IResult<Span, Vec<i64>, ErrorTree<Span>> {
        separated_list0(space1, parse_number)(i)
    }

    #[rstest]
    #[case("12", vec![12])]
    #[case("-4 0 7", vec![-4, 0, 7])]
    #[case("1\t2", vec![1, 2])]
    #[case("", vec![])]
    fn parses_numbers(#[case] line: &str, #[case] expected: Vec<i64>) {
        let res = parse_line(line, numbers);
        assert!(res.is_ok());
        assert_eq!(res.unwrap(), expected);
    }

    #[rstest]
    #[case("3 4x", 4)]
    #[case("x", 1)]
    #[case("1 - 2", 2)]
    fn reports_bad_column(#[case] line: &str, #[case] column: usize) {
        let res = parse_line(line, numbers);
        assert!(res.is_err());
        assert_eq!(res.unwrap_err().column, column);
    }

    #[test]
    fn rejects_overflow() {
        let res = parse_line("99999999999999999999", numbers);
        assert!(res.is_err());
    }

    #[test]
    fn missing_file() {
        let res = read_input(Path::new("does/not/exist"));
        assert_eq!(res.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
