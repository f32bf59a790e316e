//! Date and date-time parsers.

use abnf_core::{
    is_digit,
    streaming::{dquote, sp},
};
use chrono::{
    FixedOffset, LocalResult, NaiveDate as ChronoNaiveDate, NaiveDateTime, NaiveTime, TimeZone,
};
use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case, take_while_m_n},
    character::streaming::char,
    combinator::{map, map_res, value},
    sequence::{delimited, preceded, tuple},
};

use crate::{
    parse::{ImapErrorKind, ImapParseError, ImapResult},
    types::datetime::{DateTime, NaiveDate},
};

/// `date = date-text / DQUOTE date-text DQUOTE`
pub(crate) fn date(input: &[u8]) -> ImapResult<'_, Option<NaiveDate>> {
    alt((date_text, delimited(dquote, date_text, dquote)))(input)
}

/// `date-text = date-day "-" date-month "-" date-year`
pub(crate) fn date_text(input: &[u8]) -> ImapResult<'_, Option<NaiveDate>> {
    let mut parser = tuple((date_day, tag(b"-"), date_month, tag(b"-"), date_year));

    let (remaining, (d, _, m, _, y)) = parser(input)?;

    Ok((
        remaining,
        ChronoNaiveDate::from_ymd_opt(y.into(), m.into(), d.into()).map(NaiveDate::unvalidated),
    ))
}

/// Day of month.
///
/// `date-day = 1*2DIGIT`
pub(crate) fn date_day(input: &[u8]) -> ImapResult<'_, u8> {
    digit_1_2(input)
}

/// `date-month = "Jan" / "Feb" / "Mar" / "Apr" / "May" / "Jun" /
///               "Jul" / "Aug" / "Sep" / "Oct" / "Nov" / "Dec"`
pub(crate) fn date_month(input: &[u8]) -> ImapResult<'_, u8> {
    alt((
        value(1, tag_no_case(b"Jan")),
        value(2, tag_no_case(b"Feb")),
        value(3, tag_no_case(b"Mar")),
        value(4, tag_no_case(b"Apr")),
        value(5, tag_no_case(b"May")),
        value(6, tag_no_case(b"Jun")),
        value(7, tag_no_case(b"Jul")),
        value(8, tag_no_case(b"Aug")),
        value(9, tag_no_case(b"Sep")),
        value(10, tag_no_case(b"Oct")),
        value(11, tag_no_case(b"Nov")),
        value(12, tag_no_case(b"Dec")),
    ))(input)
}

/// `date-year = 4DIGIT`
pub(crate) fn date_year(input: &[u8]) -> ImapResult<'_, u16> {
    digit_4(input)
}

/// `time = 2DIGIT ":" 2DIGIT ":" 2DIGIT`
pub(crate) fn time(input: &[u8]) -> ImapResult<'_, Option<NaiveTime>> {
    let mut parser = tuple((digit_2, tag(b":"), digit_2, tag(b":"), digit_2));

    let (remaining, (h, _, m, _, s)) = parser(input)?;

    Ok((
        remaining,
        NaiveTime::from_hms_opt(h.into(), m.into(), s.into()),
    ))
}

/// `date-time = DQUOTE date-day-fixed "-" date-month "-" date-year SP
///              time SP zone DQUOTE`
pub(crate) fn date_time(input: &[u8]) -> ImapResult<'_, DateTime> {
    let mut parser = delimited(
        dquote,
        tuple((
            date_day_fixed,
            tag(b"-"),
            date_month,
            tag(b"-"),
            date_year,
            sp,
            time,
            sp,
            zone,
        )),
        dquote,
    );

    let (remaining, (d, _, m, _, y, _, time, _, zone)) = parser(input)?;

    let date = ChronoNaiveDate::from_ymd_opt(y.into(), m.into(), d.into());

    match (date, time, zone) {
        (Some(date), Some(time), Some(zone)) => {
            let local_datetime = NaiveDateTime::new(date, time);

            if let LocalResult::Single(datetime) = zone.from_local_datetime(&local_datetime) {
                Ok((remaining, DateTime::unvalidated(datetime)))
            } else {
                Err(nom::Err::Failure(ImapParseError {
                    input,
                    kind: ImapErrorKind::BadDateTime,
                }))
            }
        }
        _ => Err(nom::Err::Failure(ImapParseError {
            input,
            kind: ImapErrorKind::BadDateTime,
        })),
    }
}

/// Fixed-format version of date-day.
///
/// `date-day-fixed = (SP DIGIT) / 2DIGIT`
pub(crate) fn date_day_fixed(input: &[u8]) -> ImapResult<'_, u8> {
    alt((
        map(
            preceded(sp, take_while_m_n(1, 1, is_digit)),
            |bytes: &[u8]| bytes[0] - b'0',
        ),
        digit_2,
    ))(input)
}

/// Signed four-digit hhmm east of Greenwich.
///
/// `zone = ("+" / "-") 4DIGIT`
pub(crate) fn zone(input: &[u8]) -> ImapResult<'_, Option<FixedOffset>> {
    let mut parser = tuple((alt((char('+'), char('-'))), digit_2, digit_2));

    let (remaining, (sign, hh, mm)) = parser(input)?;

    let offset = 3600 * (hh as i32) + 60 * (mm as i32);

    let zone = match sign {
        '+' => FixedOffset::east_opt(offset),
        '-' => FixedOffset::west_opt(offset),
        _ => unreachable!(),
    };

    Ok((remaining, zone))
}

fn digit_1_2(input: &[u8]) -> ImapResult<'_, u8> {
    map_res(
        map(take_while_m_n(1, 2, is_digit), |bytes| {
            std::str::from_utf8(bytes).unwrap()
        }),
        str::parse::<u8>,
    )(input)
}

fn digit_2(input: &[u8]) -> ImapResult<'_, u8> {
    map_res(
        map(take_while_m_n(2, 2, is_digit), |bytes| {
            std::str::from_utf8(bytes).unwrap()
        }),
        str::parse::<u8>,
    )(input)
}

fn digit_4(input: &[u8]) -> ImapResult<'_, u16> {
    map_res(
        map(take_while_m_n(4, 4, is_digit), |bytes| {
            std::str::from_utf8(bytes).unwrap()
        }),
        str::parse::<u16>,
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date() {
        let (rem, val) = date(b"1-Feb-2020xxx").unwrap();
        assert_eq!(rem, b"xxx");
        assert_eq!(
            val,
            ChronoNaiveDate::from_ymd_opt(2020, 2, 1).map(NaiveDate::unvalidated)
        );

        let (rem, val) = date(b"\"01-Feb-2020\"xxx").unwrap();
        assert_eq!(rem, b"xxx");
        assert_eq!(
            val,
            ChronoNaiveDate::from_ymd_opt(2020, 2, 1).map(NaiveDate::unvalidated)
        );
    }

    #[test]
    fn test_date_month_is_case_insensitive() {
        let (_, val) = date_month(b"jAn ").unwrap();
        assert_eq!(val, 1);

        let (_, val) = date_month(b"DeC ").unwrap();
        assert_eq!(val, 12);
    }

    #[test]
    fn test_date_time() {
        let (rem, _) = date_time(b"\" 1-Feb-1985 12:34:56 +0100\"xxx").unwrap();
        assert_eq!(rem, b"xxx");

        let (rem, _) = date_time(b"\"01-Jul-2003 10:52:37 +0200\"xxx").unwrap();
        assert_eq!(rem, b"xxx");
    }

    #[test]
    fn test_date_time_invalid() {
        // Nonexistent dates and out-of-range components are rejected.
        assert!(date_time(b"\"31-Feb-2020 00:00:00 +0100\"xxx").is_err());
        assert!(date_time(b"\"99-Feb-2020 99:99:99 +0100\"xxx").is_err());
        assert!(date_time(b"\" 1-Feb-2020 12:34:56 +9999\"xxx").is_err());
    }

    #[test]
    fn test_zone() {
        let (_, val) = zone(b"+0000 ").unwrap();
        assert_eq!(val, FixedOffset::east_opt(0));

        let (_, val) = zone(b"-0205 ").unwrap();
        assert_eq!(val, FixedOffset::west_opt(2 * 3600 + 5 * 60));
    }
}
