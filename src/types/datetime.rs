//! Date and date-time wrappers.

use chrono::{DateTime as ChronoDateTime, Datelike, FixedOffset, NaiveDate as ChronoNaiveDate};
use thiserror::Error;

/// An `INTERNALDATE`-style date-time with a fixed timezone offset.
///
/// The wire format only carries four-digit years and `±HHMM` zones, so the
/// wrapped value is validated accordingly.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DateTime(pub(crate) ChronoDateTime<FixedOffset>);

impl DateTime {
    pub fn verify(value: &ChronoDateTime<FixedOffset>) -> Result<(), DateTimeError> {
        if !(0..=9999).contains(&value.year()) {
            return Err(DateTimeError::YearOutOfRange { year: value.year() });
        }

        if value.offset().local_minus_utc() % 60 != 0 {
            return Err(DateTimeError::SubMinuteOffset);
        }

        Ok(())
    }

    pub(crate) fn unvalidated(inner: ChronoDateTime<FixedOffset>) -> Self {
        #[cfg(debug_assertions)]
        Self::verify(&inner).unwrap();

        Self(inner)
    }

    pub fn inner(&self) -> &ChronoDateTime<FixedOffset> {
        &self.0
    }
}

impl TryFrom<ChronoDateTime<FixedOffset>> for DateTime {
    type Error = DateTimeError;

    fn try_from(value: ChronoDateTime<FixedOffset>) -> Result<Self, Self::Error> {
        Self::verify(&value)?;

        Ok(Self(value))
    }
}

/// A `date` as used in searches and APPEND.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NaiveDate(pub(crate) ChronoNaiveDate);

impl NaiveDate {
    pub fn verify(value: &ChronoNaiveDate) -> Result<(), DateTimeError> {
        if !(0..=9999).contains(&value.year()) {
            return Err(DateTimeError::YearOutOfRange { year: value.year() });
        }

        Ok(())
    }

    pub(crate) fn unvalidated(inner: ChronoNaiveDate) -> Self {
        #[cfg(debug_assertions)]
        Self::verify(&inner).unwrap();

        Self(inner)
    }

    pub fn inner(&self) -> &ChronoNaiveDate {
        &self.0
    }
}

impl TryFrom<ChronoNaiveDate> for NaiveDate {
    type Error = DateTimeError;

    fn try_from(value: ChronoNaiveDate) -> Result<Self, Self::Error> {
        Self::verify(&value)?;

        Ok(Self(value))
    }
}

#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum DateTimeError {
    #[error("year {year} is not representable in four digits")]
    YearOutOfRange { year: i32 },
    #[error("timezone offset has a sub-minute component")]
    SubMinuteOffset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_validation() {
        let ok = ChronoDateTime::parse_from_rfc2822("Tue, 1 Jul 2003 10:52:37 +0200").unwrap();
        assert!(DateTime::try_from(ok).is_ok());

        let prehistoric = ok.with_year(-5).unwrap();
        assert!(DateTime::try_from(prehistoric).is_err());
    }

    #[test]
    fn test_naive_date_validation() {
        assert!(NaiveDate::try_from(ChronoNaiveDate::from_ymd_opt(2023, 4, 12).unwrap()).is_ok());
    }
}
