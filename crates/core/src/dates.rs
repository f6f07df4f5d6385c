use chrono::format::ParseErrorKind;
use chrono::{Datelike, Local, NaiveDate};
use thiserror::Error;

const GENITIVE_MONTHS: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("expected dd.mm or dd.mm.yyyy")]
    Format,
    #[error("no such calendar date")]
    OutOfRange,
}

/// Parses `dd.mm` (year taken from `today`) or `dd.mm.yyyy`.
pub fn parse_day_month(text: &str, today: NaiveDate) -> Result<NaiveDate, DateParseError> {
    let text = text.trim();
    let full = match text.split('.').collect::<Vec<_>>().as_slice() {
        [day, month] if digits(day, 1..=2) && digits(month, 1..=2) => {
            format!("{text}.{:04}", today.year())
        }
        [day, month, year]
            if digits(day, 1..=2) && digits(month, 1..=2) && digits(year, 4..=4) =>
        {
            text.to_owned()
        }
        _ => return Err(DateParseError::Format),
    };

    NaiveDate::parse_from_str(&full, "%d.%m.%Y").map_err(|error| match error.kind() {
        ParseErrorKind::OutOfRange | ParseErrorKind::Impossible => DateParseError::OutOfRange,
        _ => DateParseError::Format,
    })
}

fn digits(text: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&text.len()) && text.chars().all(|ch| ch.is_ascii_digit())
}

pub fn month_genitive(date: NaiveDate) -> &'static str {
    GENITIVE_MONTHS[date.month0() as usize]
}

/// `5 марта 2024`
pub fn format_long_plain(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), month_genitive(date), date.year())
}

/// `5 марта 2024 г.`
pub fn format_long(date: NaiveDate) -> String {
    format!("{} г.", format_long_plain(date))
}

/// `15 июня 2024 года`, or `до 15 июня 2024 года` when the goods are delivered.
pub fn format_delivery_term(date: NaiveDate, by_deadline: bool) -> String {
    let phrase = format!("{} года", format_long_plain(date));
    if by_deadline {
        format!("до {phrase}")
    } else {
        phrase
    }
}

/// `05.03.2024`
pub fn format_short(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}
