use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::model::CertificateStatus;

const DATE_TOKEN: &str = r"[0-9]{2}\.[0-9]{2}\.[0-9]{4}";

fn date_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(DATE_TOKEN).expect("date token pattern compiles"))
}

/// Classifies a certificate by the first `DD.MM.YYYY` token in its file name.
/// A certificate dated today is still valid.
pub fn evaluate(file_name: &str, today: NaiveDate) -> CertificateStatus {
    let Some(token) = date_token().find(file_name) else {
        return CertificateStatus::DateNotFound;
    };
    match parse_token(token.as_str()) {
        Some(due) if due < today => CertificateStatus::Expired,
        Some(_) => CertificateStatus::Valid,
        None => CertificateStatus::DateParseError,
    }
}

fn parse_token(token: &str) -> Option<NaiveDate> {
    let mut parts = token.split('.');
    let day = parts.next()?.parse::<u32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let year = parts.next()?.parse::<i32>().ok()?;
    // calendar years start at 1
    if year < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn rank(status: CertificateStatus) -> u8 {
    match status {
        CertificateStatus::Expired => 3,
        CertificateStatus::DateParseError => 2,
        CertificateStatus::DateNotFound => 1,
        _ => 0,
    }
}

/// Combines two statuses of the same certificate type: the worse one wins
/// (Expired > DateParseError > DateNotFound > Valid).
pub fn worst(a: CertificateStatus, b: CertificateStatus) -> CertificateStatus {
    if rank(b) > rank(a) {
        b
    } else {
        a
    }
}
