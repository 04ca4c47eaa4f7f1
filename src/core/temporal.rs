use crate::domain::model::{Table, DATE_COLUMN};
use crate::utils::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// 月份名稱格式（%B 解析時也接受縮寫）
const NAMED_MONTH_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%B %d, %y",
    "%d %B %y",
    "%d-%b-%y",
    "%d-%b-%Y",
];

const ISO_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// 數字格式一律先以日在前解讀
const DAY_FIRST_FORMATS: &[&str] = &[
    "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y", "%d-%m-%y", "%d.%m.%y",
];

/// 只有日在前不可能成立時才使用
const MONTH_FIRST_FORMATS: &[&str] = &[
    "%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y", "%m/%d/%y", "%m-%d-%y", "%m.%d.%y",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemporalFilterReport {
    pub kept: usize,
    pub dropped: usize,
    pub skipped: bool,
}

/// chrono 的 %Y 接受任意位數，只有字串裡確實有四位數年份時才套用
fn has_four_digit_year(value: &str) -> bool {
    value
        .split(|c: char| !c.is_ascii_digit())
        .any(|token| token.len() == 4)
}

fn accepts_format(format: &str, four_digit_year: bool) -> bool {
    four_digit_year || !format.contains("%Y")
}

/// 寬鬆的混合格式日期解析；無法解析則回傳 None
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    let value = collapsed.as_str();
    let four_digit_year = has_four_digit_year(value);

    let try_dates = |formats: &[&str]| {
        formats
            .iter()
            .filter(|f| accepts_format(f, four_digit_year))
            .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
    };

    try_dates(NAMED_MONTH_FORMATS)
        .or_else(|| try_dates(ISO_DATE_FORMATS))
        .or_else(|| {
            ISO_DATETIME_FORMATS
                .iter()
                .filter(|f| accepts_format(f, four_digit_year))
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| try_dates(DAY_FIRST_FORMATS))
        .or_else(|| try_dates(MONTH_FIRST_FORMATS))
}

/// 丟棄日期無法解析的列，並把日期改寫成 ISO 格式
pub fn filter_by_date(table: Table) -> Result<(Table, TemporalFilterReport)> {
    let Some(date_index) = table.column_index(DATE_COLUMN) else {
        tracing::warn!(
            "⚠️ Column '{}' not found in {}; skipping temporal filtering",
            DATE_COLUMN,
            table.name
        );
        let report = TemporalFilterReport {
            kept: table.len(),
            dropped: 0,
            skipped: true,
        };
        return Ok((table, report));
    };

    let total = table.len();
    let mut filtered = Table::new(table.name.clone(), table.columns.clone());
    for mut record in table.records {
        if let Some(date) = parse_date(record.get(date_index)) {
            record.values[date_index] = date.format("%Y-%m-%d").to_string();
            filtered.push_record(record);
        }
    }

    let report = TemporalFilterReport {
        kept: filtered.len(),
        dropped: total - filtered.len(),
        skipped: false,
    };

    if report.dropped > 0 {
        tracing::info!(
            "Dropped {} of {} records with unparseable dates",
            report.dropped,
            total
        );
    } else {
        tracing::debug!("All {} dates parsed", total);
    }

    Ok((filtered, report))
}
