use serde::Serialize;

use crate::model::{
    CertificateStatus, CertificateType, CompanyResult, OverallStatus, ReportModel, VerificationMode,
};

const COMPANY: &str = "Company";
const ADVERSE: &str = "Adverse finding";
const MISSING: &str = "Missing files";
const STATUS: &str = "Status";
const NONE: &str = "NONE";

/// Presentation category a renderer maps onto colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    Ok,
    Warn,
    Alert,
    Neutral,
    Error,
}

pub fn status_highlight(status: CertificateStatus) -> Highlight {
    match status {
        CertificateStatus::Present | CertificateStatus::Valid => Highlight::Ok,
        CertificateStatus::Absent | CertificateStatus::DateParseError => Highlight::Warn,
        CertificateStatus::Expired => Highlight::Alert,
        CertificateStatus::DateNotFound => Highlight::Neutral,
    }
}

pub fn overall_highlight(status: OverallStatus) -> Highlight {
    match status {
        OverallStatus::Complete => Highlight::Ok,
        OverallStatus::Incomplete => Highlight::Warn,
        OverallStatus::ProcessingError => Highlight::Error,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlight>,
}

impl Cell {
    fn plain(value: &str) -> Cell {
        Cell {
            value: value.into(),
            highlight: None,
        }
    }
    fn marked(value: &str, highlight: Highlight) -> Cell {
        Cell {
            value: value.into(),
            highlight: Some(highlight),
        }
    }
}

/// "cells of `column` equal to `value` get `highlight`"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightRule {
    pub column: usize,
    pub value: String,
    pub highlight: Highlight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub rules: Vec<HighlightRule>,
}

impl ReportTable {
    /// Header plus one row per company.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }
    pub fn column_count(&self) -> usize {
        self.header.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportLayout {
    /// Adds a comma-joined list of missing certificates before the status.
    pub include_missing_column: bool,
}

#[derive(Debug, Clone, Copy)]
enum Column {
    Company,
    Certificate(usize),
    Adverse,
    Missing,
    Status,
}

fn columns(model: &ReportModel, layout: ReportLayout) -> Vec<Column> {
    let mut columns = vec![Column::Company];
    columns.extend((0..model.certificates().len()).map(Column::Certificate));
    if model.mode() == VerificationMode::PositiveDebtCheck {
        columns.push(Column::Adverse);
    }
    if layout.include_missing_column {
        columns.push(Column::Missing);
    }
    columns.push(Column::Status);
    columns
}

pub fn build_report(model: &ReportModel) -> ReportTable {
    build_report_with(model, ReportLayout::default())
}

/// Lays the model out as a table. Pure: the same model always gives the
/// same table.
pub fn build_report_with(model: &ReportModel, layout: ReportLayout) -> ReportTable {
    let columns = columns(model, layout);
    let header = columns
        .iter()
        .map(|column| match column {
            Column::Company => COMPANY.to_string(),
            Column::Certificate(i) => model.certificates()[*i].label().to_string(),
            Column::Adverse => ADVERSE.to_string(),
            Column::Missing => MISSING.to_string(),
            Column::Status => STATUS.to_string(),
        })
        .collect();
    let rows = model
        .companies()
        .iter()
        .map(|company| {
            columns
                .iter()
                .map(|column| cell(model, company, *column))
                .collect()
        })
        .collect();
    ReportTable {
        title: format!(
            "CND REPORT ({}) - {}",
            model.mode(),
            model.generated_at().format("%d/%m/%Y %H:%M")
        ),
        header,
        rows,
        rules: rules(model, &columns),
    }
}

fn cell(model: &ReportModel, company: &CompanyResult, column: Column) -> Cell {
    let failed = company.overall_status() == OverallStatus::ProcessingError;
    match column {
        Column::Company => Cell::plain(company.company_name()),
        _ if failed && !matches!(column, Column::Status) => Cell::plain(""),
        Column::Certificate(i) => match company.status_of(&model.certificates()[i]) {
            Some(status) => Cell::marked(status.label(), status_highlight(status)),
            None => Cell::plain(""),
        },
        Column::Adverse => match company.adverse_finding() {
            Some(certificate) => Cell::marked(certificate.label(), Highlight::Alert),
            None => Cell::marked(NONE, Highlight::Ok),
        },
        Column::Missing => {
            if company.missing_types().is_empty() {
                Cell::plain(NONE)
            } else {
                let missing: Vec<&str> = company
                    .missing_types()
                    .iter()
                    .map(CertificateType::label)
                    .collect();
                Cell::plain(&missing.join(", "))
            }
        }
        Column::Status => {
            let status = company.overall_status();
            Cell::marked(status.label(), overall_highlight(status))
        }
    }
}

fn rules(model: &ReportModel, columns: &[Column]) -> Vec<HighlightRule> {
    let mut rules = vec![];
    let mut push = |column: usize, value: &str, highlight: Highlight| {
        rules.push(HighlightRule {
            column,
            value: value.into(),
            highlight,
        })
    };
    for (index, column) in columns.iter().enumerate() {
        match column {
            Column::Certificate(_) => {
                for status in CertificateStatus::for_mode(model.mode()) {
                    push(index, status.label(), status_highlight(*status));
                }
            }
            Column::Adverse => {
                push(index, NONE, Highlight::Ok);
                for certificate in model.certificates() {
                    push(index, certificate.label(), Highlight::Alert);
                }
            }
            Column::Status => {
                for status in [
                    OverallStatus::Complete,
                    OverallStatus::Incomplete,
                    OverallStatus::ProcessingError,
                ] {
                    push(index, status.label(), overall_highlight(status));
                }
            }
            Column::Company | Column::Missing => {}
        }
    }
    rules
}
