//! UK coronavirus API client and CSV dataset summaries

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

use super::CovidSource;
use crate::errors::{SourceError, SourceResult};

pub const COVID_API_URL: &str = "https://api.coronavirus.data.gov.uk/v1/data";

pub const NEW_CASES_COLUMN: &str = "newCasesBySpecimenDate";
pub const HOSPITAL_CASES_COLUMN: &str = "hospitalCases";
pub const CUMULATIVE_DEATHS_COLUMN: &str = "cumDailyNsoDeathsByDeathDate";

/// Number of daily case rows summed for the weekly figure
const WEEK_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AreaType {
    /// Lower-tier local authority
    Ltla,
    Nation,
}

impl AreaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaType::Ltla => "ltla",
            AreaType::Nation => "nation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CovidArea {
    pub name: String,
    pub area_type: AreaType,
}

impl CovidArea {
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            area_type: AreaType::Ltla,
        }
    }

    pub fn nation(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            area_type: AreaType::Nation,
        }
    }
}

/// Headline figures derived from one dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CovidSummary {
    pub seven_day_cases: i64,
    pub hospital_cases: i64,
    pub total_deaths: i64,
}

/// A CSV table from the covid API, newest date first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CovidDataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CovidDataset {
    /// Parse CSV text whose first line is the header row
    pub fn parse_csv(contents: &str) -> SourceResult<Self> {
        let mut lines = contents.lines().filter(|line| !line.trim().is_empty());
        let headers = lines
            .next()
            .map(split_csv_line)
            .ok_or_else(|| SourceError::parse_error("covid csv", "no header row"))?;
        let rows = lines.map(split_csv_line).collect();
        Ok(Self { headers, rows })
    }

    pub fn load_csv_file(path: impl AsRef<Path>) -> SourceResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_csv(&contents)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows, excluding the header
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Integer value of a cell; blank, missing or non-numeric cells read as 0
    pub fn value(&self, row: usize, column: usize) -> i64 {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .and_then(|cell| {
                cell.parse::<i64>()
                    .ok()
                    .or_else(|| cell.parse::<f64>().ok().map(|v| v as i64))
            })
            .unwrap_or(0)
    }

    /// First data row holding a non-zero value in `column`
    pub fn first_non_blank(&self, column: usize) -> Option<usize> {
        (0..self.rows.len()).find(|&row| self.value(row, column) != 0)
    }

    /// Cases over the last week, current hospital cases and cumulative deaths.
    ///
    /// The most recent case figure is usually incomplete, so the week starts
    /// at the row after the first one reporting cases. Missing columns give 0.
    pub fn summarize(&self) -> CovidSummary {
        let seven_day_cases = self
            .column(NEW_CASES_COLUMN)
            .and_then(|column| {
                self.first_non_blank(column).map(|first| {
                    (first + 1..first + 1 + WEEK_DAYS)
                        .map(|row| self.value(row, column))
                        .sum()
                })
            })
            .unwrap_or(0);

        CovidSummary {
            seven_day_cases,
            hospital_cases: self.latest_value(HOSPITAL_CASES_COLUMN),
            total_deaths: self.latest_value(CUMULATIVE_DEATHS_COLUMN),
        }
    }

    fn latest_value(&self, column_name: &str) -> i64 {
        match self.column(column_name) {
            Some(column) => self
                .first_non_blank(column)
                .map(|row| self.value(row, column))
                .unwrap_or(0),
            None => {
                debug!("Covid dataset has no '{}' column", column_name);
                0
            }
        }
    }
}

/// Split one CSV line, honouring double-quoted fields
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Client for the UK government coronavirus dashboard API
#[derive(Debug, Clone)]
pub struct UkCovidClient {
    client: reqwest::Client,
    base_url: String,
}

impl UkCovidClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, COVID_API_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CovidSource for UkCovidClient {
    async fn fetch(&self, area: &CovidArea) -> SourceResult<CovidDataset> {
        info!("Requesting COVID data for {}...", area.name);

        let filters = format!("areaType={};areaName={}", area.area_type.as_str(), area.name);
        let structure = json!({
            "areaCode": "areaCode",
            "areaName": "areaName",
            "areaType": "areaType",
            "date": "date",
            CUMULATIVE_DEATHS_COLUMN: CUMULATIVE_DEATHS_COLUMN,
            HOSPITAL_CASES_COLUMN: HOSPITAL_CASES_COLUMN,
            NEW_CASES_COLUMN: NEW_CASES_COLUMN,
        })
        .to_string();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("filters", filters.as_str()),
                ("structure", structure.as_str()),
                ("format", "csv"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let dataset = CovidDataset::parse_csv(&response.text().await?)?;
        info!("COVID data for {} updated ({} rows).", area.name, dataset.len());
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NATION_CSV: &str = "\
areaCode,areaName,areaType,date,cumDailyNsoDeathsByDeathDate,hospitalCases,newCasesBySpecimenDate
E92000001,England,nation,2021-10-28,,,
E92000001,England,nation,2021-10-27,,7019,100
E92000001,England,nation,2021-10-26,141544,7000,10
E92000001,England,nation,2021-10-25,141500,6900,20
E92000001,England,nation,2021-10-24,141400,6800,30
E92000001,England,nation,2021-10-23,141300,6700,40
E92000001,England,nation,2021-10-22,141200,6600,50
E92000001,England,nation,2021-10-21,141100,6500,60
E92000001,England,nation,2021-10-20,141000,6400,70
E92000001,England,nation,2021-10-19,140900,6300,80
";

    #[test]
    fn test_parse_csv_reads_header_and_rows() {
        let data = CovidDataset::parse_csv(NATION_CSV).unwrap();
        assert_eq!(data.headers().len(), 7);
        assert_eq!(data.len(), 10);
        assert_eq!(data.column(HOSPITAL_CASES_COLUMN), Some(5));
        assert_eq!(data.column("missing"), None);
    }

    #[test]
    fn test_value_reads_blank_cells_as_zero() {
        let data = CovidDataset::parse_csv(NATION_CSV).unwrap();
        assert_eq!(data.value(0, 6), 0);
        assert_eq!(data.value(1, 6), 100);
        assert_eq!(data.value(2, 4), 141_544);
        assert_eq!(data.value(99, 4), 0);

        let row = CovidDataset::parse_csv("a,b,c,d,e,f\n0,10,20,30,40,50").unwrap();
        assert_eq!(row.value(0, 3), 30);
    }

    #[test]
    fn test_first_non_blank() {
        let data = CovidDataset::parse_csv(NATION_CSV).unwrap();
        assert_eq!(data.first_non_blank(4), Some(2));
        assert_eq!(data.first_non_blank(5), Some(1));
        assert_eq!(data.first_non_blank(6), Some(1));

        let pets = CovidDataset::parse_csv("Cats,Dogs,Fish\n1,,3\n2,1,3").unwrap();
        assert_eq!(pets.first_non_blank(1), Some(1));
        assert_eq!(pets.first_non_blank(2), Some(0));
    }

    #[test]
    fn test_summarize_skips_incomplete_latest_day() {
        let summary = CovidDataset::parse_csv(NATION_CSV).unwrap().summarize();
        assert_eq!(
            summary,
            CovidSummary {
                seven_day_cases: 10 + 20 + 30 + 40 + 50 + 60 + 70,
                hospital_cases: 7019,
                total_deaths: 141_544,
            }
        );
    }

    #[test]
    fn test_summarize_without_data_is_zero() {
        let summary = CovidDataset::parse_csv("date,newCasesBySpecimenDate\n2021-10-28,\n")
            .unwrap()
            .summarize();
        assert_eq!(summary, CovidSummary::default());
    }

    #[test]
    fn test_quoted_fields_keep_commas() {
        let data = CovidDataset::parse_csv(
            "areaName,newCasesBySpecimenDate\n\"Bristol, City of\",12\n\"Say \"\"hi\"\"\",3",
        )
        .unwrap();
        assert_eq!(data.value(0, 1), 12);
        assert_eq!(data.rows[0][0], "Bristol, City of");
        assert_eq!(data.rows[1][0], "Say \"hi\"");
    }

    #[test]
    fn test_crlf_line_endings() {
        let data =
            CovidDataset::parse_csv("areaName,newCasesBySpecimenDate\r\nExeter,7\r\n\"Devon\",\r\n")
                .unwrap();
        assert_eq!(data.headers()[1], "newCasesBySpecimenDate");
        assert_eq!(data.len(), 2);
        assert_eq!(data.value(0, 1), 7);
        assert_eq!(data.rows[1][0], "Devon");
        assert_eq!(data.rows[1][1], "");
    }

    #[test]
    fn test_empty_csv_is_a_parse_error() {
        assert!(matches!(
            CovidDataset::parse_csv("\n\n"),
            Err(SourceError::ParseError { .. })
        ));
    }

    #[test]
    fn test_load_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nation.csv");
        std::fs::write(&path, NATION_CSV).unwrap();

        let data = CovidDataset::load_csv_file(&path).unwrap();
        assert_eq!(data.summarize().hospital_cases, 7019);
        assert!(matches!(
            CovidDataset::load_csv_file(dir.path().join("absent.csv")),
            Err(SourceError::Io(_))
        ));
    }
}
