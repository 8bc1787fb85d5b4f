use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::enums::{ProductType, Project, Scale, SortDirection, SortField, SupplyArea};

/// Smallest and largest page sizes a query may request.
pub const LIMIT_MIN: u8 = 1;
pub const LIMIT_MAX: u8 = 100;

/// Wire names of every SearchParams field, in declaration order.
pub const FIELD_NAMES: &[&str] = &[
    "keyword",
    "scale",
    "productType",
    "state",
    "city",
    "supplyArea",
    "project",
    "publicationPeriod",
    "creationPeriod",
    "sortField",
    "sortDirection",
    "limit",
];

/// Inclusive calendar range. Construction guarantees `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Returns None when `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }
}

/// Unchecked wire form; deserialization goes through `DateRange::new`.
#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = String;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
            .ok_or_else(|| format!("date range ends ({}) before it starts ({})", raw.end, raw.start))
    }
}

/// Validated, structured catalog query.
///
/// Enumerated fields only ever hold members of their closed domain, and
/// sorting is always resolved. Build one through the validator, not by hand,
/// when the input is untrusted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_area: Option<SupplyArea>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_period: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_period: Option<DateRange>,
    #[serde(default)]
    pub sort_field: SortField,
    #[serde(default)]
    pub sort_direction: SortDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u8>,
}

impl SearchParams {
    /// True when at least one filter (anything besides sorting and paging) is set.
    pub fn has_filters(&self) -> bool {
        self.keyword.is_some()
            || self.scale.is_some()
            || self.product_type.is_some()
            || self.state.is_some()
            || self.city.is_some()
            || self.supply_area.is_some()
            || self.project.is_some()
            || self.publication_period.is_some()
            || self.creation_period.is_some()
    }

    /// Wire form as a JSON object (camelCase keys, absent fields omitted).
    pub fn to_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_range_rejects_inverted_bounds() {
        assert!(DateRange::new(date(2024, 5, 10), date(2024, 5, 1)).is_none());
        let range = DateRange::new(date(2024, 5, 1), date(2024, 5, 10)).unwrap();
        assert_eq!((range.start, range.end), (date(2024, 5, 1), date(2024, 5, 10)));
    }

    #[test]
    fn deserialized_range_must_be_ordered() {
        let inverted = r#"{"publicationPeriod":{"start":"2024-05-10","end":"2024-05-01"}}"#;
        let err = serde_json::from_str::<SearchParams>(inverted).unwrap_err();
        assert!(err.to_string().contains("before it starts"));

        let ordered = r#"{"publicationPeriod":{"start":"2024-05-01","end":"2024-05-10"}}"#;
        let params: SearchParams = serde_json::from_str(ordered).unwrap();
        assert_eq!(
            params.publication_period,
            DateRange::new(date(2024, 5, 1), date(2024, 5, 10))
        );
    }

    #[test]
    fn single_day_range_is_valid() {
        let range = DateRange::new(date(2024, 2, 29), date(2024, 2, 29)).unwrap();
        assert_eq!(range.start, range.end);
    }

    #[test]
    fn default_params_have_sorting_and_no_filters() {
        let params = SearchParams::default();
        assert!(!params.has_filters());
        let fields = params.to_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["sortField"], "publicationDate");
        assert_eq!(fields["sortDirection"], "DESC");
    }

    #[test]
    fn wire_form_uses_camel_case_and_iso_dates() {
        let params = SearchParams {
            product_type: Some(ProductType::Orthoimage),
            publication_period: DateRange::new(date(2023, 1, 1), date(2023, 12, 31)),
            limit: Some(50),
            ..Default::default()
        };
        let fields = params.to_fields();
        assert_eq!(fields["productType"], "Carta Ortoimagem");
        assert_eq!(fields["publicationPeriod"]["start"], "2023-01-01");
        assert_eq!(fields["publicationPeriod"]["end"], "2023-12-31");
        assert_eq!(fields["limit"], 50);
        assert!(!fields.contains_key("scale"));
    }

    #[test]
    fn deserializing_missing_sort_applies_defaults() {
        let params: SearchParams =
            serde_json::from_str(r#"{"supplyArea":"5° Centro de Geoinformação"}"#).unwrap();
        assert_eq!(params.supply_area, Some(SupplyArea::Fifth));
        assert_eq!(params.sort_field, SortField::PublicationDate);
        assert_eq!(params.sort_direction, SortDirection::Desc);
    }

    #[test]
    fn every_wire_field_name_is_known() {
        let params = SearchParams {
            keyword: Some("MI 2965-2-NE".into()),
            scale: Some(Scale::Scale25k),
            product_type: Some(ProductType::Topographic),
            state: Some("RJ".into()),
            city: Some("Niterói".into()),
            supply_area: Some(SupplyArea::Fifth),
            project: Some(Project::SystematicMapping),
            publication_period: DateRange::new(date(2020, 1, 1), date(2020, 6, 30)),
            creation_period: DateRange::new(date(2019, 1, 1), date(2019, 12, 31)),
            sort_field: SortField::CreationDate,
            sort_direction: SortDirection::Asc,
            limit: Some(10),
        };
        let fields = params.to_fields();
        assert_eq!(fields.len(), FIELD_NAMES.len());
        for key in fields.keys() {
            assert!(FIELD_NAMES.contains(&key.as_str()), "unexpected key {key}");
        }
    }
}
