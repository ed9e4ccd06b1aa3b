use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{stage_of, Stage};

pub type ItemId = u64;

/// One RFP record as served by the backend list endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RfpRecord {
    pub id: ItemId,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub client_name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub deadline: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub status: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub extracted_data: Option<Value>,
}

impl RfpRecord {
    pub fn stage(&self) -> Stage {
        stage_of(&self.status)
    }

    /// Typed view of `extracted_data`, limited to what the stage guarantees.
    pub fn extracted(&self) -> ExtractedData {
        ExtractedData::from_payload(self.stage(), self.extracted_data.as_ref())
    }

    /// Final path segment of the source document, if any.
    pub fn source_file_name(&self) -> Option<&str> {
        self.file_url
            .as_deref()
            .and_then(|url| url.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    })
}

/// Requirement name to display text, as extracted by technical analysis.
pub type Requirements = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct ProductMatch {
    pub product_id: String,
    pub match_score: Option<f64>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PriceComponents {
    #[serde(default)]
    pub base_price: Option<f64>,
    #[serde(default, rename = "logistics_5_percent")]
    pub logistics: Option<f64>,
    #[serde(default, rename = "margin_20_percent")]
    pub margin: Option<f64>,
    #[serde(default, rename = "gst_18_percent")]
    pub gst: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingQuote {
    pub sku: String,
    pub product_name: Option<String>,
    pub currency: String,
    pub unit: Option<String>,
    pub components: PriceComponents,
    pub final_unit_price: f64,
}

#[derive(Deserialize)]
struct RawPricing {
    #[serde(default, deserialize_with = "string_or_empty")]
    sku: String,
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    components: Option<PriceComponents>,
    #[serde(default)]
    final_unit_price: Option<f64>,
}

/// Stage-keyed view of the open-ended `extracted_data` payload.
///
/// The variant never claims more than the record's stage, and degrades to a
/// lower variant when the payload is missing the fields of its stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ExtractedData {
    #[default]
    Unanalyzed,
    Analyzed {
        requirements: Requirements,
        product_match: Option<ProductMatch>,
    },
    Priced {
        requirements: Requirements,
        product_match: Option<ProductMatch>,
        pricing: PricingQuote,
    },
    Finalized {
        requirements: Requirements,
        product_match: Option<ProductMatch>,
        pricing: PricingQuote,
    },
}

impl ExtractedData {
    pub fn from_payload(stage: Stage, payload: Option<&Value>) -> Self {
        let Some(Value::Object(fields)) = payload else {
            return ExtractedData::Unanalyzed;
        };
        if stage == Stage::New {
            return ExtractedData::Unanalyzed;
        }

        let has_analysis = fields.contains_key("requirements") || fields.contains_key("match");
        if !has_analysis {
            return ExtractedData::Unanalyzed;
        }
        let requirements = fields
            .get("requirements")
            .map(parse_requirements)
            .unwrap_or_default();
        let product_match = fields.get("match").and_then(parse_match);

        let pricing = if stage >= Stage::PricingComplete {
            fields.get("pricing").and_then(parse_pricing)
        } else {
            None
        };

        match (stage, pricing) {
            (Stage::ReadyToSubmit, Some(pricing)) => ExtractedData::Finalized {
                requirements,
                product_match,
                pricing,
            },
            (_, Some(pricing)) => ExtractedData::Priced {
                requirements,
                product_match,
                pricing,
            },
            (_, None) => ExtractedData::Analyzed {
                requirements,
                product_match,
            },
        }
    }

    pub fn requirements(&self) -> Option<&Requirements> {
        match self {
            ExtractedData::Unanalyzed => None,
            ExtractedData::Analyzed { requirements, .. }
            | ExtractedData::Priced { requirements, .. }
            | ExtractedData::Finalized { requirements, .. } => Some(requirements),
        }
    }

    pub fn product_match(&self) -> Option<&ProductMatch> {
        match self {
            ExtractedData::Unanalyzed => None,
            ExtractedData::Analyzed { product_match, .. }
            | ExtractedData::Priced { product_match, .. }
            | ExtractedData::Finalized { product_match, .. } => product_match.as_ref(),
        }
    }

    pub fn pricing(&self) -> Option<&PricingQuote> {
        match self {
            ExtractedData::Unanalyzed | ExtractedData::Analyzed { .. } => None,
            ExtractedData::Priced { pricing, .. } | ExtractedData::Finalized { pricing, .. } => {
                Some(pricing)
            }
        }
    }
}

fn parse_requirements(value: &Value) -> Requirements {
    match value {
        Value::Object(fields) => fields
            .iter()
            .map(|(key, value)| (key.clone(), display_value(value)))
            .collect(),
        Value::Null => Requirements::new(),
        other => Requirements::from([("raw".to_string(), display_value(other))]),
    }
}

fn parse_match(value: &Value) -> Option<ProductMatch> {
    let fields = value.as_object()?;
    let product_id = match fields.get("product_id")? {
        Value::Null | Value::Bool(false) => return None,
        Value::String(id) if id.is_empty() => return None,
        Value::String(id) => id.clone(),
        other => other.to_string(),
    };
    Some(ProductMatch {
        product_id,
        match_score: fields.get("match_score").and_then(Value::as_f64),
        reason: fields
            .get("reason")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
    })
}

fn parse_pricing(value: &Value) -> Option<PricingQuote> {
    let raw: RawPricing = serde_json::from_value(value.clone()).ok()?;
    let final_unit_price = raw.final_unit_price?;
    Some(PricingQuote {
        sku: raw.sku,
        product_name: raw.product_name,
        currency: raw.currency.unwrap_or_else(|| "INR".to_string()),
        unit: raw.unit,
        components: raw.components.unwrap_or_default(),
        final_unit_price,
    })
}

/// Renders an arbitrary JSON value as a single display line.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => "N/A".to_string(),
        Value::String(text) if text.is_empty() => "N/A".to_string(),
        Value::String(text) => text.clone(),
        Value::Array(items) if items.is_empty() => "N/A".to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_scalar)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(fields) if fields.is_empty() => "N/A".to_string(),
        Value::Object(fields) => fields
            .iter()
            .map(|(key, value)| format!("{key}: {}", display_scalar(value)))
            .collect::<Vec<_>>()
            .join(" | "),
        Value::Number(number) if number.as_f64() == Some(0.0) => "N/A".to_string(),
        other => other.to_string(),
    }
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Pipeline counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total: usize,
    pub new: usize,
    pub processing: usize,
    pub ready: usize,
}

impl DashboardStats {
    pub fn from_records(records: &[RfpRecord]) -> Self {
        records
            .iter()
            .fold(DashboardStats::default(), |mut stats, record| {
                stats.total += 1;
                match record.status.as_str() {
                    crate::STATUS_NEW => stats.new += 1,
                    crate::STATUS_PROCESSED | crate::STATUS_PRICING_COMPLETE => {
                        stats.processing += 1
                    }
                    crate::STATUS_READY_TO_SUBMIT => stats.ready += 1,
                    _ => {}
                }
                stats
            })
    }
}
