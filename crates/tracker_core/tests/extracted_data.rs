use serde_json::json;
use tracker_core::{ExtractedData, PriceComponents, RfpRecord, Stage};

fn analysis_payload() -> serde_json::Value {
    json!({
        "requirements": {
            "item_name": "Exterior emulsion",
            "quantity": 1200,
            "colors": ["white", "ivory"],
            "warranty": null
        },
        "match": {
            "product_id": 17,
            "match_score": 92.5,
            "reason": "Meets weather resistance clause"
        }
    })
}

fn priced_payload() -> serde_json::Value {
    let mut payload = analysis_payload();
    payload["pricing"] = json!({
        "sku": "EXT-EM-20",
        "product_name": "Apex Exterior",
        "currency": "INR",
        "unit": "Per Litre",
        "components": {
            "base_price": 300.0,
            "logistics_5_percent": 15.0,
            "margin_20_percent": 60.0,
            "gst_18_percent": 56.7
        },
        "final_unit_price": 431.7
    });
    payload
}

#[test]
fn new_items_are_unanalyzed_even_with_payload() {
    let data = ExtractedData::from_payload(Stage::New, Some(&priced_payload()));
    assert_eq!(data, ExtractedData::Unanalyzed);
    assert!(data.requirements().is_none());
}

#[test]
fn processed_items_expose_requirements_and_match_only() {
    let data = ExtractedData::from_payload(Stage::Processed, Some(&priced_payload()));

    let requirements = data.requirements().expect("requirements");
    assert_eq!(requirements["item_name"], "Exterior emulsion");
    assert_eq!(requirements["quantity"], "1200");
    assert_eq!(requirements["colors"], "white, ivory");
    assert_eq!(requirements["warranty"], "N/A");

    let product = data.product_match().expect("match");
    assert_eq!(product.product_id, "17");
    assert_eq!(product.match_score, Some(92.5));
    assert!(data.pricing().is_none());
}

#[test]
fn priced_and_finalized_carry_the_quote() {
    let priced = ExtractedData::from_payload(Stage::PricingComplete, Some(&priced_payload()));
    assert!(matches!(priced, ExtractedData::Priced { .. }));
    let quote = priced.pricing().expect("pricing");
    assert_eq!(quote.sku, "EXT-EM-20");
    assert_eq!(quote.final_unit_price, 431.7);
    assert_eq!(
        quote.components,
        PriceComponents {
            base_price: Some(300.0),
            logistics: Some(15.0),
            margin: Some(60.0),
            gst: Some(56.7),
        }
    );

    let finalized = ExtractedData::from_payload(Stage::ReadyToSubmit, Some(&priced_payload()));
    assert!(matches!(finalized, ExtractedData::Finalized { .. }));
}

#[test]
fn missing_stage_fields_degrade_the_variant() {
    let data = ExtractedData::from_payload(Stage::ReadyToSubmit, Some(&analysis_payload()));
    assert!(matches!(data, ExtractedData::Analyzed { .. }));

    let data = ExtractedData::from_payload(Stage::PricingComplete, Some(&json!({})));
    assert_eq!(data, ExtractedData::Unanalyzed);

    let data = ExtractedData::from_payload(Stage::Processed, Some(&json!("not an object")));
    assert_eq!(data, ExtractedData::Unanalyzed);

    let data = ExtractedData::from_payload(Stage::Processed, None);
    assert_eq!(data, ExtractedData::Unanalyzed);
}

#[test]
fn malformed_sections_are_treated_as_absent() {
    let payload = json!({
        "requirements": {"item_name": "Primer"},
        "match": {"match_score": 40},
        "pricing": {"sku": "PR-1", "final_unit_price": "cheap"}
    });
    let data = ExtractedData::from_payload(Stage::PricingComplete, Some(&payload));

    assert!(matches!(data, ExtractedData::Analyzed { .. }));
    assert!(data.product_match().is_none());
    assert!(data.pricing().is_none());
}

#[test]
fn pricing_defaults_currency_and_components() {
    let payload = json!({
        "match": {"product_id": "P-9"},
        "pricing": {"sku": "P-9", "final_unit_price": 10.0}
    });
    let data = ExtractedData::from_payload(Stage::PricingComplete, Some(&payload));
    let quote = data.pricing().expect("pricing");
    assert_eq!(quote.currency, "INR");
    assert_eq!(quote.components, PriceComponents::default());
    assert!(data.requirements().unwrap().is_empty());
}

#[test]
fn record_deserializes_backend_row() {
    let record: RfpRecord = serde_json::from_value(json!({
        "id": 21,
        "title": "Hospital repaint",
        "client_name": "Health Dept",
        "deadline": "2025-02-14",
        "status": "Pricing Complete",
        "file_url": "/app/data/portal/hospital.pdf",
        "extracted_data": priced_payload(),
        "created_at": "2025-01-02T10:00:00Z"
    }))
    .expect("record");

    assert_eq!(record.stage(), Stage::PricingComplete);
    assert!(matches!(record.extracted(), ExtractedData::Priced { .. }));
}
