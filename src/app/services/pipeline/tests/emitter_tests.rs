use super::*;

fn enriched(key: &str, name: Option<&str>, price: &str) -> EnrichedTrade {
    TradeRecord::new("20240315", key, "USD", price)
        .unwrap()
        .enrich(name.map(str::to_string))
}

fn as_text(units: &[Bytes]) -> String {
    units
        .iter()
        .map(|unit| std::str::from_utf8(unit).unwrap())
        .collect()
}

#[test]
fn test_csv_output_lines() {
    let emitter = OutputEmitter::new(EmitFormat::Csv, 100);
    let trades = vec![
        enriched("1", Some("Widget"), "100.50"),
        enriched("9", None, "0.01"),
    ];

    let units = emitter.encode(&trades).unwrap();

    assert_eq!(units.len(), 1);
    assert_eq!(
        as_text(&units),
        format!(
            "20240315,Widget,USD,100.50\n20240315,{},USD,0.01\n",
            MISSING_PRODUCT_NAME
        )
    );
}

#[test]
fn test_csv_quotes_names_with_delimiter() {
    let emitter = OutputEmitter::new(EmitFormat::Csv, 100);
    let trades = vec![enriched("1", Some("Widget, large"), "5")];

    let units = emitter.encode(&trades).unwrap();

    assert_eq!(as_text(&units), "20240315,\"Widget, large\",USD,5\n");
}

#[test]
fn test_json_lines_output() {
    let emitter = OutputEmitter::new(EmitFormat::Json, 100);
    let trades = vec![enriched("1", Some("Widget"), "100.50"), enriched("2", None, "7")];

    let text = as_text(&emitter.encode(&trades).unwrap());
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["productName"], "Widget");
    assert_eq!(lines[0]["productId"], "1");
    assert_eq!(lines[0]["price"], "100.50");
    assert_eq!(lines[1]["productName"], MISSING_PRODUCT_NAME);
}

#[test]
fn test_output_split_into_batches() {
    let emitter = OutputEmitter::new(EmitFormat::Csv, 2);
    let trades: Vec<EnrichedTrade> = (0..5)
        .map(|i| enriched(&i.to_string(), Some("Widget"), "1"))
        .collect();

    let units = emitter.encode(&trades).unwrap();

    assert_eq!(units.len(), 3);
    assert_eq!(as_text(&units).lines().count(), 5);
}

#[test]
fn test_empty_input_produces_no_units() {
    let emitter = OutputEmitter::new(EmitFormat::Json, 10);
    assert!(emitter.encode(&[]).unwrap().is_empty());
}

#[test]
fn test_zero_batch_size_clamped() {
    let emitter = OutputEmitter::new(EmitFormat::Csv, 0);
    let trades = vec![enriched("1", None, "1"), enriched("2", None, "2")];

    assert_eq!(emitter.encode(&trades).unwrap().len(), 2);
}

#[test]
fn test_emit_format_from_str() {
    assert_eq!("csv".parse::<EmitFormat>().unwrap(), EmitFormat::Csv);
    assert_eq!("JSONL".parse::<EmitFormat>().unwrap(), EmitFormat::Json);
    assert_eq!("ndjson".parse::<EmitFormat>().unwrap(), EmitFormat::Json);
    assert!(matches!(
        "parquet".parse::<EmitFormat>(),
        Err(Error::Configuration { .. })
    ));
}

#[test]
fn test_output_ordering_from_str() {
    assert_eq!(
        "preserve".parse::<OutputOrdering>().unwrap(),
        OutputOrdering::Preserve
    );
    assert_eq!(
        "Completion".parse::<OutputOrdering>().unwrap(),
        OutputOrdering::Completion
    );
    assert!("random".parse::<OutputOrdering>().is_err());
    assert_eq!(OutputOrdering::default().to_string(), "preserve");
}
