//! Tests for ChunkAccumulator threshold and carry-over behaviour

use super::*;

#[test]
fn test_small_input_becomes_one_final_chunk() {
    let chunks = accumulate(
        FileFormat::Csv,
        ChunkThreshold::Bytes(1024),
        "1,Product A\n2,Product B",
        4096,
    );

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].index, 0);
    assert_eq!(chunks[0].text, "1,Product A\n2,Product B");
}

#[test]
fn test_record_threshold_cuts_exact_counts() {
    let input = trade_lines(10);
    let chunks = accumulate(FileFormat::Csv, ChunkThreshold::Records(3), &input, 7);

    let sizes: Vec<_> = chunks.iter().map(|c| c.records).collect();
    assert_eq!(sizes, vec![3, 3, 3, 1]);
    for chunk in &chunks {
        assert!(chunk.text.ends_with('\n'));
    }
}

#[test]
fn test_byte_threshold_never_splits_records() {
    let input = trade_lines(50);
    let chunks = accumulate(FileFormat::Csv, ChunkThreshold::Bytes(64), &input, 5);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.text.ends_with('\n'), "chunk {} split a line", chunk.index);
        let parsed = FileFormat::Csv.parse_trade_records(&chunk.text);
        assert_eq!(parsed.stats.records_skipped, 0);
    }
}

#[test]
fn test_chunk_indexes_are_sequential() {
    let input = trade_lines(40);
    let chunks = accumulate(FileFormat::Csv, ChunkThreshold::Records(4), &input, 11);
    let indexes: Vec<_> = chunks.iter().map(|c| c.index).collect();
    assert_eq!(indexes, (0..chunks.len() as u64).collect::<Vec<_>>());
}

#[test]
fn test_concatenated_chunks_reproduce_input() {
    for format_input in [
        (FileFormat::Csv, trade_lines(37)),
        (FileFormat::Json, trade_array(23)),
        (FileFormat::Xml, trade_document(19)),
    ] {
        let (format, input) = format_input;
        for fragment_size in [1, 3, 64, 4096] {
            let chunks = accumulate(format, ChunkThreshold::Bytes(100), &input, fragment_size);
            let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
            assert_eq!(rebuilt.trim_end(), input.trim_end(), "{} / {}", format, fragment_size);
        }
    }
}

#[test]
fn test_chunking_does_not_change_parsed_records() {
    let inputs = [
        (FileFormat::Csv, trade_lines(41)),
        (FileFormat::Json, trade_array(29)),
        (FileFormat::Xml, trade_document(31)),
    ];

    for (format, input) in inputs {
        let whole = format.parse_trade_records(&input).records;
        for threshold in [
            ChunkThreshold::Bytes(1),
            ChunkThreshold::Bytes(150),
            ChunkThreshold::Records(1),
            ChunkThreshold::Records(5),
        ] {
            let chunked: Vec<_> = accumulate(format, threshold, &input, 13)
                .iter()
                .flat_map(|c| format.parse_trade_records(&c.text).records)
                .collect();
            assert_eq!(chunked, whole, "{} with {:?}", format, threshold);
        }
    }
}

#[test]
fn test_multibyte_characters_split_across_fragments() {
    let input = "1,Café Crème\n2,Ünïcödé\n";
    let chunks = accumulate(FileFormat::Csv, ChunkThreshold::Records(1), input, 1);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].text, "1,Café Crème\n");
    assert_eq!(chunks[1].text, "2,Ünïcödé\n");
}

#[test]
fn test_partial_record_is_carried_over() {
    let mut accumulator = ChunkAccumulator::new(FileFormat::Csv, ChunkThreshold::Records(1));

    assert!(accumulator.push(b"1,Prod").is_empty());
    assert_eq!(accumulator.buffered(), 6);

    let chunks = accumulator.push(b"uct A\n2,Pro");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "1,Product A\n");
    assert_eq!(accumulator.buffered(), 5);

    let last = accumulator.finish().unwrap();
    assert_eq!(last.text, "2,Pro");
    assert_eq!(last.index, 1);
    assert_eq!(accumulator.chunks_emitted(), 2);
}

#[test]
fn test_whitespace_remainder_is_dropped() {
    let mut accumulator = ChunkAccumulator::new(FileFormat::Csv, ChunkThreshold::Records(1));
    let chunks = accumulator.push(b"1,A\n\n  \n");
    assert_eq!(chunks.len(), 1);
    assert!(accumulator.finish().is_none());
}

#[test]
fn test_empty_input_produces_no_chunks() {
    let chunks = accumulate(FileFormat::Json, ChunkThreshold::default(), "", 16);
    assert!(chunks.is_empty());
}
