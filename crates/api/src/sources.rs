use std::collections::HashSet;

use index::IndexRecord;

/// Collapse retrieved passages into display labels, deduplicated by
/// `(source, page)` while keeping retrieval order.
pub fn source_labels(records: &[IndexRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut labels = Vec::new();

    for record in records {
        let label = match record.page_number {
            Some(page) => format!("{} — page {}", record.source, page),
            None => record.source.clone(),
        };
        if seen.insert(label.clone()) {
            labels.push(label);
        }
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, page: Option<u32>) -> IndexRecord {
        IndexRecord {
            vector: vec![0.0],
            text: "passage".to_string(),
            source: source.to_string(),
            page_number: page,
        }
    }

    #[test]
    fn labels_are_deduplicated_by_source_and_page() {
        let records = [
            record("handbook.pdf", Some(3)),
            record("handbook.pdf", Some(3)),
            record("handbook.pdf", Some(4)),
            record("integrity.pdf", None),
        ];
        let labels = source_labels(&records);
        assert_eq!(
            labels,
            [
                "handbook.pdf — page 3",
                "handbook.pdf — page 4",
                "integrity.pdf",
            ]
        );
    }

    #[test]
    fn labels_keep_retrieval_order() {
        let records = [record("b.pdf", Some(1)), record("a.pdf", Some(1))];
        let labels = source_labels(&records);
        assert_eq!(labels, ["b.pdf — page 1", "a.pdf — page 1"]);
    }
}
