//! Knowledge-base records and the built-in sample set

use crate::schema::{FieldValue, Row, CATEGORY_FIELD, CONTENT_FIELD, TITLE_FIELD, VECTOR_FIELD};
use serde::{Deserialize, Serialize};

/// A knowledge-base entry before it is embedded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub content: String,
    pub category: String,
    pub title: String,
}

impl KnowledgeRecord {
    pub fn new(
        content: impl Into<String>,
        category: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            category: category.into(),
            title: title.into(),
        }
    }

    /// Build the insert row for this record with its embedding
    pub fn to_row(&self, embedding: Vec<f32>) -> Row {
        Row::from([
            (VECTOR_FIELD.to_string(), FieldValue::FloatVector(embedding)),
            (
                CONTENT_FIELD.to_string(),
                FieldValue::VarChar(self.content.clone()),
            ),
            (
                CATEGORY_FIELD.to_string(),
                FieldValue::VarChar(self.category.clone()),
            ),
            (
                TITLE_FIELD.to_string(),
                FieldValue::VarChar(self.title.clone()),
            ),
        ])
    }
}

/// The sample traffic-knowledge records seeded into a fresh collection
pub fn sample_records() -> Vec<KnowledgeRecord> {
    vec![
        KnowledgeRecord::new(
            "On February 15, 2024, a serious traffic accident occurred at the intersection of \
             Fifth Avenue and 42nd Street in Manhattan: a taxi collided with a bus, injuring 3 people.",
            "traffic_accident",
            "Serious traffic accident in Manhattan, February 2024",
        ),
        KnowledgeRecord::new(
            "On February 18, 2024, due to a snowstorm, the New York City transportation department \
             issued a yellow alert advising residents to avoid unnecessary travel.",
            "weather_impact",
            "Snowstorm traffic advisory, February 2024",
        ),
        KnowledgeRecord::new(
            "On February 20, 2024, temporary traffic control was put in place around Times Square \
             for a large event, and several bus routes were adjusted.",
            "permitted_event",
            "Times Square event traffic control, February 2024",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CollectionSpec;

    #[test]
    fn test_sample_rows_fit_knowledge_base_schema() {
        let spec = CollectionSpec::knowledge_base("knowledge_base", 8, 2);
        let records = sample_records();
        assert_eq!(records.len(), 3);

        for record in &records {
            spec.validate_row(&record.to_row(vec![0.5; 8])).unwrap();
        }
    }

    #[test]
    fn test_to_row_carries_text_fields() {
        let record = KnowledgeRecord::new("body", "cat", "head");
        let row = record.to_row(vec![1.0, 2.0]);
        assert_eq!(row.get(CONTENT_FIELD).and_then(|v| v.as_str()), Some("body"));
        assert_eq!(row.get(CATEGORY_FIELD).and_then(|v| v.as_str()), Some("cat"));
        assert_eq!(row.get(TITLE_FIELD).and_then(|v| v.as_str()), Some("head"));
        assert_eq!(
            row.get(VECTOR_FIELD).and_then(|v| v.as_vector()),
            Some(&[1.0, 2.0][..])
        );
    }
}
