//! Feature table assembly and CSV serialization.

use anyhow::Result;

use crate::extract::TrackRecord;

/// Column order of the feature table. Schema inference and the COPY column
/// list downstream both key off this exact sequence.
pub const COLUMNS: [&str; 21] = [
    "track",
    "artist",
    "danceability",
    "energy",
    "key",
    "loudness",
    "mode",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
    "type",
    "id",
    "uri",
    "track_href",
    "analysis_url",
    "duration_ms",
    "time_signature",
    "genres",
];

/// The denormalized feature table: one row per track that carries a
/// resolved feature set, in extraction order.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    rows: Vec<Vec<String>>,
}

impl FeatureTable {
    /// Build the table from enriched records. Records without a feature set
    /// are excluded; everything else keeps its extraction order.
    pub fn from_records(records: &[TrackRecord]) -> Self {
        let mut rows = Vec::new();
        for record in records {
            let Some(f) = &record.features else {
                continue;
            };
            let genres = serde_json::to_string(&record.genres)
                .unwrap_or_else(|_| String::from("[]"));
            rows.push(vec![
                record.name.clone(),
                record.artist.clone(),
                f.danceability.to_string(),
                f.energy.to_string(),
                f.key.to_string(),
                f.loudness.to_string(),
                f.mode.to_string(),
                f.speechiness.to_string(),
                f.acousticness.to_string(),
                f.instrumentalness.to_string(),
                f.liveness.to_string(),
                f.valence.to_string(),
                f.tempo.to_string(),
                f.kind.clone(),
                f.id.clone(),
                f.uri.clone(),
                f.track_href.clone(),
                f.analysis_url.clone(),
                f.duration_ms.to_string(),
                f.time_signature.to_string(),
                genres,
            ]);
        }
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Serialize as CSV with a header row.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(COLUMNS)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        Ok(writer.into_inner()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::AudioFeatures;

    fn record(id: &str, name: &str, features: bool, genres: &[&str]) -> TrackRecord {
        TrackRecord {
            id: Some(id.to_string()),
            name: name.to_string(),
            artist: "Artist".to_string(),
            features: features.then(|| AudioFeatures {
                danceability: 0.5,
                energy: 0.6,
                key: 5,
                loudness: -7.0,
                mode: 1,
                speechiness: 0.05,
                acousticness: 0.2,
                instrumentalness: 0.0,
                liveness: 0.1,
                valence: 0.4,
                tempo: 120.0,
                kind: "audio_features".to_string(),
                id: id.to_string(),
                uri: format!("spotify:track:{}", id),
                track_href: format!("https://api.example.com/tracks/{}", id),
                analysis_url: format!("https://api.example.com/analysis/{}", id),
                duration_ms: 180_000,
                time_signature: 4,
            }),
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[test]
    fn test_column_order_is_deterministic() {
        let records = vec![record("t1", "one", true, &["rock"])];
        let table = FeatureTable::from_records(&records);
        let csv_bytes = table.to_csv().unwrap();

        let mut reader = csv::Reader::from_reader(csv_bytes.as_slice());
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, COLUMNS);

        // Building again yields the same header.
        let again = FeatureTable::from_records(&records).to_csv().unwrap();
        assert_eq!(csv_bytes, again);
    }

    #[test]
    fn test_records_without_features_are_excluded() {
        let records = vec![
            record("t1", "one", true, &[]),
            record("t2", "two", false, &[]),
            record("t3", "three", true, &[]),
        ];
        let table = FeatureTable::from_records(&records);
        assert_eq!(table.row_count(), 2);

        let csv_bytes = table.to_csv().unwrap();
        let mut reader = csv::Reader::from_reader(csv_bytes.as_slice());
        let names: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[0].to_string())
            .collect();
        assert_eq!(names, vec!["one", "three"]);
    }

    #[test]
    fn test_genre_cell_survives_csv_round_trip() {
        // Genre lists contain commas once serialized; quoting must keep the
        // row at exactly 21 fields.
        let records = vec![record("t1", "one", true, &["rock", "indie pop"])];
        let csv_bytes = FeatureTable::from_records(&records).to_csv().unwrap();

        let mut reader = csv::Reader::from_reader(csv_bytes.as_slice());
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(&row[20], r#"["rock","indie pop"]"#);
    }

    #[test]
    fn test_empty_input_yields_header_only() {
        let table = FeatureTable::from_records(&[]);
        assert_eq!(table.row_count(), 0);
        let csv_bytes = table.to_csv().unwrap();
        let mut reader = csv::Reader::from_reader(csv_bytes.as_slice());
        assert_eq!(reader.headers().unwrap().len(), COLUMNS.len());
        assert_eq!(reader.records().count(), 0);
    }
}
