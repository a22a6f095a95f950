use colonycore_pluginapi::dataset::{Column, Format, RunResult};
use serde_json::{Map, Value};

/// An artifact body ready for the object store.
pub(super) struct Rendered {
    pub content_type: &'static str,
    pub extension: &'static str,
    pub payload: Vec<u8>,
    pub metadata: Map<String, Value>,
}

/// Encodes `result` as `format`. Only JSON and CSV have encoders.
pub(super) fn materialize(
    format: Format,
    columns: &[Column],
    result: &RunResult,
) -> Result<Rendered, String> {
    let mut metadata = Map::new();
    metadata.insert("rows".to_string(), Value::from(result.rows.len()));

    match format {
        Format::Json => {
            let payload =
                serde_json::to_vec(result).map_err(|err| format!("marshal json: {err}"))?;
            Ok(Rendered {
                content_type: "application/json",
                extension: "json",
                payload,
                metadata,
            })
        }
        Format::Csv => {
            let columns = if result.schema.is_empty() {
                columns
            } else {
                &result.schema
            };
            let payload =
                render_csv(columns, &result.rows).map_err(|err| format!("write csv: {err}"))?;
            Ok(Rendered {
                content_type: "text/csv",
                extension: "csv",
                payload,
                metadata,
            })
        }
        other => Err(format!("format {other} not supported by exporter")),
    }
}

fn render_csv(columns: &[Column], rows: &[Map<String, Value>]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.iter().map(|column| column.name.as_str()))?;
    for row in rows {
        writer.write_record(columns.iter().map(|column| cell(row.get(&column.name))))?;
    }
    Ok(writer.into_inner().map_err(|err| err.into_error())?)
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
