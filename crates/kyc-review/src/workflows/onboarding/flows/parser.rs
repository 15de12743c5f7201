use serde::Deserialize;
use std::io::Read;

#[derive(Debug)]
pub(crate) struct FlowRow {
    pub(crate) name: String,
    pub(crate) steps: Vec<String>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<FlowRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<CatalogRow>() {
        let row = record?;
        if row.name.is_empty() {
            continue;
        }

        let steps = row
            .required_steps
            .split(|ch| ch == ',' || ch == ';' || ch == '|')
            .map(str::trim)
            .filter(|step| !step.is_empty())
            .map(str::to_string)
            .collect();

        rows.push(FlowRow {
            name: row.name,
            steps,
        });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Flow name")]
    name: String,
    #[serde(rename = "Required steps", default)]
    required_steps: String,
}
