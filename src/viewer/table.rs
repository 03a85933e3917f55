use crate::geofile::feature::FeatureCollection;
use crate::validity::classify::InvalidityReport;

/// Render the attribute columns of a collection as a fixed-width text
/// table, geometry excluded. Shows at most `max_rows` rows.
pub fn render_attribute_table(collection: &FeatureCollection, max_rows: usize) -> String {
    let rows: Vec<Vec<String>> = collection
        .features
        .iter()
        .take(max_rows)
        .map(|feature| attribute_row(&collection.field_names, feature.attributes.as_ref()))
        .collect();
    render_rows(&collection.field_names, &rows, collection.len())
}

/// Render the invalidity report with the attribute columns followed by the
/// cause column.
pub fn render_invalidity_report(
    report: &InvalidityReport,
    field_names: &[String],
    max_rows: usize,
) -> String {
    let mut headers = field_names.to_vec();
    headers.push("invalid_cause".to_string());
    let rows: Vec<Vec<String>> = report
        .entries
        .iter()
        .take(max_rows)
        .map(|entry| {
            let mut row = attribute_row(field_names, entry.attributes.as_ref());
            row.push(entry.invalid_cause.clone());
            row
        })
        .collect();
    render_rows(&headers, &rows, report.len())
}

fn attribute_row(
    field_names: &[String],
    attributes: Option<&std::collections::HashMap<String, String>>,
) -> Vec<String> {
    field_names
        .iter()
        .map(|field_name| {
            attributes
                .and_then(|attributes| attributes.get(field_name))
                .cloned()
                .unwrap_or_default()
        })
        .collect()
}

fn render_rows(headers: &[String], rows: &[Vec<String>], total_rows: usize) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.len()).collect();
    for row in rows {
        for (index, value) in row.iter().enumerate() {
            widths[index] = widths[index].max(value.len());
        }
    }

    let render_line = |values: &[String]| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{:<width$}", value, width = *width))
            .collect::<Vec<String>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::new();
    lines.push(render_line(headers));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<String>>()
            .join("  "),
    );
    for row in rows {
        lines.push(render_line(row));
    }
    if rows.len() < total_rows {
        lines.push(format!("({} of {} rows shown)", rows.len(), total_rows));
    }
    lines.join("\n")
}
