//! CSV rendering of enriched session rows

use crate::pipeline::sessions::SessionRow;

/// Column order of the session download
pub const SESSION_CSV_COLUMNS: &[&str] = &[
    "_id",
    "date",
    "mentor_name",
    "startup_company",
    "topic",
    "status",
    "summary",
    "duration",
    "comments",
    "pdfUrl",
    "mentorSigned",
    "startupSigned",
];

const COMMENT_SEPARATOR: &str = "; ";

/// Quote a field when it contains a delimiter, quote or line break (RFC 4180)
fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn push_record(out: &mut String, fields: &[String]) {
    let line: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

/// Render rows as CSV with a header line; empty input yields only the header
pub fn sessions_to_csv(rows: &[SessionRow]) -> String {
    let mut out = String::new();
    let header: Vec<String> = SESSION_CSV_COLUMNS.iter().map(|c| c.to_string()).collect();
    push_record(&mut out, &header);

    for row in rows {
        let fields = [
            row.id.clone().unwrap_or_default(),
            row.date.clone().unwrap_or_default(),
            row.mentor_name.clone(),
            row.startup_company.clone(),
            row.topic.clone().unwrap_or_default(),
            row.status.clone().unwrap_or_default(),
            row.summary.clone().unwrap_or_default(),
            row.duration.map(|d| d.to_string()).unwrap_or_default(),
            row.comments.join(COMMENT_SEPARATOR),
            row.pdf_url.clone(),
            row.mentor_signed.signed.to_string(),
            row.startup_signed.signed.to_string(),
        ];
        push_record(&mut out, &fields);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::sessions::SignatureRow;

    fn row() -> SessionRow {
        SessionRow {
            id: Some("687dbc94a09e6c626f1bc7e6".into()),
            mentor_id: None,
            mentor_name: "Marta".into(),
            startup_company: "Agrotech Sur".into(),
            startup_id: None,
            date: Some("2025-08-10 14:00".into()),
            topic: Some("Estrategias de Crecimiento, Escalado".into()),
            duration: Some(1.5),
            summary: Some("Dijo \"bien\"".into()),
            status: Some("signed".into()),
            comments: vec!["uno".into(), "dos".into()],
            pdf_url: String::new(),
            mentor_signed: SignatureRow { signed: true, timestamp: None },
            startup_signed: SignatureRow::default(),
        }
    }

    #[test]
    fn test_header_only_for_empty_input() {
        assert_eq!(
            sessions_to_csv(&[]),
            "_id,date,mentor_name,startup_company,topic,status,summary,duration,comments,pdfUrl,mentorSigned,startupSigned\r\n"
        );
    }

    #[test]
    fn test_row_escaping() {
        let csv = sessions_to_csv(&[row()]);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(
            lines[1],
            "687dbc94a09e6c626f1bc7e6,2025-08-10 14:00,Marta,Agrotech Sur,\"Estrategias de Crecimiento, Escalado\",signed,\"Dijo \"\"bien\"\"\",1.5,uno; dos,,true,false"
        );
    }
}
