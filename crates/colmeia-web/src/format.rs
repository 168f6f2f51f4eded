//! Local-time display strings and the CSV writer.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

pub fn local_datetime(dt: &DateTime<Utc>, offset: FixedOffset) -> String {
    dt.with_timezone(&offset).format("%d/%m/%Y %H:%M").to_string()
}

pub fn local_iso(dt: &DateTime<Utc>, offset: FixedOffset) -> String {
    dt.with_timezone(&offset).to_rfc3339()
}

pub fn date_display(date: &NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Builds `text/csv` bodies: CRLF line ends, fields quoted only when needed.
#[derive(Debug, Default)]
pub struct CsvWriter {
    buf: String,
}

impl CsvWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_record<S: AsRef<str>>(&mut self, fields: &[S]) {
        for (index, field) in fields.iter().enumerate() {
            if index > 0 {
                self.buf.push(',');
            }
            let field = field.as_ref();
            if field.contains([',', '"', '\n', '\r']) {
                self.buf.push('"');
                self.buf.push_str(&field.replace('"', "\"\""));
                self.buf.push('"');
            } else {
                self.buf.push_str(field);
            }
        }
        self.buf.push_str("\r\n");
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn displays_in_the_configured_offset() {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let dt = Utc.with_ymd_and_hms(2025, 3, 1, 2, 30, 0).unwrap();
        assert_eq!(local_datetime(&dt, offset), "28/02/2025 23:30");
        assert_eq!(local_iso(&dt, offset), "2025-02-28T23:30:00-03:00");
    }

    #[test]
    fn csv_quotes_special_fields() {
        let mut csv = CsvWriter::new();
        csv.write_record(&["Mês", "Mel (ml)"]);
        csv.write_record(&["a,b", "diz \"oi\"", "linha\nnova"]);
        assert_eq!(
            csv.finish(),
            "Mês,Mel (ml)\r\n\"a,b\",\"diz \"\"oi\"\"\",\"linha\nnova\"\r\n"
        );
    }
}
