use std::io::{self, Write};

use crate::{monitor::Renderer, pvt::PvtRecord};

/// Headless output: one JSON object per line and per record
pub struct JsonLines<W: Write> {
    out: W,
}

impl<W: Write> JsonLines<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonLines<W> {
    fn render_header(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn render_record(&mut self, record: &PvtRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod test {
    use super::JsonLines;
    use crate::{monitor::Renderer, pvt::PvtRecord};

    #[test]
    fn json_lines() {
        let record = PvtRecord {
            tow_at_current_symbol_ms: 123456,
            week: 2200,
            valid_sats: 9,
            ar_ratio_factor: 2.5,
            ..Default::default()
        };

        let mut json = JsonLines::new(Vec::new());
        json.render_header().unwrap();
        json.render_record(&record).unwrap();
        json.render_record(&record).unwrap();

        let content = String::from_utf8(json.into_inner()).unwrap();
        let lines = content.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], lines[1]);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["tow_at_current_symbol_ms"], 123456);
        assert_eq!(value["week"], 2200);
        assert_eq!(value["valid_sats"], 9);
        assert_eq!(value["ar_ratio_factor"], 2.5);
        assert_eq!(value["vdop"], 0.0);
    }
}
