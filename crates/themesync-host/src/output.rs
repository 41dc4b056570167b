use std::io::{self, Write};

use console::Style;
use serde::Serialize;
use themesync::{Disposition, ResolvedScheme};

use crate::cli::Format;
use crate::session::Snapshot;

#[derive(Serialize)]
struct Record<'a> {
    line: usize,
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    disposition: Option<&'a Disposition>,
    state: &'a Snapshot,
}

/// Writes one record per applied event.
pub struct Printer<W: Write> {
    format: Format,
    out: W,
}

impl<W: Write> Printer<W> {
    pub fn new(format: Format, out: W) -> Self {
        Self { format, out }
    }

    pub fn print(
        &mut self,
        line: usize,
        event: &str,
        disposition: Option<&Disposition>,
        snapshot: &Snapshot,
    ) -> io::Result<()> {
        match self.format {
            Format::Json => {
                let record = Record {
                    line,
                    event,
                    disposition,
                    state: snapshot,
                };
                serde_json::to_writer(&mut self.out, &record)?;
                writeln!(self.out)
            }
            Format::Text => self.print_text(line, event, disposition, snapshot),
        }
    }

    fn print_text(
        &mut self,
        line: usize,
        event: &str,
        disposition: Option<&Disposition>,
        snapshot: &Snapshot,
    ) -> io::Result<()> {
        let dim = Style::new().dim();
        let scheme = scheme_style(snapshot.resolved);
        let root = &snapshot.root;

        write!(
            self.out,
            "{} {:<9} theme={} resolved={} class=\"{}\"",
            dim.apply_to(format!("{:>4}", line)),
            event,
            snapshot.theme,
            scheme.apply_to(snapshot.resolved),
            root.class_name(),
        )?;
        if let Some(value) = root.attributes().values().next() {
            write!(self.out, " scheme={}", value)?;
        }
        let css = root.css_text();
        if !css.is_empty() {
            write!(self.out, " style=\"{}\"", css)?;
        }
        if let Some(disposition) = disposition {
            write!(self.out, " {}", describe(disposition))?;
        }
        writeln!(self.out)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn scheme_style(scheme: ResolvedScheme) -> Style {
    match scheme {
        ResolvedScheme::Dark => Style::new().blue().bold(),
        ResolvedScheme::Light => Style::new().yellow().bold(),
    }
}

fn describe(disposition: &Disposition) -> String {
    match disposition {
        Disposition::CssVarsApplied { applied, skipped } => Style::new()
            .green()
            .apply_to(format!("applied {} vars ({} skipped)", applied, skipped))
            .to_string(),
        Disposition::ThemeForwarded { theme } => Style::new()
            .green()
            .apply_to(format!("forwarded theme {}", theme))
            .to_string(),
        Disposition::Ignored { reason } => Style::new()
            .red()
            .apply_to(format!("ignored: {}", reason))
            .to_string(),
    }
}
