//! A compact terminal renderer for diagnostics.
//!
//! This is deliberately plain: `path:line:col severity[code]: message`
//! followed by label and help lines. The fancy graphical renderer the CLI may
//! grow later sits outside the engine.

use std::io::{self, Write};

use termcolor::{Color, ColorSpec, WriteColor};

use crate::file::LineIndex;
use crate::{Diagnostic, Severity};

pub struct Emitter<W> {
    writer: W,
}

impl<W: WriteColor> Emitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn emit(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        let severity_color = match diagnostic.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Note => Color::Cyan,
        };

        let location = diagnostic.source.as_ref().map(|source| {
            let index = LineIndex::new(source.text());
            let (line, col) = index.line_col(diagnostic.primary_span().start as usize);
            (source.name().into_owned(), line, col)
        });

        if let Some((name, line, col)) = &location {
            write!(self.writer, "{}:{}:{}: ", name, line, col)?;
        } else if let Some(name) = &diagnostic.source_name {
            write!(self.writer, "{}: ", name)?;
        }

        self.writer
            .set_color(ColorSpec::new().set_fg(Some(severity_color)).set_bold(true))?;
        write!(self.writer, "{}", diagnostic.severity)?;
        self.writer.reset()?;
        writeln!(
            self.writer,
            "[{}]: {}",
            diagnostic.code, diagnostic.message
        )?;

        if let Some(source) = &diagnostic.source {
            for label in &diagnostic.labels {
                let snippet = source.slice(label.span);
                let marker = if label.primary { "-->" } else { "   " };
                match &label.message {
                    Some(message) => {
                        writeln!(self.writer, "  {} `{}`: {}", marker, snippet, message)?
                    }
                    None => writeln!(self.writer, "  {} `{}`", marker, snippet)?,
                }
            }
        }

        if let Some(help) = &diagnostic.help {
            self.writer
                .set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            write!(self.writer, "  help")?;
            self.writer.reset()?;
            writeln!(self.writer, ": {}", help)?;
        }

        Ok(())
    }
}
