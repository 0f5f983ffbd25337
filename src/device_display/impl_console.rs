use crate::config::IndicatorColor;
use crate::device_display::interface::DeviceDisplay;
use crate::realtime::indicator::Indicator;
use image::DynamicImage;
use std::error::Error;
use std::io::{Stdout, Write};

const RESET: &str = "\x1b[0m";

fn ansi(color: IndicatorColor) -> &'static str {
    match color {
        IndicatorColor::Green => "\x1b[32m",
        IndicatorColor::Red => "\x1b[31m",
        IndicatorColor::Yellow => "\x1b[33m",
        IndicatorColor::White => "\x1b[37m",
    }
}

/// Prints one coloured detection line per frame. Colour codes never leak
/// past the line that uses them.
pub struct DeviceDisplayConsole<W: Write + Send> {
    out: W,
}

impl DeviceDisplayConsole<Stdout> {
    pub fn new() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write + Send> DeviceDisplayConsole<W> {
    #[allow(dead_code)]
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    #[allow(dead_code)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> DeviceDisplay for DeviceDisplayConsole<W> {
    fn open(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    fn render(
        &mut self,
        _frame: &DynamicImage,
        indicator: &Indicator,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        writeln!(
            self.out,
            "{}[Falling Detection AI] Detected: {}{}",
            ansi(indicator.color),
            indicator.text,
            RESET
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        write!(self.out, "{}", RESET)?;
        self.out.flush()?;
        Ok(())
    }
}
